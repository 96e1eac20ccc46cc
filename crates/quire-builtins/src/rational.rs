//! Exact rational arithmetic.
//!
//! A `Rational` is a numerator/denominator pair of arbitrary-precision
//! integers. The denominator is always positive; the sign lives on the
//! numerator. Values are *not* reduced on every operation; multiply
//! and add chains defer the gcd work until `normalize` is called at a
//! point that actually needs the reduced form (display, integer tests,
//! power case analysis).

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::{Integer, Roots};
use num_rational::BigRational;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};
use once_cell::sync::Lazy;

use crate::complex::Complex;
use crate::error::{ErrorCode, LangError};

/// Result of `pow`/`sqrt`: stays real when it can, promotes to a
/// complex value when the principal root is off the real line.
#[derive(Debug, Clone, PartialEq)]
pub enum PowOutcome {
    Real(Rational),
    Cplx(Complex),
}

#[derive(Debug, Clone)]
pub struct Rational(BigRational);

/// Exact factorials for arguments 0..=100. Larger or fractional
/// arguments go through the Lanczos gamma approximation.
static FACTORIAL_TABLE: Lazy<Vec<BigInt>> = Lazy::new(|| {
    let mut table = Vec::with_capacity(101);
    let mut acc = BigInt::one();
    table.push(acc.clone());
    for i in 1..=100u32 {
        acc *= BigInt::from(i);
        table.push(acc.clone());
    }
    table
});

/// Lanczos coefficients (g = 5, n = 6), the fixed published set.
const LANCZOS_COEFFS: [f64; 6] = [
    76.180_091_729_471_46,
    -86.505_320_329_416_77,
    24.014_098_240_830_91,
    -1.231_739_572_450_155,
    0.120_865_097_386_617_9e-2,
    -0.539_523_938_495_3e-5,
];

/// Natural log of the gamma function for x > 0.
fn ln_gamma(x: f64) -> f64 {
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    for (i, c) in LANCZOS_COEFFS.iter().enumerate() {
        ser += c / (x + 1.0 + i as f64);
    }
    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

/// Gamma extended to the whole real line via the reflection formula
/// for arguments below 1/2.
fn gamma(x: f64) -> f64 {
    if x < 0.5 {
        std::f64::consts::PI / ((std::f64::consts::PI * x).sin() * gamma(1.0 - x))
    } else {
        ln_gamma(x).exp()
    }
}

impl Rational {
    /// Build from a numerator/denominator pair. The denominator sign is
    /// folded into the numerator; the pair is not reduced.
    pub fn new(numer: BigInt, denom: BigInt) -> Result<Self, LangError> {
        if denom.is_zero() {
            return Err(LangError::new(ErrorCode::DivideByZero));
        }
        if denom.is_negative() {
            Ok(Rational(BigRational::new_raw(-numer, -denom)))
        } else {
            Ok(Rational(BigRational::new_raw(numer, denom)))
        }
    }

    pub fn from_integer(n: BigInt) -> Self {
        Rational(BigRational::new_raw(n, BigInt::one()))
    }

    pub fn from_i64(n: i64) -> Self {
        Self::from_integer(BigInt::from(n))
    }

    pub fn zero() -> Self {
        Self::from_i64(0)
    }

    pub fn one() -> Self {
        Self::from_i64(1)
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    pub fn is_zero(&self) -> bool {
        self.0.numer().is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.numer().is_negative()
    }

    pub fn is_one(&self) -> bool {
        self.0.numer() == self.0.denom()
    }

    /// Reduce to lowest terms. The result satisfies
    /// gcd(|numerator|, denominator) = 1 and denominator > 0.
    pub fn normalize(&self) -> Self {
        if self.0.numer().is_zero() {
            return Rational::zero();
        }
        let g = self.0.numer().gcd(self.0.denom());
        Rational(BigRational::new_raw(
            self.0.numer() / &g,
            self.0.denom() / &g,
        ))
    }

    pub fn is_integer(&self) -> bool {
        self.0.numer().is_multiple_of(self.0.denom())
    }

    /// Exact integer part toward negative infinity.
    pub fn floor(&self) -> BigInt {
        self.0.numer().div_floor(self.0.denom())
    }

    pub fn ceil(&self) -> BigInt {
        self.0.numer().div_ceil(self.0.denom())
    }

    /// Truncate toward zero.
    pub fn trunc(&self) -> BigInt {
        self.0.numer() / self.0.denom()
    }

    /// Round half away from zero.
    pub fn round(&self) -> BigInt {
        let two = BigInt::from(2);
        let doubled = self.0.numer() * &two;
        if self.is_negative() {
            -((-doubled + self.0.denom()) / (self.0.denom() * &two))
        } else {
            (doubled + self.0.denom()) / (self.0.denom() * two)
        }
    }

    pub fn abs(&self) -> Self {
        Rational(BigRational::new_raw(
            self.0.numer().abs(),
            self.0.denom().clone(),
        ))
    }

    pub fn recip(&self) -> Result<Self, LangError> {
        if self.is_zero() {
            return Err(LangError::new(ErrorCode::DivideByZero));
        }
        Rational::new(self.0.denom().clone(), self.0.numer().clone())
    }

    pub fn checked_div(&self, other: &Rational) -> Result<Self, LangError> {
        if other.is_zero() {
            return Err(LangError::new(ErrorCode::DivideByZero));
        }
        Rational::new(
            self.0.numer() * other.0.denom(),
            self.0.denom() * other.0.numer(),
        )
    }

    /// Truncated-division remainder, sign following the dividend.
    pub fn modulo(&self, other: &Rational) -> Result<Self, LangError> {
        if other.is_zero() {
            return Err(LangError::new(ErrorCode::DivideByZero));
        }
        let quotient = self.checked_div(other)?.trunc();
        Ok(self - &(&Rational::from_integer(quotient) * other))
    }

    /// Greatest common divisor; both operands must be integers.
    pub fn gcd(&self, other: &Rational) -> Result<Self, LangError> {
        if !self.is_integer() || !other.is_integer() {
            return Err(LangError::with_detail(
                ErrorCode::BadType,
                "gcd is defined for integers",
            ));
        }
        Ok(Rational::from_integer(self.trunc().gcd(&other.trunc())))
    }

    /// Exact integer power by repeated squaring. A negative exponent
    /// is the reciprocal of the positive power.
    pub fn pow_int(&self, exp: &BigInt) -> Result<Self, LangError> {
        if exp.is_negative() {
            return self.recip()?.pow_int(&-exp);
        }
        let mut result = Rational::one();
        let mut base = self.clone();
        let mut e = exp.clone();
        let two = BigInt::from(2);
        while e.is_positive() {
            if e.is_odd() {
                result = &result * &base;
            }
            base = &base * &base;
            e /= &two;
        }
        Ok(result)
    }

    /// Power case analysis:
    /// - integer exponent: exact repeated multiplication (reciprocal
    ///   of the positive power when negative);
    /// - non-integer exponent, non-negative base: float pow, then
    ///   reconstructed as a rational;
    /// - non-integer exponent, negative base: the real root through
    ///   `(-1)^k` parity on the numerator when the reduced exponent
    ///   denominator is odd, the complex principal root when it is
    ///   even.
    pub fn pow(&self, exp: &Rational) -> Result<PowOutcome, LangError> {
        let exp = exp.normalize();
        if exp.is_integer() {
            return Ok(PowOutcome::Real(self.pow_int(&exp.trunc())?));
        }
        if self.is_zero() {
            if exp.is_negative() {
                return Err(LangError::new(ErrorCode::DivideByZero));
            }
            return Ok(PowOutcome::Real(Rational::zero()));
        }
        if !self.is_negative() {
            let approx = self.to_f64().powf(exp.to_f64());
            return Ok(PowOutcome::Real(Rational::from_f64(approx)?));
        }
        // Negative base, fractional exponent.
        if exp.denom().is_odd() {
            // Real odd root; the numerator parity decides the sign.
            let magnitude = self.abs().to_f64().powf(exp.to_f64());
            let root = Rational::from_f64(magnitude)?;
            if exp.numer().is_odd() {
                Ok(PowOutcome::Real(-&root))
            } else {
                Ok(PowOutcome::Real(root))
            }
        } else {
            Ok(PowOutcome::Cplx(Complex::from_rational(self.clone()).pow_complex(
                &Complex::from_rational(exp),
            )?))
        }
    }

    /// Square root: exact when both reduced terms are perfect squares,
    /// float fallback otherwise; a negative argument yields the
    /// imaginary root.
    pub fn sqrt(&self) -> Result<PowOutcome, LangError> {
        if self.is_negative() {
            let inner = self.abs().sqrt()?;
            return match inner {
                PowOutcome::Real(r) => Ok(PowOutcome::Cplx(Complex::new(Rational::zero(), r))),
                PowOutcome::Cplx(_) => Err(LangError::new(ErrorCode::BadRoot)),
            };
        }
        let reduced = self.normalize();
        let num_root = reduced.numer().sqrt();
        let den_root = reduced.denom().sqrt();
        if &(&num_root * &num_root) == reduced.numer() && &(&den_root * &den_root) == reduced.denom()
        {
            return Ok(PowOutcome::Real(Rational::new(num_root, den_root)?));
        }
        Ok(PowOutcome::Real(Rational::from_f64(self.to_f64().sqrt())?))
    }

    /// Factorial: the exact table for 0..=100, the Lanczos gamma
    /// beyond it and for non-integer arguments.
    pub fn factorial(&self) -> Result<Self, LangError> {
        if self.is_integer() {
            let n = self.trunc();
            if n.is_negative() {
                return Err(LangError::with_detail(
                    ErrorCode::BadType,
                    "factorial of a negative integer",
                ));
            }
            if let Some(idx) = n.to_usize() {
                if idx <= 100 {
                    return Ok(Rational::from_integer(FACTORIAL_TABLE[idx].clone()));
                }
            }
        }
        let approx = gamma(self.to_f64() + 1.0);
        Rational::from_f64(approx)
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    /// Exact conversion from a double. Fails on NaN/infinity, which is
    /// how float-fallback overflow surfaces as `BadRoot`.
    pub fn from_f64(f: f64) -> Result<Self, LangError> {
        match BigRational::from_float(f) {
            Some(r) => Ok(Rational(r)),
            None => Err(LangError::new(ErrorCode::BadRoot)),
        }
    }

    /// Decimal string with `digits` significant digits. Decides the
    /// decimal-place count from the magnitude, then defers to the
    /// fixed-point formatter; never rounds left of the decimal point.
    pub fn to_string_significant(&self, digits: usize) -> String {
        if self.is_zero() || digits == 0 {
            return "0".to_string();
        }
        let exp10 = self.to_f64().abs().log10().floor() as i64;
        let decimals = (digits as i64 - 1 - exp10).max(0) as usize;
        let mut s = self.to_string_fixed(decimals);
        // Trim trailing zeros in the fraction part.
        if s.contains('.') {
            while s.ends_with('0') {
                s.pop();
            }
            if s.ends_with('.') {
                s.pop();
            }
        }
        s
    }

    /// Fixed-point decimal string with `digits` places after the
    /// point, rounded half away from zero.
    pub fn to_string_fixed(&self, digits: usize) -> String {
        let scale = BigInt::from(10).pow(digits as u32);
        let scaled = self * &Rational::from_integer(scale.clone());
        let rounded = scaled.round();
        let negative = rounded.is_negative();
        let magnitude = rounded.abs();
        let (int_part, frac_part) = magnitude.div_rem(&scale);
        let sign = if negative { "-" } else { "" };
        if digits == 0 {
            format!("{sign}{int_part}")
        } else {
            format!("{sign}{int_part}.{frac_part:0>width$}", width = digits)
        }
    }
}

// Literal grammar shared with the lexer: decimal, scientific,
// hexadecimal, percentage, plain fraction, and mixed fraction.
impl FromStr for Rational {
    type Err = LangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let bad = || LangError::with_detail(ErrorCode::BadLiteral, text);
        if text.is_empty() {
            return Err(bad());
        }
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, text),
        };
        let (body, percent) = match body.strip_suffix('%') {
            Some(rest) => (rest.trim_end(), true),
            None => (body, false),
        };

        let mut value = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X"))
        {
            let n = BigInt::parse_bytes(hex.as_bytes(), 16).ok_or_else(bad)?;
            Rational::from_integer(n)
        } else if let Some((whole, frac)) = body.split_once(' ') {
            // Mixed fraction: "2 3/8"
            let whole: BigInt = whole.parse().map_err(|_| bad())?;
            let frac = parse_plain_fraction(frac).ok_or_else(bad)?;
            &Rational::from_integer(whole) + &frac
        } else if body.contains('/') {
            parse_plain_fraction(body).ok_or_else(bad)?
        } else {
            parse_decimal(body).ok_or_else(bad)?
        };

        if percent {
            value = value.checked_div(&Rational::from_i64(100))?;
        }
        if negative {
            value = -&value;
        }
        Ok(value)
    }
}

fn parse_plain_fraction(s: &str) -> Option<Rational> {
    let (n, d) = s.split_once('/')?;
    let numer: BigInt = n.trim().parse().ok()?;
    let denom: BigInt = d.trim().parse().ok()?;
    Rational::new(numer, denom).ok()
}

fn parse_decimal(s: &str) -> Option<Rational> {
    let (mantissa, exponent) = match s.split_once(['e', 'E']) {
        Some((m, e)) => (m, e.parse::<i64>().ok()?),
        None => (s, 0i64),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let digits = format!("{int_part}{frac_part}");
    let numer = if digits.is_empty() {
        BigInt::zero()
    } else {
        BigInt::parse_bytes(digits.as_bytes(), 10)?
    };
    let shift = exponent - frac_part.len() as i64;
    let value = if shift >= 0 {
        Rational::from_integer(numer * BigInt::from(10).pow(shift as u32))
    } else {
        Rational::new(numer, BigInt::from(10).pow((-shift) as u32)).ok()?
    };
    Some(value)
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reduced = self.normalize();
        if reduced.is_integer() {
            write!(f, "{}", reduced.numer())
        } else {
            write!(f, "{}/{}", reduced.numer(), reduced.denom())
        }
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.0.numer() * other.0.denom() == other.0.numer() * self.0.denom()
    }
}

impl Eq for Rational {}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are kept positive, so cross-multiplication
        // preserves the ordering.
        (self.0.numer() * other.0.denom()).cmp(&(other.0.numer() * self.0.denom()))
    }
}

impl Add for &Rational {
    type Output = Rational;
    fn add(self, rhs: &Rational) -> Rational {
        Rational(BigRational::new_raw(
            self.0.numer() * rhs.0.denom() + rhs.0.numer() * self.0.denom(),
            self.0.denom() * rhs.0.denom(),
        ))
    }
}

impl Sub for &Rational {
    type Output = Rational;
    fn sub(self, rhs: &Rational) -> Rational {
        Rational(BigRational::new_raw(
            self.0.numer() * rhs.0.denom() - rhs.0.numer() * self.0.denom(),
            self.0.denom() * rhs.0.denom(),
        ))
    }
}

impl Mul for &Rational {
    type Output = Rational;
    fn mul(self, rhs: &Rational) -> Rational {
        Rational(BigRational::new_raw(
            self.0.numer() * rhs.0.numer(),
            self.0.denom() * rhs.0.denom(),
        ))
    }
}

impl Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational(BigRational::new_raw(
            -self.0.numer().clone(),
            self.0.denom().clone(),
        ))
    }
}
