//! Exact complex arithmetic over a pair of Rationals.
//!
//! Ring operations stay exact. Anything transcendental drops to
//! `num_complex::Complex64`, then the result is reconstructed as a
//! rational pair with a tiny imaginary residue snapped to exact zero.

use std::fmt;

use num_complex::Complex64;

use crate::error::{ErrorCode, LangError};
use crate::rational::{PowOutcome, Rational};

/// Imaginary parts below this magnitude after a float fallback are
/// display noise, not information.
const IM_SNAP_EPSILON: f64 = 1e-14;

#[derive(Debug, Clone, PartialEq)]
pub struct Complex {
    pub re: Rational,
    pub im: Rational,
}

impl Complex {
    pub fn new(re: Rational, im: Rational) -> Self {
        Complex { re, im }
    }

    pub fn from_rational(re: Rational) -> Self {
        Complex {
            re,
            im: Rational::zero(),
        }
    }

    pub fn zero() -> Self {
        Complex::from_rational(Rational::zero())
    }

    pub fn i() -> Self {
        Complex::new(Rational::zero(), Rational::one())
    }

    pub fn is_real(&self) -> bool {
        self.im.is_zero()
    }

    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    pub fn conj(&self) -> Self {
        Complex::new(self.re.clone(), -&self.im)
    }

    pub fn add(&self, other: &Complex) -> Complex {
        Complex::new(&self.re + &other.re, &self.im + &other.im)
    }

    pub fn sub(&self, other: &Complex) -> Complex {
        Complex::new(&self.re - &other.re, &self.im - &other.im)
    }

    pub fn mul(&self, other: &Complex) -> Complex {
        Complex::new(
            &(&self.re * &other.re) - &(&self.im * &other.im),
            &(&self.re * &other.im) + &(&self.im * &other.re),
        )
    }

    pub fn neg(&self) -> Complex {
        Complex::new(-&self.re, -&self.im)
    }

    pub fn checked_div(&self, other: &Complex) -> Result<Complex, LangError> {
        let denom = &(&other.re * &other.re) + &(&other.im * &other.im);
        if denom.is_zero() {
            return Err(LangError::new(ErrorCode::DivideByZero));
        }
        let num = self.mul(&other.conj());
        Ok(Complex::new(
            num.re.checked_div(&denom)?,
            num.im.checked_div(&denom)?,
        ))
    }

    /// |z|, exact when re²+im² is a perfect square.
    pub fn magnitude(&self) -> Result<Rational, LangError> {
        let squared = &(&self.re * &self.re) + &(&self.im * &self.im);
        match squared.sqrt()? {
            PowOutcome::Real(r) => Ok(r),
            PowOutcome::Cplx(_) => Err(LangError::new(ErrorCode::BadRoot)),
        }
    }

    /// Integer exponents stay exact by repeated squaring; everything
    /// else goes through the float principal branch.
    pub fn pow_complex(&self, exp: &Complex) -> Result<Complex, LangError> {
        if exp.is_real() {
            let e = exp.re.normalize();
            if e.is_integer() {
                return self.pow_int_exact(&e);
            }
        }
        let base = self.to_c64();
        let power = base.powc(exp.to_c64());
        Complex::from_c64(power)
    }

    fn pow_int_exact(&self, exp: &Rational) -> Result<Complex, LangError> {
        let n = exp.trunc();
        let negative = n < num_bigint::BigInt::from(0);
        let mut e = if negative { -n } else { n };
        let mut result = Complex::from_rational(Rational::one());
        let mut base = self.clone();
        let two = num_bigint::BigInt::from(2);
        while e > num_bigint::BigInt::from(0) {
            if num_integer::Integer::is_odd(&e) {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            e /= &two;
        }
        if negative {
            Complex::from_rational(Rational::one()).checked_div(&result)
        } else {
            Ok(result)
        }
    }

    pub fn to_c64(&self) -> Complex64 {
        Complex64::new(self.re.to_f64(), self.im.to_f64())
    }

    /// Reconstruct from a float pair; snaps a sub-epsilon imaginary
    /// residue to exact zero.
    pub fn from_c64(z: Complex64) -> Result<Complex, LangError> {
        let re = Rational::from_f64(z.re)?;
        let im = if z.im.abs() < IM_SNAP_EPSILON {
            Rational::zero()
        } else {
            Rational::from_f64(z.im)?
        };
        Ok(Complex::new(re, im))
    }

    /// Apply a `Complex64 -> Complex64` function and reconstruct.
    /// This is the transcendental fallback path (trig, exp, log).
    pub fn map_c64(&self, f: impl Fn(Complex64) -> Complex64) -> Result<Complex, LangError> {
        Complex::from_c64(f(self.to_c64()))
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im.is_zero() {
            return write!(f, "{}", self.re);
        }
        if self.re.is_zero() {
            if self.im.is_one() {
                return write!(f, "i");
            }
            if (-&self.im).is_one() {
                return write!(f, "-i");
            }
            return write!(f, "{}i", self.im);
        }
        if self.im.is_negative() {
            write!(f, "{} - {}i", self.re, self.im.abs())
        } else {
            write!(f, "{} + {}i", self.re, self.im)
        }
    }
}
