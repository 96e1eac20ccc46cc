//! Unit descriptors: the dimensional signature and conversion data
//! attached to quantities. The resolution tables live in
//! `quire-units`; this module owns the data model because descriptors
//! travel inside operands.

use std::fmt;

use crate::rational::Rational;

/// Base-dimension order: length, mass, time, current, temperature,
/// amount of substance, luminous intensity, money.
pub const BASE_DIMENSIONS: [&str; 8] = [
    "length",
    "mass",
    "time",
    "current",
    "temperature",
    "amount",
    "luminous intensity",
    "money",
];

/// A dimensional signature: one signed exponent per base dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions(pub [i8; 8]);

impl Dimensions {
    pub fn zero() -> Self {
        Dimensions([0; 8])
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.iter().all(|&e| e == 0)
    }

    /// Two signatures are compatible iff element-wise equal.
    pub fn compatible(&self, other: &Dimensions) -> bool {
        self.0 == other.0
    }

    pub fn add(&self, other: &Dimensions) -> Dimensions {
        let mut out = [0i8; 8];
        for i in 0..8 {
            out[i] = self.0[i] + other.0[i];
        }
        Dimensions(out)
    }

    pub fn sub(&self, other: &Dimensions) -> Dimensions {
        let mut out = [0i8; 8];
        for i in 0..8 {
            out[i] = self.0[i] - other.0[i];
        }
        Dimensions(out)
    }

    pub fn scale(&self, factor: i8) -> Dimensions {
        let mut out = [0i8; 8];
        for i in 0..8 {
            out[i] = self.0[i] * factor;
        }
        Dimensions(out)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, &exp) in BASE_DIMENSIONS.iter().zip(self.0.iter()) {
            if exp != 0 {
                if !first {
                    write!(f, "\u{00b7}")?;
                }
                first = false;
                if exp == 1 {
                    write!(f, "{name}")?;
                } else {
                    write!(f, "{name}^{exp}")?;
                }
            }
        }
        if first {
            write!(f, "dimensionless")?;
        }
        Ok(())
    }
}

/// Everything needed to convert a quantity to and from base units:
/// multiplicative factor, additive gauge (temperature scales), and
/// the dimensional signature.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDescriptor {
    pub name: String,
    pub factor: Rational,
    pub gauge: Rational,
    pub dims: Dimensions,
}

impl UnitDescriptor {
    pub fn unitless() -> Self {
        UnitDescriptor {
            name: String::new(),
            factor: Rational::one(),
            gauge: Rational::zero(),
            dims: Dimensions::zero(),
        }
    }

    /// Convert a scalar in this unit to base units: (x + gauge) * factor.
    pub fn to_base(&self, x: &Rational) -> Rational {
        &(x + &self.gauge) * &self.factor
    }

    /// Convert a base-unit scalar back to this unit: x / factor - gauge.
    pub fn from_base(&self, x: &Rational) -> Result<Rational, crate::LangError> {
        Ok(&x.checked_div(&self.factor)? - &self.gauge)
    }
}

impl fmt::Display for UnitDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
