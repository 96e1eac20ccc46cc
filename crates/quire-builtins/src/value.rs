//! The operand model: a tagged-union `Value` plus the `Quantity`
//! wrapper that attaches a unit to any base variant. `Shape` is the
//! operator-dispatch category computed from the variant (and matrix
//! dimensions); `Dtype` is the closed tag set used for table columns
//! and result-type inference.

use std::fmt;

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::complex::Complex;
use crate::error::{ErrorCode, LangError};
use crate::functions::UserFunction;
use crate::map::ValueMap;
use crate::matrix::Matrix;
use crate::rational::Rational;
use crate::table::Table;
use crate::unit::{Dimensions, UnitDescriptor};

/// The closed set of operand type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dtype {
    Rational,
    Complex,
    Boolean,
    String,
    Quantity,
    Range,
    Tuple,
    Map,
    RowVector,
    ColumnVector,
    Matrix,
    Table,
    Module,
    Error,
    Unit,
    Drawing,
    RichText,
}

/// Operand category used to select an operator implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    Complex,
    Boolean,
    Text,
    RowVector,
    ColumnVector,
    Matrix,
    Map,
    MapOfVectors,
    Table,
    Range,
    Tuple,
    Module,
    Unit,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Scalar => "scalar",
            Shape::Complex => "complex",
            Shape::Boolean => "boolean",
            Shape::Text => "string",
            Shape::RowVector => "row vector",
            Shape::ColumnVector => "column vector",
            Shape::Matrix => "matrix",
            Shape::Map => "map",
            Shape::MapOfVectors => "map of vectors",
            Shape::Table => "table",
            Shape::Range => "range",
            Shape::Tuple => "tuple",
            Shape::Module => "module",
            Shape::Unit => "unit",
        };
        write!(f, "{name}")
    }
}

/// An exact arithmetic range: start, step, end (inclusive).
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: Rational,
    pub step: Rational,
    pub end: Rational,
}

impl Range {
    pub fn new(start: Rational, step: Rational, end: Rational) -> Result<Self, LangError> {
        if step.is_zero() {
            return Err(LangError::new(ErrorCode::ZeroStep));
        }
        Ok(Range { start, step, end })
    }

    /// Number of elements the range produces.
    pub fn len(&self) -> usize {
        let span = &self.end - &self.start;
        let steps = span.checked_div(&self.step).map(|q| q.floor()).unwrap_or_else(|_| BigInt::from(0));
        if steps < BigInt::from(0) {
            0
        } else {
            use num_traits::ToPrimitive;
            steps.to_usize().map(|n| n + 1).unwrap_or(0)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the range as the sequence of its values.
    pub fn values(&self) -> Vec<Rational> {
        let mut out = Vec::with_capacity(self.len());
        let mut current = self.start.clone();
        let ascending = !self.step.is_negative();
        while (ascending && current <= self.end) || (!ascending && current >= self.end) {
            out.push(current.clone());
            current = &current + &self.step;
        }
        out
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step.is_one() {
            write!(f, "{}..{}", self.start, self.end)
        } else {
            write!(f, "{}..{}..{}", self.start, self.step, self.end)
        }
    }
}

/// A value with an attached unit. The numeric payload is stored in
/// base units; `unit` is the descriptor most recently applied, kept
/// for display conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    pub value: Value,
    pub unit: UnitDescriptor,
}

impl Quantity {
    pub fn dims(&self) -> &Dimensions {
        &self.unit.dims
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(Rational),
    Complex(Complex),
    Bool(bool),
    Str(String),
    RichText(String),
    Range(Range),
    Matrix(Matrix),
    Map(ValueMap),
    Table(Table),
    Tuple(Vec<Value>),
    Func(Box<UserFunction>),
    Unit(UnitDescriptor),
    Quantity(Box<Quantity>),
}

impl Value {
    /// Dispatch category. Quantities dispatch on their payload.
    pub fn shape(&self) -> Shape {
        match self {
            Value::Num(_) => Shape::Scalar,
            Value::Complex(_) => Shape::Complex,
            Value::Bool(_) => Shape::Boolean,
            Value::Str(_) | Value::RichText(_) => Shape::Text,
            Value::Range(_) => Shape::Range,
            Value::Matrix(m) => {
                if m.is_row_vector() {
                    Shape::RowVector
                } else if m.is_column_vector() {
                    Shape::ColumnVector
                } else {
                    Shape::Matrix
                }
            }
            Value::Map(m) => {
                if m.is_map_of_vectors() {
                    Shape::MapOfVectors
                } else {
                    Shape::Map
                }
            }
            Value::Table(_) => Shape::Table,
            Value::Tuple(_) => Shape::Tuple,
            Value::Func(_) => Shape::Module,
            Value::Unit(_) => Shape::Unit,
            Value::Quantity(q) => q.value.shape(),
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Value::Num(_) => Dtype::Rational,
            Value::Complex(_) => Dtype::Complex,
            Value::Bool(_) => Dtype::Boolean,
            Value::Str(_) => Dtype::String,
            Value::RichText(_) => Dtype::RichText,
            Value::Range(_) => Dtype::Range,
            Value::Matrix(m) => {
                if m.is_row_vector() {
                    Dtype::RowVector
                } else if m.is_column_vector() {
                    Dtype::ColumnVector
                } else {
                    Dtype::Matrix
                }
            }
            Value::Map(_) => Dtype::Map,
            Value::Table(_) => Dtype::Table,
            Value::Tuple(_) => Dtype::Tuple,
            Value::Func(_) => Dtype::Module,
            Value::Unit(_) => Dtype::Unit,
            Value::Quantity(_) => Dtype::Quantity,
        }
    }

    pub fn has_unit(&self) -> bool {
        matches!(self, Value::Quantity(_))
    }

    /// Unwrap one level of quantity, if present.
    pub fn payload(&self) -> &Value {
        match self {
            Value::Quantity(q) => &q.value,
            other => other,
        }
    }

    pub fn as_bool(&self) -> Result<bool, LangError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(LangError::with_detail(
                ErrorCode::BadType,
                format!("expected a boolean, found {}", other.shape()),
            )),
        }
    }

    pub fn as_rational(&self) -> Result<&Rational, LangError> {
        match self {
            Value::Num(r) => Ok(r),
            Value::Quantity(q) => q.value.as_rational(),
            other => Err(LangError::with_detail(
                ErrorCode::BadType,
                format!("expected a number, found {}", other.shape()),
            )),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Num(r) => write!(f, "{r}"),
            Value::Complex(c) => write!(f, "{c}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::RichText(s) => write!(f, "{s}"),
            Value::Range(r) => write!(f, "{r}"),
            Value::Matrix(m) => write!(f, "{m}"),
            Value::Map(m) => write!(f, "{m}"),
            Value::Table(t) => write!(f, "{t}"),
            Value::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            Value::Func(func) => write!(f, "function {}", func.name),
            Value::Unit(u) => write!(f, "{u}"),
            Value::Quantity(q) => {
                // Convert the base-unit payload back to the display unit.
                match &q.value {
                    Value::Num(r) => match q.unit.from_base(r) {
                        Ok(display) => write!(f, "{} {}", display, q.unit.name),
                        Err(_) => write!(f, "{} {}", r, q.unit.name),
                    },
                    other => write!(f, "{} {}", other, q.unit.name),
                }
            }
        }
    }
}

// ---- conversions used by builtin wrappers ----

impl From<Rational> for Value {
    fn from(r: Rational) -> Self {
        Value::Num(r)
    }
}

impl From<Complex> for Value {
    fn from(c: Complex) -> Self {
        if c.is_real() {
            Value::Num(c.re)
        } else {
            Value::Complex(c)
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Matrix> for Value {
    fn from(m: Matrix) -> Self {
        Value::Matrix(m)
    }
}

impl From<ValueMap> for Value {
    fn from(m: ValueMap) -> Self {
        Value::Map(m)
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

impl From<Range> for Value {
    fn from(r: Range) -> Self {
        Value::Range(r)
    }
}

impl From<UserFunction> for Value {
    fn from(func: UserFunction) -> Self {
        Value::Func(Box::new(func))
    }
}

impl TryFrom<&Value> for Rational {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v {
            Value::Num(r) => Ok(r.clone()),
            Value::Quantity(q) => Rational::try_from(&q.value),
            _ => Err(LangError::with_detail(
                ErrorCode::BadType,
                format!("expected a number, found {}", v.shape()),
            )),
        }
    }
}

impl TryFrom<&Value> for Complex {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v {
            Value::Complex(c) => Ok(c.clone()),
            Value::Num(r) => Ok(Complex::from_rational(r.clone())),
            _ => Err(LangError::with_detail(
                ErrorCode::BadType,
                format!("expected a complex number, found {}", v.shape()),
            )),
        }
    }
}

impl TryFrom<&Value> for f64 {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        Rational::try_from(v).map(|r| r.to_f64())
    }
}

impl TryFrom<&Value> for i64 {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        use num_traits::ToPrimitive;
        let r = Rational::try_from(v)?;
        if !r.is_integer() {
            return Err(LangError::with_detail(
                ErrorCode::BadType,
                "expected an integer",
            ));
        }
        r.trunc()
            .to_i64()
            .ok_or_else(|| LangError::with_detail(ErrorCode::BadType, "integer out of range"))
    }
}

impl TryFrom<&Value> for usize {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        let n = i64::try_from(v)?;
        usize::try_from(n)
            .map_err(|_| LangError::with_detail(ErrorCode::BadType, "expected a non-negative integer"))
    }
}

impl TryFrom<&Value> for bool {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        v.as_bool()
    }
}

impl TryFrom<&Value> for String {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v {
            Value::Str(s) | Value::RichText(s) => Ok(s.clone()),
            _ => Err(LangError::with_detail(
                ErrorCode::BadType,
                format!("expected a string, found {}", v.shape()),
            )),
        }
    }
}

impl TryFrom<&Value> for Matrix {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v {
            Value::Matrix(m) => Ok(m.clone()),
            Value::Quantity(q) => Matrix::try_from(&q.value),
            _ => Err(LangError::with_detail(
                ErrorCode::BadType,
                format!("expected a vector or matrix, found {}", v.shape()),
            )),
        }
    }
}

impl TryFrom<&Value> for Table {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        match v {
            Value::Table(t) => Ok(t.clone()),
            _ => Err(LangError::with_detail(
                ErrorCode::BadType,
                format!("expected a table, found {}", v.shape()),
            )),
        }
    }
}

impl TryFrom<&Value> for Value {
    type Error = LangError;
    fn try_from(v: &Value) -> Result<Self, Self::Error> {
        Ok(v.clone())
    }
}
