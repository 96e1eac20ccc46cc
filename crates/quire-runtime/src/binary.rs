//! Shape-polymorphic binary operator dispatch.
//!
//! Every operator is implemented once per pair of operand shapes,
//! selected by a match over the `(Shape, Shape)` pair. Quantities are
//! split into payload and unit first; the unit algebra runs alongside
//! the payload operation and fails at the point of violation.
//! A missing shape combination is a typed `NoOperator` error, never a
//! panic.

use quire_builtins::{
    Complex, Dimensions, ErrorCode, LangError, Matrix, PowOutcome, Quantity, Range, Rational,
    Shape, Table, UnitDescriptor, Value, ValueMap,
};

use crate::matrix_ops;

/// Split a value into its payload and optional unit descriptor.
fn split(v: &Value) -> (&Value, Option<&UnitDescriptor>) {
    match v {
        Value::Quantity(q) => (&q.value, Some(&q.unit)),
        other => (other, None),
    }
}

fn dims_of(unit: Option<&UnitDescriptor>) -> Dimensions {
    unit.map(|u| u.dims).unwrap_or_else(Dimensions::zero)
}

/// Rewrap a payload with a unit descriptor unless the result is
/// dimensionless.
fn wrap(value: Value, unit: Option<UnitDescriptor>) -> Value {
    match unit {
        Some(u) if !u.dims.is_dimensionless() => Value::Quantity(Box::new(Quantity {
            value,
            unit: u,
        })),
        _ => value,
    }
}

fn no_operator(op: &str, a: &Value, b: &Value) -> LangError {
    LangError::with_detail(
        ErrorCode::NoOperator,
        format!("{} {op} {}", a.shape(), b.shape()),
    )
}

/// Addition. Unit-bearing operands must agree dimensionally.
pub fn add(a: &Value, b: &Value) -> Result<Value, LangError> {
    additive(a, b, "+")
}

pub fn subtract(a: &Value, b: &Value) -> Result<Value, LangError> {
    additive(a, b, "-")
}

fn additive(a: &Value, b: &Value, op: &str) -> Result<Value, LangError> {
    let (pa, ua) = split(a);
    let (pb, ub) = split(b);
    if !dims_of(ua).compatible(&dims_of(ub)) {
        return Err(LangError::new(ErrorCode::UnitAdd));
    }
    let unit = ua.or(ub).cloned();
    let value = additive_payload(pa, pb, op)?;
    Ok(wrap(value, unit))
}

fn additive_payload(a: &Value, b: &Value, op: &str) -> Result<Value, LangError> {
    let sub = op == "-";
    match (a.shape(), b.shape()) {
        (Shape::Scalar, Shape::Scalar) => {
            let (x, y) = (a.as_rational()?, b.as_rational()?);
            Ok(Value::Num(if sub { x - y } else { x + y }))
        }
        (Shape::Complex, _) | (_, Shape::Complex)
            if matches!(a.shape(), Shape::Scalar | Shape::Complex)
                && matches!(b.shape(), Shape::Scalar | Shape::Complex) =>
        {
            let x = Complex::try_from(a)?;
            let y = Complex::try_from(b)?;
            Ok(Value::from(if sub { x.sub(&y) } else { x.add(&y) }))
        }
        (Shape::RowVector | Shape::ColumnVector | Shape::Matrix, Shape::Scalar | Shape::Complex) => {
            let m = Matrix::try_from(a)?;
            Ok(Value::Matrix(m.map(|v| additive_payload(v, b, op))?))
        }
        (Shape::Scalar | Shape::Complex, Shape::RowVector | Shape::ColumnVector | Shape::Matrix) => {
            let m = Matrix::try_from(b)?;
            Ok(Value::Matrix(m.map(|v| additive_payload(a, v, op))?))
        }
        (
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
        ) => {
            let ma = Matrix::try_from(a)?;
            let mb = Matrix::try_from(b)?;
            Ok(Value::Matrix(ma.zip(&mb, |x, y| additive_payload(x, y, op))?))
        }
        (Shape::Map | Shape::MapOfVectors, Shape::Scalar) => match a {
            Value::Map(m) => Ok(Value::Map(m.map_values(|v| additive_payload(v, b, op))?)),
            _ => Err(no_operator(op, a, b)),
        },
        (Shape::Map | Shape::MapOfVectors, Shape::Map | Shape::MapOfVectors) => {
            match (a, b) {
                (Value::Map(x), Value::Map(y)) => {
                    Ok(Value::Map(x.zip_values(y, |p, q| additive_payload(p, q, op))?))
                }
                _ => Err(no_operator(op, a, b)),
            }
        }
        _ => Err(no_operator(op, a, b)),
    }
}

/// Multiplication (`×` and the synthesized implicit multiply).
/// Vector and matrix operands route through the four matrix
/// multiplication sub-cases.
pub fn multiply(a: &Value, b: &Value) -> Result<Value, LangError> {
    let (pa, ua) = split(a);
    let (pb, ub) = split(b);
    let unit = multiplicative_unit(ua, ub, false)?;
    let value = multiply_payload(pa, pb)?;
    Ok(wrap(value, unit))
}

fn multiplicative_unit(
    ua: Option<&UnitDescriptor>,
    ub: Option<&UnitDescriptor>,
    divide: bool,
) -> Result<Option<UnitDescriptor>, LangError> {
    match (ua, ub) {
        (None, None) => Ok(None),
        _ => {
            let a = ua.cloned().unwrap_or_else(UnitDescriptor::unitless);
            let b = ub.cloned().unwrap_or_else(UnitDescriptor::unitless);
            let (factor, dims, joiner) = if divide {
                (a.factor.checked_div(&b.factor)?, a.dims.sub(&b.dims), "/")
            } else {
                (&a.factor * &b.factor, a.dims.add(&b.dims), "\u{00b7}")
            };
            let name = match (a.name.is_empty(), b.name.is_empty()) {
                (false, false) => format!("{}{}{}", a.name, joiner, b.name),
                (false, true) => a.name,
                (true, false) => b.name,
                (true, true) => String::new(),
            };
            Ok(Some(UnitDescriptor {
                name,
                factor,
                gauge: Rational::zero(),
                dims,
            }))
        }
    }
}

fn multiply_payload(a: &Value, b: &Value) -> Result<Value, LangError> {
    match (a.shape(), b.shape()) {
        (Shape::Scalar, Shape::Scalar) => {
            Ok(Value::Num(a.as_rational()? * b.as_rational()?))
        }
        (Shape::Complex, _) | (_, Shape::Complex)
            if matches!(a.shape(), Shape::Scalar | Shape::Complex)
                && matches!(b.shape(), Shape::Scalar | Shape::Complex) =>
        {
            let x = Complex::try_from(a)?;
            let y = Complex::try_from(b)?;
            Ok(Value::from(x.mul(&y)))
        }
        (Shape::RowVector | Shape::ColumnVector | Shape::Matrix, Shape::Scalar | Shape::Complex) => {
            let m = Matrix::try_from(a)?;
            Ok(Value::Matrix(m.map(|v| multiply_payload(v, b))?))
        }
        (Shape::Scalar | Shape::Complex, Shape::RowVector | Shape::ColumnVector | Shape::Matrix) => {
            let m = Matrix::try_from(b)?;
            Ok(Value::Matrix(m.map(|v| multiply_payload(a, v))?))
        }
        (
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
        ) => {
            let ma = Matrix::try_from(a)?;
            let mb = Matrix::try_from(b)?;
            matrix_ops::matmul(&ma, &mb)
        }
        (Shape::Map | Shape::MapOfVectors, Shape::Scalar) => match a {
            Value::Map(m) => Ok(Value::Map(m.map_values(|v| multiply_payload(v, b))?)),
            _ => Err(no_operator("\u{00d7}", a, b)),
        },
        (Shape::Scalar, Shape::Map | Shape::MapOfVectors) => match b {
            Value::Map(m) => Ok(Value::Map(m.map_values(|v| multiply_payload(a, v))?)),
            _ => Err(no_operator("\u{00d7}", a, b)),
        },
        _ => Err(no_operator("\u{00d7}", a, b)),
    }
}

/// Dot operator `·`: scalar multiply on scalars, dot product on
/// vectors.
pub fn dot(a: &Value, b: &Value) -> Result<Value, LangError> {
    let (pa, ua) = split(a);
    let (pb, ub) = split(b);
    let unit = multiplicative_unit(ua, ub, false)?;
    let value = match (pa.shape(), pb.shape()) {
        (Shape::RowVector | Shape::ColumnVector, Shape::RowVector | Shape::ColumnVector) => {
            let ma = Matrix::try_from(pa)?;
            let mb = Matrix::try_from(pb)?;
            matrix_ops::dot_product(&ma, &mb)?
        }
        _ => multiply_payload(pa, pb)?,
    };
    Ok(wrap(value, unit))
}

pub fn divide(a: &Value, b: &Value) -> Result<Value, LangError> {
    let (pa, ua) = split(a);
    let (pb, ub) = split(b);
    let unit = multiplicative_unit(ua, ub, true)?;
    let value = divide_payload(pa, pb)?;
    Ok(wrap(value, unit))
}

fn divide_payload(a: &Value, b: &Value) -> Result<Value, LangError> {
    match (a.shape(), b.shape()) {
        (Shape::Scalar, Shape::Scalar) => {
            Ok(Value::Num(a.as_rational()?.checked_div(b.as_rational()?)?))
        }
        (Shape::Complex, _) | (_, Shape::Complex)
            if matches!(a.shape(), Shape::Scalar | Shape::Complex)
                && matches!(b.shape(), Shape::Scalar | Shape::Complex) =>
        {
            let x = Complex::try_from(a)?;
            let y = Complex::try_from(b)?;
            Ok(Value::from(x.checked_div(&y)?))
        }
        (Shape::RowVector | Shape::ColumnVector | Shape::Matrix, Shape::Scalar | Shape::Complex) => {
            let m = Matrix::try_from(a)?;
            Ok(Value::Matrix(m.map(|v| divide_payload(v, b))?))
        }
        (Shape::Scalar | Shape::Complex, Shape::RowVector | Shape::ColumnVector | Shape::Matrix) => {
            let m = Matrix::try_from(b)?;
            Ok(Value::Matrix(m.map(|v| divide_payload(a, v))?))
        }
        (
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
        ) => {
            let ma = Matrix::try_from(a)?;
            let mb = Matrix::try_from(b)?;
            Ok(Value::Matrix(ma.zip(&mb, divide_payload)?))
        }
        (Shape::Map | Shape::MapOfVectors, Shape::Scalar) => match a {
            Value::Map(m) => Ok(Value::Map(m.map_values(|v| divide_payload(v, b))?)),
            _ => Err(no_operator("/", a, b)),
        },
        _ => Err(no_operator("/", a, b)),
    }
}

pub fn modulo(a: &Value, b: &Value) -> Result<Value, LangError> {
    match (a.payload(), b.payload()) {
        (Value::Num(x), Value::Num(y)) => Ok(Value::Num(x.modulo(y)?)),
        _ => Err(no_operator("%", a, b)),
    }
}

/// Power. The exponent of a quantity must be a unit-less integer so
/// the exponent vector stays integral.
pub fn power(a: &Value, b: &Value) -> Result<Value, LangError> {
    let (pa, ua) = split(a);
    let (pb, ub) = split(b);
    if ub.is_some() && !dims_of(ub).is_dimensionless() {
        return Err(LangError::new(ErrorCode::UnitPower));
    }
    let unit = match ua {
        Some(u) if !u.dims.is_dimensionless() => {
            let exp = pb.as_rational()?.normalize();
            if !exp.is_integer() {
                return Err(LangError::new(ErrorCode::UnitPower));
            }
            use num_traits::ToPrimitive;
            let e = exp
                .trunc()
                .to_i8()
                .ok_or_else(|| LangError::new(ErrorCode::UnitPower))?;
            Some(UnitDescriptor {
                name: format!("{}^{}", u.name, e),
                factor: u.factor.pow_int(&exp.trunc())?,
                gauge: Rational::zero(),
                dims: u.dims.scale(e),
            })
        }
        _ => None,
    };
    let value = power_payload(pa, pb)?;
    Ok(wrap(value, unit))
}

fn power_payload(a: &Value, b: &Value) -> Result<Value, LangError> {
    match (a.shape(), b.shape()) {
        (Shape::Scalar, Shape::Scalar) => match a.as_rational()?.pow(b.as_rational()?)? {
            PowOutcome::Real(r) => Ok(Value::Num(r)),
            PowOutcome::Cplx(c) => Ok(Value::from(c)),
        },
        (Shape::Complex, Shape::Scalar) | (Shape::Complex, Shape::Complex)
        | (Shape::Scalar, Shape::Complex) => {
            let base = Complex::try_from(a)?;
            let exp = Complex::try_from(b)?;
            Ok(Value::from(base.pow_complex(&exp)?))
        }
        (Shape::RowVector | Shape::ColumnVector | Shape::Matrix, Shape::Scalar) => {
            let m = Matrix::try_from(a)?;
            Ok(Value::Matrix(m.map(|v| power_payload(v, b))?))
        }
        _ => Err(no_operator("^", a, b)),
    }
}

/// Concatenation `&`: two scalars form a row vector, vectors append,
/// strings join, matrices stack side by side, tables gain columns.
pub fn concat(a: &Value, b: &Value) -> Result<Value, LangError> {
    let (pa, ua) = split(a);
    let (pb, ub) = split(b);
    if !dims_of(ua).compatible(&dims_of(ub)) {
        return Err(LangError::new(ErrorCode::UnitAppend));
    }
    let unit = ua.or(ub).cloned();
    let value = concat_payload(pa, pb)?;
    Ok(wrap(value, unit))
}

fn concat_payload(a: &Value, b: &Value) -> Result<Value, LangError> {
    match (a.shape(), b.shape()) {
        (Shape::Text, Shape::Text) => match (a, b) {
            (Value::Str(x), Value::Str(y)) => Ok(Value::Str(format!("{x}{y}"))),
            _ => Err(no_operator("&", a, b)),
        },
        (Shape::Text, Shape::Scalar) => match a {
            Value::Str(x) => Ok(Value::Str(format!("{x}{b}"))),
            _ => Err(no_operator("&", a, b)),
        },
        (Shape::Scalar, Shape::Text) => match b {
            Value::Str(y) => Ok(Value::Str(format!("{a}{y}"))),
            _ => Err(no_operator("&", a, b)),
        },
        (Shape::Scalar | Shape::Complex, Shape::Scalar | Shape::Complex) => {
            Ok(Value::Matrix(Matrix::row_vector(vec![a.clone(), b.clone()])))
        }
        (Shape::RowVector, Shape::Scalar | Shape::Complex) => {
            let m = Matrix::try_from(a)?;
            let mut data = m.data;
            data.push(b.clone());
            Ok(Value::Matrix(Matrix::row_vector(data)))
        }
        (Shape::Scalar | Shape::Complex, Shape::RowVector) => {
            let m = Matrix::try_from(b)?;
            let mut data = vec![a.clone()];
            data.extend(m.data);
            Ok(Value::Matrix(Matrix::row_vector(data)))
        }
        (Shape::ColumnVector, Shape::Scalar | Shape::Complex) => {
            let m = Matrix::try_from(a)?;
            let mut data = m.data;
            data.push(b.clone());
            Ok(Value::Matrix(Matrix::column_vector(data)))
        }
        (Shape::RowVector, Shape::RowVector) => {
            let ma = Matrix::try_from(a)?;
            let mb = Matrix::try_from(b)?;
            let mut data = ma.data;
            data.extend(mb.data);
            Ok(Value::Matrix(Matrix::row_vector(data)))
        }
        (Shape::ColumnVector, Shape::ColumnVector) => {
            let ma = Matrix::try_from(a)?;
            let mb = Matrix::try_from(b)?;
            let mut data = ma.data;
            data.extend(mb.data);
            Ok(Value::Matrix(Matrix::column_vector(data)))
        }
        (Shape::Matrix, Shape::Matrix)
        | (Shape::Matrix, Shape::ColumnVector)
        | (Shape::ColumnVector, Shape::Matrix) => {
            let ma = Matrix::try_from(a)?;
            let mb = Matrix::try_from(b)?;
            matrix_ops::hconcat(&ma, &mb)
        }
        (Shape::Table, Shape::Table) => match (a, b) {
            (Value::Table(x), Value::Table(y)) => merge_tables(x, y),
            _ => Err(no_operator("&", a, b)),
        },
        _ => Err(no_operator("&", a, b)),
    }
}

fn merge_tables(a: &Table, b: &Table) -> Result<Value, LangError> {
    if a.num_rows() != b.num_rows() {
        return Err(LangError::with_detail(
            ErrorCode::MismatchedElementCount,
            format!("{}-row and {}-row tables", a.num_rows(), b.num_rows()),
        ));
    }
    let mut merged = a.clone();
    let bs = b.storage();
    for (i, heading) in bs.headings.iter().enumerate() {
        merged = merged.with_column(
            heading.clone(),
            bs.columns[i].clone(),
            bs.dtypes[i],
            bs.units[i].clone(),
        )?;
    }
    Ok(Value::Table(merged))
}

/// Range construction `..`. A second `..` reads the middle value as
/// the step: `start..step..end`.
pub fn range(a: &Value, b: &Value) -> Result<Value, LangError> {
    match (a.payload(), b.payload()) {
        (Value::Num(start), Value::Num(end)) => {
            let step = if end >= start {
                Rational::one()
            } else {
                -&Rational::one()
            };
            Ok(Value::Range(Range::new(start.clone(), step, end.clone())?))
        }
        (Value::Range(r), Value::Num(end)) => {
            // `a..m..b`: the middle term is the step.
            let step = r.end.clone();
            let start = r.start.clone();
            let dir_ok = if end >= &start {
                !step.is_negative()
            } else {
                step.is_negative()
            };
            if !dir_ok {
                return Err(LangError::new(ErrorCode::ZeroStep));
            }
            Ok(Value::Range(Range::new(start, step, end.clone())?))
        }
        _ => Err(no_operator("..", a, b)),
    }
}

pub fn logical_and(a: &Value, b: &Value) -> Result<Value, LangError> {
    Ok(Value::Bool(a.as_bool()? && b.as_bool()?))
}

pub fn logical_or(a: &Value, b: &Value) -> Result<Value, LangError> {
    Ok(Value::Bool(a.as_bool()? || b.as_bool()?))
}

/// Map construction from alternating key/value arguments.
pub fn build_map(args: &[Value]) -> Result<Value, LangError> {
    if args.len() % 2 != 0 {
        return Err(LangError::with_detail(
            ErrorCode::WrongArity,
            "map literal needs key/value pairs",
        ));
    }
    let mut pairs = Vec::with_capacity(args.len() / 2);
    for chunk in args.chunks(2) {
        let key = match &chunk[0] {
            Value::Str(s) => s.clone(),
            other => other.to_string(),
        };
        pairs.push((key, chunk[1].clone()));
    }
    Ok(Value::Map(ValueMap::new(pairs)?))
}
