//! Unary operators: negation, logical not, factorial, square root,
//! absolute value, transpose.

use quire_builtins::{
    Complex, ErrorCode, LangError, PowOutcome, Quantity, UnitDescriptor, Value,
};

fn no_operator(op: &str, a: &Value) -> LangError {
    LangError::with_detail(ErrorCode::NoOperator, format!("{op} {}", a.shape()))
}

fn rewrap(value: Value, unit: Option<UnitDescriptor>) -> Value {
    match unit {
        Some(unit) => Value::Quantity(Box::new(Quantity { value, unit })),
        None => value,
    }
}

fn split_owned(v: &Value) -> (&Value, Option<UnitDescriptor>) {
    match v {
        Value::Quantity(q) => (&q.value, Some(q.unit.clone())),
        other => (other, None),
    }
}

pub fn negate(a: &Value) -> Result<Value, LangError> {
    let (p, unit) = split_owned(a);
    let value = match p {
        Value::Num(r) => Value::Num(-r),
        Value::Complex(c) => Value::Complex(c.neg()),
        Value::Matrix(m) => Value::Matrix(m.map(negate)?),
        Value::Map(m) => Value::Map(m.map_values(negate)?),
        _ => return Err(no_operator("-", a)),
    };
    Ok(rewrap(value, unit))
}

pub fn logical_not(a: &Value) -> Result<Value, LangError> {
    Ok(Value::Bool(!a.as_bool()?))
}

pub fn factorial(a: &Value) -> Result<Value, LangError> {
    match a.payload() {
        Value::Num(r) => Ok(Value::Num(r.factorial()?)),
        _ => Err(no_operator("!", a)),
    }
}

pub fn square_root(a: &Value) -> Result<Value, LangError> {
    let (p, unit) = split_owned(a);
    if unit.is_some() {
        // A root would fractionalize the exponent vector.
        return Err(LangError::new(ErrorCode::UnitPower));
    }
    match p {
        Value::Num(r) => match r.sqrt()? {
            PowOutcome::Real(x) => Ok(Value::Num(x)),
            PowOutcome::Cplx(c) => Ok(Value::from(c)),
        },
        Value::Complex(c) => Ok(Value::from(c.map_c64(|z| z.sqrt())?)),
        Value::Matrix(m) => Ok(Value::Matrix(m.map(square_root)?)),
        _ => Err(no_operator("\u{221a}", a)),
    }
}

pub fn absolute(a: &Value) -> Result<Value, LangError> {
    let (p, unit) = split_owned(a);
    let value = match p {
        Value::Num(r) => Value::Num(r.abs()),
        Value::Complex(c) => Value::Num(c.magnitude()?),
        Value::Matrix(m) => Value::Matrix(m.map(absolute)?),
        _ => return Err(no_operator("abs", a)),
    };
    Ok(rewrap(value, unit))
}

pub fn transpose(a: &Value) -> Result<Value, LangError> {
    let (p, unit) = split_owned(a);
    let value = match p {
        Value::Matrix(m) => Value::Matrix(m.transpose()),
        Value::Num(_) | Value::Complex(_) => p.clone(),
        _ => return Err(no_operator("transpose", a)),
    };
    Ok(rewrap(value, unit))
}

/// Promote a complex scalar helper used by builtins.
pub fn as_complex(a: &Value) -> Result<Complex, LangError> {
    Complex::try_from(a.payload())
}

/// Flatten a vector-like operand into its element values.
pub fn vector_elements(a: &Value) -> Result<Vec<Value>, LangError> {
    match a.payload() {
        Value::Matrix(m) => Ok(m.data.clone()),
        Value::Range(r) => Ok(r.values().into_iter().map(Value::Num).collect()),
        other => Ok(vec![other.clone()]),
    }
}

/// Used by aggregation builtins to iterate matrices wrapped in units.
pub fn elements_with_unit(a: &Value) -> Result<(Vec<Value>, Option<UnitDescriptor>), LangError> {
    let (p, unit) = split_owned(a);
    Ok((vector_elements(p)?, unit))
}
