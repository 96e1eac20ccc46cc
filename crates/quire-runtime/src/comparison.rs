//! Relational operators. Scalar comparisons produce booleans;
//! vector/matrix comparisons apply element-wise. Chained relations
//! (`a < b < c`) are resolved by the stack machine, which threads the
//! previous link's right-hand operand through `compare_chained`.

use std::cmp::Ordering;

use quire_builtins::{ErrorCode, LangError, Matrix, Shape, Value};

fn dims_check(a: &Value, b: &Value) -> Result<(), LangError> {
    let da = match a {
        Value::Quantity(q) => q.unit.dims,
        _ => quire_builtins::Dimensions::zero(),
    };
    let db = match b {
        Value::Quantity(q) => q.unit.dims,
        _ => quire_builtins::Dimensions::zero(),
    };
    if !da.compatible(&db) {
        return Err(LangError::new(ErrorCode::UnitCompare));
    }
    Ok(())
}

fn scalar_ordering(a: &Value, b: &Value) -> Result<Ordering, LangError> {
    match (a.payload(), b.payload()) {
        (Value::Num(x), Value::Num(y)) => Ok(x.cmp(y)),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
        _ => Err(LangError::with_detail(
            ErrorCode::BadType,
            format!("cannot order {} and {}", a.shape(), b.shape()),
        )),
    }
}

fn apply_op(op: &str, ordering: Ordering) -> bool {
    match op {
        "<" => ordering == Ordering::Less,
        ">" => ordering == Ordering::Greater,
        "\u{2264}" => ordering != Ordering::Greater,
        "\u{2265}" => ordering != Ordering::Less,
        "=" => ordering == Ordering::Equal,
        _ => ordering != Ordering::Equal, // ≠
    }
}

fn scalar_compare(op: &str, a: &Value, b: &Value) -> Result<bool, LangError> {
    // Equality on complex values has no ordering to consult.
    if matches!(op, "=" | "\u{2260}") {
        if let (Value::Complex(x), Value::Complex(y)) = (a.payload(), b.payload()) {
            let equal = x == y;
            return Ok(if op == "=" { equal } else { !equal });
        }
    }
    Ok(apply_op(op, scalar_ordering(a, b)?))
}

/// Element-wise or scalar comparison.
pub fn compare(op: &str, a: &Value, b: &Value) -> Result<Value, LangError> {
    dims_check(a, b)?;
    match (a.shape(), b.shape()) {
        (
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
            Shape::Scalar | Shape::Complex,
        ) => {
            let m = Matrix::try_from(a)?;
            Ok(Value::Matrix(m.map(|v| compare(op, v, b))?))
        }
        (
            Shape::Scalar | Shape::Complex,
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
        ) => {
            let m = Matrix::try_from(b)?;
            Ok(Value::Matrix(m.map(|v| compare(op, a, v))?))
        }
        (
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
            Shape::RowVector | Shape::ColumnVector | Shape::Matrix,
        ) => {
            let ma = Matrix::try_from(a)?;
            let mb = Matrix::try_from(b)?;
            Ok(Value::Matrix(ma.zip(&mb, |x, y| compare(op, x, y))?))
        }
        _ => Ok(Value::Bool(scalar_compare(op, a, b)?)),
    }
}

/// Chained comparison step. When the left operand is the boolean
/// result of a previous link, the comparison runs against that link's
/// right-hand value and the chain ANDs together; the chain
/// short-circuits on the first false link without re-evaluating the
/// shared operand.
pub fn compare_chained(
    op: &str,
    a: &Value,
    b: &Value,
    prev_rhs: Option<&Value>,
) -> Result<(Value, Value), LangError> {
    if let (Value::Bool(prev_ok), Some(link)) = (a, prev_rhs) {
        if !prev_ok {
            return Ok((Value::Bool(false), b.clone()));
        }
        let result = compare(op, link, b)?;
        return Ok((result, b.clone()));
    }
    let result = compare(op, a, b)?;
    Ok((result, b.clone()))
}
