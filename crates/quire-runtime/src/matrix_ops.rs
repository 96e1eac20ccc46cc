//! Matrix multiplication sub-cases and structural operations.
//!
//! The four multiply sub-cases are selected from shape metadata:
//! vector·vector of equal orientation is element-wise, row·column is
//! a dot product, column·row is an outer product promoted to a
//! matrix, and matrix·matrix is ordinary matrix multiplication.

use quire_builtins::{ErrorCode, LangError, Matrix, Rational, Value};

use crate::binary;

fn len_mismatch(a: &Matrix, b: &Matrix) -> LangError {
    LangError::with_detail(
        ErrorCode::MismatchedElementCount,
        format!(
            "{}\u{00d7}{} and {}\u{00d7}{}",
            a.rows, a.cols, b.rows, b.cols
        ),
    )
}

/// Dot product of two vectors of equal length.
pub fn dot_product(a: &Matrix, b: &Matrix) -> Result<Value, LangError> {
    if a.len() != b.len() {
        return Err(len_mismatch(a, b));
    }
    let mut acc = Value::Num(Rational::zero());
    for (x, y) in a.data.iter().zip(b.data.iter()) {
        let product = binary::multiply(x, y)?;
        acc = binary::add(&acc, &product)?;
    }
    Ok(acc)
}

/// Outer product: column (n×1) times row (1×m) is an n×m matrix.
pub fn outer_product(a: &Matrix, b: &Matrix) -> Result<Value, LangError> {
    let mut data = Vec::with_capacity(a.len() * b.len());
    for x in &a.data {
        for y in &b.data {
            data.push(binary::multiply(x, y)?);
        }
    }
    Ok(Value::Matrix(Matrix::new(data, a.len(), b.len())?))
}

/// The matrix-multiply dispatch over the four sub-cases.
pub fn matmul(a: &Matrix, b: &Matrix) -> Result<Value, LangError> {
    if a.is_row_vector() && b.is_column_vector() {
        return dot_product(a, b);
    }
    if a.is_column_vector() && b.is_row_vector() {
        return outer_product(a, b);
    }
    if (a.is_row_vector() && b.is_row_vector())
        || (a.is_column_vector() && b.is_column_vector())
    {
        // Same orientation: element-wise product.
        if a.len() != b.len() {
            return Err(len_mismatch(a, b));
        }
        return Ok(Value::Matrix(a.zip(b, |x, y| binary::multiply(x, y))?));
    }
    // Full matrix product; inner dimensions must agree.
    if a.cols != b.rows {
        return Err(len_mismatch(a, b));
    }
    let mut data = Vec::with_capacity(a.rows * b.cols);
    for i in 0..a.rows {
        for j in 0..b.cols {
            let mut acc = Value::Num(Rational::zero());
            for k in 0..a.cols {
                let product = binary::multiply(a.get(i, k)?, b.get(k, j)?)?;
                acc = binary::add(&acc, &product)?;
            }
            data.push(acc);
        }
    }
    Ok(Value::Matrix(Matrix::new(data, a.rows, b.cols)?))
}

/// Horizontal concatenation: equal row counts, columns side by side.
pub fn hconcat(a: &Matrix, b: &Matrix) -> Result<Value, LangError> {
    if a.rows != b.rows {
        return Err(len_mismatch(a, b));
    }
    let mut data = Vec::with_capacity(a.len() + b.len());
    for r in 0..a.rows {
        for c in 0..a.cols {
            data.push(a.get(r, c)?.clone());
        }
        for c in 0..b.cols {
            data.push(b.get(r, c)?.clone());
        }
    }
    Ok(Value::Matrix(Matrix::new(data, a.rows, a.cols + b.cols)?))
}
