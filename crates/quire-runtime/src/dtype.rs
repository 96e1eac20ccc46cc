//! Result-dtype inference: the type tag of a binary operation's
//! result, computed from the two input tags and the operator token.
//! The interesting rows are the ones where the operator changes the
//! category: `&` on two scalars yields a vector, `·` on two row
//! vectors yields a scalar, matrix product of column·row yields a
//! matrix, comparisons yield booleans.

use quire_builtins::Dtype;

pub fn result_dtype(op: &str, a: Dtype, b: Dtype) -> Dtype {
    use Dtype::*;
    if a == Error || b == Error {
        return Error;
    }
    match op {
        "<" | ">" | "\u{2264}" | "\u{2265}" | "=" | "\u{2260}" => match (a, b) {
            (RowVector, _) | (_, RowVector) => RowVector,
            (ColumnVector, _) | (_, ColumnVector) => ColumnVector,
            (Matrix, _) | (_, Matrix) => Matrix,
            _ => Boolean,
        },
        "and" | "or" | "not" => Boolean,
        "&" => match (a, b) {
            (String, _) | (_, String) => String,
            (Rational, Rational) | (Rational, Complex) | (Complex, Rational)
            | (Complex, Complex) => RowVector,
            (RowVector, _) | (_, RowVector) => RowVector,
            (ColumnVector, _) | (_, ColumnVector) => ColumnVector,
            (Matrix, _) | (_, Matrix) => Matrix,
            (Table, Table) => Table,
            _ => a,
        },
        "\u{00b7}" => match (a, b) {
            // Dot product collapses vectors to a scalar.
            (RowVector, RowVector) | (ColumnVector, ColumnVector) => Rational,
            _ => multiplicative(a, b),
        },
        "\u{00d7}" | "*" => match (a, b) {
            (RowVector, ColumnVector) => Rational,
            (ColumnVector, RowVector) => Matrix,
            _ => multiplicative(a, b),
        },
        ".." => Range,
        _ => multiplicative(a, b),
    }
}

fn multiplicative(a: Dtype, b: Dtype) -> Dtype {
    use Dtype::*;
    match (a, b) {
        (Complex, _) | (_, Complex) => Complex,
        (Matrix, _) | (_, Matrix) => Matrix,
        (RowVector, _) | (_, RowVector) => RowVector,
        (ColumnVector, _) | (_, ColumnVector) => ColumnVector,
        (Map, _) | (_, Map) => Map,
        (Table, _) | (_, Table) => Table,
        (Quantity, _) | (_, Quantity) => Quantity,
        _ => Rational,
    }
}
