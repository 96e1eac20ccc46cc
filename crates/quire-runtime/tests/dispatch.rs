use quire_builtins::{Dtype, ErrorCode, Matrix, Rational, Value};
use quire_runtime::{binary_op, call_builtin, compare, result_dtype, unary_op};

fn num(n: i64) -> Value {
    Value::Num(Rational::from_i64(n))
}

fn row(ns: &[i64]) -> Value {
    Value::Matrix(Matrix::row_vector(ns.iter().copied().map(num).collect()))
}

fn col(ns: &[i64]) -> Value {
    Value::Matrix(Matrix::column_vector(ns.iter().copied().map(num).collect()))
}

#[test]
fn scalar_arithmetic_is_exact() {
    assert_eq!(binary_op("+", &num(2), &num(3)).unwrap(), num(5));
    assert_eq!(binary_op("\u{00d7}", &num(6), &num(7)).unwrap(), num(42));
    assert_eq!(
        binary_op("/", &num(1), &num(3)).unwrap(),
        Value::Num(Rational::new(1.into(), 3.into()).unwrap())
    );
}

#[test]
fn dot_product_is_deterministic() {
    let a = row(&[1, 2, 3]);
    let b = row(&[4, 5, 6]);
    // Operands are immutable; repeated dispatch cannot drift.
    for _ in 0..3 {
        assert_eq!(binary_op("\u{00b7}", &a, &b).unwrap(), num(32));
    }
}

#[test]
fn matrix_multiply_sub_cases() {
    // row · column is a dot product.
    assert_eq!(
        binary_op("\u{00d7}", &row(&[1, 2, 3]), &col(&[4, 5, 6])).unwrap(),
        num(32)
    );
    // column · row is an outer product.
    let outer = binary_op("\u{00d7}", &col(&[1, 2]), &row(&[3, 4])).unwrap();
    match outer {
        Value::Matrix(m) => {
            assert_eq!((m.rows, m.cols), (2, 2));
            assert_eq!(m.get(1, 0).unwrap(), &num(6));
            assert_eq!(m.get(1, 1).unwrap(), &num(8));
        }
        other => panic!("expected a matrix, got {other:?}"),
    }
    // matrix · matrix follows the inner-dimension rule.
    let a = Value::Matrix(Matrix::new(vec![num(1), num(2), num(3), num(4)], 2, 2).unwrap());
    let b = Value::Matrix(Matrix::new(vec![num(5), num(6), num(7), num(8)], 2, 2).unwrap());
    match binary_op("\u{00d7}", &a, &b).unwrap() {
        Value::Matrix(m) => {
            assert_eq!(m.get(0, 0).unwrap(), &num(19));
            assert_eq!(m.get(1, 1).unwrap(), &num(50));
        }
        other => panic!("expected a matrix, got {other:?}"),
    }
}

#[test]
fn mismatched_lengths_are_typed_errors() {
    let err = binary_op("+", &row(&[1, 2]), &row(&[1, 2, 3])).unwrap_err();
    assert_eq!(err.code, ErrorCode::MismatchedElementCount);
    let err = binary_op("\u{00b7}", &row(&[1, 2]), &row(&[1, 2, 3])).unwrap_err();
    assert_eq!(err.code, ErrorCode::MismatchedElementCount);
}

#[test]
fn missing_shape_combinations_do_not_panic() {
    let err = binary_op("+", &num(1), &Value::Str("x".into())).unwrap_err();
    assert_eq!(err.code, ErrorCode::NoOperator);
}

#[test]
fn broadcasting_scalars_over_matrices() {
    let doubled = binary_op("\u{00d7}", &num(2), &row(&[1, 2, 3])).unwrap();
    assert_eq!(doubled, row(&[2, 4, 6]));
    let shifted = binary_op("+", &row(&[1, 2, 3]), &num(10)).unwrap();
    assert_eq!(shifted, row(&[11, 12, 13]));
}

#[test]
fn concat_shapes() {
    // Two scalars concatenate into a row vector.
    assert_eq!(binary_op("&", &num(1), &num(2)).unwrap(), row(&[1, 2]));
    assert_eq!(
        binary_op("&", &row(&[1, 2]), &row(&[3, 4])).unwrap(),
        row(&[1, 2, 3, 4])
    );
    assert_eq!(
        binary_op("&", &Value::Str("ab".into()), &Value::Str("cd".into())).unwrap(),
        Value::Str("abcd".into())
    );
}

#[test]
fn comparisons_are_element_wise_over_vectors() {
    let result = compare("<", &row(&[1, 5]), &num(3)).unwrap();
    match result {
        Value::Matrix(m) => {
            assert_eq!(m.data[0], Value::Bool(true));
            assert_eq!(m.data[1], Value::Bool(false));
        }
        other => panic!("expected a vector of booleans, got {other:?}"),
    }
}

#[test]
fn unary_operators() {
    assert_eq!(unary_op("~", &num(5)).unwrap(), num(-5));
    assert_eq!(unary_op("!", &num(5)).unwrap(), num(120));
    assert_eq!(unary_op("\u{221a}", &num(16)).unwrap(), num(4));
    assert_eq!(unary_op("not", &Value::Bool(false)).unwrap(), Value::Bool(true));
}

#[test]
fn result_dtype_table_covers_the_shape_changing_rows() {
    assert_eq!(
        result_dtype("&", Dtype::Rational, Dtype::Rational),
        Dtype::RowVector
    );
    assert_eq!(
        result_dtype("\u{00b7}", Dtype::RowVector, Dtype::RowVector),
        Dtype::Rational
    );
    assert_eq!(
        result_dtype("\u{00d7}", Dtype::ColumnVector, Dtype::RowVector),
        Dtype::Matrix
    );
    assert_eq!(
        result_dtype("\u{00d7}", Dtype::Matrix, Dtype::Matrix),
        Dtype::Matrix
    );
    assert_eq!(result_dtype("<", Dtype::Rational, Dtype::Rational), Dtype::Boolean);
    assert_eq!(result_dtype("=", Dtype::Rational, Dtype::Error), Dtype::Error);
}

#[test]
fn builtins_resolve_through_the_registry() {
    let result = call_builtin("sum", &[row(&[1, 2, 3, 4])]).unwrap();
    assert_eq!(result, num(10));
    let result = call_builtin("max", &[num(3), num(9), num(5)]).unwrap();
    assert_eq!(result, num(9));
    let err = call_builtin("no_such_builtin", &[]).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownFunction);
}

#[test]
fn gcd_and_binom_are_exact() {
    assert_eq!(call_builtin("gcd", &[num(12), num(18)]).unwrap(), num(6));
    assert_eq!(call_builtin("binom", &[num(5), num(2)]).unwrap(), num(10));
}

#[test]
fn trig_reconstructs_rationals() {
    let result = call_builtin("sin", &[num(0)]).unwrap();
    assert_eq!(result, num(0));
    let result = call_builtin("cos", &[num(0)]).unwrap();
    assert_eq!(result, num(1));
}
