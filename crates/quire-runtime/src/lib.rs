//! Shape-polymorphic operator dispatch and the builtin function
//! library for the Quire calculation engine.

pub mod binary;
pub mod comparison;
pub mod dtype;
pub mod matrix_ops;
pub mod unary;

mod mathematics;
mod tables;

pub use comparison::{compare, compare_chained};
pub use dtype::result_dtype;

use quire_builtins::{ErrorCode, LangError, Value};

/// Call a registered builtin by name. Implementations register
/// through the `#[runtime_builtin]` attribute; the arity check lives
/// in the generated wrapper.
pub fn call_builtin(name: &str, args: &[Value]) -> Result<Value, LangError> {
    match quire_builtins::find_builtin(name) {
        Some(builtin) => (builtin.implementation)(args),
        None => {
            log::debug!("builtin lookup failed for '{name}'");
            Err(LangError::with_detail(ErrorCode::UnknownFunction, name))
        }
    }
}

/// Dispatch a binary operator by its wire symbol.
pub fn binary_op(op: &str, a: &Value, b: &Value) -> Result<Value, LangError> {
    match op {
        "+" => binary::add(a, b),
        "-" => binary::subtract(a, b),
        "\u{00d7}" => binary::multiply(a, b),
        "\u{00b7}" => binary::dot(a, b),
        "/" => binary::divide(a, b),
        "%" => binary::modulo(a, b),
        "^" => binary::power(a, b),
        "&" => binary::concat(a, b),
        ".." => binary::range(a, b),
        "and" => binary::logical_and(a, b),
        "or" => binary::logical_or(a, b),
        _ => Err(LangError::with_detail(ErrorCode::BadProgram, op)),
    }
}

/// Dispatch a unary operator by its wire symbol.
pub fn unary_op(op: &str, a: &Value) -> Result<Value, LangError> {
    match op {
        "~" => unary::negate(a),
        "not" => unary::logical_not(a),
        "!" => unary::factorial(a),
        "\u{221a}" => unary::square_root(a),
        _ => Err(LangError::with_detail(ErrorCode::BadProgram, op)),
    }
}

pub fn is_comparison_op(op: &str) -> bool {
    matches!(op, "<" | ">" | "\u{2264}" | "\u{2265}" | "=" | "\u{2260}")
}
