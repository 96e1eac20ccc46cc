//! # Quire
//!
//! A unit-aware, exact-arithmetic calculation engine designed to be
//! embedded in a live document editor: the host hands expressions in,
//! Quire hands back a typeset-ready display string and an exact (or
//! unit-checked) result.
//!
//! The pipeline is lex → parse → evaluate, one synchronous call
//! stack. The parser emits both a display string and a flat postfix
//! program text; the stack machine interprets the program text
//! against a caller-owned variable environment.
//!
//! ```
//! use quire::{evaluate, parse, Environment, Value};
//!
//! let (_render, program) = parse("2 + 3 \u{00d7} 4", true).unwrap();
//! let result = evaluate(&program, &Environment::new(), false).unwrap();
//! assert_eq!(result.to_string(), "14");
//! ```

pub use quire_builtins::{
    Complex, Dimensions, Dtype, ErrorCode, LangError, Matrix, Quantity, Range, Rational, Shape,
    Statement, StatementKind, Table, UnitDescriptor, UserFunction, Value, ValueMap,
};
pub use quire_lexer::{lex, tokenize, tokenize_detailed, SpannedToken, Token};
pub use quire_parser::{parse, parse_function_def, wire, ParseError};
pub use quire_runtime::{call_builtin, result_dtype};
pub use quire_units::{resolve as resolve_unit, set_exchange_rates};
pub use quire_vm::{evaluate, run_user_function, Environment};
