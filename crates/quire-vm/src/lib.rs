//! The stack-machine evaluator: decodes the parser's program text
//! into an instruction vector and interprets it against a
//! caller-owned variable environment, synchronously.

pub mod decode;
pub mod instr;
pub mod user_functions;
pub mod vm;

pub use decode::decode;
pub use instr::Instr;
pub use vm::{evaluate, Environment};

use quire_builtins::{LangError, UserFunction, Value};

/// Run a user-defined function descriptor directly (the embedding
/// entry point). The function sees only its parameters and itself.
pub fn run_user_function(
    func: &UserFunction,
    args: &[Value],
    unit_aware: bool,
) -> Result<Value, LangError> {
    let env = Environment::new();
    user_functions::call(func, args, &env, unit_aware, 0)
}
