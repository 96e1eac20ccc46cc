//! Value system for the Quire calculation engine: the exact numeric
//! tower, container types, unit descriptors, typed errors, and the
//! builtin-function registry shared by the runtime and the VM.

pub use inventory;

pub mod complex;
pub mod error;
pub mod functions;
pub mod map;
pub mod matrix;
pub mod rational;
pub mod table;
pub mod unit;
pub mod value;

pub use complex::Complex;
pub use error::{ErrorCode, LangError};
pub use functions::{Statement, StatementKind, UserFunction, MAX_RECURSION_DEPTH};
pub use map::ValueMap;
pub use matrix::Matrix;
pub use rational::{PowOutcome, Rational};
pub use table::{Table, TableStorage};
pub use unit::{Dimensions, UnitDescriptor, BASE_DIMENSIONS};
pub use value::{Dtype, Quantity, Range, Shape, Value};

/// A registered builtin function. Implementations live in
/// `quire-runtime` and register themselves through the
/// `#[runtime_builtin]` attribute.
#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub implementation: fn(&[Value]) -> Result<Value, LangError>,
}

impl BuiltinFunction {
    pub const fn new(
        name: &'static str,
        implementation: fn(&[Value]) -> Result<Value, LangError>,
    ) -> Self {
        BuiltinFunction {
            name,
            implementation,
        }
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BuiltinFunction {{ name: {:?} }}", self.name)
    }
}

inventory::collect!(BuiltinFunction);

pub fn builtin_functions() -> impl Iterator<Item = &'static BuiltinFunction> {
    inventory::iter::<BuiltinFunction>.into_iter()
}

/// Look up a builtin by name.
pub fn find_builtin(name: &str) -> Option<&'static BuiltinFunction> {
    builtin_functions().find(|b| b.name == name)
}
