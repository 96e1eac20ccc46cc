//! The instruction vector the wire string decodes into. Opcodes keep
//! their operands inline; the wire contract stays the flat separated
//! string, this is only the execution form.

use quire_builtins::{Complex, Rational};

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    PushRational(Rational),
    PushComplex(Complex),
    PushBool(bool),
    PushStr(String),
    PushRichText(String),
    /// Raw delimited text of an inline table literal.
    PushTable(String),
    LoadVar(String),
    /// Unary operator by wire symbol: `~ not ! √`.
    Unary(String),
    /// Binary operator by wire symbol: `+ - × · / % ^ & .. and or`.
    Binary(String),
    /// Relational operator; participates in comparison chaining.
    Compare(String),
    /// Function call with explicit arity. Resolves a user function
    /// from the environment first, then the builtin table.
    Call(String, usize),
    /// Pop rows×cols elements and build a matrix.
    BuildMatrix(usize, usize),
    /// Pop one condition per branch; evaluate only the selected
    /// branch's program text.
    Cases(Vec<String>),
    /// Accessor with explicit argument count.
    Index(usize),
    /// Attach (or convert to) a unit by name.
    ApplyUnit(String),
}
