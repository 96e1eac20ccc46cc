//! The program-text wire format: a flat string of tokens separated by
//! one reserved whitespace character. This is the only channel
//! between the parser and the evaluator.
//!
//! Token forms:
//! - rational literal       `®<numerator>/<denominator>`
//! - complex literal        `©<re-num>,<re-den>,<im-num>,<im-den>`
//! - variable reference     `¿<name>`
//! - string literal         `"…"` (same quote character it was written with)
//! - operators              `+ - × · / ^ % ! & < > ≤ ≥ = ≠ .. √ ~ and or not`
//!                          (`~` is the unary minus)
//! - function call          `function <name> <arity>`, or a bare
//!                          built-in name for recognized one-argument
//!                          built-ins
//! - aggregate markers      `matrix <rows> <cols>`, `cases <n> <branches…>`,
//!                          `[] <argCount>`, `applyUnit <unitName>`
//!
//! Cases branches are embedded as single wire tokens by swapping in
//! the alternate separator for the nested slice; the evaluator swaps
//! the standard separator back in before re-entering the branch.

use quire_builtins::Rational;

/// Reserved token separator (U+00A0 NO-BREAK SPACE).
pub const RPN_SEP: char = '\u{00a0}';

/// Alternate separator used inside embedded cases branches
/// (U+2009 THIN SPACE).
pub const BRANCH_SEP: char = '\u{2009}';

pub const RATIONAL_MARK: char = '\u{00ae}'; // ®
pub const COMPLEX_MARK: char = '\u{00a9}'; // ©
pub const VARIABLE_MARK: char = '\u{00bf}'; // ¿

/// Encode a rational literal as a wire token.
pub fn rational_token(r: &Rational) -> String {
    format!("{RATIONAL_MARK}{}/{}", r.numer(), r.denom())
}

pub fn variable_token(name: &str) -> String {
    format!("{VARIABLE_MARK}{name}")
}

/// Join program-text tokens with the reserved separator.
pub fn join(tokens: &[String]) -> String {
    tokens.join(&RPN_SEP.to_string())
}

/// Embed a branch program text: swap the standard separator for the
/// alternate one so the slice reads as a single token.
pub fn embed_branch(program: &str) -> String {
    program.replace(RPN_SEP, &BRANCH_SEP.to_string())
}

/// Restore a branch slice to standard form before re-entry.
pub fn unembed_branch(token: &str) -> String {
    token.replace(BRANCH_SEP, &RPN_SEP.to_string())
}
