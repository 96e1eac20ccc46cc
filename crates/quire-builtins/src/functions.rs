//! User-defined function descriptors: a name, parameter names, and a
//! flat statement list. Block-opening statements record the index of
//! their matching `end` so the control-flow interpreter can jump.

use serde::{Deserialize, Serialize};

/// Maximum user-function call depth before the evaluator refuses.
pub const MAX_RECURSION_DEPTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    /// An expression statement, optionally assigning to `targets`.
    Plain,
    If,
    ElseIf,
    Else,
    While,
    For,
    Break,
    Return,
    /// Evaluate and report the expression without binding it.
    Echo,
    /// Terminate the call with a user-authored error message.
    Raise,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    /// Assignment targets for `Plain`; the loop variable for `For`.
    pub targets: Vec<String>,
    /// Program text of the statement's expression or condition, when
    /// the kind carries one.
    pub rpn: Option<String>,
    /// For block openers (`If`/`ElseIf`/`Else`/`While`/`For`): the
    /// statement index of the matching `End`.
    pub end_index: usize,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Statement {
            kind,
            targets: Vec::new(),
            rpn: None,
            end_index: 0,
        }
    }

    pub fn opens_block(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::If
                | StatementKind::ElseIf
                | StatementKind::Else
                | StatementKind::While
                | StatementKind::For
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFunction {
    pub name: String,
    pub params: Vec<String>,
    pub statements: Vec<Statement>,
}
