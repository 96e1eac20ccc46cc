//! The dual-output expression compiler: one left-to-right pass over
//! the token stream builds a display (render) string and, in calc
//! mode, the postfix program text consumed by the stack machine.
//!
//! The pass keeps three parallel stacks: an operator stack for the
//! display target, an operator stack for the program-text target, and
//! a delimiter/context stack that remembers what each open bracket
//! turned out to be (plain group, function call, accessor, matrix,
//! cases block, map, absolute value).

pub mod wire;

mod function_def;

pub use function_def::parse_function_def;

use std::str::FromStr;

use quire_builtins::Rational;
use quire_lexer::{control_word, tokenize_detailed, ControlWordKind, SpannedToken, Token};

/// Built-ins the parser recognizes by name. A one-argument call to
/// one of these is emitted as a bare name; everything else uses the
/// `function <name> <arity>` form.
pub const RECOGNIZED_BUILTINS: &[&str] = &[
    "abs", "acos", "asin", "atan", "atan2", "binom", "ceil", "conj", "cos", "cosh", "count",
    "exp", "floor", "gcd", "im", "length", "ln", "log", "log10", "log2", "map", "max", "mean",
    "min", "product", "rational", "re", "root", "round", "sign", "sin", "sinh", "sqrt", "sum",
    "tan", "tanh", "transpose",
];

pub fn is_recognized_builtin(name: &str) -> bool {
    RECOGNIZED_BUILTINS.contains(&name)
}

#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
    pub found_token: Option<String>,
    pub expected: Option<String>,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Parse error at position {}: {}",
            self.position, self.message
        )?;
        if let Some(found) = &self.found_token {
            write!(f, " (found: '{found}')")?;
        }
        if let Some(expected) = &self.expected {
            write!(f, " (expected: {expected})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<String> for ParseError {
    fn from(message: String) -> Self {
        ParseError {
            message,
            position: 0,
            found_token: None,
            expected: None,
        }
    }
}

impl From<ParseError> for String {
    fn from(error: ParseError) -> Self {
        format!("{error}")
    }
}

/// Parse an expression (or a `name = expression` statement). Returns
/// the display string and, in calc mode, the program text; in
/// render-only mode the program text is empty.
pub fn parse(input: &str, calc_mode: bool) -> Result<(String, String), ParseError> {
    let tokens = tokenize_detailed(input);
    let mut start = 0;

    let mut render_prefix = String::new();
    // A leading `name =` is an assignment statement; the target is
    // display-only, the program text is the right-hand side.
    if tokens.len() >= 2 && tokens[0].token == Token::Ident && tokens[1].token == Token::Equal {
        render_prefix = format!("{} = ", tokens[0].render);
        start = 2;
    }

    let mut parser = Parser::new(tokens, start, calc_mode);
    parser.run()?;
    let (render, rpn) = parser.finish()?;
    Ok((format!("{render_prefix}{render}"), rpn))
}

struct OpEntry {
    wire: String,
    prec: u8,
    right_assoc: bool,
}

/// Pending display-side closings (√ groups, auto-inserted parens).
struct RenderOp {
    closing: String,
    prec: u8,
}

enum Ctx {
    /// A bracketed group that may still turn into a matrix.
    Group {
        bracket: char,
        ops_mark: usize,
        /// Output-queue length when the group opened (used when the
        /// group reclassifies into a cases block).
        out_mark: usize,
        is_matrix: bool,
        is_map: bool,
        rows: usize,
        row_items: usize,
        first_row_items: usize,
    },
    FuncCall {
        name: String,
        args: usize,
        ops_mark: usize,
        /// Output-queue length at the opening paren, to detect
        /// zero-argument calls.
        out_mark: usize,
        exponent: Option<Rational>,
    },
    Accessor {
        args: usize,
        ops_mark: usize,
    },
    Cases {
        ops_mark: usize,
        expr_mark: usize,
        branches: Vec<String>,
        in_condition: bool,
    },
    Abs {
        ops_mark: usize,
    },
}

impl Ctx {
    fn ops_mark(&self) -> usize {
        match self {
            Ctx::Group { ops_mark, .. }
            | Ctx::FuncCall { ops_mark, .. }
            | Ctx::Accessor { ops_mark, .. }
            | Ctx::Cases { ops_mark, .. }
            | Ctx::Abs { ops_mark, .. } => *ops_mark,
        }
    }
}

// Program-target precedence levels.
const PREC_OR: u8 = 10;
const PREC_AND: u8 = 20;
const PREC_NOT: u8 = 25;
const PREC_CMP: u8 = 30;
const PREC_RANGE: u8 = 35;
const PREC_CONCAT: u8 = 40;
const PREC_ADD: u8 = 50;
const PREC_MUL: u8 = 60;
const PREC_IMPLICIT: u8 = 70;
const PREC_UNARY: u8 = 80;
const PREC_POW: u8 = 90;

/// Display-target precedence. The two tables diverge where typeset
/// form and evaluation order disagree: the synthesized multiply binds
/// tightly in the program but renders like an ordinary product, and a
/// rendered exponent tower is flat rather than right-nested.
fn display_precedence(prec: u8) -> u8 {
    match prec {
        PREC_IMPLICIT => PREC_MUL,
        PREC_POW => PREC_UNARY,
        other => other,
    }
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    calc: bool,
    render: Vec<String>,
    render_ops: Vec<RenderOp>,
    rpn_out: Vec<String>,
    rpn_ops: Vec<OpEntry>,
    ctx: Vec<Ctx>,
    /// The previous token ended a value (controls implicit multiply).
    prev_ends_value: bool,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>, start: usize, calc: bool) -> Self {
        Parser {
            tokens,
            pos: start,
            calc,
            render: Vec::new(),
            render_ops: Vec::new(),
            rpn_out: Vec::new(),
            rpn_ops: Vec::new(),
            ctx: Vec::new(),
            prev_ends_value: false,
        }
    }

    fn error(&self, message: &str) -> ParseError {
        let (position, found_token) = if let Some(tok) = self.tokens.get(self.pos) {
            (tok.start, Some(tok.lexeme.clone()))
        } else {
            (
                self.tokens.last().map(|t| t.end).unwrap_or(0),
                None,
            )
        };
        ParseError {
            message: message.to_string(),
            position,
            found_token,
            expected: None,
        }
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<SpannedToken> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn ops_floor(&self) -> usize {
        self.ctx.last().map(|c| c.ops_mark()).unwrap_or(0)
    }

    fn out(&mut self, token: impl Into<String>) {
        if self.calc {
            self.rpn_out.push(token.into());
        }
    }

    fn emit_render(&mut self, text: impl Into<String>) {
        self.render.push(text.into());
    }

    /// Close display groups whose precedence floor the incoming
    /// operator falls below.
    fn close_render_groups(&mut self, prec: u8) {
        while let Some(top) = self.render_ops.last() {
            if prec < top.prec {
                let closing = self.render_ops.pop().unwrap().closing;
                self.render.push(closing);
            } else {
                break;
            }
        }
    }

    fn pop_op(&mut self) {
        if let Some(op) = self.rpn_ops.pop() {
            self.rpn_out.push(op.wire);
        }
    }

    /// Shunting-yard push: pop higher-precedence (or equal, for
    /// left-associative) operators, then stack this one.
    fn push_op(&mut self, wire: &str, render: &str, prec: u8, right_assoc: bool) {
        let floor = self.ops_floor();
        while self.rpn_ops.len() > floor {
            let top = self.rpn_ops.last().unwrap();
            if top.prec > prec || (top.prec == prec && !right_assoc) {
                self.pop_op();
            } else {
                break;
            }
        }
        self.close_render_groups(display_precedence(prec));
        self.rpn_ops.push(OpEntry {
            wire: wire.to_string(),
            prec,
            right_assoc,
        });
        if !render.is_empty() {
            self.emit_render(render.to_string());
        }
        self.prev_ends_value = false;
    }

    /// Flush every pending operator above the current context floor.
    /// A prefix render group (√ …) never spans a separator, so all
    /// pending display closings drop here too.
    fn flush_ops(&mut self) {
        let floor = self.ops_floor();
        while self.rpn_ops.len() > floor {
            self.pop_op();
        }
        while let Some(op) = self.render_ops.pop() {
            self.render.push(op.closing);
        }
    }

    /// Insert the synthesized multiply between adjacent factors.
    fn maybe_implicit_multiply(&mut self) {
        if self.prev_ends_value {
            self.push_op("\u{00d7}", "\u{22c5}", PREC_IMPLICIT, false);
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(tok) = self.next() {
            self.advance(tok)?;
        }
        Ok(())
    }

    fn advance(&mut self, tok: SpannedToken) -> Result<(), ParseError> {
        match tok.token {
            Token::Num => {
                self.maybe_implicit_multiply();
                let value = Rational::from_str(&tok.lexeme)
                    .map_err(|e| self.error(&e.message()))?;
                self.out(wire::rational_token(&value));
                self.emit_render(tok.render.clone());
                self.prev_ends_value = true;
            }
            Token::True | Token::False => {
                self.maybe_implicit_multiply();
                self.out(tok.lexeme.clone());
                self.emit_render(tok.render.clone());
                self.prev_ends_value = true;
            }
            Token::Ident => {
                self.maybe_implicit_multiply();
                self.handle_ident(tok)?;
            }
            Token::ControlWord => {
                self.handle_control_word(tok)?;
            }
            Token::Str | Token::RichText | Token::TableLit => {
                self.maybe_implicit_multiply();
                self.out(tok.lexeme.clone());
                self.emit_render(tok.render.clone());
                self.prev_ends_value = true;
            }
            Token::UnitLit => {
                self.handle_unit_literal(tok)?;
            }
            Token::Superscript => {
                // Exponent sugar on the preceding factor: x² == x^2.
                let exponent = superscript_value(&tok.lexeme)
                    .ok_or_else(|| self.error("malformed superscript exponent"))?;
                self.push_op("^", "", PREC_POW, true);
                self.out(wire::rational_token(&Rational::from_i64(exponent)));
                self.emit_render(tok.render.clone());
                self.prev_ends_value = true;
            }
            Token::Plus => self.push_op("+", "+", PREC_ADD, false),
            Token::Minus(true) => self.push_op("-", "\u{2212}", PREC_ADD, false),
            Token::Minus(false) => self.push_op("~", "\u{2212}", PREC_UNARY, true),
            Token::Times => self.push_op("\u{00d7}", "\u{00d7}", PREC_MUL, false),
            Token::Cdot => self.push_op("\u{00b7}", "\u{00b7}", PREC_MUL, false),
            Token::Slash => self.push_op("/", "/", PREC_MUL, false),
            Token::Mod => self.push_op("%", "mod", PREC_MUL, false),
            Token::Caret => {
                // Right-to-left: equal precedence does not pop.
                self.push_op("^", "^", PREC_POW, true)
            }
            Token::Sqrt => {
                self.maybe_implicit_multiply();
                self.push_op("\u{221a}", "\u{221a}(", PREC_UNARY, true);
                self.render_ops.push(RenderOp {
                    closing: ")".to_string(),
                    prec: PREC_UNARY,
                });
            }
            Token::Not => self.push_op("not", "\u{00ac}", PREC_NOT, true),
            Token::And => self.push_op("and", "and", PREC_AND, false),
            Token::Or => self.push_op("or", "or", PREC_OR, false),
            Token::Amp => self.push_op("&", "&", PREC_CONCAT, false),
            Token::Less => self.push_op("<", "<", PREC_CMP, false),
            Token::Greater => self.push_op(">", ">", PREC_CMP, false),
            Token::LessEqual => self.push_op("\u{2264}", "\u{2264}", PREC_CMP, false),
            Token::GreaterEqual => self.push_op("\u{2265}", "\u{2265}", PREC_CMP, false),
            Token::Equal | Token::EqualEqual => self.push_op("=", "=", PREC_CMP, false),
            Token::NotEqual => self.push_op("\u{2260}", "\u{2260}", PREC_CMP, false),
            Token::Range => self.push_op("..", "\u{2026}", PREC_RANGE, false),
            Token::Bang => {
                // Postfix factorial applies to the completed operand.
                self.out("!");
                self.emit_render("!");
                self.prev_ends_value = true;
            }
            Token::Percent => {
                // Postfix percent: divide the operand by 100.
                self.out(wire::rational_token(
                    &Rational::new(1.into(), 100.into()).expect("non-zero denominator"),
                ));
                self.out("\u{00d7}");
                self.emit_render("%");
                self.prev_ends_value = true;
            }
            Token::LParen => {
                self.maybe_implicit_multiply();
                self.open_group('(');
                self.emit_render("(");
            }
            Token::LBracket => {
                if self.prev_ends_value && !tok.spaced_before {
                    // Accessor bracket.
                    self.ctx.push(Ctx::Accessor {
                        args: 0,
                        ops_mark: self.rpn_ops.len(),
                    });
                    self.emit_render("[");
                    self.prev_ends_value = false;
                } else {
                    self.maybe_implicit_multiply();
                    self.open_group('[');
                    self.emit_render("[");
                }
            }
            Token::LBrace => {
                self.maybe_implicit_multiply();
                self.open_group('{');
                self.emit_render("{");
            }
            Token::Pipe => {
                if matches!(self.ctx.last(), Some(Ctx::Abs { .. })) {
                    self.close_abs()?;
                } else {
                    self.maybe_implicit_multiply();
                    self.ctx.push(Ctx::Abs {
                        ops_mark: self.rpn_ops.len(),
                    });
                    self.emit_render("|");
                    self.prev_ends_value = false;
                }
            }
            Token::Comma => self.handle_separator(false)?,
            Token::Semicolon => self.handle_separator(true)?,
            Token::Colon => self.handle_colon()?,
            Token::If => self.handle_if()?,
            Token::Otherwise => self.handle_otherwise()?,
            Token::RParen => self.close_group(')')?,
            Token::RBracket => self.close_group(']')?,
            Token::RBrace => self.close_group('}')?,
            Token::Underscore => {
                return Err(self.error("a subscript must follow an identifier"));
            }
            Token::Error => {
                return Err(self.error("unrecognized character"));
            }
            _ => {
                return Err(self.error("reserved word is not allowed in an expression"));
            }
        }
        Ok(())
    }

    fn handle_ident(&mut self, tok: SpannedToken) -> Result<(), ParseError> {
        let mut name = tok.render.clone();
        // Fold a subscript group into the variable name: x_1, T_max.
        if self.peek().map(|t| t.token) == Some(Token::Underscore) {
            self.pos += 1;
            match self.next() {
                Some(sub) if matches!(sub.token, Token::Ident | Token::Num) => {
                    name = format!("{}_{}", name, sub.render);
                }
                _ => return Err(self.error("a subscript must follow the underscore")),
            }
        }

        // Function call: identifier directly followed by `(`, with
        // optional exponent sugar in between (sin²(x), sin⁻¹(x)).
        let mut exponent: Option<Rational> = None;
        let mut offset = 0;
        if let Some(sup) = self.peek() {
            if sup.token == Token::Superscript {
                offset = 1;
            }
        }
        let call_paren = self
            .peek_at(offset)
            .map(|t| t.token == Token::LParen && !t.spaced_before)
            .unwrap_or(false);
        if call_paren && (offset == 0 || is_recognized_builtin(&name)) {
            if offset == 1 {
                let sup = self.next().expect("peeked superscript");
                let value = superscript_value(&sup.lexeme)
                    .ok_or_else(|| self.error("malformed superscript exponent"))?;
                if value == -1 && is_inverse_sugar(&name) {
                    // sin⁻¹(x) is asin(x), by syntax alone.
                    name = format!("a{name}");
                } else {
                    exponent = Some(Rational::from_i64(value));
                }
            }
            self.pos += 1; // consume '('
            self.emit_render(format!("{name}("));
            self.ctx.push(Ctx::FuncCall {
                name,
                args: 0,
                ops_mark: self.rpn_ops.len(),
                out_mark: self.rpn_out.len(),
                exponent,
            });
            self.prev_ends_value = false;
            return Ok(());
        }

        self.out(wire::variable_token(&name));
        self.emit_render(name);
        self.prev_ends_value = true;
        Ok(())
    }

    fn handle_control_word(&mut self, tok: SpannedToken) -> Result<(), ParseError> {
        let word = &tok.lexeme[1..];
        match control_word(word) {
            Some((render, ControlWordKind::Accent)) => {
                // The accent folds into the following identifier.
                match self.next() {
                    Some(ident) if ident.token == Token::Ident => {
                        self.maybe_implicit_multiply();
                        let name = format!("{}{}", ident.render, render);
                        self.out(wire::variable_token(&name));
                        self.emit_render(name);
                        self.prev_ends_value = true;
                        Ok(())
                    }
                    _ => Err(self.error("an accent must precede an identifier")),
                }
            }
            Some((_, ControlWordKind::Unary)) if word == "sqrt" => {
                self.maybe_implicit_multiply();
                self.push_op("\u{221a}", "\u{221a}(", PREC_UNARY, true);
                self.render_ops.push(RenderOp {
                    closing: ")".to_string(),
                    prec: PREC_UNARY,
                });
                Ok(())
            }
            Some((_, ControlWordKind::Unary)) if word == "neg" => {
                self.push_op("not", "\u{00ac}", PREC_NOT, true);
                Ok(())
            }
            Some((_, ControlWordKind::Unary)) if word == "binom" => {
                // \binom(n, k): a two-argument call.
                match self.next() {
                    Some(open) if open.token == Token::LParen => {
                        self.maybe_implicit_multiply();
                        self.emit_render("binom(".to_string());
                        self.ctx.push(Ctx::FuncCall {
                            name: "binom".to_string(),
                            args: 0,
                            ops_mark: self.rpn_ops.len(),
                            out_mark: self.rpn_out.len(),
                            exponent: None,
                        });
                        self.prev_ends_value = false;
                        Ok(())
                    }
                    _ => Err(self.error("\\binom requires parenthesized arguments")),
                }
            }
            Some((render, ControlWordKind::Binary)) => {
                let (wire_sym, prec) = match word {
                    "cdot" => ("\u{00b7}", PREC_MUL),
                    "times" => ("\u{00d7}", PREC_MUL),
                    "div" => ("/", PREC_MUL),
                    _ => ("+", PREC_ADD),
                };
                self.push_op(wire_sym, render, prec, false);
                Ok(())
            }
            Some((render, ControlWordKind::Relation)) => {
                let wire_sym = match word {
                    "le" => "\u{2264}",
                    "ge" => "\u{2265}",
                    "ne" => "\u{2260}",
                    _ => "=",
                };
                self.push_op(wire_sym, render, PREC_CMP, false);
                Ok(())
            }
            Some((_, ControlWordKind::Color)) => {
                // Colors affect rendering only.
                self.emit_render(tok.render.clone());
                Ok(())
            }
            _ => Err(self.error("unknown control word")),
        }
    }

    fn handle_unit_literal(&mut self, tok: SpannedToken) -> Result<(), ParseError> {
        let inner = tok.lexeme.trim_matches('\'').trim();
        if inner.is_empty() {
            return Err(self.error("empty unit literal"));
        }
        // A leading number makes this a quantity literal: '3 m'.
        let split = inner
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | '/' | 'e' | 'E' | ' ')))
            .unwrap_or(inner.len());
        let (num_part, unit_part) = inner.split_at(split);
        let num_part = num_part.trim();
        let unit_part = unit_part.trim();

        if !num_part.is_empty() && !unit_part.is_empty() {
            self.maybe_implicit_multiply();
            let value = Rational::from_str(num_part).map_err(|e| self.error(&e.message()))?;
            self.out(wire::rational_token(&value));
            self.out("applyUnit");
            self.out(unit_part.to_string());
        } else {
            // A bare unit applies to the preceding operand. Flush
            // everything that binds tighter than multiplication so the
            // unit attaches to the whole factor.
            if !self.prev_ends_value {
                return Err(self.error("a unit must follow a value"));
            }
            let floor = self.ops_floor();
            while self.rpn_ops.len() > floor && self.rpn_ops.last().unwrap().prec >= PREC_IMPLICIT {
                self.pop_op();
            }
            self.out("applyUnit");
            self.out(inner.to_string());
        }
        self.emit_render(inner.to_string());
        self.prev_ends_value = true;
        Ok(())
    }

    fn open_group(&mut self, bracket: char) {
        self.ctx.push(Ctx::Group {
            bracket,
            ops_mark: self.rpn_ops.len(),
            out_mark: self.rpn_out.len(),
            is_matrix: false,
            is_map: false,
            rows: 0,
            row_items: 0,
            first_row_items: 0,
        });
        self.prev_ends_value = false;
    }

    fn handle_separator(&mut self, is_row: bool) -> Result<(), ParseError> {
        self.flush_ops();
        enum Action {
            Arg,
            MatrixCol,
            MatrixRow,
            CaseEnd,
            BadSemicolonInMap,
            RaggedRow,
            MissingCondition,
            Outside,
        }
        let action = match self.ctx.last() {
            Some(Ctx::FuncCall { .. }) | Some(Ctx::Accessor { .. }) if !is_row => Action::Arg,
            Some(Ctx::Group { is_map: true, .. }) => {
                if is_row {
                    Action::BadSemicolonInMap
                } else {
                    Action::Arg
                }
            }
            Some(Ctx::Group {
                rows,
                row_items,
                first_row_items,
                ..
            }) => {
                if is_row {
                    if *rows > 0 && *row_items + 1 != *first_row_items {
                        Action::RaggedRow
                    } else {
                        Action::MatrixRow
                    }
                } else {
                    Action::MatrixCol
                }
            }
            Some(Ctx::Cases { in_condition, .. }) if is_row => {
                if *in_condition {
                    Action::CaseEnd
                } else {
                    Action::MissingCondition
                }
            }
            _ => Action::Outside,
        };
        match action {
            Action::Arg => {
                match self.ctx.last_mut() {
                    Some(Ctx::FuncCall { args, .. }) | Some(Ctx::Accessor { args, .. }) => {
                        *args += 1
                    }
                    Some(Ctx::Group { row_items, .. }) => *row_items += 1,
                    _ => {}
                }
                self.emit_render(", ");
            }
            Action::MatrixCol => {
                if let Some(Ctx::Group {
                    is_matrix,
                    row_items,
                    ..
                }) = self.ctx.last_mut()
                {
                    // First separator at this depth: the group is a matrix.
                    *is_matrix = true;
                    *row_items += 1;
                }
                self.emit_render(", ");
            }
            Action::MatrixRow => {
                if let Some(Ctx::Group {
                    is_matrix,
                    rows,
                    row_items,
                    first_row_items,
                    ..
                }) = self.ctx.last_mut()
                {
                    *is_matrix = true;
                    *row_items += 1;
                    if *rows == 0 {
                        *first_row_items = *row_items;
                    }
                    *rows += 1;
                    *row_items = 0;
                }
                self.emit_render("; ");
            }
            Action::CaseEnd => {
                let mark = self.rpn_out.len();
                if let Some(Ctx::Cases {
                    expr_mark,
                    in_condition,
                    ..
                }) = self.ctx.last_mut()
                {
                    *in_condition = false;
                    *expr_mark = mark;
                }
                self.emit_render("; ");
            }
            Action::BadSemicolonInMap => {
                return Err(self.error("';' is not allowed in a map literal"))
            }
            Action::RaggedRow => return Err(self.error("matrix rows must have equal lengths")),
            Action::MissingCondition => {
                return Err(self.error("each case needs an 'if' or 'otherwise'"))
            }
            Action::Outside => return Err(self.error("separator outside of a bracketed group")),
        }
        self.prev_ends_value = false;
        Ok(())
    }

    fn handle_colon(&mut self) -> Result<(), ParseError> {
        self.flush_ops();
        let is_map_position = matches!(
            self.ctx.last(),
            Some(Ctx::Group {
                bracket: '{',
                is_matrix: false,
                ..
            })
        );
        if !is_map_position {
            return Err(self.error("':' is only allowed in a map literal"));
        }
        if let Some(Ctx::Group { is_map, .. }) = self.ctx.last_mut() {
            *is_map = true;
        }
        // The key just emitted must be a string; a bare identifier
        // key is quoted.
        if let Some(last) = self.rpn_out.last_mut() {
            if let Some(name) = last.strip_prefix(wire::VARIABLE_MARK) {
                *last = format!("\"{name}\"");
            }
        }
        self.emit_render(": ");
        self.prev_ends_value = false;
        Ok(())
    }

    fn handle_if(&mut self) -> Result<(), ParseError> {
        self.flush_ops();
        // `if` reclassifies an open brace group into a cases block.
        match self.ctx.last() {
            Some(Ctx::Group {
                bracket: '{',
                is_matrix: false,
                is_map: false,
                ..
            }) => self.reclassify_as_cases()?,
            Some(Ctx::Cases { .. }) => {}
            _ => return Err(self.error("'if' is only allowed inside a cases block")),
        }
        self.begin_condition()
    }

    fn reclassify_as_cases(&mut self) -> Result<(), ParseError> {
        if self.ctx.iter().rev().skip(1).any(|c| matches!(c, Ctx::Cases { .. })) {
            // One alternate separator level: an embedded branch cannot
            // itself embed branches.
            return Err(self.error("cases blocks cannot nest"));
        }
        match self.ctx.pop() {
            Some(Ctx::Group {
                ops_mark,
                out_mark,
                ..
            }) => {
                self.ctx.push(Ctx::Cases {
                    ops_mark,
                    expr_mark: out_mark,
                    branches: Vec::new(),
                    in_condition: false,
                });
                Ok(())
            }
            _ => Err(self.error("'if' is only allowed inside a cases block")),
        }
    }

    /// Slice the just-finished branch expression out of the output
    /// queue; condition tokens that follow stay in the queue.
    fn slice_branch(&mut self, keyword: &str) -> Result<(), ParseError> {
        let (expr_mark, in_condition) = match self.ctx.last() {
            Some(Ctx::Cases {
                expr_mark,
                in_condition,
                ..
            }) => (*expr_mark, *in_condition),
            _ => {
                return Err(self.error(&format!(
                    "'{keyword}' is only allowed inside a cases block"
                )))
            }
        };
        if in_condition {
            return Err(self.error(&format!("'{keyword}' already given for this case")));
        }
        let mut branch = None;
        if self.calc {
            if self.rpn_out[expr_mark..]
                .iter()
                .any(|t| t.contains(wire::BRANCH_SEP))
            {
                // The slice would need a second alternate separator.
                return Err(self.error("cases blocks cannot nest"));
            }
            let slice: Vec<String> = self.rpn_out.drain(expr_mark..).collect();
            if slice.is_empty() {
                return Err(self.error(&format!(
                    "a case needs an expression before '{keyword}'"
                )));
            }
            branch = Some(wire::embed_branch(&wire::join(&slice)));
        }
        if let Some(Ctx::Cases {
            branches,
            in_condition,
            ..
        }) = self.ctx.last_mut()
        {
            if let Some(b) = branch {
                branches.push(b);
            }
            *in_condition = true;
        }
        Ok(())
    }

    fn begin_condition(&mut self) -> Result<(), ParseError> {
        self.slice_branch("if")?;
        self.emit_render(" if ");
        self.prev_ends_value = false;
        Ok(())
    }

    fn handle_otherwise(&mut self) -> Result<(), ParseError> {
        self.flush_ops();
        // An `otherwise` may open the cases block itself when it is
        // the only branch: `{x otherwise}`.
        if matches!(
            self.ctx.last(),
            Some(Ctx::Group {
                bracket: '{',
                is_matrix: false,
                is_map: false,
                ..
            })
        ) {
            self.reclassify_as_cases()?;
        }
        self.slice_branch("otherwise")?;
        // The constant-true condition keeps the branch selectable.
        if self.calc {
            self.rpn_out.push("true".to_string());
        }
        self.emit_render(" otherwise");
        self.prev_ends_value = true;
        Ok(())
    }

    fn close_abs(&mut self) -> Result<(), ParseError> {
        self.flush_ops();
        match self.ctx.pop() {
            Some(Ctx::Abs { .. }) => {
                self.out("abs");
                self.emit_render("|");
                self.prev_ends_value = true;
                Ok(())
            }
            _ => Err(self.error("unbalanced '|'")),
        }
    }

    fn close_group(&mut self, closer: char) -> Result<(), ParseError> {
        self.flush_ops();
        match self.ctx.pop() {
            Some(Ctx::FuncCall {
                name,
                args,
                out_mark,
                exponent,
                ..
            }) => {
                if closer != ')' {
                    return Err(self.error("mismatched closing delimiter"));
                }
                let arity = if args == 0 && self.rpn_out.len() == out_mark {
                    0
                } else {
                    args + 1
                };
                if is_recognized_builtin(&name) && arity == 1 {
                    self.out(name.clone());
                } else {
                    self.out("function");
                    self.out(name.clone());
                    self.out(arity.to_string());
                }
                if let Some(exp) = exponent {
                    self.out(wire::rational_token(&exp));
                    self.out("^");
                }
                self.emit_render(")");
                self.prev_ends_value = true;
                Ok(())
            }
            Some(Ctx::Accessor { args, .. }) => {
                if closer != ']' {
                    return Err(self.error("mismatched closing delimiter"));
                }
                self.out("[]");
                self.out((args + 1).to_string());
                self.emit_render("]");
                self.prev_ends_value = true;
                Ok(())
            }
            Some(Ctx::Group {
                bracket,
                is_matrix,
                is_map,
                rows,
                row_items,
                first_row_items,
                ..
            }) => {
                let expected = match bracket {
                    '(' => ')',
                    '[' => ']',
                    _ => '}',
                };
                if closer != expected {
                    return Err(self.error("mismatched closing delimiter"));
                }
                if is_map {
                    let pairs = row_items + 1;
                    self.out("function");
                    self.out("map");
                    self.out((pairs * 2).to_string());
                } else if is_matrix || bracket == '[' || bracket == '{' {
                    let cols = if rows == 0 {
                        row_items + 1
                    } else {
                        first_row_items
                    };
                    let total_rows = rows + 1;
                    if rows > 0 && row_items + 1 != first_row_items {
                        return Err(self.error("matrix rows must have equal lengths"));
                    }
                    self.out("matrix");
                    self.out(total_rows.to_string());
                    self.out(cols.to_string());
                }
                self.emit_render(expected.to_string());
                self.prev_ends_value = true;
                Ok(())
            }
            Some(Ctx::Cases {
                branches,
                in_condition,
                ..
            }) => {
                if closer != '}' {
                    return Err(self.error("mismatched closing delimiter"));
                }
                if !in_condition {
                    return Err(self.error("the final case is missing 'if' or 'otherwise'"));
                }
                if self.calc {
                    self.out("cases");
                    self.out(branches.len().to_string());
                    for branch in branches {
                        self.rpn_out.push(branch);
                    }
                }
                self.emit_render("}");
                self.prev_ends_value = true;
                Ok(())
            }
            Some(Ctx::Abs { .. }) | None => Err(self.error("unbalanced closing delimiter")),
        }
    }

    fn finish(mut self) -> Result<(String, String), ParseError> {
        // Close all outstanding delimiters, then flush the remaining
        // operator stack in reverse order.
        loop {
            let closer = match self.ctx.last() {
                None => break,
                Some(Ctx::Group { bracket: '(', .. }) | Some(Ctx::FuncCall { .. }) => Some(')'),
                Some(Ctx::Group { bracket: '[', .. }) | Some(Ctx::Accessor { .. }) => Some(']'),
                Some(Ctx::Group { .. }) | Some(Ctx::Cases { .. }) => Some('}'),
                Some(Ctx::Abs { .. }) => None,
            };
            match closer {
                Some(c) => self.close_group(c)?,
                None => self.close_abs()?,
            }
        }
        self.flush_ops();
        while !self.rpn_ops.is_empty() {
            self.pop_op();
        }
        while let Some(op) = self.render_ops.pop() {
            self.render.push(op.closing);
        }
        let render = assemble_render(&self.render);
        let rpn = wire::join(&self.rpn_out);
        Ok((render, rpn))
    }
}

fn assemble_render(parts: &[String]) -> String {
    let mut out = String::new();
    for part in parts {
        if !out.is_empty()
            && needs_space_before(part)
            && !out.ends_with('(')
            && !out.ends_with('[')
            && !out.ends_with('{')
            && !out.ends_with(' ')
        {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

fn needs_space_before(part: &str) -> bool {
    !matches!(
        part.chars().next(),
        Some(')' | ']' | '}' | ',' | ';' | '!' | '%') | None
    ) && !part.starts_with(": ")
}

fn is_inverse_sugar(name: &str) -> bool {
    matches!(name, "sin" | "cos" | "tan" | "sinh" | "cosh" | "tanh")
}

/// Value of a superscript-digit run, e.g. "⁻¹" → -1, "²³" → 23.
pub fn superscript_value(text: &str) -> Option<i64> {
    let mut negative = false;
    let mut value: i64 = 0;
    let mut any = false;
    for ch in text.chars() {
        let digit = match ch {
            '\u{2070}' => 0,
            '\u{00b9}' => 1,
            '\u{00b2}' => 2,
            '\u{00b3}' => 3,
            '\u{2074}' => 4,
            '\u{2075}' => 5,
            '\u{2076}' => 6,
            '\u{2077}' => 7,
            '\u{2078}' => 8,
            '\u{2079}' => 9,
            '\u{207b}' => {
                if any {
                    return None;
                }
                negative = true;
                continue;
            }
            _ => return None,
        };
        any = true;
        value = value * 10 + digit;
    }
    if !any {
        return None;
    }
    Some(if negative { -value } else { value })
}
