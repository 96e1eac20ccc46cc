//! User-function definitions. A function block is a flat statement
//! list; each block-opening statement records the index of its
//! matching `end` so the control-flow interpreter can jump without a
//! tree.
//!
//! ```text
//! function hypotenuse(a, b)
//!     c = sqrt(a^2 + b^2)
//!     return c
//! end
//! ```

use quire_builtins::{Statement, StatementKind, UserFunction};
use quire_lexer::{tokenize_detailed, Token};

use crate::{parse, ParseError};

/// Parse a complete `function … end` block into a descriptor.
pub fn parse_function_def(text: &str) -> Result<UserFunction, ParseError> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .enumerate()
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

    let (_, header) = lines
        .next()
        .ok_or_else(|| ParseError::from("empty function definition".to_string()))?;
    let (name, params) = parse_header(header)?;

    let mut statements: Vec<Statement> = Vec::new();
    // Stack of open block chains; each chain is the list of statement
    // indices (if/else-if/else share one `end`).
    let mut chains: Vec<Vec<usize>> = Vec::new();
    let mut closed = false;

    for (line_no, line) in lines {
        if closed {
            return Err(ParseError {
                message: "statements after the closing 'end'".to_string(),
                position: line_no,
                found_token: Some(line.to_string()),
                expected: None,
            });
        }
        let stmt = classify_line(line)?;
        match stmt.kind {
            StatementKind::If | StatementKind::While | StatementKind::For => {
                chains.push(vec![statements.len()]);
                statements.push(stmt);
            }
            StatementKind::ElseIf | StatementKind::Else => {
                let chain = chains.last_mut().ok_or_else(|| {
                    ParseError::from(format!("'{line}' without a matching 'if'"))
                })?;
                chain.push(statements.len());
                statements.push(stmt);
            }
            StatementKind::End => {
                match chains.pop() {
                    Some(chain) => {
                        let end_index = statements.len();
                        for idx in chain {
                            statements[idx].end_index = end_index;
                        }
                        statements.push(stmt);
                    }
                    // The function's own closing `end`.
                    None => closed = true,
                }
            }
            _ => statements.push(stmt),
        }
    }

    if !closed {
        return Err(ParseError::from(format!(
            "function '{name}' is missing its closing 'end'"
        )));
    }
    if !chains.is_empty() {
        return Err(ParseError::from(format!(
            "unclosed block inside function '{name}'"
        )));
    }

    Ok(UserFunction {
        name,
        params,
        statements,
    })
}

fn parse_header(line: &str) -> Result<(String, Vec<String>), ParseError> {
    let tokens = tokenize_detailed(line);
    let mut iter = tokens.iter();
    match iter.next().map(|t| t.token) {
        Some(Token::Function) => {}
        _ => {
            return Err(ParseError::from(
                "a function definition must start with 'function'".to_string(),
            ))
        }
    }
    let name = match iter.next() {
        Some(t) if t.token == Token::Ident => t.render.clone(),
        _ => return Err(ParseError::from("missing function name".to_string())),
    };
    match iter.next().map(|t| t.token) {
        Some(Token::LParen) => {}
        _ => {
            return Err(ParseError::from(
                "missing '(' after the function name".to_string(),
            ))
        }
    }
    let mut params = Vec::new();
    let mut expect_name = true;
    for tok in iter {
        match tok.token {
            Token::Ident if expect_name => {
                params.push(tok.render.clone());
                expect_name = false;
            }
            Token::Comma if !expect_name => expect_name = true,
            Token::RParen => return Ok((name, params)),
            _ => {
                return Err(ParseError::from(format!(
                    "malformed parameter list near '{}'",
                    tok.lexeme
                )))
            }
        }
    }
    Err(ParseError::from("missing ')' in function header".to_string()))
}

fn classify_line(line: &str) -> Result<Statement, ParseError> {
    if line == "end" {
        return Ok(Statement::new(StatementKind::End));
    }
    if line == "break" {
        return Ok(Statement::new(StatementKind::Break));
    }
    if line == "else" {
        return Ok(Statement::new(StatementKind::Else));
    }
    if let Some(cond) = line.strip_prefix("else if ") {
        let mut stmt = Statement::new(StatementKind::ElseIf);
        stmt.rpn = Some(compile(cond)?);
        return Ok(stmt);
    }
    if let Some(cond) = line.strip_prefix("if ") {
        let mut stmt = Statement::new(StatementKind::If);
        stmt.rpn = Some(compile(cond)?);
        return Ok(stmt);
    }
    if let Some(cond) = line.strip_prefix("while ") {
        let mut stmt = Statement::new(StatementKind::While);
        stmt.rpn = Some(compile(cond)?);
        return Ok(stmt);
    }
    if let Some(rest) = line.strip_prefix("for ") {
        let (var, source) = rest.split_once(" in ").ok_or_else(|| {
            ParseError::from("a 'for' statement reads: for <name> in <expression>".to_string())
        })?;
        let mut stmt = Statement::new(StatementKind::For);
        stmt.targets = vec![var.trim().to_string()];
        stmt.rpn = Some(compile(source)?);
        return Ok(stmt);
    }
    if line == "return" {
        return Ok(Statement::new(StatementKind::Return));
    }
    if let Some(expr) = line.strip_prefix("return ") {
        let mut stmt = Statement::new(StatementKind::Return);
        stmt.rpn = Some(compile(expr)?);
        return Ok(stmt);
    }
    if let Some(expr) = line.strip_prefix("echo ") {
        let mut stmt = Statement::new(StatementKind::Echo);
        stmt.rpn = Some(compile(expr)?);
        return Ok(stmt);
    }
    if let Some(expr) = line.strip_prefix("raise ") {
        let mut stmt = Statement::new(StatementKind::Raise);
        stmt.rpn = Some(compile(expr)?);
        return Ok(stmt);
    }

    let mut stmt = Statement::new(StatementKind::Plain);
    match split_assignment(line) {
        Some((targets, expr)) => {
            stmt.targets = targets;
            stmt.rpn = Some(compile(expr)?);
        }
        None => {
            stmt.rpn = Some(compile(line)?);
        }
    }
    Ok(stmt)
}

fn compile(expr: &str) -> Result<String, ParseError> {
    let (_, rpn) = parse(expr.trim(), true)?;
    Ok(rpn)
}

/// Detect `a = expr` / `a, b = expr` at bracket depth zero. A lone
/// `=` deeper in the line is equality, not assignment.
fn split_assignment(line: &str) -> Option<(Vec<String>, &str)> {
    let bytes = line.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'=' if depth == 0 => {
                // Skip ==, <=, >=, !=
                if bytes.get(i + 1) == Some(&b'=') || i == 0 {
                    return None;
                }
                if matches!(bytes[i - 1], b'<' | b'>' | b'!' | b'=') {
                    return None;
                }
                let lhs = &line[..i];
                let targets: Vec<String> = lhs
                    .split(',')
                    .map(|t| t.trim().to_string())
                    .collect();
                if targets.is_empty()
                    || targets
                        .iter()
                        .any(|t| t.is_empty() || !is_identifier(t))
                {
                    return None;
                }
                return Some((targets, &line[i + 1..]));
            }
            _ => {}
        }
    }
    None
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
