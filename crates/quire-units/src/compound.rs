//! Compound unit expressions (`N·m/s²`, `kW·h`, `kg/m^3`) compiled
//! with a small shunting-yard pass over `· / ^` and a unary minus in
//! exponents. Factors compose by multiplication/division; exponent
//! vectors by addition/subtraction/scalar multiplication.

use quire_builtins::{ErrorCode, LangError, Rational, UnitDescriptor};

use crate::lookup_single;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Int(i8),
    Op(char),
}

#[derive(Debug, Clone)]
enum Operand {
    Unit(UnitDescriptor),
    Exp(i8),
}

fn precedence(op: char) -> u8 {
    match op {
        '^' => 3,
        _ => 2,
    }
}

/// Map superscript digit runs to `^` notation so the tokenizer only
/// has one exponent form to deal with.
fn fold_superscripts(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() + 4);
    let mut in_super = false;
    for ch in expr.chars() {
        let digit = match ch {
            '\u{2070}' => Some('0'),
            '\u{00b9}' => Some('1'),
            '\u{00b2}' => Some('2'),
            '\u{00b3}' => Some('3'),
            '\u{2074}' => Some('4'),
            '\u{2075}' => Some('5'),
            '\u{2076}' => Some('6'),
            '\u{2077}' => Some('7'),
            '\u{2078}' => Some('8'),
            '\u{2079}' => Some('9'),
            '\u{207b}' => Some('-'),
            _ => None,
        };
        match digit {
            Some(d) => {
                if !in_super {
                    out.push('^');
                    in_super = true;
                }
                out.push(d);
            }
            None => {
                in_super = false;
                out.push(ch);
            }
        }
    }
    out
}

fn tokenize(expr: &str) -> Result<Vec<Token>, LangError> {
    let folded = fold_superscripts(expr);
    let mut tokens = Vec::new();
    let mut chars = folded.chars().peekable();
    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' => {
                chars.next();
                // A space between two names is multiplication.
                if let (Some(Token::Name(_)), Some(&next)) = (tokens.last(), chars.peek()) {
                    if next != '/' && next != '^' && next != '\u{00b7}' && next != '*' && next != ' '
                    {
                        tokens.push(Token::Op('\u{00b7}'));
                    }
                }
            }
            '\u{00b7}' | '*' => {
                chars.next();
                tokens.push(Token::Op('\u{00b7}'));
            }
            '/' => {
                chars.next();
                tokens.push(Token::Op('/'));
            }
            '^' => {
                chars.next();
                tokens.push(Token::Op('^'));
                let mut negative = false;
                if chars.peek() == Some(&'-') {
                    negative = true;
                    chars.next();
                }
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n: i8 = digits
                    .parse()
                    .map_err(|_| LangError::with_detail(ErrorCode::BadUnitName, expr))?;
                tokens.push(Token::Int(if negative { -n } else { n }));
            }
            _ => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ' '
                        || c == '/'
                        || c == '^'
                        || c == '*'
                        || c == '\u{00b7}'
                    {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(LangError::with_detail(ErrorCode::BadUnitName, expr));
                }
                tokens.push(Token::Name(name));
            }
        }
    }
    Ok(tokens)
}

fn apply(op: char, stack: &mut Vec<Operand>, expr: &str) -> Result<(), LangError> {
    let bad = || LangError::with_detail(ErrorCode::BadUnitName, expr);
    match op {
        '^' => {
            let exp = match stack.pop().ok_or_else(bad)? {
                Operand::Exp(n) => n,
                Operand::Unit(_) => return Err(bad()),
            };
            let unit = match stack.pop().ok_or_else(bad)? {
                Operand::Unit(u) => u,
                Operand::Exp(_) => return Err(bad()),
            };
            let factor = unit.factor.pow_int(&num_bigint::BigInt::from(exp))?;
            stack.push(Operand::Unit(UnitDescriptor {
                name: format!("{}^{}", unit.name, exp),
                factor,
                gauge: Rational::zero(),
                dims: unit.dims.scale(exp),
            }));
        }
        '/' => {
            let b = pop_unit(stack, expr)?;
            let a = pop_unit(stack, expr)?;
            stack.push(Operand::Unit(UnitDescriptor {
                name: format!("{}/{}", a.name, b.name),
                factor: a.factor.checked_div(&b.factor)?,
                gauge: Rational::zero(),
                dims: a.dims.sub(&b.dims),
            }));
        }
        _ => {
            let b = pop_unit(stack, expr)?;
            let a = pop_unit(stack, expr)?;
            stack.push(Operand::Unit(UnitDescriptor {
                name: format!("{}\u{00b7}{}", a.name, b.name),
                factor: &a.factor * &b.factor,
                gauge: Rational::zero(),
                dims: a.dims.add(&b.dims),
            }));
        }
    }
    Ok(())
}

fn pop_unit(stack: &mut Vec<Operand>, expr: &str) -> Result<UnitDescriptor, LangError> {
    match stack.pop() {
        Some(Operand::Unit(u)) => Ok(u),
        _ => Err(LangError::with_detail(ErrorCode::BadUnitName, expr)),
    }
}

/// Compile a compound unit expression into one descriptor.
/// Gauges do not survive composition: a gauged unit only keeps its
/// offset when it stands alone.
pub fn compile(expr: &str) -> Result<UnitDescriptor, LangError> {
    let tokens = tokenize(expr)?;
    let mut output: Vec<Operand> = Vec::new();
    let mut ops: Vec<char> = Vec::new();
    for token in tokens {
        match token {
            Token::Name(name) => {
                let unit = lookup_single(&name)?
                    .ok_or_else(|| LangError::with_detail(ErrorCode::BadUnitName, &name))?;
                output.push(Operand::Unit(unit));
            }
            Token::Int(n) => output.push(Operand::Exp(n)),
            Token::Op(op) => {
                while let Some(&top) = ops.last() {
                    // `^` binds right-to-left; equal precedence does not pop.
                    if precedence(top) > precedence(op)
                        || (precedence(top) == precedence(op) && op != '^')
                    {
                        ops.pop();
                        apply(top, &mut output, expr)?;
                    } else {
                        break;
                    }
                }
                ops.push(op);
            }
        }
    }
    while let Some(op) = ops.pop() {
        apply(op, &mut output, expr)?;
    }
    let mut result = match output.pop() {
        Some(Operand::Unit(u)) => u,
        _ => return Err(LangError::with_detail(ErrorCode::BadUnitName, expr)),
    };
    if !output.is_empty() {
        return Err(LangError::with_detail(ErrorCode::BadUnitName, expr));
    }
    // The display name keeps what the author typed.
    result.name = expr.to_string();
    Ok(result)
}
