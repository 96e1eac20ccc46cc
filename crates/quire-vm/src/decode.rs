//! Wire-string decoder: split the program text on the reserved
//! separator and translate each token into an instruction. Aggregate
//! markers consume their trailing counts from the token stream; they
//! are explicit in the wire format, never inferred.

use std::str::FromStr;

use num_bigint::BigInt;
use quire_builtins::{Complex, ErrorCode, LangError, Rational};
use quire_parser::wire;

use crate::instr::Instr;

fn bad(token: &str) -> LangError {
    LangError::with_detail(ErrorCode::BadProgram, token)
}

fn parse_count(tokens: &[&str], pos: &mut usize) -> Result<usize, LangError> {
    let token = tokens
        .get(*pos)
        .ok_or_else(|| bad("missing count"))?;
    *pos += 1;
    token.parse::<usize>().map_err(|_| bad(token))
}

fn parse_rational(body: &str) -> Result<Rational, LangError> {
    let (n, d) = body.split_once('/').ok_or_else(|| bad(body))?;
    let numer: BigInt = n.parse().map_err(|_| bad(body))?;
    let denom: BigInt = d.parse().map_err(|_| bad(body))?;
    Rational::new(numer, denom)
}

fn parse_complex(body: &str) -> Result<Complex, LangError> {
    let parts: Vec<&str> = body.split(',').collect();
    let [re_num, re_den, im_num, im_den] = parts[..] else {
        return Err(bad(body));
    };
    let re_num: BigInt = re_num.parse().map_err(|_| bad(body))?;
    let re_den: BigInt = re_den.parse().map_err(|_| bad(body))?;
    let im_num: BigInt = im_num.parse().map_err(|_| bad(body))?;
    let im_den: BigInt = im_den.parse().map_err(|_| bad(body))?;
    Ok(Complex::new(
        Rational::new(re_num, re_den)?,
        Rational::new(im_num, im_den)?,
    ))
}

fn is_binary_symbol(token: &str) -> bool {
    matches!(
        token,
        "+" | "-" | "\u{00d7}" | "\u{00b7}" | "/" | "%" | "^" | "&" | ".." | "and" | "or"
    )
}

fn is_unary_symbol(token: &str) -> bool {
    matches!(token, "~" | "not" | "!" | "\u{221a}")
}

pub fn decode(program: &str) -> Result<Vec<Instr>, LangError> {
    let tokens: Vec<&str> = program
        .split(wire::RPN_SEP)
        .filter(|t| !t.is_empty())
        .collect();
    let mut out = Vec::with_capacity(tokens.len());
    let mut pos = 0;
    while pos < tokens.len() {
        let token = tokens[pos];
        pos += 1;
        let mut chars = token.chars();
        match chars.next() {
            Some(wire::RATIONAL_MARK) => {
                out.push(Instr::PushRational(parse_rational(chars.as_str())?));
            }
            Some(wire::COMPLEX_MARK) => {
                out.push(Instr::PushComplex(parse_complex(chars.as_str())?));
            }
            Some(wire::VARIABLE_MARK) => {
                out.push(Instr::LoadVar(chars.as_str().to_string()));
            }
            Some('"') => {
                out.push(Instr::PushStr(token.trim_matches('"').to_string()));
            }
            Some('`') => {
                if let Some(body) = token
                    .strip_prefix("``")
                    .and_then(|t| t.strip_suffix("``"))
                {
                    out.push(Instr::PushTable(body.to_string()));
                } else {
                    out.push(Instr::PushRichText(token.trim_matches('`').to_string()));
                }
            }
            _ => match token {
                "true" => out.push(Instr::PushBool(true)),
                "false" => out.push(Instr::PushBool(false)),
                "matrix" => {
                    let rows = parse_count(&tokens, &mut pos)?;
                    let cols = parse_count(&tokens, &mut pos)?;
                    out.push(Instr::BuildMatrix(rows, cols));
                }
                "cases" => {
                    let n = parse_count(&tokens, &mut pos)?;
                    let mut branches = Vec::with_capacity(n);
                    for _ in 0..n {
                        let slice = tokens
                            .get(pos)
                            .ok_or_else(|| bad("missing cases branch"))?;
                        pos += 1;
                        branches.push(wire::unembed_branch(slice));
                    }
                    out.push(Instr::Cases(branches));
                }
                "[]" => {
                    let argc = parse_count(&tokens, &mut pos)?;
                    out.push(Instr::Index(argc));
                }
                "applyUnit" => {
                    let name = tokens
                        .get(pos)
                        .ok_or_else(|| bad("missing unit name"))?;
                    pos += 1;
                    out.push(Instr::ApplyUnit((*name).to_string()));
                }
                "function" => {
                    let name = tokens
                        .get(pos)
                        .ok_or_else(|| bad("missing function name"))?;
                    pos += 1;
                    let argc = parse_count(&tokens, &mut pos)?;
                    out.push(Instr::Call((*name).to_string(), argc));
                }
                t if is_unary_symbol(t) => out.push(Instr::Unary(t.to_string())),
                t if quire_runtime::is_comparison_op(t) => {
                    out.push(Instr::Compare(t.to_string()))
                }
                t if is_binary_symbol(t) => out.push(Instr::Binary(t.to_string())),
                // A bare recognized built-in name is a one-argument call.
                t if quire_parser::is_recognized_builtin(t)
                    || quire_builtins::find_builtin(t).is_some() =>
                {
                    out.push(Instr::Call(t.to_string(), 1));
                }
                other => return Err(bad(other)),
            },
        }
    }
    Ok(out)
}

/// Convenience used by tests and hosts: decode, or explain which
/// token failed.
pub fn decode_or_message(program: &str) -> Result<Vec<Instr>, String> {
    decode(program).map_err(|e| e.message())
}

impl FromStr for Instr {
    type Err = LangError;

    /// Decode a single stand-alone instruction token.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let instrs = decode(s)?;
        instrs
            .into_iter()
            .next()
            .ok_or_else(|| bad("empty instruction"))
    }
}
