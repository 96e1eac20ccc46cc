//! The user-defined-function executor: a small interpreter over the
//! flat statement list. A control stack of frames tracks open
//! if/while/for blocks; block openers carry the index of their
//! matching `end`, and control flow is statement-index mutation.

use quire_builtins::{
    ErrorCode, LangError, Statement, StatementKind, UserFunction, Value, MAX_RECURSION_DEPTH,
};

use crate::decode::decode;
use crate::vm::{run, Environment};

enum Frame {
    /// A taken if/else-if/else branch; popped at the chain's end.
    Branch { end: usize },
    While { start: usize, end: usize },
    For {
        start: usize,
        end: usize,
        var: String,
        items: Vec<Value>,
        cursor: usize,
    },
}

impl Frame {
    fn end(&self) -> usize {
        match self {
            Frame::Branch { end } => *end,
            Frame::While { end, .. } => *end,
            Frame::For { end, .. } => *end,
        }
    }

    fn is_loop(&self) -> bool {
        matches!(self, Frame::While { .. } | Frame::For { .. })
    }
}

/// Run a user function against its arguments. The local environment
/// starts as a copy of the caller's (functions and globals stay
/// visible), with parameters bound on top.
pub fn call(
    func: &UserFunction,
    args: &[Value],
    outer_env: &Environment,
    unit_aware: bool,
    depth: usize,
) -> Result<Value, LangError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(LangError::with_detail(ErrorCode::RecursionDepth, &func.name));
    }
    if args.len() != func.params.len() {
        return Err(LangError::with_detail(ErrorCode::WrongArity, &func.name));
    }
    log::debug!("calling user function {} with {} args", func.name, args.len());

    let mut env = outer_env.clone();
    for (param, arg) in func.params.iter().zip(args.iter()) {
        env.insert(param.clone(), arg.clone());
    }
    // The function can call itself by name.
    env.insert(func.name.clone(), Value::Func(Box::new(func.clone())));

    execute(func, &mut env, unit_aware, depth)
}

fn eval_stmt(
    stmt: &Statement,
    env: &Environment,
    unit_aware: bool,
    depth: usize,
) -> Result<Value, LangError> {
    let rpn = stmt
        .rpn
        .as_ref()
        .ok_or_else(|| LangError::with_detail(ErrorCode::BadProgram, "statement without code"))?;
    let instrs = decode(rpn)?;
    run(&instrs, env, unit_aware, depth)
}

fn execute(
    func: &UserFunction,
    env: &mut Environment,
    unit_aware: bool,
    depth: usize,
) -> Result<Value, LangError> {
    let stmts = &func.statements;
    let mut frames: Vec<Frame> = Vec::new();
    let mut i = 0usize;

    while i < stmts.len() {
        let stmt = &stmts[i];
        match stmt.kind {
            StatementKind::Plain => {
                let value = eval_stmt(stmt, env, unit_aware, depth)?;
                assign(env, &stmt.targets, value)?;
                i += 1;
            }
            StatementKind::If => {
                i = enter_if_chain(stmts, i, env, unit_aware, depth, &mut frames)?;
            }
            StatementKind::ElseIf | StatementKind::Else => {
                // Reached by falling out of a taken branch: skip the
                // rest of the chain.
                i = stmt.end_index;
            }
            StatementKind::While => {
                let cond = eval_stmt(stmt, env, unit_aware, depth)?.as_bool()?;
                if cond {
                    frames.push(Frame::While {
                        start: i,
                        end: stmt.end_index,
                    });
                    i += 1;
                } else {
                    i = stmt.end_index;
                }
            }
            StatementKind::For => {
                let source = eval_stmt(stmt, env, unit_aware, depth)?;
                let items = iteration_items(&source)?;
                let var = stmt
                    .targets
                    .first()
                    .cloned()
                    .ok_or_else(|| {
                        LangError::with_detail(ErrorCode::BadProgram, "for without a loop variable")
                    })?;
                match items.first() {
                    Some(first) => {
                        env.insert(var.clone(), first.clone());
                        frames.push(Frame::For {
                            start: i,
                            end: stmt.end_index,
                            var,
                            items,
                            cursor: 0,
                        });
                        i += 1;
                    }
                    None => i = stmt.end_index,
                }
            }
            StatementKind::Break => {
                // Pop frames up to the nearest enclosing loop, then
                // jump past its end.
                let loop_pos = frames.iter().rposition(Frame::is_loop).ok_or_else(|| {
                    LangError::with_detail(ErrorCode::BadProgram, "'break' outside of a loop")
                })?;
                let end = frames[loop_pos].end();
                frames.truncate(loop_pos);
                i = end + 1;
            }
            StatementKind::Return => {
                return match &stmt.rpn {
                    Some(_) => eval_stmt(stmt, env, unit_aware, depth),
                    None => Ok(Value::Tuple(Vec::new())),
                };
            }
            StatementKind::Echo => {
                let value = eval_stmt(stmt, env, unit_aware, depth)?;
                // The host's print hook.
                log::info!("{}: {}", func.name, value);
                i += 1;
            }
            StatementKind::Raise => {
                let value = eval_stmt(stmt, env, unit_aware, depth)?;
                return Err(LangError::with_detail(ErrorCode::Raised, value.to_string()));
            }
            StatementKind::End => {
                i = close_block(stmts, i, env, unit_aware, depth, &mut frames)?;
            }
        }
    }
    // Falling off the end returns nothing.
    Ok(Value::Tuple(Vec::new()))
}

/// Walk an if/else-if/else chain: evaluate conditions in order, enter
/// the first true branch, or jump past the chain.
fn enter_if_chain(
    stmts: &[Statement],
    start: usize,
    env: &Environment,
    unit_aware: bool,
    depth: usize,
    frames: &mut Vec<Frame>,
) -> Result<usize, LangError> {
    let chain_end = stmts[start].end_index;
    let mut j = start;
    loop {
        match stmts[j].kind {
            StatementKind::If | StatementKind::ElseIf => {
                if eval_stmt(&stmts[j], env, unit_aware, depth)?.as_bool()? {
                    frames.push(Frame::Branch { end: chain_end });
                    return Ok(j + 1);
                }
                j = next_chain_link(stmts, j, chain_end);
            }
            StatementKind::Else => {
                frames.push(Frame::Branch { end: chain_end });
                return Ok(j + 1);
            }
            _ => return Ok(chain_end),
        }
        if j >= chain_end {
            return Ok(chain_end);
        }
    }
}

/// The next else-if/else link of a chain, or the chain's end.
fn next_chain_link(stmts: &[Statement], from: usize, chain_end: usize) -> usize {
    let mut j = from + 1;
    while j < chain_end {
        if stmts[j].end_index == chain_end
            && matches!(stmts[j].kind, StatementKind::ElseIf | StatementKind::Else)
        {
            return j;
        }
        j += 1;
    }
    chain_end
}

/// `end` statement: loops re-evaluate their condition or advance
/// their cursor and jump back; branches simply pop.
fn close_block(
    stmts: &[Statement],
    i: usize,
    env: &mut Environment,
    unit_aware: bool,
    depth: usize,
    frames: &mut Vec<Frame>,
) -> Result<usize, LangError> {
    let owns_this_end = frames.last().map(|f| f.end() == i).unwrap_or(false);
    if !owns_this_end {
        // An `end` jumped to without an open frame (untaken branch or
        // an empty loop).
        return Ok(i + 1);
    }
    match frames.pop() {
        Some(Frame::Branch { .. }) => Ok(i + 1),
        Some(Frame::While { start, end }) => {
            let cond = eval_stmt(&stmts[start], env, unit_aware, depth)?.as_bool()?;
            if cond {
                frames.push(Frame::While { start, end });
                Ok(start + 1)
            } else {
                Ok(i + 1)
            }
        }
        Some(Frame::For {
            start,
            end,
            var,
            items,
            cursor,
        }) => {
            let cursor = cursor + 1;
            if cursor < items.len() {
                env.insert(var.clone(), items[cursor].clone());
                frames.push(Frame::For {
                    start,
                    end,
                    var,
                    items,
                    cursor,
                });
                Ok(start + 1)
            } else {
                Ok(i + 1)
            }
        }
        None => Ok(i + 1),
    }
}

fn assign(env: &mut Environment, targets: &[String], value: Value) -> Result<(), LangError> {
    match targets {
        [] => Ok(()),
        [single] => {
            env.insert(single.clone(), value);
            Ok(())
        }
        several => {
            let items = match value {
                Value::Tuple(items) => items,
                Value::Matrix(m) if m.is_vector() => m.data,
                other => {
                    return Err(LangError::with_detail(
                        ErrorCode::BadType,
                        format!("cannot unpack a {} into {} names", other.shape(), several.len()),
                    ))
                }
            };
            if items.len() != several.len() {
                return Err(LangError::with_detail(
                    ErrorCode::MismatchedElementCount,
                    format!("{} values into {} names", items.len(), several.len()),
                ));
            }
            for (name, item) in several.iter().zip(items) {
                env.insert(name.clone(), item);
            }
            Ok(())
        }
    }
}

/// What a `for` loop iterates: ranges, vectors, matrices (by
/// element), tables (by row), and text (by character, the observable
/// equivalent of the original's surrogate-pair stride).
fn iteration_items(source: &Value) -> Result<Vec<Value>, LangError> {
    match source.payload() {
        Value::Range(r) => Ok(r.values().into_iter().map(Value::Num).collect()),
        Value::Matrix(m) => Ok(m.data.clone()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::Str(c.to_string())).collect()),
        Value::Map(m) => Ok(m.values().cloned().collect()),
        Value::Table(t) => {
            let mut rows = Vec::with_capacity(t.num_rows());
            for r in 0..t.num_rows() {
                let mut row = Vec::with_capacity(t.num_cols());
                for c in 0..t.num_cols() {
                    row.push(t.cell(r, c)?);
                }
                rows.push(Value::Matrix(quire_builtins::Matrix::row_vector(row)));
            }
            Ok(rows)
        }
        other => Err(LangError::with_detail(
            ErrorCode::NotIterable,
            other.shape().to_string(),
        )),
    }
}
