//! The RPN stack machine. One pass over the instruction vector drives
//! an explicit value stack; any error stops the evaluation at the
//! point of violation and propagates unchanged.

use std::collections::HashMap;

use quire_builtins::{
    ErrorCode, LangError, Matrix, Quantity, Rational, UnitDescriptor, Value,
};
use quire_runtime::{binary_op, call_builtin, compare_chained, unary_op};

use crate::decode::decode;
use crate::instr::Instr;
use crate::user_functions;

/// The caller-owned variable environment. The engine reads it during
/// one evaluation and retains nothing afterwards.
pub type Environment = HashMap<String, Value>;

/// Evaluate a program text against an environment.
pub fn evaluate(program: &str, env: &Environment, unit_aware: bool) -> Result<Value, LangError> {
    let instrs = decode(program)?;
    run(&instrs, env, unit_aware, 0)
}

fn underflow(context: &str) -> LangError {
    LangError::with_detail(ErrorCode::StackUnderflow, context)
}

pub(crate) fn run(
    instrs: &[Instr],
    env: &Environment,
    unit_aware: bool,
    depth: usize,
) -> Result<Value, LangError> {
    let mut stack: Vec<Value> = Vec::new();
    // Previous comparison's right-hand operand, for chained relations.
    let mut chain_rhs: Option<Value> = None;

    for instr in instrs {
        match instr {
            Instr::PushRational(r) => stack.push(Value::Num(r.clone())),
            Instr::PushComplex(c) => stack.push(Value::from(c.clone())),
            Instr::PushBool(b) => stack.push(Value::Bool(*b)),
            Instr::PushStr(s) => stack.push(Value::Str(s.clone())),
            Instr::PushRichText(s) => stack.push(Value::RichText(s.clone())),
            Instr::PushTable(text) => {
                stack.push(Value::Table(quire_builtins::Table::from_text(text)?))
            }
            Instr::LoadVar(name) => {
                stack.push(resolve_variable(name, env, unit_aware)?);
            }
            Instr::Unary(op) => {
                let a = stack.pop().ok_or_else(|| underflow(op))?;
                stack.push(unary_op(op, &a)?);
                chain_rhs = None;
            }
            Instr::Binary(op) => {
                let b = stack.pop().ok_or_else(|| underflow(op))?;
                let a = stack.pop().ok_or_else(|| underflow(op))?;
                stack.push(binary_op(op, &a, &b)?);
                chain_rhs = None;
            }
            Instr::Compare(op) => {
                let b = stack.pop().ok_or_else(|| underflow(op))?;
                let a = stack.pop().ok_or_else(|| underflow(op))?;
                let (result, rhs) = compare_chained(op, &a, &b, chain_rhs.as_ref())?;
                stack.push(result);
                chain_rhs = Some(rhs);
            }
            Instr::Call(name, argc) => {
                if stack.len() < *argc {
                    return Err(underflow(name));
                }
                let args = stack.split_off(stack.len() - argc);
                let result = match env.get(name.as_str()) {
                    Some(Value::Func(func)) => {
                        user_functions::call(func, &args, env, unit_aware, depth + 1)?
                    }
                    _ => call_builtin(name, &args)?,
                };
                stack.push(result);
                chain_rhs = None;
            }
            Instr::BuildMatrix(rows, cols) => {
                let count = rows * cols;
                if stack.len() < count {
                    return Err(underflow("matrix"));
                }
                let data = stack.split_off(stack.len() - count);
                stack.push(build_matrix(data, *rows, *cols)?);
            }
            Instr::Cases(branches) => {
                if stack.len() < branches.len() {
                    return Err(underflow("cases"));
                }
                let conds = stack.split_off(stack.len() - branches.len());
                let mut selected = None;
                for (cond, branch) in conds.iter().zip(branches.iter()) {
                    if cond.as_bool()? {
                        selected = Some(branch);
                        break;
                    }
                }
                match selected {
                    // Only the selected branch is ever evaluated, so
                    // an error in an untaken branch never surfaces.
                    Some(branch) => {
                        let value = evaluate_nested(branch, env, unit_aware, depth)?;
                        stack.push(value);
                    }
                    None => {
                        return Err(LangError::with_detail(
                            ErrorCode::BadProgram,
                            "no case condition was true",
                        ))
                    }
                }
            }
            Instr::Index(argc) => {
                if stack.len() < argc + 1 {
                    return Err(underflow("[]"));
                }
                let args = stack.split_off(stack.len() - argc);
                let base = stack.pop().ok_or_else(|| underflow("[]"))?;
                stack.push(index_value(&base, &args, unit_aware)?);
            }
            Instr::ApplyUnit(name) => {
                if unit_aware {
                    let value = stack.pop().ok_or_else(|| underflow("applyUnit"))?;
                    let unit = quire_units::resolve(name)?;
                    stack.push(apply_unit(value, unit)?);
                }
                // In a non-unit-aware run units are ignored entirely.
            }
        }
    }

    let result = stack.pop().ok_or_else(|| underflow("end of program"))?;
    if !stack.is_empty() {
        return Err(LangError::with_detail(
            ErrorCode::BadProgram,
            "operands left on the stack",
        ));
    }
    Ok(result)
}

/// Evaluate an embedded branch program (cases) in the same
/// environment and at the same depth.
fn evaluate_nested(
    program: &str,
    env: &Environment,
    unit_aware: bool,
    depth: usize,
) -> Result<Value, LangError> {
    let instrs = decode(program)?;
    run(&instrs, env, unit_aware, depth)
}

/// Resolve a variable. Unit-aware runs hand quantities through in
/// base units; plain runs convert back to the value the author wrote.
/// The named constants lose to an environment entry of the same name.
fn resolve_variable(
    name: &str,
    env: &Environment,
    unit_aware: bool,
) -> Result<Value, LangError> {
    if let Some(value) = env.get(name) {
        if !unit_aware {
            if let Value::Quantity(q) = value {
                return strip_unit(q);
            }
        }
        return Ok(value.clone());
    }
    match name {
        "\u{03c0}" | "pi" => Rational::from_f64(std::f64::consts::PI).map(Value::Num),
        "e" => Rational::from_f64(std::f64::consts::E).map(Value::Num),
        "i" => Ok(Value::from(quire_builtins::Complex::i())),
        _ => Err(LangError::with_detail(ErrorCode::UndefinedVariable, name)),
    }
}

/// Convert a quantity's base-unit payload back to its display unit.
fn strip_unit(q: &Quantity) -> Result<Value, LangError> {
    map_scalars(&q.value, &|r| q.unit.from_base(r))
}

fn map_scalars(
    value: &Value,
    f: &dyn Fn(&Rational) -> Result<Rational, LangError>,
) -> Result<Value, LangError> {
    match value {
        Value::Num(r) => Ok(Value::Num(f(r)?)),
        Value::Matrix(m) => Ok(Value::Matrix(m.map(|v| map_scalars(v, f))?)),
        Value::Map(m) => Ok(Value::Map(m.map_values(|v| map_scalars(v, f))?)),
        other => Ok(other.clone()),
    }
}

/// Attach a unit to a plain value (converting it to base units), or
/// convert an existing quantity to a compatible display unit.
fn apply_unit(value: Value, unit: UnitDescriptor) -> Result<Value, LangError> {
    match value {
        Value::Quantity(q) => {
            // Result-unit conversion: the dimensions must agree.
            if !q.unit.dims.compatible(&unit.dims) {
                return Err(LangError::with_detail(ErrorCode::UnitResult, unit.name));
            }
            Ok(Value::Quantity(Box::new(Quantity {
                value: q.value,
                unit,
            })))
        }
        plain => {
            let in_base = map_scalars(&plain, &|r| Ok(unit.to_base(r)))?;
            Ok(Value::Quantity(Box::new(Quantity {
                value: in_base,
                unit,
            })))
        }
    }
}

/// Build a matrix from its elements. A single-element bracket group
/// holding a range expands into a row vector (range-from-bracket).
fn build_matrix(data: Vec<Value>, rows: usize, cols: usize) -> Result<Value, LangError> {
    if rows == 1 && cols == 1 {
        if let Some(Value::Range(r)) = data.first() {
            let values: Vec<Value> = r.values().into_iter().map(Value::Num).collect();
            return Ok(Value::Matrix(Matrix::row_vector(values)));
        }
    }
    // Rows of nested vectors splice into a wider matrix; plain
    // scalars fill the declared shape.
    Ok(Value::Matrix(Matrix::new(data, rows, cols)?))
}

/// The accessor `base[args…]`, 1-based.
fn index_value(base: &Value, args: &[Value], unit_aware: bool) -> Result<Value, LangError> {
    match base.payload() {
        Value::Matrix(m) => index_matrix(m, args, base),
        Value::Range(r) => {
            let values: Vec<Value> = r.values().into_iter().map(Value::Num).collect();
            index_matrix(&Matrix::row_vector(values), args, base)
        }
        Value::Str(s) => index_string(s, args),
        Value::Map(map) => match args {
            [Value::Str(key)] => map
                .get(key)
                .cloned()
                .ok_or_else(|| LangError::with_detail(ErrorCode::BadIndex, key)),
            _ => Err(LangError::with_detail(
                ErrorCode::BadIndex,
                "maps are indexed by key string",
            )),
        },
        Value::Table(table) => index_table(table, args, unit_aware),
        _ => Err(LangError::with_detail(
            ErrorCode::BadType,
            format!("cannot index a {}", base.shape()),
        )),
    }
}

fn positive_index(v: &Value, len: usize) -> Result<usize, LangError> {
    let n = usize::try_from(v)?;
    if n == 0 || n > len {
        return Err(LangError::with_detail(
            ErrorCode::BadIndex,
            format!("{n} of {len}"),
        ));
    }
    Ok(n - 1)
}

fn index_matrix(m: &Matrix, args: &[Value], original: &Value) -> Result<Value, LangError> {
    let rewrap = |v: Value| -> Value {
        match original {
            Value::Quantity(q) => Value::Quantity(Box::new(Quantity {
                value: v,
                unit: q.unit.clone(),
            })),
            _ => v,
        }
    };
    match args {
        [Value::Range(r)] if m.is_vector() => {
            let mut out = Vec::new();
            for idx in r.values() {
                let i = positive_index(&Value::Num(idx), m.len())?;
                out.push(m.data[i].clone());
            }
            Ok(rewrap(Value::Matrix(if m.is_column_vector() {
                Matrix::column_vector(out)
            } else {
                Matrix::row_vector(out)
            })))
        }
        [single] if m.is_vector() => {
            let i = positive_index(single, m.len())?;
            Ok(rewrap(m.data[i].clone()))
        }
        [single] => {
            // One index into a full matrix selects a row.
            let r = positive_index(single, m.rows)?;
            let mut out = Vec::with_capacity(m.cols);
            for c in 0..m.cols {
                out.push(m.get(r, c)?.clone());
            }
            Ok(rewrap(Value::Matrix(Matrix::row_vector(out))))
        }
        [row, col] => {
            let r = positive_index(row, m.rows)?;
            let c = positive_index(col, m.cols)?;
            Ok(rewrap(m.get(r, c)?.clone()))
        }
        _ => Err(LangError::with_detail(
            ErrorCode::BadIndex,
            "a matrix accessor takes one or two arguments",
        )),
    }
}

fn index_string(s: &str, args: &[Value]) -> Result<Value, LangError> {
    let chars: Vec<char> = s.chars().collect();
    match args {
        [Value::Range(r)] => {
            let mut out = String::new();
            for idx in r.values() {
                let i = positive_index(&Value::Num(idx), chars.len())?;
                out.push(chars[i]);
            }
            Ok(Value::Str(out))
        }
        [single] => {
            let i = positive_index(single, chars.len())?;
            Ok(Value::Str(chars[i].to_string()))
        }
        _ => Err(LangError::with_detail(
            ErrorCode::BadIndex,
            "a string accessor takes one argument",
        )),
    }
}

/// Table accessor: a column name yields the column as a vector (with
/// its unit attached in unit-aware mode); a row name plus column name
/// yields one cell; numeric indices address rows.
fn index_table(table: &quire_builtins::Table, args: &[Value], unit_aware: bool) -> Result<Value, LangError> {
    match args {
        [Value::Str(name)] => {
            if let Some(col) = table.column_index(name) {
                let (values, unit_name) = table.column_values(col)?;
                let vector = Value::Matrix(Matrix::column_vector(values));
                if unit_aware && !unit_name.is_empty() {
                    let unit = quire_units::resolve(&unit_name)?;
                    return apply_unit(vector, unit);
                }
                return Ok(vector);
            }
            if let Some(row) = table.row_index(name) {
                let mut out = Vec::with_capacity(table.num_cols());
                for c in 0..table.num_cols() {
                    out.push(table.cell(row, c)?);
                }
                return Ok(Value::Matrix(Matrix::row_vector(out)));
            }
            Err(LangError::with_detail(ErrorCode::BadIndex, name))
        }
        [Value::Str(row_name), Value::Str(col_name)] => {
            let row = table
                .row_index(row_name)
                .ok_or_else(|| LangError::with_detail(ErrorCode::BadIndex, row_name))?;
            let col = table
                .column_index(col_name)
                .ok_or_else(|| LangError::with_detail(ErrorCode::BadIndex, col_name))?;
            let cell = table.cell(row, col)?;
            let unit_name = &table.storage().units[col];
            if unit_aware && !unit_name.is_empty() {
                let unit = quire_units::resolve(unit_name)?;
                return apply_unit(cell, unit);
            }
            Ok(cell)
        }
        [row, Value::Str(col_name)] => {
            let r = positive_index(row, table.num_rows())?;
            let col = table
                .column_index(col_name)
                .ok_or_else(|| LangError::with_detail(ErrorCode::BadIndex, col_name))?;
            table.cell(r, col)
        }
        [row] => {
            let r = positive_index(row, table.num_rows())?;
            let mut out = Vec::with_capacity(table.num_cols());
            for c in 0..table.num_cols() {
                out.push(table.cell(r, c)?);
            }
            Ok(Value::Matrix(Matrix::row_vector(out)))
        }
        _ => Err(LangError::with_detail(
            ErrorCode::BadIndex,
            "a table accessor takes one or two arguments",
        )),
    }
}
