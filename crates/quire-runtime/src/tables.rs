//! Table construction from vectors: the second of the two table
//! lifecycles (the first, delimited text, lives on the Table type
//! itself). `table("w", w, "h", h)` builds a columnar table from
//! alternating heading/vector arguments; quantities contribute their
//! unit name to the column header metadata.

use quire_builtins::{
    Dtype, ErrorCode, LangError, Table, TableStorage, Value,
};
use quire_macros::runtime_builtin;

use crate::unary;

fn column_cells(value: &Value) -> Result<(Vec<String>, Dtype, String), LangError> {
    let (elements, unit) = unary::elements_with_unit(value)?;
    let unit_name = unit.map(|u| u.name).unwrap_or_default();
    let dtype = elements.first().map(|v| v.dtype()).unwrap_or(Dtype::Rational);
    let mut cells = Vec::with_capacity(elements.len());
    for element in &elements {
        match element {
            Value::Num(r) => cells.push(r.to_string()),
            Value::Str(s) => cells.push(s.clone()),
            Value::Bool(b) => cells.push(b.to_string()),
            other => {
                return Err(LangError::with_detail(
                    ErrorCode::BadType,
                    format!("a table column cannot hold a {}", other.shape()),
                ))
            }
        }
    }
    Ok((cells, dtype, unit_name))
}

#[runtime_builtin(name = "table")]
fn table_builtin(args: Vec<Value>) -> Result<Value, LangError> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(LangError::with_detail(
            ErrorCode::WrongArity,
            "table needs heading/column pairs",
        ));
    }
    let mut headings = Vec::with_capacity(args.len() / 2);
    let mut columns = Vec::with_capacity(args.len() / 2);
    let mut dtypes = Vec::with_capacity(args.len() / 2);
    let mut units = Vec::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        let heading = match &pair[0] {
            Value::Str(s) => s.clone(),
            other => {
                return Err(LangError::with_detail(
                    ErrorCode::BadType,
                    format!("a column heading must be a string, found {}", other.shape()),
                ))
            }
        };
        let (cells, dtype, unit) = column_cells(&pair[1])?;
        headings.push(heading);
        columns.push(cells);
        dtypes.push(dtype);
        units.push(unit);
    }
    let table = Table::new(TableStorage {
        headings,
        columns,
        dtypes,
        units,
        row_names: None,
    })?;
    Ok(Value::Table(table))
}
