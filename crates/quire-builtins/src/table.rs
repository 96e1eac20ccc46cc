//! Columnar tables. A table is built once, from delimited text or
//! from vectors, and its storage is shared behind an `Arc`.
//! Column access hands out parsed values; append clones the storage
//! first (copy-on-write), so operands holding the earlier table keep
//! seeing the data they captured.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, LangError};
use crate::rational::Rational;
use crate::value::{Dtype, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStorage {
    pub headings: Vec<String>,
    /// Raw text cells, one Vec per column, all the same length.
    pub columns: Vec<Vec<String>>,
    pub dtypes: Vec<Dtype>,
    /// Per-column unit names; empty string means no unit.
    pub units: Vec<String>,
    /// Set when the first column is a row-name index.
    pub row_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    storage: Arc<TableStorage>,
}

impl Table {
    pub fn new(storage: TableStorage) -> Result<Self, LangError> {
        let rows = storage.columns.first().map(|c| c.len()).unwrap_or(0);
        if storage.columns.iter().any(|c| c.len() != rows)
            || storage.columns.len() != storage.headings.len()
            || storage.dtypes.len() != storage.headings.len()
            || storage.units.len() != storage.headings.len()
        {
            return Err(LangError::with_detail(
                ErrorCode::MismatchedElementCount,
                "ragged table columns",
            ));
        }
        Ok(Table {
            storage: Arc::new(storage),
        })
    }

    /// Build from delimited text: the first line is headings, an
    /// optional second line gives per-column unit names (recognized
    /// when none of its non-empty cells parse as numbers), remaining
    /// lines are data rows. Cells split on tab or comma.
    pub fn from_text(text: &str) -> Result<Self, LangError> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(split_cells)
            .collect::<Vec<_>>();
        if lines.is_empty() {
            return Err(LangError::with_detail(ErrorCode::BadLiteral, "empty table"));
        }
        let headings = lines.remove(0);
        let ncols = headings.len();
        let units = if let Some(first) = lines.first() {
            let unit_row = !first.is_empty()
                && first
                    .iter()
                    .all(|c| c.is_empty() || Rational::from_str(c).is_err());
            if unit_row && lines.len() > 1 {
                let mut row = lines.remove(0);
                row.resize(ncols, String::new());
                row
            } else {
                vec![String::new(); ncols]
            }
        } else {
            vec![String::new(); ncols]
        };

        let mut columns: Vec<Vec<String>> = vec![Vec::with_capacity(lines.len()); ncols];
        for mut row in lines {
            row.resize(ncols, String::new());
            for (col, cell) in columns.iter_mut().zip(row) {
                col.push(cell);
            }
        }
        let dtypes = columns.iter().map(|col| infer_column_dtype(col)).collect::<Vec<_>>();

        // A leading non-numeric, unit-less column is a row-name index.
        let row_names = match dtypes.first() {
            Some(Dtype::String) if units.first().map(|u| u.is_empty()).unwrap_or(true) => {
                Some(columns[0].clone())
            }
            _ => None,
        };

        Table::new(TableStorage {
            headings,
            columns,
            dtypes,
            units,
            row_names,
        })
    }

    pub fn storage(&self) -> &TableStorage {
        &self.storage
    }

    pub fn num_rows(&self) -> usize {
        self.storage.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn num_cols(&self) -> usize {
        self.storage.headings.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.storage.headings.iter().position(|h| h == name)
    }

    pub fn row_index(&self, name: &str) -> Option<usize> {
        self.storage
            .row_names
            .as_ref()
            .and_then(|names| names.iter().position(|n| n == name))
    }

    /// Parse one column's cells into values of the column dtype,
    /// returned as a column vector. The column's unit name rides along.
    pub fn column_values(&self, index: usize) -> Result<(Vec<Value>, String), LangError> {
        let column = self
            .storage
            .columns
            .get(index)
            .ok_or_else(|| LangError::with_detail(ErrorCode::BadIndex, format!("column {index}")))?;
        let dtype = self.storage.dtypes[index];
        let mut out = Vec::with_capacity(column.len());
        for cell in column {
            out.push(parse_cell(cell, dtype)?);
        }
        Ok((out, self.storage.units[index].clone()))
    }

    pub fn cell(&self, row: usize, col: usize) -> Result<Value, LangError> {
        let column = self
            .storage
            .columns
            .get(col)
            .ok_or_else(|| LangError::with_detail(ErrorCode::BadIndex, format!("column {col}")))?;
        let cell = column
            .get(row)
            .ok_or_else(|| LangError::with_detail(ErrorCode::BadIndex, format!("row {row}")))?;
        parse_cell(cell, self.storage.dtypes[col])
    }

    /// Append a column. Clones the shared storage first, so any other
    /// operand holding this table is unaffected.
    pub fn with_column(
        &self,
        heading: String,
        cells: Vec<String>,
        dtype: Dtype,
        unit: String,
    ) -> Result<Table, LangError> {
        if cells.len() != self.num_rows() {
            return Err(LangError::with_detail(
                ErrorCode::MismatchedElementCount,
                format!("{} cells in a {}-row table", cells.len(), self.num_rows()),
            ));
        }
        let mut table = self.clone();
        let storage = Arc::make_mut(&mut table.storage);
        storage.headings.push(heading);
        storage.columns.push(cells);
        storage.dtypes.push(dtype);
        storage.units.push(unit);
        Ok(table)
    }

    /// True when the two tables share the same storage allocation.
    pub fn shares_storage(&self, other: &Table) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

fn split_cells(line: &str) -> Vec<String> {
    let sep = if line.contains('\t') { '\t' } else { ',' };
    line.split(sep).map(|c| c.trim().to_string()).collect()
}

fn infer_column_dtype(cells: &[String]) -> Dtype {
    if cells
        .iter()
        .all(|c| c.is_empty() || Rational::from_str(c).is_ok())
    {
        Dtype::Rational
    } else if cells
        .iter()
        .all(|c| c.is_empty() || c == "true" || c == "false")
    {
        Dtype::Boolean
    } else {
        Dtype::String
    }
}

fn parse_cell(cell: &str, dtype: Dtype) -> Result<Value, LangError> {
    match dtype {
        Dtype::Rational => {
            if cell.is_empty() {
                Ok(Value::Num(Rational::zero()))
            } else {
                Ok(Value::Num(Rational::from_str(cell)?))
            }
        }
        Dtype::Boolean => Ok(Value::Bool(cell == "true")),
        _ => Ok(Value::Str(cell.to_string())),
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.storage.headings.join("\t"))?;
        for r in 0..self.num_rows() {
            let row: Vec<&str> = self
                .storage
                .columns
                .iter()
                .map(|c| c[r].as_str())
                .collect();
            writeln!(f, "{}", row.join("\t"))?;
        }
        Ok(())
    }
}
