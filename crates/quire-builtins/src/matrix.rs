//! Row vectors, column vectors, and matrices share one container.
//! Shape is carried by the dimensions: rows == 1 is a row vector,
//! cols == 1 (with more than one row) is a column vector.

use std::fmt;

use crate::error::{ErrorCode, LangError};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub data: Vec<Value>,
    pub rows: usize,
    pub cols: usize,
}

impl Matrix {
    /// Row-major storage.
    pub fn new(data: Vec<Value>, rows: usize, cols: usize) -> Result<Self, LangError> {
        if rows * cols != data.len() {
            return Err(LangError::with_detail(
                ErrorCode::MismatchedElementCount,
                format!("{} elements in a {rows}\u{00d7}{cols} matrix", data.len()),
            ));
        }
        Ok(Matrix { data, rows, cols })
    }

    pub fn row_vector(data: Vec<Value>) -> Self {
        let cols = data.len();
        Matrix {
            data,
            rows: 1,
            cols,
        }
    }

    pub fn column_vector(data: Vec<Value>) -> Self {
        let rows = data.len();
        Matrix {
            data,
            rows,
            cols: 1,
        }
    }

    pub fn is_row_vector(&self) -> bool {
        self.rows == 1
    }

    pub fn is_column_vector(&self) -> bool {
        self.cols == 1 && self.rows > 1
    }

    pub fn is_vector(&self) -> bool {
        self.rows == 1 || self.cols == 1
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 0-based element access.
    pub fn get(&self, row: usize, col: usize) -> Result<&Value, LangError> {
        if row >= self.rows || col >= self.cols {
            return Err(LangError::with_detail(
                ErrorCode::BadIndex,
                format!(
                    "({}, {}) in a {}\u{00d7}{} matrix",
                    row + 1,
                    col + 1,
                    self.rows,
                    self.cols
                ),
            ));
        }
        Ok(&self.data[row * self.cols + col])
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = Vec::with_capacity(self.data.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                data.push(self.data[r * self.cols + c].clone());
            }
        }
        Matrix {
            data,
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Apply a fallible element-wise function, keeping the shape.
    pub fn map(&self, f: impl Fn(&Value) -> Result<Value, LangError>) -> Result<Matrix, LangError> {
        let mut data = Vec::with_capacity(self.data.len());
        for v in &self.data {
            data.push(f(v)?);
        }
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Element-wise combination of two equally shaped matrices.
    pub fn zip(
        &self,
        other: &Matrix,
        f: impl Fn(&Value, &Value) -> Result<Value, LangError>,
    ) -> Result<Matrix, LangError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(LangError::with_detail(
                ErrorCode::MismatchedElementCount,
                format!(
                    "{}\u{00d7}{} and {}\u{00d7}{}",
                    self.rows, self.cols, other.rows, other.cols
                ),
            ));
        }
        let mut data = Vec::with_capacity(self.data.len());
        for (a, b) in self.data.iter().zip(other.data.iter()) {
            data.push(f(a, b)?);
        }
        Ok(Matrix {
            data,
            rows: self.rows,
            cols: self.cols,
        })
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for r in 0..self.rows {
            if r > 0 {
                write!(f, "; ")?;
            }
            for c in 0..self.cols {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.data[r * self.cols + c])?;
            }
        }
        write!(f, ")")
    }
}
