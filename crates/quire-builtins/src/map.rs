//! Ordered string-keyed maps. All values in a map share one dtype
//! (and, for quantities, one unit); a map whose values are vectors is
//! dispatched as a map-of-vectors.

use std::fmt;

use crate::error::{ErrorCode, LangError};
use crate::value::{Dtype, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ValueMap {
    keys: Vec<String>,
    values: Vec<Value>,
}

impl ValueMap {
    /// Insertion order is preserved. Construction fails when the
    /// values do not all share one dtype.
    pub fn new(pairs: Vec<(String, Value)>) -> Result<Self, LangError> {
        let mut keys = Vec::with_capacity(pairs.len());
        let mut values = Vec::with_capacity(pairs.len());
        let mut dtype: Option<Dtype> = None;
        for (key, value) in pairs {
            let vt = value.dtype();
            match &dtype {
                None => dtype = Some(vt),
                Some(expected) if *expected == vt => {}
                Some(expected) => {
                    return Err(LangError::with_detail(
                        ErrorCode::BadType,
                        format!("map values must share one type, found {expected:?} and {vt:?}"),
                    ))
                }
            }
            keys.push(key);
            values.push(value);
        }
        Ok(ValueMap { keys, values })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| &self.values[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.keys.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.keys.iter().zip(self.values.iter())
    }

    /// The shared dtype of the values; `None` for an empty map.
    pub fn value_dtype(&self) -> Option<Dtype> {
        self.values.first().map(|v| v.dtype())
    }

    /// True when every value is a vector, the map-of-vectors shape.
    pub fn is_map_of_vectors(&self) -> bool {
        !self.values.is_empty()
            && self
                .values
                .iter()
                .all(|v| matches!(v, Value::Matrix(m) if m.is_vector()))
    }

    /// Apply a fallible function to every value, keeping keys/order.
    pub fn map_values(
        &self,
        f: impl Fn(&Value) -> Result<Value, LangError>,
    ) -> Result<ValueMap, LangError> {
        let mut values = Vec::with_capacity(self.values.len());
        for v in &self.values {
            values.push(f(v)?);
        }
        Ok(ValueMap {
            keys: self.keys.clone(),
            values,
        })
    }

    /// Pair up values under matching keys of two maps.
    pub fn zip_values(
        &self,
        other: &ValueMap,
        f: impl Fn(&Value, &Value) -> Result<Value, LangError>,
    ) -> Result<ValueMap, LangError> {
        if self.keys != other.keys {
            return Err(LangError::with_detail(
                ErrorCode::MismatchedElementCount,
                "maps with different keys",
            ));
        }
        let mut values = Vec::with_capacity(self.values.len());
        for (a, b) in self.values.iter().zip(other.values.iter()) {
            values.push(f(a, b)?);
        }
        Ok(ValueMap {
            keys: self.keys.clone(),
            values,
        })
    }
}

impl fmt::Display for ValueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}
