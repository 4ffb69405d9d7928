//! Column affinity, as SQLite applies it when a value is written.
//!
//! The record layer caches the value it writes instead of reading it back, so
//! it must convert a candidate the same way storage will. Conversions SQLite
//! performs whose result is not exactly predictable (numeric text in a REAL
//! column, reals in a TEXT column) are rejected instead.

use crate::column_value::ColumnValue;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affinity {
    Integer,
    Real,
    Text,
    /// No affinity: values are stored exactly as given.
    Blob,
}

impl Affinity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Blob => "blob",
        }
    }

    /// The value storage will hold after writing `value` into a column of
    /// this affinity.
    pub fn coerce(&self, value: ColumnValue) -> Result<ColumnValue, CoreError> {
        match (self, value) {
            (_, ColumnValue::Null) => Ok(ColumnValue::Null),
            (_, ColumnValue::Blob(bytes)) => Ok(ColumnValue::Blob(bytes)),
            (Self::Blob, value) => Ok(value),

            (Self::Integer, ColumnValue::Integer(n)) => Ok(ColumnValue::Integer(n)),
            (Self::Integer, ColumnValue::Real(f)) => Ok(integral(f)
                .map(ColumnValue::Integer)
                .unwrap_or(ColumnValue::Real(f))),
            (Self::Integer, ColumnValue::Text(text)) => match canonical_integer(&text) {
                Some(n) => Ok(ColumnValue::Integer(n)),
                None => Err(self.mismatch("text")),
            },

            (Self::Real, ColumnValue::Integer(n)) => Ok(ColumnValue::Real(n as f64)),
            (Self::Real, ColumnValue::Real(f)) => Ok(ColumnValue::Real(f)),
            (Self::Real, ColumnValue::Text(_)) => Err(self.mismatch("text")),

            (Self::Text, ColumnValue::Text(text)) => Ok(ColumnValue::Text(text)),
            (Self::Text, ColumnValue::Integer(n)) => Ok(ColumnValue::Text(n.to_string())),
            (Self::Text, ColumnValue::Real(_)) => Err(self.mismatch("real")),
        }
    }

    fn mismatch(&self, found: &'static str) -> CoreError {
        CoreError::TypeMismatch {
            expected: self.as_str(),
            found,
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    (f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)).then_some(f as i64)
}

/// Only text that is the exact decimal rendering of an integer.
fn canonical_integer(text: &str) -> Option<i64> {
    text.parse::<i64>()
        .ok()
        .filter(|n| n.to_string() == text)
}
