use crate::error::CoreError;

/// A single stored column value, one variant per SQLite storage class.
///
/// Booleans have no storage class of their own; they are written as
/// `Integer(0)` / `Integer(1)` so that a flag read back from storage compares
/// equal to the value that was written.
#[derive(Debug, Clone)]
pub enum ColumnValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl PartialEq for ColumnValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.total_cmp(b).is_eq(),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Blob(a), Self::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ColumnValue {}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ColumnValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ColumnValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            ColumnValue::Real(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            ColumnValue::Blob(b) => Some(b),
            _ => None,
        }
    }

    /// Boolean coercion for flag-style reads.
    pub fn truthy(&self) -> bool {
        match self {
            ColumnValue::Null => false,
            ColumnValue::Integer(n) => *n != 0,
            ColumnValue::Real(n) => *n != 0.0,
            ColumnValue::Text(s) => !(s.is_empty() || s == "0"),
            ColumnValue::Blob(b) => !b.is_empty(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Null => "null",
            ColumnValue::Integer(_) => "integer",
            ColumnValue::Real(_) => "real",
            ColumnValue::Text(_) => "text",
            ColumnValue::Blob(_) => "blob",
        }
    }
}

impl From<i64> for ColumnValue {
    fn from(n: i64) -> Self {
        ColumnValue::Integer(n)
    }
}

impl From<i32> for ColumnValue {
    fn from(n: i32) -> Self {
        ColumnValue::Integer(n.into())
    }
}

impl From<u32> for ColumnValue {
    fn from(n: u32) -> Self {
        ColumnValue::Integer(n.into())
    }
}

impl From<bool> for ColumnValue {
    fn from(b: bool) -> Self {
        ColumnValue::Integer(i64::from(b))
    }
}

impl From<f64> for ColumnValue {
    fn from(n: f64) -> Self {
        ColumnValue::Real(n)
    }
}

impl From<String> for ColumnValue {
    fn from(s: String) -> Self {
        ColumnValue::Text(s)
    }
}

impl From<&str> for ColumnValue {
    fn from(s: &str) -> Self {
        ColumnValue::Text(s.to_string())
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(b: Vec<u8>) -> Self {
        ColumnValue::Blob(b)
    }
}

impl From<&[u8]> for ColumnValue {
    fn from(b: &[u8]) -> Self {
        ColumnValue::Blob(b.to_vec())
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ColumnValue::Null, Into::into)
    }
}

/// Conversion out of a stored value into a concrete Rust type.
pub trait FromColumn: Sized {
    fn from_column(value: ColumnValue) -> Result<Self, CoreError>;
}

fn mismatch<T>(expected: &'static str, found: &ColumnValue) -> Result<T, CoreError> {
    Err(CoreError::TypeMismatch {
        expected,
        found: found.type_name(),
    })
}

impl FromColumn for ColumnValue {
    fn from_column(value: ColumnValue) -> Result<Self, CoreError> {
        Ok(value)
    }
}

impl FromColumn for String {
    fn from_column(value: ColumnValue) -> Result<Self, CoreError> {
        match value {
            ColumnValue::Text(s) => Ok(s),
            other => mismatch("text", &other),
        }
    }
}

impl FromColumn for i64 {
    fn from_column(value: ColumnValue) -> Result<Self, CoreError> {
        match value {
            ColumnValue::Integer(n) => Ok(n),
            other => mismatch("integer", &other),
        }
    }
}

impl FromColumn for f64 {
    fn from_column(value: ColumnValue) -> Result<Self, CoreError> {
        match value {
            ColumnValue::Real(n) => Ok(n),
            ColumnValue::Integer(n) => Ok(n as f64),
            other => mismatch("real", &other),
        }
    }
}

impl FromColumn for bool {
    fn from_column(value: ColumnValue) -> Result<Self, CoreError> {
        Ok(value.truthy())
    }
}

impl FromColumn for Vec<u8> {
    fn from_column(value: ColumnValue) -> Result<Self, CoreError> {
        match value {
            ColumnValue::Blob(b) => Ok(b),
            other => mismatch("blob", &other),
        }
    }
}

impl<T: FromColumn> FromColumn for Option<T> {
    fn from_column(value: ColumnValue) -> Result<Self, CoreError> {
        match value {
            ColumnValue::Null => Ok(None),
            other => T::from_column(other).map(Some),
        }
    }
}
