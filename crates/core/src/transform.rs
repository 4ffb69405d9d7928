//! Column transforms applied between the stored value and the value a
//! property exposes. `Null` passes through every built-in unchanged.

use crate::column_value::ColumnValue;
use crate::error::CoreError;

pub type Transform = fn(ColumnValue) -> Result<ColumnValue, CoreError>;

/// Stored blob to lower-case hex text.
pub fn bytes_to_hex(value: ColumnValue) -> Result<ColumnValue, CoreError> {
    match value {
        ColumnValue::Null => Ok(ColumnValue::Null),
        ColumnValue::Blob(bytes) => Ok(ColumnValue::Text(hex::encode(bytes))),
        other => Err(CoreError::TypeMismatch {
            expected: "blob",
            found: other.type_name(),
        }),
    }
}

/// Hex text (either case) to a blob.
pub fn hex_to_bytes(value: ColumnValue) -> Result<ColumnValue, CoreError> {
    match value {
        ColumnValue::Null => Ok(ColumnValue::Null),
        ColumnValue::Text(text) => hex::decode(&text)
            .map(ColumnValue::Blob)
            .map_err(|e| CoreError::InvalidData(format!("not a hex string {text:?}: {e}"))),
        other => Err(CoreError::TypeMismatch {
            expected: "text",
            found: other.type_name(),
        }),
    }
}

pub fn integer_to_bool(value: ColumnValue) -> Result<ColumnValue, CoreError> {
    match value {
        ColumnValue::Null => Ok(ColumnValue::Null),
        other => Ok(ColumnValue::from(other.truthy())),
    }
}

pub fn bool_to_integer(value: ColumnValue) -> Result<ColumnValue, CoreError> {
    integer_to_bool(value)
}

pub fn trim_text(value: ColumnValue) -> Result<ColumnValue, CoreError> {
    match value {
        ColumnValue::Text(text) => Ok(ColumnValue::Text(text.trim().to_string())),
        other => Ok(other),
    }
}
