use rusqlite::Connection;

use crate::config::StorageConfig;
use crate::error::StorageError;

/// Apply connection-level PRAGMAs. Table DDL belongs to the application.
pub fn init_connection(conn: &Connection, config: &StorageConfig) -> Result<(), StorageError> {
    conn.execute_batch(&format!(
        "
        PRAGMA journal_mode = {};
        PRAGMA synchronous = {};
        PRAGMA foreign_keys = {};
        PRAGMA cache_size = -{};
        PRAGMA busy_timeout = {};
    ",
        config.journal_mode.as_str(),
        config.synchronous.as_str(),
        if config.foreign_keys { "ON" } else { "OFF" },
        config.cache_size_kib,
        config.busy_timeout_ms,
    ))?;
    Ok(())
}

/// Check a table or column name and return it double-quoted.
///
/// Only plain identifiers are accepted; names are interpolated into SQL
/// text, values never are.
pub fn quote_ident(name: &str) -> Result<String, StorageError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if !valid {
        return Err(StorageError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{name}\""))
}
