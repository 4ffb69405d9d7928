use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("statement needs at least one column")]
    EmptyColumnList,

    #[error("invalid storage config: {0}")]
    Config(String),

    #[error("core error: {0}")]
    Core(#[from] rowkeep_core::CoreError),
}
