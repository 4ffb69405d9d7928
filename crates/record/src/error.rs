use rowkeep_core::CoreError;
use rowkeep_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("id {id} does not exist in table {table}")]
    NotFound { id: i64, table: &'static str },

    #[error("unknown property: {name}")]
    UnknownProperty { name: String },

    #[error("invalid accessor: {0}")]
    InvalidAccessor(String),

    #[error("invalid serialized record: {0}")]
    InvalidSerialForm(String),

    #[error("image error: {0}")]
    Image(#[from] std::io::Error),

    #[error("verification failed: {0}")]
    Verification(String),
}

impl RecordError {
    /// True for the one failure callers are expected to surface as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, RecordError::NotFound { .. })
    }
}
