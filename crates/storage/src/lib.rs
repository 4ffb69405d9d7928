pub mod config;
pub mod error;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use config::{JournalMode, StorageConfig, Synchronous};
pub use error::StorageError;
pub use sqlite::SqliteStorage;
pub use traits::*;
