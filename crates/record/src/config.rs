//! Application-level configuration: where the database lives, how the
//! connection is tuned and where image folders are rooted.
//!
//! ```toml
//! database = "/var/lib/app/rows.db"
//!
//! [storage]
//! journal_mode = "wal"
//! busy_timeout_ms = 2000
//!
//! [images]
//! root = "/var/lib/app/media"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use rowkeep_storage::{SqliteStorage, StorageConfig, StorageError};

use crate::image::ImageStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordConfig {
    /// SQLite database path; `:memory:` opens a private in-memory database.
    pub database: String,

    #[serde(default)]
    pub storage: StorageConfig,

    pub images: ImageStore,
}

impl RecordConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.is_empty() {
            return Err(ConfigError::Validation("database path is empty".to_string()));
        }
        if self.images.root.as_os_str().is_empty() {
            return Err(ConfigError::Validation("images.root is empty".to_string()));
        }
        Ok(())
    }

    pub fn open_storage(&self) -> Result<SqliteStorage, StorageError> {
        SqliteStorage::open_with(&self.database, &self.storage)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
