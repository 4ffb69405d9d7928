//! Connection settings for [`SqliteStorage`](crate::SqliteStorage).
//!
//! Every field has a default, so an empty TOML document (or a missing
//! `[storage]` table in a larger file) yields the stock configuration.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Delete,
    Truncate,
    Memory,
    Wal,
}

impl JournalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Truncate => "TRUNCATE",
            Self::Memory => "MEMORY",
            Self::Wal => "WAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Synchronous {
    Off,
    Normal,
    Full,
}

impl Synchronous {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::Normal => "NORMAL",
            Self::Full => "FULL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub journal_mode: JournalMode,
    pub synchronous: Synchronous,
    pub foreign_keys: bool,
    pub busy_timeout_ms: u32,
    /// Page cache size in KiB.
    pub cache_size_kib: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            journal_mode: JournalMode::Wal,
            synchronous: Synchronous::Normal,
            foreign_keys: true,
            busy_timeout_ms: 5000,
            cache_size_kib: 32000,
        }
    }
}

impl StorageConfig {
    pub fn from_toml(content: &str) -> Result<Self, StorageError> {
        toml::from_str(content).map_err(|e| StorageError::Config(e.to_string()))
    }
}
