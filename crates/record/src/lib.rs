pub mod cache;
pub mod config;
pub mod dispatch;
pub mod entity;
pub mod error;
pub mod image;
pub mod property;
pub mod record;
pub mod serial;

pub use cache::ColumnCache;
pub use config::{ConfigError, RecordConfig};
pub use dispatch::{Accessor, AccessorKind, Dispatched};
pub use entity::{Attachments, Entity, HasImage, HasImageSet};
pub use error::RecordError;
pub use image::{Image, ImageStore, StoredImage};
pub use property::{Property, PropertySpec};
pub use record::{Record, WriteOutcome};

pub use rowkeep_core::{Affinity, ColumnValue, FromColumn, RecordId, Transform, transform};
