//! Transport form of a record: the id alone, MessagePack-encoded.
//!
//! Cached columns never travel. Restoring re-validates the id against
//! storage and starts with an empty cache.

use rowkeep_core::{CoreError, RecordId};
use rowkeep_storage::QueryExecutor;

use crate::entity::Entity;
use crate::error::RecordError;
use crate::record::Record;

impl<E: Entity> Record<E> {
    pub fn serialize(&self) -> Result<Vec<u8>, RecordError> {
        rmp_serde::to_vec(&self.id())
            .map_err(|e| RecordError::Core(CoreError::Serialization(e.to_string())))
    }

    pub fn deserialize(storage: &dyn QueryExecutor, bytes: &[u8]) -> Result<Self, RecordError> {
        let id = decode_id(bytes)?;
        let mut record = Self::load(storage, id)?;
        E::verify_restored(&mut record, storage)?;
        Ok(record)
    }
}

/// Accept only the exact encoding [`Record::serialize`] produces: a single
/// positive MessagePack integer with nothing trailing it.
fn decode_id(bytes: &[u8]) -> Result<RecordId, RecordError> {
    let raw: i64 =
        rmp_serde::from_slice(bytes).map_err(|e| RecordError::InvalidSerialForm(e.to_string()))?;
    let canonical =
        rmp_serde::to_vec(&raw).map_err(|e| RecordError::InvalidSerialForm(e.to_string()))?;
    if canonical != bytes {
        return Err(RecordError::InvalidSerialForm(
            "payload is not a canonical record id".to_string(),
        ));
    }
    RecordId::new(raw).map_err(|e| RecordError::InvalidSerialForm(e.to_string()))
}
