use std::fmt;
use std::marker::PhantomData;

use rowkeep_core::{ColumnValue, CoreError, FromColumn, RecordId};
use rowkeep_storage::{Equals, ID_COLUMN, QueryExecutor};

use crate::cache::ColumnCache;
use crate::entity::Entity;
use crate::error::RecordError;
use crate::image::ImageStore;
use crate::property::Property;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The transformed value equalled the stored one; nothing was issued.
    Unchanged,
    Written,
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// An in-memory proxy for one existing row of `E::TABLE`.
///
/// A record is request-scoped: it is not shared between concurrent
/// operations and nothing keeps two records for the same id coherent.
/// Writes are last-write-wins at the row level.
pub struct Record<E: Entity> {
    id: RecordId,
    cache: ColumnCache,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> fmt::Debug for Record<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("table", &E::TABLE)
            .field("id", &self.id)
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<E: Entity> Record<E> {
    /// Load the record for `id`, failing with `NotFound` if no row has it.
    pub fn load(storage: &dyn QueryExecutor, id: RecordId) -> Result<Self, RecordError> {
        Self::with_cache(storage, id, ColumnCache::new())
    }

    /// Like [`Record::load`], seeding the cache with values the caller
    /// already fetched (e.g. from a bulk query).
    pub fn with_cache(
        storage: &dyn QueryExecutor,
        id: RecordId,
        prefill: ColumnCache,
    ) -> Result<Self, RecordError> {
        if !Self::exists(storage, id)? {
            return Err(RecordError::NotFound {
                id: id.get(),
                table: E::TABLE,
            });
        }
        Ok(Self::from_parts(id, prefill))
    }

    pub fn exists(storage: &dyn QueryExecutor, id: RecordId) -> Result<bool, RecordError> {
        let rows = storage.select(E::TABLE, &[ID_COLUMN], &Equals::id(id))?;
        if rows.len() > 1 {
            tracing::warn!(
                table = E::TABLE,
                %id,
                matches = rows.len(),
                "id matched more than one row"
            );
        }
        Ok(!rows.is_empty())
    }

    /// Insert a row and return its record. Used by [`Entity::create`]
    /// implementations; the cache starts empty so that reads see storage's
    /// own coercion of the inserted values.
    pub fn insert(
        storage: &mut dyn QueryExecutor,
        values: &[(&str, ColumnValue)],
    ) -> Result<Self, RecordError> {
        let id = storage.insert(E::TABLE, values)?;
        tracing::debug!(table = E::TABLE, %id, "inserted record");
        Ok(Self::from_parts(id, ColumnCache::new()))
    }

    fn from_parts(id: RecordId, cache: ColumnCache) -> Self {
        Self {
            id,
            cache,
            _entity: PhantomData,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn table(&self) -> &'static str {
        E::TABLE
    }

    pub fn cache(&self) -> &ColumnCache {
        &self.cache
    }

    // ========================================================================
    // Cache-or-database
    // ========================================================================

    /// The stored value of `column`, from cache if present, otherwise one
    /// single-column select whose result is cached.
    pub fn value_of(
        &mut self,
        storage: &dyn QueryExecutor,
        column: &str,
    ) -> Result<ColumnValue, RecordError> {
        if let Some(value) = self.cache.get(column) {
            tracing::trace!(table = E::TABLE, id = %self.id, column, "cache hit");
            return Ok(value.clone());
        }
        tracing::trace!(table = E::TABLE, id = %self.id, column, "cache miss");
        let value = self.fetch_column(storage, column)?;
        self.cache.insert(column, value.clone());
        Ok(value)
    }

    fn fetch_column(
        &self,
        storage: &dyn QueryExecutor,
        column: &str,
    ) -> Result<ColumnValue, RecordError> {
        let rows = storage.select(E::TABLE, &[column], &Equals::id(self.id))?;
        let mut row = rows.into_iter().next().ok_or(RecordError::NotFound {
            id: self.id.get(),
            table: E::TABLE,
        })?;
        row.take(column).ok_or_else(|| {
            RecordError::Core(CoreError::InvalidData(format!(
                "select on {} did not return column {column}",
                E::TABLE
            )))
        })
    }

    /// Memoise a derived value under `key` in this record's cache.
    pub fn cached_or_compute<F>(&mut self, key: &str, compute: F) -> Result<ColumnValue, RecordError>
    where
        F: FnOnce(&mut Self) -> Result<ColumnValue, RecordError>,
    {
        if let Some(value) = self.cache.get(key) {
            return Ok(value.clone());
        }
        let value = compute(self)?;
        self.cache.insert(key, value.clone());
        Ok(value)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Forget one entry, e.g. after the row was changed out of band.
    pub fn clear_cached(&mut self, key: &str) {
        self.cache.remove(key);
    }

    // ========================================================================
    // Typed accessors
    // ========================================================================

    pub fn get(
        &mut self,
        storage: &dyn QueryExecutor,
        property: E::Property,
    ) -> Result<ColumnValue, RecordError> {
        let spec = property.spec();
        let stored = self.value_of(storage, spec.column)?;
        Ok(spec.apply_read(stored)?)
    }

    pub fn get_as<T: FromColumn>(
        &mut self,
        storage: &dyn QueryExecutor,
        property: E::Property,
    ) -> Result<T, RecordError> {
        Ok(T::from_column(self.get(storage, property)?)?)
    }

    pub fn is(
        &mut self,
        storage: &dyn QueryExecutor,
        property: E::Property,
    ) -> Result<bool, RecordError> {
        Ok(self.get(storage, property)?.truthy())
    }

    /// Write through if the value storage would hold differs from what is
    /// stored.
    ///
    /// The candidate goes through the write transform and the column's
    /// affinity, so the cached value matches what storage holds and a later
    /// `set` of the same value is a no-op. A value the affinity cannot
    /// represent exactly fails with `TypeMismatch` before anything is issued.
    /// The cache is only updated after the update succeeded, so a failed
    /// write leaves it as it was.
    pub fn set(
        &mut self,
        storage: &mut dyn QueryExecutor,
        property: E::Property,
        value: impl Into<ColumnValue>,
    ) -> Result<WriteOutcome, RecordError> {
        let spec = property.spec();
        let current = self.value_of(&*storage, spec.column)?;
        let candidate = spec.apply_write(value.into())?;
        if candidate == current {
            tracing::trace!(table = E::TABLE, id = %self.id, property = property.name(), "unchanged, skipping write");
            return Ok(WriteOutcome::Unchanged);
        }

        let changed = storage.update(
            E::TABLE,
            &[(spec.column, candidate.clone())],
            &Equals::id(self.id),
        )?;
        if changed == 0 {
            return Err(RecordError::NotFound {
                id: self.id.get(),
                table: E::TABLE,
            });
        }
        tracing::debug!(table = E::TABLE, id = %self.id, column = spec.column, "wrote column");
        self.cache.insert(spec.column, candidate);
        Ok(WriteOutcome::Written)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Soft-delete: run the pre-deletion hook, overwrite the row with the
    /// entity's tombstone values and delete attached images.
    ///
    /// Images are resolved before the row is tombstoned, since resolving
    /// them usually reads columns the tombstone overwrites. If they cannot be
    /// resolved the failure is logged and the row is tombstoned anyway,
    /// leaving its files in place. Afterwards reads reflect the tombstone
    /// values.
    pub fn delete(
        &mut self,
        storage: &mut dyn QueryExecutor,
        images: &ImageStore,
    ) -> Result<(), RecordError> {
        E::before_delete(self, storage)?;

        let attached = match E::attachments().resolve(self, &*storage) {
            Ok(attached) => attached,
            Err(error) => {
                tracing::warn!(
                    table = E::TABLE,
                    id = %self.id,
                    %error,
                    "could not resolve attached images, deleting without them"
                );
                Vec::new()
            }
        };

        self.cache.clear();

        let tombstone = E::deleted_values();
        if !tombstone.is_empty() {
            let changed = storage.update(E::TABLE, tombstone, &Equals::id(self.id))?;
            if changed == 0 {
                return Err(RecordError::NotFound {
                    id: self.id.get(),
                    table: E::TABLE,
                });
            }
        }

        for image in &attached {
            image.delete(images)?;
        }
        tracing::debug!(
            table = E::TABLE,
            id = %self.id,
            images = attached.len(),
            "deleted record"
        );
        Ok(())
    }
}
