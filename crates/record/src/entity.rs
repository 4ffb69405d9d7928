use rowkeep_core::ColumnValue;
use rowkeep_storage::QueryExecutor;

use crate::error::RecordError;
use crate::image::Image;
use crate::property::Property;
use crate::record::Record;

/// What every concrete record type supplies.
pub trait Entity: Sized + 'static {
    const TABLE: &'static str;

    /// The schema descriptor: every property this type exposes.
    type Property: Property;

    /// Values accepted by [`Entity::create`].
    type Draft;

    /// Column overwrites applied on soft deletion, shared by all instances.
    fn deleted_values() -> &'static [(&'static str, ColumnValue)];

    /// Insert a new row and return it as a record.
    ///
    /// The draft is trusted; callers validate it first.
    fn create(storage: &mut dyn QueryExecutor, draft: Self::Draft)
    -> Result<Record<Self>, RecordError>;

    /// Runs first in [`Record::delete`], before anything is tombstoned.
    fn before_delete(
        _record: &mut Record<Self>,
        _storage: &mut dyn QueryExecutor,
    ) -> Result<(), RecordError> {
        Ok(())
    }

    /// Runs after [`Record::deserialize`] has re-validated the id.
    fn verify_restored(
        _record: &mut Record<Self>,
        _storage: &dyn QueryExecutor,
    ) -> Result<(), RecordError> {
        Ok(())
    }

    /// Image capabilities deletion should cascade into.
    fn attachments() -> Attachments<Self> {
        Attachments::none()
    }
}

/// Capability: the record owns exactly one image.
pub trait HasImage: Entity {
    fn image(
        record: &mut Record<Self>,
        storage: &dyn QueryExecutor,
    ) -> Result<Box<dyn Image>, RecordError>;
}

/// Capability: the record owns a collection of images.
pub trait HasImageSet: Entity {
    fn image_set(
        record: &mut Record<Self>,
        storage: &dyn QueryExecutor,
    ) -> Result<Vec<Box<dyn Image>>, RecordError>;
}

pub type ImageResolver<E> =
    fn(&mut Record<E>, &dyn QueryExecutor) -> Result<Box<dyn Image>, RecordError>;

pub type ImageSetResolver<E> =
    fn(&mut Record<E>, &dyn QueryExecutor) -> Result<Vec<Box<dyn Image>>, RecordError>;

/// The image capabilities an entity type has opted into.
///
/// Only the capabilities registered here are cascaded on delete; the
/// `with_*` builders require the matching trait, so registration cannot
/// drift from the implementation.
pub struct Attachments<E: Entity> {
    image: Option<ImageResolver<E>>,
    image_set: Option<ImageSetResolver<E>>,
}

impl<E: Entity> Attachments<E> {
    pub fn none() -> Self {
        Self {
            image: None,
            image_set: None,
        }
    }

    pub fn with_image(mut self) -> Self
    where
        E: HasImage,
    {
        self.image = Some(<E as HasImage>::image as ImageResolver<E>);
        self
    }

    pub fn with_image_set(mut self) -> Self
    where
        E: HasImageSet,
    {
        self.image_set = Some(<E as HasImageSet>::image_set as ImageSetResolver<E>);
        self
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn has_image_set(&self) -> bool {
        self.image_set.is_some()
    }

    /// Single image first, then the set.
    pub(crate) fn resolve(
        &self,
        record: &mut Record<E>,
        storage: &dyn QueryExecutor,
    ) -> Result<Vec<Box<dyn Image>>, RecordError> {
        let mut images = Vec::new();
        if let Some(image) = self.image {
            images.push(image(record, storage)?);
        }
        if let Some(image_set) = self.image_set {
            images.extend(image_set(record, storage)?);
        }
        Ok(images)
    }
}
