use std::path::{Path, PathBuf};

use rowkeep_record::{Entity, ImageStore, Record, RecordError};
use rowkeep_storage::SqliteStorage;
use tempfile::TempDir;

use crate::counting::CountingStorage;
use crate::fixtures::{CHARACTER_IMAGES, PROFILE_PICTURES, SCHEMA_SQL, User, UserDraft};

/// An in-memory database with the fixture schema plus a scratch media root.
pub struct TestStore {
    pub db: CountingStorage,
    pub images: ImageStore,
    media: TempDir,
}

impl TestStore {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let storage = SqliteStorage::open_in_memory()?;
        storage.execute_batch(SCHEMA_SQL)?;

        let media = tempfile::tempdir()?;
        for folder in [PROFILE_PICTURES, CHARACTER_IMAGES] {
            std::fs::create_dir_all(media.path().join(folder))?;
        }

        Ok(Self {
            db: CountingStorage::new(storage),
            images: ImageStore::new(media.path()),
            media,
        })
    }

    pub fn media_root(&self) -> &Path {
        self.media.path()
    }

    /// Write a placeholder file at `<root>/<folder>/<file_name>`.
    pub fn place_image(&self, folder: &str, file_name: &str) -> std::io::Result<PathBuf> {
        let path = self.media.path().join(folder).join(file_name);
        std::fs::write(&path, b"\x89PNG")?;
        Ok(path)
    }

    pub fn create<E: Entity>(&mut self, draft: E::Draft) -> Result<Record<E>, RecordError> {
        E::create(&mut self.db, draft)
    }

    pub fn create_user(&mut self, username: &str) -> Result<Record<User>, RecordError> {
        self.create::<User>(UserDraft::new(username))
    }

    pub fn load<E: Entity>(&self, id: rowkeep_core::RecordId) -> Result<Record<E>, RecordError> {
        Record::load(&self.db, id)
    }

    pub fn delete<E: Entity>(&mut self, record: &mut Record<E>) -> Result<(), RecordError> {
        record.delete(&mut self.db, &self.images)
    }
}
