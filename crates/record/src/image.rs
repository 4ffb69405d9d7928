use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// File name every image folder uses for its shared placeholder.
pub const DEFAULT_IMAGE: &str = "default.png";

/// Where image folders live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStore {
    pub root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// An image resource attached to a record.
pub trait Image {
    fn delete(&self, store: &ImageStore) -> Result<(), RecordError>;
}

/// An image file at `<root>/<folder>/<token><path>`.
///
/// `path == None` stands for the folder's placeholder image, which is shared
/// and therefore never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    folder: String,
    token: String,
    path: Option<String>,
    nsfw: bool,
}

impl StoredImage {
    pub fn new(
        folder: impl Into<String>,
        token: impl Into<String>,
        path: Option<String>,
        nsfw: bool,
    ) -> Self {
        Self {
            folder: folder.into(),
            token: token.into(),
            path,
            nsfw,
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_nsfw(&self) -> bool {
        self.nsfw
    }

    pub fn is_default(&self) -> bool {
        self.path.is_none()
    }

    pub fn file_name(&self) -> String {
        match &self.path {
            Some(path) => format!("{}{}", self.token, path),
            None => DEFAULT_IMAGE.to_string(),
        }
    }

    pub fn filesystem_path(&self, store: &ImageStore) -> PathBuf {
        store.root().join(&self.folder).join(self.file_name())
    }
}

impl Image for StoredImage {
    fn delete(&self, store: &ImageStore) -> Result<(), RecordError> {
        if self.is_default() {
            tracing::trace!(folder = %self.folder, "default image, nothing to delete");
            return Ok(());
        }
        let path = self.filesystem_path(store);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted image");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "image already absent");
                Ok(())
            }
            Err(e) => Err(RecordError::Image(e)),
        }
    }
}
