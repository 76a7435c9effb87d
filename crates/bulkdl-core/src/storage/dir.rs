//! Directory-backed artifact store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{Persist, PersistError};
use crate::items::is_plain_file_name;

/// Writes each artifact as `root/<name>`, replacing any existing file.
/// Writes are not atomic: a failed write may leave a truncated file.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Use `root` as-is; the directory must already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create `root` (and parents) if missing.
    pub async fn create(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| PersistError::Io {
                path: root.clone(),
                source,
            })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an artifact named `name` is written to.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, PersistError> {
        if !is_plain_file_name(name) {
            return Err(PersistError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl Persist for DirStore {
    async fn persist(&self, name: &str, body: &[u8]) -> Result<(), PersistError> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| PersistError::Io { path, source })
    }
}
