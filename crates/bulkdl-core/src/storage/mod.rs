//! Artifact persistence.
//!
//! The pipeline hands each fetched body to a `Persist` implementation keyed by
//! the item's artifact name. `DirStore` writes plain files under one directory.

mod dir;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use dir::DirStore;

/// Error returned when an artifact cannot be written.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Name is empty, contains a separator, or is `.`/`..`.
    #[error("invalid artifact name {0:?}")]
    InvalidName(String),
    /// Disk/storage write failed (e.g. disk full, permission denied).
    #[error("write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Full-overwrite write of `body` to the artifact addressed by `name`.
#[async_trait]
pub trait Persist: Send + Sync {
    async fn persist(&self, name: &str, body: &[u8]) -> Result<(), PersistError>;
}
