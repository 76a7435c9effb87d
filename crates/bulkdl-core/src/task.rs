//! Fetch-then-persist: the unit of work both pipelines execute per item.

use thiserror::Error;

use crate::items::WorkItem;
use crate::storage::{Persist, PersistError};
use crate::transport::{classify_fetch, FailureKind, Fetch, FetchError};

/// Failure of one item, tagged with the step that failed.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("fetch #{index} {url} failed: {source}")]
    Fetch {
        index: usize,
        url: String,
        #[source]
        source: FetchError,
    },
    #[error("persist #{index} {name} failed: {source}")]
    Persist {
        index: usize,
        name: String,
        #[source]
        source: PersistError,
    },
}

impl TaskError {
    pub fn index(&self) -> usize {
        match self {
            TaskError::Fetch { index, .. } | TaskError::Persist { index, .. } => *index,
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            TaskError::Fetch { source, .. } => classify_fetch(source),
            TaskError::Persist { .. } => FailureKind::Storage,
        }
    }
}

/// GET `item.url()` in full, then write the body verbatim to `item.name()`.
/// Returns the number of bytes written. No retry.
pub async fn fetch_then_persist<F, S>(
    fetcher: &F,
    store: &S,
    item: &WorkItem,
) -> Result<usize, TaskError>
where
    F: Fetch + ?Sized,
    S: Persist + ?Sized,
{
    let body = fetcher
        .fetch(item.url())
        .await
        .map_err(|source| TaskError::Fetch {
            index: item.index(),
            url: item.url().to_string(),
            source,
        })?;
    store
        .persist(item.name(), &body)
        .await
        .map_err(|source| TaskError::Persist {
            index: item.index(),
            name: item.name().to_string(),
            source,
        })?;
    Ok(body.len())
}
