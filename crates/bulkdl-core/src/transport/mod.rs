//! Network transport: the fetch collaborator and its libcurl implementation.
//!
//! Pipelines only depend on the `Fetch` trait, so tests can swap in scripted
//! fetchers while production runs share one `CurlSession`.

mod classify;
mod error;
mod session;

use async_trait::async_trait;

pub use classify::{classify_curl_error, classify_fetch, FailureKind};
pub use error::FetchError;
pub use session::{CurlSession, TransportOptions};

/// GET-style retrieval of a full response body.
///
/// Implementations must be safe to share across concurrently running tasks.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}
