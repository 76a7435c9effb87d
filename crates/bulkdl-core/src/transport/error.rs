//! Fetch error type.

use thiserror::Error;

/// Error returned by a single fetch (curl failure, HTTP error, or a lost transfer task).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, truncated body, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status and the session treats that as failure.
    #[error("HTTP {0}")]
    Http(u32),
    /// The blocking transfer task panicked or was cancelled before finishing.
    #[error("transfer task failed: {0}")]
    Join(String),
    /// Scripted or adapter-level failure from a non-curl fetcher.
    #[error("{0}")]
    Other(String),
}
