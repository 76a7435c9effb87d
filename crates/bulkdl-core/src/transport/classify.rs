//! Classify fetch and persist failures into coarse kinds for diagnostics.

use std::fmt;

use super::FetchError;

/// High-level classification of a task failure, reported alongside the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused, DNS, reset, truncated body).
    Connection,
    /// Server answered with a non-2xx status.
    Http(u16),
    /// Writing the artifact failed.
    Storage,
    /// Anything else.
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Connection => write!(f, "connection"),
            FailureKind::Http(code) => write!(f, "http {}", code),
            FailureKind::Storage => write!(f, "storage"),
            FailureKind::Other => write!(f, "other"),
        }
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_operation_timedout() {
        return FailureKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return FailureKind::Connection;
    }
    FailureKind::Other
}

/// Classify a fetch error.
pub fn classify_fetch(e: &FetchError) -> FailureKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Http(code) => FailureKind::Http(u16::try_from(*code).unwrap_or(u16::MAX)),
        FetchError::Join(_) | FetchError::Other(_) => FailureKind::Other,
    }
}
