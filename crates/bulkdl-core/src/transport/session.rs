//! Shared libcurl transport session.
//!
//! One `CurlSession` is created per run and cloned into every worker or task.
//! Transfers run on tokio's blocking pool; finished `Easy` handles go back to an
//! idle pool so their keep-alive connections are reused by later fetches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Fetch, FetchError};

/// Transport tuning (optional `[transport]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransportOptions {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (0 = no limit).
    pub timeout_secs: u64,
    /// Follow 3xx redirects.
    pub follow_redirects: bool,
    /// Redirect hop limit when following redirects.
    pub max_redirects: u32,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    /// Treat non-2xx responses as fetch failures instead of persisting their body.
    pub fail_on_http_error: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 300,
            follow_redirects: true,
            max_redirects: 10,
            user_agent: concat!("bulkdl/", env!("CARGO_PKG_VERSION")).to_string(),
            fail_on_http_error: false,
        }
    }
}

struct Inner {
    options: TransportOptions,
    idle: Mutex<Vec<curl::easy::Easy>>,
    closed: AtomicBool,
}

/// Shared, read-only handle to the HTTP transport. Cheap to clone.
#[derive(Clone)]
pub struct CurlSession {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CurlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurlSession")
            .field("options", &self.inner.options)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl CurlSession {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                options,
                idle: Mutex::new(Vec::new()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn options(&self) -> &TransportOptions {
        &self.inner.options
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of idle handles currently pooled.
    pub fn idle_handles(&self) -> usize {
        self.inner.idle.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Close the session: drop pooled handles (and their connections). Later
    /// fetches on any clone fail with `FetchError::Other`. Returns the number of
    /// handles closed; a second close is a no-op returning 0.
    pub fn close(self) -> usize {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            tracing::warn!("transport session closed twice");
            return 0;
        }
        let closed = {
            let mut idle = self.inner.idle.lock().unwrap_or_else(|e| e.into_inner());
            let n = idle.len();
            idle.clear();
            n
        };
        tracing::debug!(handles = closed, "transport session closed");
        closed
    }

    fn checkout(&self) -> curl::easy::Easy {
        self.inner
            .idle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop()
            .unwrap_or_else(curl::easy::Easy::new)
    }

    fn checkin(&self, easy: curl::easy::Easy) {
        if self.is_closed() {
            return;
        }
        self.inner.idle.lock().unwrap_or_else(|e| e.into_inner()).push(easy);
    }

    /// Blocking GET of `url`, returning the full body.
    pub fn fetch_blocking(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if self.is_closed() {
            return Err(FetchError::Other("transport session is closed".to_string()));
        }
        let mut easy = self.checkout();
        // A handle that failed mid-transfer is dropped rather than pooled.
        let (code, body) = get(&mut easy, url, &self.inner.options)?;
        self.checkin(easy);

        if !(200..300).contains(&code) {
            if self.inner.options.fail_on_http_error {
                return Err(FetchError::Http(code));
            }
            tracing::warn!(url, status = code, "non-success status; keeping response body");
        }
        Ok(body)
    }
}

fn get(
    easy: &mut curl::easy::Easy,
    url: &str,
    options: &TransportOptions,
) -> Result<(u32, Vec<u8>), FetchError> {
    easy.reset();
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(options.follow_redirects)?;
    if options.follow_redirects {
        easy.max_redirections(options.max_redirects)?;
    }
    easy.connect_timeout(Duration::from_secs(options.connect_timeout_secs))?;
    if options.timeout_secs > 0 {
        easy.timeout(Duration::from_secs(options.timeout_secs))?;
    }
    easy.useragent(&options.user_agent)?;

    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    Ok((code, body))
}

#[async_trait]
impl Fetch for CurlSession {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let session = self.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || session.fetch_blocking(&url))
            .await
            .map_err(|e| FetchError::Join(e.to_string()))?
    }
}
