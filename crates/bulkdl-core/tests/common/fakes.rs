//! Scripted fetcher for pipeline tests.
//!
//! Serves `body-<index>` for `<base>/<index>`, optionally failing or panicking
//! on chosen indices, sleeping per call, and recording start/finish order plus the
//! highest number of concurrent fetches seen.

use async_trait::async_trait;
use bulkdl_core::transport::{Fetch, FetchError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Started(usize),
    Finished(usize),
}

#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    fail: HashSet<usize>,
    panic: HashSet<usize>,
    delay: Duration,
    /// Vary the delay by index so completion order differs from launch order.
    stagger: bool,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    events: Mutex<Vec<Event>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, index: usize) -> Self {
        self.fail.insert(index);
        self
    }

    /// Panic inside the fetch for `index`, killing whichever task runs it.
    pub fn panicking(mut self, index: usize) -> Self {
        self.panic.insert(index);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn staggered(mut self) -> Self {
        self.stagger = true;
        self
    }

    /// Highest number of fetches observed running at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started(i) => Some(i),
                Event::Finished(_) => None,
            })
            .collect()
    }

    fn delay_for(&self, index: usize) -> Duration {
        if self.stagger {
            self.delay * (1 + (index % 3) as u32)
        } else {
            self.delay
        }
    }
}

pub fn body_for(index: usize) -> String {
    format!("body-{}", index)
}

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let index: usize = url
            .rsplit('/')
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| FetchError::Other(format!("no index in {}", url)))?;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.events.lock().unwrap().push(Event::Started(index));
        if self.panic.contains(&index) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            panic!("scripted panic for {}", index);
        }

        let delay = self.delay_for(index);
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }

        self.events.lock().unwrap().push(Event::Finished(index));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail.contains(&index) {
            return Err(FetchError::Other(format!("scripted failure for {}", index)));
        }
        Ok(body_for(index).into_bytes())
    }
}
