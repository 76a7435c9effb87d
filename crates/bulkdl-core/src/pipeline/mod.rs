//! Run strategies over an item plan.
//!
//! Both strategies take the same inputs (plan, shared fetcher, shared store)
//! and produce a `RunReport`, so callers pick one without touching the task or
//! the item generator:
//! - `WorkerPool`: fixed workers draining a bounded queue (see `workers`).
//! - `Chunked`: fixed-size batches launched together and awaited in order.

mod chunked;
mod report;
mod workers;

use anyhow::Result;
use std::fmt;
use std::sync::Arc;

use crate::items::ItemPlan;
use crate::storage::Persist;
use crate::transport::Fetch;

pub use chunked::run_chunked;
pub use report::{FailedItem, RunReport};
pub use workers::run_worker_pool;

/// How a run bounds concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `workers` long-lived workers; queue capacity equals the worker count.
    WorkerPool { workers: usize },
    /// Batches of `chunk_size` items; concurrency equals the chunk size.
    Chunked { chunk_size: usize },
}

impl Strategy {
    /// Upper bound on items in flight at once.
    pub fn concurrency(&self) -> usize {
        match *self {
            Strategy::WorkerPool { workers } => workers.max(1),
            Strategy::Chunked { chunk_size } => chunk_size.max(1),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::WorkerPool { workers } => write!(f, "worker pool ({} workers)", workers),
            Strategy::Chunked { chunk_size } => write!(f, "chunked ({} per chunk)", chunk_size),
        }
    }
}

/// Fetch and persist every item of `plan` using `strategy`.
pub async fn run_pipeline<F, S>(
    strategy: Strategy,
    plan: &ItemPlan,
    fetcher: Arc<F>,
    store: Arc<S>,
) -> Result<RunReport>
where
    F: Fetch + ?Sized + 'static,
    S: Persist + ?Sized + 'static,
{
    tracing::info!(
        %strategy,
        concurrency = strategy.concurrency(),
        items = plan.count(),
        base_url = plan.base_url(),
        "run started"
    );
    match strategy {
        Strategy::WorkerPool { workers } => run_worker_pool(plan, workers, fetcher, store).await,
        Strategy::Chunked { chunk_size } => run_chunked(plan, chunk_size, fetcher, store).await,
    }
}
