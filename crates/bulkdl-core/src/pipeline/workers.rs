//! Fixed worker pool draining a bounded queue.
//!
//! The producer enqueues items in plan order; `workers` long-lived tasks each
//! loop dequeue → fetch-then-persist → acknowledge. Once the queue is drained
//! the idle workers are cancelled. Cancellation is only observed while a worker
//! waits on the queue, never mid-item.
//!
//! A failed item is logged, recorded in the report and still acknowledged, so
//! the drain always completes. Queue contract violations and worker panics
//! abort the run.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::items::{ItemPlan, WorkItem};
use crate::queue::{QueueError, WorkQueue};
use crate::storage::Persist;
use crate::task::fetch_then_persist;
use crate::transport::Fetch;

use super::RunReport;

/// Run every item of `plan` through a pool of `workers` workers (clamped to ≥ 1).
/// The queue capacity equals the worker count, bounding in-flight fetches.
pub async fn run_worker_pool<F, S>(
    plan: &ItemPlan,
    workers: usize,
    fetcher: Arc<F>,
    store: Arc<S>,
) -> Result<RunReport>
where
    F: Fetch + ?Sized + 'static,
    S: Persist + ?Sized + 'static,
{
    let workers = workers.max(1);
    let queue: Arc<WorkQueue<WorkItem>> = Arc::new(WorkQueue::new(workers));
    let cancel = CancellationToken::new();

    // Workers start before the first item is enqueued.
    let mut pool = JoinSet::new();
    for id in 0..workers {
        pool.spawn(worker(
            id,
            Arc::clone(&queue),
            Arc::clone(&fetcher),
            Arc::clone(&store),
            cancel.clone(),
        ));
    }
    tracing::debug!(workers, items = plan.count(), "worker pool started");

    // A worker only returns before cancellation on a fatal error, so watch the
    // pool while producing to avoid blocking forever on a dead consumer side.
    let produced: Result<()> = tokio::select! {
        res = produce(&queue, plan) => res.context("enqueue"),
        Some(joined) = pool.join_next() => Err(match joined {
            Ok(Ok(_)) => anyhow::anyhow!("worker exited before the queue drained"),
            Ok(Err(e)) => anyhow::Error::new(e).context("worker aborted"),
            Err(e) => anyhow::anyhow!("worker task join: {}", e),
        }),
    };

    if produced.is_err() {
        pool.abort_all();
    }
    cancel.cancel();
    queue.close();

    let mut report = RunReport::new(plan.count());
    let mut first_error = produced.err();
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok(Ok(partial)) => report.absorb(partial),
            Ok(Err(e)) => {
                if first_error.is_none() {
                    first_error = Some(anyhow::Error::new(e).context("worker aborted"));
                }
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => {
                if first_error.is_none() {
                    first_error = Some(anyhow::anyhow!("worker task join: {}", e));
                }
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    tracing::info!(
        workers,
        total = report.total,
        succeeded = report.succeeded,
        failed = report.failures.len(),
        bytes = report.bytes,
        "worker pool drained"
    );
    Ok(report)
}

/// Enqueue every item in order, then wait for the drain.
async fn produce(queue: &WorkQueue<WorkItem>, plan: &ItemPlan) -> Result<(), QueueError> {
    for item in plan.items() {
        let index = item.index();
        queue.enqueue(item).await?;
        tracing::trace!(index, "item queued");
    }
    queue.join().await;
    tracing::debug!("queue joined");
    Ok(())
}

/// Dequeue → execute → acknowledge until cancelled or the queue closes.
async fn worker<F, S>(
    id: usize,
    queue: Arc<WorkQueue<WorkItem>>,
    fetcher: Arc<F>,
    store: Arc<S>,
    cancel: CancellationToken,
) -> Result<RunReport, QueueError>
where
    F: Fetch + ?Sized,
    S: Persist + ?Sized,
{
    let mut report = RunReport::default();
    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = queue.dequeue() => match item {
                Some(item) => item,
                None => break,
            },
        };

        match fetch_then_persist(fetcher.as_ref(), store.as_ref(), &item).await {
            Ok(bytes) => {
                tracing::debug!(
                    worker = id,
                    index = item.index(),
                    artifact = item.name(),
                    bytes,
                    remaining = queue.unfinished().saturating_sub(1),
                    "item done"
                );
                report.record_success(bytes);
            }
            Err(e) => {
                tracing::error!(
                    worker = id,
                    index = item.index(),
                    url = item.url(),
                    artifact = item.name(),
                    kind = %e.kind(),
                    "{}",
                    e
                );
                report.record_failure(&item, &e);
            }
        }
        queue.mark_done()?;
    }
    tracing::trace!(worker = id, "worker stopped");
    Ok(report)
}
