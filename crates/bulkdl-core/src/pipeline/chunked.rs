//! Chunked batch gather.
//!
//! Items are split into consecutive chunks; every item of a chunk is launched
//! at once and the whole chunk is awaited before the next one starts. The first
//! failure aborts the rest of its chunk and ends the run; siblings that already
//! finished keep their artifacts.

use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::items::ItemPlan;
use crate::storage::Persist;
use crate::task::fetch_then_persist;
use crate::transport::Fetch;

use super::RunReport;

/// Run `plan` in chunks of `chunk_size` items (clamped to ≥ 1). On failure the
/// returned error wraps the `TaskError` of the first item that failed.
pub async fn run_chunked<F, S>(
    plan: &ItemPlan,
    chunk_size: usize,
    fetcher: Arc<F>,
    store: Arc<S>,
) -> Result<RunReport>
where
    F: Fetch + ?Sized + 'static,
    S: Persist + ?Sized + 'static,
{
    let chunk_size = chunk_size.max(1);
    let chunk_count = plan.chunk_count(chunk_size);
    let mut report = RunReport::new(plan.count());

    for (n, chunk) in plan.chunks(chunk_size).enumerate() {
        let first = chunk.first().map(|i| i.index()).unwrap_or_default();
        let len = chunk.len();
        tracing::debug!(chunk = n, first, len, "chunk launched");

        let mut tasks = JoinSet::new();
        for item in chunk {
            let fetcher = Arc::clone(&fetcher);
            let store = Arc::clone(&store);
            tasks.spawn(async move {
                let res = fetch_then_persist(fetcher.as_ref(), store.as_ref(), &item).await;
                (item, res)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (item, res) = joined.map_err(|e| anyhow::anyhow!("chunk task join: {}", e))?;
            match res {
                Ok(bytes) => {
                    report.record_success(bytes);
                    tracing::debug!(
                        index = item.index(),
                        artifact = item.name(),
                        bytes,
                        done = report.succeeded,
                        "item done"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        chunk = n,
                        index = item.index(),
                        url = item.url(),
                        artifact = item.name(),
                        kind = %e.kind(),
                        "{}",
                        e
                    );
                    // Dropping `tasks` aborts the chunk's remaining items.
                    return Err(anyhow::Error::new(e)
                        .context(format!("chunk {} of {}", n + 1, chunk_count)));
                }
            }
        }
        tracing::info!(chunk = n + 1, of = chunk_count, done = report.succeeded, "chunk complete");
    }

    Ok(report)
}
