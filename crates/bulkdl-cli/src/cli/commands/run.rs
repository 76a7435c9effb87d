//! `bulkdl run` – fetch every item with the configured strategy.

use anyhow::{Context, Result};
use bulkdl_core::config::BulkConfig;
use bulkdl_core::pipeline::{self, RunReport};
use bulkdl_core::storage::DirStore;
use bulkdl_core::transport::CurlSession;
use std::sync::Arc;
use std::time::Instant;

/// Run the configured pipeline over `session`. The session is closed once the
/// pipeline returns, whether or not the run succeeded.
pub async fn run_fetch(cfg: &BulkConfig, session: CurlSession) -> Result<RunReport> {
    let result = fetch_all(cfg, &session).await;
    session.close();
    result
}

async fn fetch_all(cfg: &BulkConfig, session: &CurlSession) -> Result<RunReport> {
    let plan = cfg.plan()?;
    let strategy = cfg.strategy();
    let store = DirStore::create(&cfg.output_dir)
        .await
        .with_context(|| format!("output dir {}", cfg.output_dir.display()))?;

    let started = Instant::now();
    let report = pipeline::run_pipeline(
        strategy,
        &plan,
        Arc::new(session.clone()),
        Arc::new(store),
    )
    .await?;

    let elapsed = started.elapsed().as_secs_f64();
    println!(
        "{} of {} item(s) saved to {} ({} bytes, {:.1}s, {})",
        report.succeeded,
        report.total,
        cfg.output_dir.display(),
        report.bytes,
        elapsed,
        strategy
    );
    if !report.failures.is_empty() {
        eprintln!("{} item(s) failed:", report.failures.len());
        for f in &report.failures {
            eprintln!("  #{} {} -> {} [{}]: {}", f.index, f.url, f.name, f.kind, f.message);
        }
    }
    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failures.len(),
        elapsed_secs = elapsed,
        "run completed"
    );
    Ok(report)
}
