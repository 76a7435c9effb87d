//! `bulkdl plan` – list the items a run would fetch.

use anyhow::Result;
use bulkdl_core::config::BulkConfig;
use bulkdl_core::pipeline::Strategy;

pub fn run_plan(cfg: &BulkConfig, limit: Option<usize>) -> Result<()> {
    let plan = cfg.plan()?;
    let strategy = cfg.strategy();
    println!(
        "{} item(s), {}, at most {} in flight",
        plan.count(),
        strategy,
        strategy.concurrency()
    );
    if let Strategy::Chunked { chunk_size } = strategy {
        println!("{} chunk(s)", plan.chunk_count(chunk_size));
    }
    if plan.count() == 0 {
        return Ok(());
    }

    println!("{:<8} {:<20} {}", "INDEX", "NAME", "URL");
    let shown = limit.unwrap_or(usize::MAX);
    for item in plan.items().take(shown) {
        println!("{:<8} {:<20} {}", item.index(), item.name(), item.url());
    }
    if shown < plan.count() {
        println!("... {} more", plan.count() - shown);
    }
    Ok(())
}
