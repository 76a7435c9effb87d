//! Tests for applying CLI overrides on top of the config file.

use crate::cli::Overrides;
use bulkdl_core::config::{BulkConfig, StrategyKind};
use bulkdl_core::pipeline::Strategy;

#[test]
fn no_overrides_keeps_config() {
    let cfg = Overrides::default().apply(BulkConfig::default());
    assert_eq!(cfg, BulkConfig::default());
}

#[test]
fn overrides_replace_config_values() {
    let overrides = Overrides {
        strategy: Some(StrategyKind::Chunked),
        chunk_size: Some(2),
        count: Some(5),
        ..Overrides::default()
    };
    let cfg = overrides.apply(BulkConfig::default());
    assert_eq!(cfg.strategy(), Strategy::Chunked { chunk_size: 2 });
    assert_eq!(cfg.count, 5);
    assert_eq!(cfg.workers, 50);
}

#[test]
fn load_uses_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bulkdl.toml");
    std::fs::write(&path, "count = 3\nworkers = 2\n").unwrap();
    let overrides = Overrides {
        config: Some(path),
        workers: Some(7),
        ..Overrides::default()
    };
    let cfg = overrides.load().unwrap();
    assert_eq!(cfg.count, 3);
    assert_eq!(cfg.strategy(), Strategy::WorkerPool { workers: 7 });
}
