use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::items::ItemPlan;
use crate::pipeline::Strategy;
use crate::transport::TransportOptions;

/// Which pipeline a run uses: a fixed worker pool or chunked batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Workers,
    Chunked,
}

/// Run configuration loaded from `~/.config/bulkdl/config.toml`.
/// Missing keys take the defaults below; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BulkConfig {
    /// Items are fetched from `<base_url>/<index>`.
    pub base_url: String,
    /// Number of items (indices `0..count`).
    pub count: usize,
    /// Artifact name; `{index}` is replaced with the item index.
    pub name_pattern: String,
    /// "workers" (default) or "chunked".
    pub strategy: StrategyKind,
    /// Worker pool size (and queue capacity) for the "workers" strategy.
    pub workers: usize,
    /// Items per chunk for the "chunked" strategy.
    pub chunk_size: usize,
    /// Directory artifacts are written to.
    pub output_dir: PathBuf,
    /// Optional transport tuning; if missing, built-in defaults are used.
    pub transport: Option<TransportOptions>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            base_url: "https://jsonplaceholder.typicode.com/posts".to_string(),
            count: 1000,
            name_pattern: "{index}.txt".to_string(),
            strategy: StrategyKind::Workers,
            workers: 50,
            chunk_size: 100,
            output_dir: PathBuf::from("."),
            transport: None,
        }
    }
}

impl BulkConfig {
    /// The selected strategy with its concurrency bound.
    pub fn strategy(&self) -> Strategy {
        match self.strategy {
            StrategyKind::Workers => Strategy::WorkerPool {
                workers: self.workers,
            },
            StrategyKind::Chunked => Strategy::Chunked {
                chunk_size: self.chunk_size,
            },
        }
    }

    /// Validated item plan for this configuration.
    pub fn plan(&self) -> Result<ItemPlan> {
        Ok(ItemPlan::new(&self.base_url, self.count, &self.name_pattern)?)
    }

    pub fn transport_options(&self) -> TransportOptions {
        self.transport.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BulkConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BulkConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<BulkConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: BulkConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
