//! CLI for the bulkdl fetch pipeline.

mod commands;

use anyhow::Result;
use bulkdl_core::config::{self, BulkConfig, StrategyKind};
use bulkdl_core::transport::CurlSession;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_fetch, run_plan};

/// Exit code when the run finished but some items failed.
pub const EXIT_PARTIAL: i32 = 2;

/// Top-level CLI for bulkdl.
#[derive(Debug, Parser)]
#[command(name = "bulkdl")]
#[command(about = "bulkdl: fetch a list of URLs into files with bounded concurrency", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every item and write one file per item.
    Run {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// List the items a run would fetch, without touching the network.
    Plan {
        #[command(flatten)]
        overrides: Overrides,
        /// Show at most N items.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
}

/// Settings that override the config file for one invocation.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Read this config file instead of ~/.config/bulkdl/config.toml.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// "workers" (fixed pool draining a bounded queue) or "chunked" (batches).
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<StrategyKind>,
    /// Worker pool size for the workers strategy.
    #[arg(long, value_name = "N", value_parser = parse_positive)]
    pub workers: Option<usize>,
    /// Items per chunk for the chunked strategy.
    #[arg(long, value_name = "N", value_parser = parse_positive)]
    pub chunk_size: Option<usize>,
    /// Number of items (indices 0..N).
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,
    /// Items are fetched from <BASE_URL>/<index>.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Output file name; {index} is replaced with the item index.
    #[arg(long)]
    pub name_pattern: Option<String>,
    /// Directory to write files into.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl Overrides {
    /// Load the config (explicit path or default location) and apply overrides.
    pub fn load(&self) -> Result<BulkConfig> {
        let cfg = match &self.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        Ok(self.apply(cfg))
    }

    pub fn apply(&self, mut cfg: BulkConfig) -> BulkConfig {
        if let Some(strategy) = self.strategy {
            cfg.strategy = strategy;
        }
        if let Some(workers) = self.workers {
            cfg.workers = workers;
        }
        if let Some(chunk_size) = self.chunk_size {
            cfg.chunk_size = chunk_size;
        }
        if let Some(count) = self.count {
            cfg.count = count;
        }
        if let Some(base_url) = &self.base_url {
            cfg.base_url = base_url.clone();
        }
        if let Some(pattern) = &self.name_pattern {
            cfg.name_pattern = pattern.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        cfg
    }
}

fn parse_strategy(s: &str) -> Result<StrategyKind, String> {
    match s.to_ascii_lowercase().as_str() {
        "workers" | "worker-pool" | "pool" => Ok(StrategyKind::Workers),
        "chunked" | "chunks" => Ok(StrategyKind::Chunked),
        other => Err(format!("unknown strategy {:?} (expected workers or chunked)", other)),
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl CliCommand {
    /// Parse arguments, run the command, and return the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Run { overrides } => {
                let cfg = overrides.load()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let session = CurlSession::new(cfg.transport_options());
                let report = run_fetch(&cfg, session).await?;
                Ok(if report.is_success() { 0 } else { EXIT_PARTIAL })
            }
            CliCommand::Plan { overrides, limit } => {
                let cfg = overrides.load()?;
                run_plan(&cfg, limit)?;
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
