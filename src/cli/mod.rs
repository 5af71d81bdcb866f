//! Command handlers for the `heartfile` binary.

mod serve;
mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use heartfile::HeartConfig;

pub(crate) use serve::cmd_serve;
pub(crate) use status::cmd_status;

/// Flags shared by commands that need heartbeat configuration.
#[derive(Args, Debug)]
pub(crate) struct ConfigArgs {
    /// Config file (defaults to ~/.heartfile/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Heartbeat file whose modification time advertises liveness
    #[arg(long)]
    heartbeat_path: Option<PathBuf>,
}

impl ConfigArgs {
    /// Load config (file, then env), then apply command-line overrides.
    pub(crate) fn resolve(&self) -> Result<HeartConfig> {
        let mut config = match &self.config {
            Some(path) => HeartConfig::load_from(path).with_context(|| {
                format!("Failed to load configuration from {}", path.display())
            })?,
            None => HeartConfig::load().with_context(|| {
                format!(
                    "Failed to load configuration from {}",
                    HeartConfig::path().display()
                )
            })?,
        };
        if let Some(heartbeat_path) = &self.heartbeat_path {
            config.heartbeat_path = heartbeat_path.clone();
        }
        Ok(config)
    }
}

/// Parse interval string like "1h", "30m", "15m", "60s" into seconds.
pub(crate) fn parse_interval(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();
    if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.parse().with_context(|| "Invalid hours value")?;
        n.checked_mul(3600).context("Interval too large")
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().with_context(|| "Invalid minutes value")?;
        n.checked_mul(60).context("Interval too large")
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().with_context(|| "Invalid seconds value")?;
        Ok(n)
    } else {
        s.parse::<u64>()
            .with_context(|| "Invalid interval. Use formats like 1h, 30m, or 60s")
    }
}
