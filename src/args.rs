use std::path::PathBuf;

use clap::Parser;

/// Indoor air-quality monitor.
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    /// JSON config file; also holds the persisted sensor baseline.
    #[arg(long, env = "AIRWATCH_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Stop after this many ticks instead of running forever.
    #[arg(long)]
    pub ticks: Option<u64>,
}
