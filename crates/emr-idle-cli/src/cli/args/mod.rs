use clap::{Parser, ValueEnum};
use emr_idle_core::SourceKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "emr-idle",
    version,
    about = "Compute how long an EMR cluster sat ready but idle between jobs"
)]
pub struct Cli {
    /// Cluster identifier (j-XXXXXXXXXXXXX)
    pub cluster_id: String,

    /// Where work is recorded: submitted steps, or MapReduce job history logs
    #[arg(long, value_enum)]
    pub source: Option<SourceArg>,

    /// YAML config file
    #[arg(long, env = "EMR_IDLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read saved describe-cluster/list-steps responses from this directory
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    /// AWS region for the CLI and the S3 client
    #[arg(long)]
    pub region: Option<String>,

    /// AWS CLI profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Pause before reading the log archive, in milliseconds
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    /// Steps submitted through the EMR API
    Steps,
    /// Job history files under the cluster's log URI
    History,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Steps => SourceKind::Steps,
            SourceArg::History => SourceKind::History,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One summary line
    Plain,
    /// Full report as JSON
    Json,
    /// Intervals and gaps, overlaps marked
    Table,
}

#[cfg(test)]
mod tests;
