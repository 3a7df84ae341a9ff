use clap::Parser;

use crate::bench::{BackendKind, BenchMode};

#[derive(Parser, Debug, PartialEq)]
#[command(version, about = "Compare query latency across database, memory and file backends")]
pub struct CliArgs {
    #[arg(short, long)]
    pub config: Option<String>,
    #[arg(short, long, value_enum)]
    pub mode: Option<BenchMode>,
    #[arg(short, long, value_enum)]
    pub single: Option<BackendKind>,
    #[arg(short, long)]
    pub trials: Option<u32>,
    /// Print the report as JSON instead of per-trial lines.
    #[arg(long)]
    pub json: bool,
}
