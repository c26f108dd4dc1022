//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::Parser;
use std::path::PathBuf;

/// mailsleuth CLI
#[derive(Parser)]
#[command(name = "sleuthctl")]
#[command(about = "Investigate the public footprint of an email address", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Email address to investigate
    pub email: String,

    /// Emit the report as pretty-printed JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Overall deadline in milliseconds (overrides the config file)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Skip all network probes; heuristic extraction only
    #[arg(long)]
    pub offline: bool,

    /// Path to a TOML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose logging to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
