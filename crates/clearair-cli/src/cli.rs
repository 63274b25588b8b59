//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Command;

/// ClearAir API client.
#[derive(Parser, Debug)]
#[command(name = "clearair")]
#[command(author, version = env!("CLEARAIR_VERSION"), about, long_about = None)]
pub struct Cli {
    /// API base URL
    #[arg(
        long,
        env = "CLEARAIR_API",
        default_value = "https://api.clearair.app",
        global = true
    )]
    pub api: String,

    /// Session file (defaults to the user data directory)
    #[arg(long, env = "CLEARAIR_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}
