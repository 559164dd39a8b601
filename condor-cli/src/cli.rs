//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "condor",
    version,
    about = "Watch livestreams and launch a player when they go live"
)]
pub struct Args {
    /// Path to the configuration file (defaults to the per-user location)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Log errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Monitor configured streams and print transitions as they happen
    Watch {
        /// Poll interval in seconds (10-3600, overrides the configured value)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// One-shot liveness check of any URL
    Check {
        url: String,
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Launch a configured stream (by name or URL) in the player
    Play {
        stream: String,
        /// Use the alternate player profile
        #[arg(long)]
        alternate: bool,
    },

    /// Print the command `play` would run, without running it
    Command {
        stream: String,
        /// Use the alternate player profile
        #[arg(long)]
        alternate: bool,
    },

    /// List configured streams with their effective toggles
    List {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a starter configuration file if none exists
    Init,

    /// Print the configuration file location
    ConfigPath,

    /// Generate shell completion scripts
    Completions { shell: Shell },
}
