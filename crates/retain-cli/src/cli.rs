use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `retain` binary.
#[derive(Debug, Parser)]
#[command(name = "retain", version, about = "Spaced-repetition review for markdown question notes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (.toml, .json or .yaml)
    #[arg(short, long, global = true, env = "RETAIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Question database path (overrides config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Tenant whose questions are used
    #[arg(short, long, global = true, env = "RETAIN_TENANT", default_value = "default")]
    pub tenant: String,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Parse markdown question files and add new questions
    Import {
        /// Directories to scan (defaults to the configured question dirs)
        dirs: Vec<PathBuf>,
    },
    /// Review due questions interactively
    Review,
    /// List questions due now
    Due,
    /// Show learning statistics
    Stats,
    /// Delete a question by id
    Delete {
        /// Question id (as shown by `retain due`)
        id: String,
    },
}
