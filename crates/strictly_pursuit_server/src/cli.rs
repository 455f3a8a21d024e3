//! Command-line interface for strictly_pursuit.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Pursuit - hidden-movement pursuit game server
#[derive(Parser, Debug)]
#[command(name = "strictly_pursuit")]
#[command(about = "Matchmaking and WebSocket server for hidden-movement pursuit games", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket game server
    Serve {
        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Validate a board file against the configured match size
    CheckBoard {
        /// Board file to check (overrides config)
        board: Option<PathBuf>,
    },
}
