//! Strictly Pursuit - server binary
//!
//! Loads configuration, then serves matches over WebSocket or checks a
//! board file.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use strictly_pursuit::MatchSetup;
use strictly_pursuit_server::{Lobby, ServerConfig, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    match cli.command {
        Command::Serve { port, host } => run_server(config.with_address(host, port)).await,
        Command::CheckBoard { board } => check_board(config.with_board(board)),
    }
}

/// Run the WebSocket game server
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    let board = config.load_board()?;
    config.validate(&board)?;

    let setup = MatchSetup::new(Arc::new(board), config.rules());
    let lobby = Lobby::new(setup, *config.match_size(), config.rng());
    let app = router(lobby);

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!(
        "Server ready at ws://{}:{}/ws",
        config.host(),
        config.port()
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Validate the configured board and report its shape
#[instrument(skip(config))]
fn check_board(config: ServerConfig) -> Result<()> {
    let board = config.load_board()?;
    config.validate(&board)?;
    info!(
        stations = board.stations().len(),
        connections = board.connections().len(),
        match_size = config.match_size(),
        "Board is playable"
    );
    Ok(())
}
