//! Strictly Pursuit server - matchmaking and transport for pursuit matches.
//!
//! # Architecture
//!
//! - **Lobby**: connected participants and the matchmaking queue
//! - **Actor**: one task per match, the single writer of its state
//! - **Roster**: per-match participant bindings and event fan-out
//! - **Protocol**: JSON messages exchanged over WebSocket
//! - **Config**: TOML server configuration
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_pursuit::MatchSetup;
//! use strictly_pursuit_server::{Lobby, ServerConfig, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let board = config.load_board()?;
//! let setup = MatchSetup::new(Arc::new(board), config.rules());
//! let lobby = Lobby::new(setup, *config.match_size(), config.rng());
//!
//! let listener = tokio::net::TcpListener::bind(("127.0.0.1", 3000)).await?;
//! axum::serve(listener, router(lobby)).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod actor;
mod config;
mod lobby;
mod participant;
mod protocol;
mod roster;
mod ws;

pub use actor::{MatchActor, MatchCommand, MatchHandle, MatchId};
pub use config::{ConfigError, ServerConfig};
pub use lobby::Lobby;
pub use participant::{Outbound, ParticipantHandle};
pub use protocol::{ClientMessage, ServerMessage};
pub use roster::Roster;
pub use ws::router;
