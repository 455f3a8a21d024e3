//! Server configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use strictly_pursuit::{
    Board, BoardDefinition, MatchRules, MAX_PARTICIPANTS, MIN_PARTICIPANTS,
};
use tracing::{debug, info, instrument};

/// Configuration for the pursuit server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// Participants per match, evader included.
    #[serde(default = "default_match_size")]
    match_size: usize,

    /// Evader turn cycles survived to win.
    #[serde(default = "default_max_evader_turns")]
    max_evader_turns: u32,

    /// Turn cycles on which the evader is shown to everyone.
    #[serde(default = "default_reveal_turns")]
    reveal_turns: Vec<u32>,

    /// Board definition file. The built-in board is used when absent.
    #[serde(default)]
    board: Option<PathBuf>,

    /// Seed for dealing matches. Entropy is used when absent.
    #[serde(default)]
    seed: Option<u64>,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    3000
}

#[instrument]
fn default_match_size() -> usize {
    3
}

#[instrument]
fn default_max_evader_turns() -> u32 {
    strictly_pursuit::rules::DEFAULT_MAX_EVADER_TURNS
}

#[instrument]
fn default_reveal_turns() -> Vec<u32> {
    strictly_pursuit::rules::DEFAULT_REVEAL_TURNS.to_vec()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            match_size: default_match_size(),
            max_evader_turns: default_max_evader_turns(),
            reveal_turns: default_reveal_turns(),
            board: None,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(
            host = %config.host,
            port = config.port,
            match_size = config.match_size,
            "Config loaded successfully"
        );
        Ok(config)
    }

    /// Applies command-line overrides for the listen address.
    pub fn with_address(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// Replaces the board file.
    pub fn with_board(mut self, board: Option<PathBuf>) -> Self {
        if board.is_some() {
            self.board = board;
        }
        self
    }

    /// Match rules built from this configuration.
    pub fn rules(&self) -> MatchRules {
        MatchRules::new(self.max_evader_turns, self.reveal_turns.iter().copied())
    }

    /// Random source for dealing matches.
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Loads the configured board, or the built-in board when none is set.
    #[instrument(skip(self), fields(board = ?self.board))]
    pub fn load_board(&self) -> Result<Board, ConfigError> {
        let Some(path) = &self.board else {
            debug!("Using built-in board");
            return Ok(Board::classic());
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("Failed to read board file: {}", e)))?;
        let definition: BoardDefinition = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse board: {}", e)))?;
        let board = Board::from_definition(definition)
            .map_err(|e| ConfigError::new(format!("Invalid board: {}", e)))?;

        info!(
            stations = board.stations().len(),
            connections = board.connections().len(),
            "Board loaded"
        );
        Ok(board)
    }

    /// Checks that every match this configuration deals can be seated on
    /// `board`.
    #[instrument(skip(self, board), fields(match_size = self.match_size))]
    pub fn validate(&self, board: &Board) -> Result<(), ConfigError> {
        if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&self.match_size) {
            return Err(ConfigError::new(format!(
                "match_size must be between {} and {}, got {}",
                MIN_PARTICIPANTS, MAX_PARTICIPANTS, self.match_size
            )));
        }
        if self.max_evader_turns == 0 {
            return Err(ConfigError::new(
                "max_evader_turns must be positive".to_string(),
            ));
        }

        let pools = board.starting_positions();
        let pursuer_pool: BTreeSet<_> = pools.pursuers().iter().copied().collect();
        let needed = self.match_size - 1;
        for start in pools.evader() {
            let free = pursuer_pool.iter().filter(|s| *s != start).count();
            if free < needed {
                return Err(ConfigError::new(format!(
                    "Pursuer pool seats {} pursuers when the evader starts on {}, match_size needs {}",
                    free, start, needed
                )));
            }
        }
        debug!("Config validated against board");
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
