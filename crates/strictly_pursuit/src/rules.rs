//! Match-length and disclosure rules, plus win detection.

use crate::game::Match;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::instrument;

/// Default number of evader turn cycles before the evader wins.
pub const DEFAULT_MAX_EVADER_TURNS: u32 = 23;

/// Default turn cycles on which the evader's position is revealed.
pub const DEFAULT_REVEAL_TURNS: [u32; 2] = [1, 3];

/// Per-match rule parameters.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MatchRules {
    /// Evader wins once this many turn cycles have completed.
    max_evader_turns: u32,
    /// Turn-cycle indices on which the evader is revealed to everyone.
    reveal_turns: BTreeSet<u32>,
}

impl MatchRules {
    /// Creates rules with an explicit limit and reveal schedule.
    pub fn new(max_evader_turns: u32, reveal_turns: impl IntoIterator<Item = u32>) -> Self {
        Self {
            max_evader_turns,
            reveal_turns: reveal_turns.into_iter().collect(),
        }
    }

    /// Returns true if the evader is revealed during `turn`.
    pub fn reveals_on(&self, turn: u32) -> bool {
        self.reveal_turns.contains(&turn)
    }
}

impl Default for MatchRules {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVADER_TURNS, DEFAULT_REVEAL_TURNS)
    }
}

/// Returns true if a pursuer stands on the evader's station.
#[instrument(skip(game))]
pub fn is_captured(game: &Match) -> bool {
    let evader = game.evader().station();
    game.pursuers().any(|p| p.station() == evader)
}

/// Returns true if every station next to the evader is occupied.
///
/// An evader with no neighbours at all is boxed in as well.
#[instrument(skip(game))]
pub fn is_boxed_in(game: &Match) -> bool {
    let evader = game.evader().station();
    game.board()
        .neighbors_of(evader)
        .into_iter()
        .all(|station| game.pieces().iter().any(|p| p.station() == station))
}

/// Returns true if the evader has survived the configured number of turns.
pub fn has_outlasted(game: &Match) -> bool {
    game.evader_turns() >= *game.rules().max_evader_turns()
}
