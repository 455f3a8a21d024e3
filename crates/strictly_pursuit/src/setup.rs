//! Dealing a new match: roles, starting stations, and ledgers.

use crate::board::{Board, StationId};
use crate::game::Match;
use crate::piece::{ParticipantId, Piece, PieceId, PURSUER_COLORS};
use crate::rules::MatchRules;
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Smallest playable roster: one evader and one pursuer.
pub const MIN_PARTICIPANTS: usize = 2;

/// Largest roster: one evader plus one pursuer per colour.
pub const MAX_PARTICIPANTS: usize = PURSUER_COLORS.len() + 1;

/// Why a match could not be created.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum SetupError {
    /// Too few participants for a match.
    #[display("Need at least {} participants, got {}", MIN_PARTICIPANTS, _0)]
    TooFewParticipants(usize),

    /// More participants than there are pursuer colours.
    #[display("At most {} participants are supported, got {}", MAX_PARTICIPANTS, _0)]
    TooManyParticipants(usize),

    /// The same participant was listed twice.
    #[display("Participant {} listed twice", _0)]
    DuplicateParticipant(ParticipantId),

    /// The pursuer pool cannot seat every pursuer apart from the evader.
    #[display("Pursuer pool has {} free stations for {} pursuers", available, needed)]
    PoolTooSmall {
        /// Stations left after removing the evader's start.
        available: usize,
        /// Pursuers to seat.
        needed: usize,
    },

    /// Two pieces share an id.
    #[display("Duplicate piece id")]
    DuplicatePiece,

    /// Not exactly one evader, or the evader is not piece 1.
    #[display("Exactly one evader with piece id 1 is required")]
    EvaderCount,

    /// A piece stands on a station that is not on the board.
    #[display("Piece placed on unknown station {}", _0)]
    UnknownStation(StationId),

    /// Two pursuers start on the same station.
    #[display("Pursuers may not start on the same station")]
    StackedPursuers,
}

impl std::error::Error for SetupError {}

/// Deals matches on one board under one rule set.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    board: Arc<Board>,
    rules: MatchRules,
}

impl MatchSetup {
    /// Creates a dealer.
    pub fn new(board: Arc<Board>, rules: MatchRules) -> Self {
        Self { board, rules }
    }

    /// Board matches are dealt on.
    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// Rules dealt matches use.
    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Deals a match for `participants`, given in join order.
    ///
    /// One participant is picked uniformly as the evader and starts on a
    /// random station from the evader pool. The rest become pursuers with
    /// ids 2.. in join order, seated on distinct stations from a shuffle of
    /// the pursuer pool that excludes the evader's start.
    #[instrument(skip(self, rng), fields(participants = participants.len()))]
    pub fn deal<R: Rng + ?Sized>(
        &self,
        participants: &[ParticipantId],
        rng: &mut R,
    ) -> Result<Match, SetupError> {
        if participants.len() < MIN_PARTICIPANTS {
            return Err(SetupError::TooFewParticipants(participants.len()));
        }
        if participants.len() > MAX_PARTICIPANTS {
            return Err(SetupError::TooManyParticipants(participants.len()));
        }
        for (i, p) in participants.iter().enumerate() {
            if participants[..i].contains(p) {
                return Err(SetupError::DuplicateParticipant(*p));
            }
        }

        let pools = self.board.starting_positions();
        let evader_index = rng.gen_range(0..participants.len());
        let evader_owner = participants[evader_index];
        let evader_start = *pools
            .evader()
            .choose(rng)
            .ok_or(SetupError::PoolTooSmall {
                available: 0,
                needed: 1,
            })?;

        let mut starts: Vec<StationId> = pools
            .pursuers()
            .iter()
            .copied()
            .filter(|s| *s != evader_start)
            .collect();
        starts.sort();
        starts.dedup();
        let needed = participants.len() - 1;
        if starts.len() < needed {
            return Err(SetupError::PoolTooSmall {
                available: starts.len(),
                needed,
            });
        }
        starts.shuffle(rng);

        let mut pieces = vec![Piece::evader(evader_owner, evader_start)];
        let pursuer_owners = participants.iter().filter(|p| **p != evader_owner);
        for (seat, (owner, station)) in pursuer_owners.zip(starts).enumerate() {
            pieces.push(Piece::pursuer(
                PieceId(seat as u32 + 2),
                *owner,
                station,
                PURSUER_COLORS[seat],
            ));
        }

        debug!(
            evader = %evader_owner,
            evader_start = %evader_start,
            "Roles dealt"
        );
        Match::new(Arc::clone(&self.board), pieces, self.rules.clone())
    }
}
