//! Strictly Pursuit - rules engine for a hidden-movement pursuit game.
//!
//! One concealed evader (Mr X) flees several pursuers (detectives) across a
//! graph of stations joined by typed transit links. Every move spends a
//! ticket; the evader's position is only disclosed on scheduled turns.
//!
//! # Architecture
//!
//! - **Board**: immutable station graph and starting pools
//! - **Tickets**: enum-indexed ledger of movement rights
//! - **Match**: the state machine (legality, application, turn switching,
//!   win evaluation)
//! - **Contracts / invariants**: preconditions checked on every move,
//!   postconditions asserted in debug builds
//! - **Events**: per-audience dispatches with explicit redaction
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rand::SeedableRng;
//! use strictly_pursuit::{Board, MatchRules, MatchSetup, ParticipantId};
//!
//! let setup = MatchSetup::new(Arc::new(Board::classic()), MatchRules::default());
//! let mut rng = rand::rngs::StdRng::seed_from_u64(1);
//! let game = setup
//!     .deal(&[ParticipantId(1), ParticipantId(2), ParticipantId(3)], &mut rng)
//!     .expect("classic board seats three");
//! assert!(game.is_evader_turn());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
pub mod contracts;
mod events;
mod game;
pub mod invariants;
mod piece;
pub mod rules;
mod setup;
mod tickets;

pub use action::{Move, MoveRejection};
pub use board::{Board, BoardDefinition, BoardError, Connection, StartingPools, Station, StationId, Transit};
pub use events::{Audience, Dispatch, MatchEvent, PieceView, Sighting};
pub use game::Match;
pub use piece::{ParticipantId, Piece, PieceColor, PieceId, Side, PURSUER_COLORS};
pub use rules::MatchRules;
pub use setup::{MatchSetup, SetupError, MAX_PARTICIPANTS, MIN_PARTICIPANTS};
pub use tickets::{Allowance, TicketLedger, TicketType};

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Arc;

    /// Classic board, evader on 1, pursuers on 3 and 5, default rules.
    ///
    /// Returns the match, the evader's owner, and the pursuers' owners.
    pub(crate) fn classic_match() -> (Match, ParticipantId, Vec<ParticipantId>) {
        let evader = ParticipantId(10);
        let pursuers = vec![ParticipantId(20), ParticipantId(30)];
        let pieces = vec![
            Piece::evader(evader, StationId(1)),
            Piece::pursuer(PieceId(2), pursuers[0], StationId(3), PieceColor::Blue),
            Piece::pursuer(PieceId(3), pursuers[1], StationId(5), PieceColor::Red),
        ];
        let game = Match::new(Arc::new(Board::classic()), pieces, MatchRules::default())
            .expect("valid fixture");
        (game, evader, pursuers)
    }
}
