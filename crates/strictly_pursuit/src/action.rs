//! First-class move descriptors and rejection reasons.
//!
//! A move is the participant's intent. It is validated against the match
//! before anything is mutated, and a rejected move leaves no trace.

use crate::board::StationId;
use crate::piece::PieceId;
use crate::tickets::TicketType;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A declared move: which piece, where to, and which ticket pays for it.
///
/// Spending a [`TicketType::Double`] is a declaration rather than a
/// journey; the destination is ignored for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Acting piece.
    pub piece: PieceId,
    /// Destination station.
    pub destination: StationId,
    /// Ticket to spend.
    pub ticket: TicketType,
}

impl Move {
    /// Creates a new move.
    #[instrument]
    pub fn new(piece: PieceId, destination: StationId, ticket: TicketType) -> Self {
        Self {
            piece,
            destination,
            ticket,
        }
    }

    /// Declares a double move for `piece` without relocating it.
    pub fn double(piece: PieceId, current: StationId) -> Self {
        Self::new(piece, current, TicketType::Double)
    }

    /// Returns true if this move declares a double move.
    pub fn is_double_declaration(&self) -> bool {
        self.ticket == TicketType::Double
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_double_declaration() {
            write!(f, "piece {} declares double move", self.piece)
        } else {
            write!(
                f,
                "piece {} -> station {} by {}",
                self.piece, self.destination, self.ticket
            )
        }
    }
}

/// Why a move was refused.
///
/// Rejections are the expected response to bad client input. They never
/// mutate the match and are never fatal, except for
/// [`MoveRejection::InvariantViolation`], which only a postcondition raises.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveRejection {
    /// The match already has a winner.
    #[display("Game is already over")]
    GameOver,

    /// No piece with this id exists.
    #[display("Piece {} does not exist", _0)]
    UnknownPiece(PieceId),

    /// No station with this number exists.
    #[display("Station {} does not exist", _0)]
    UnknownStation(StationId),

    /// The requester does not own the piece.
    #[display("Piece {} belongs to someone else", _0)]
    NotOwner(PieceId),

    /// The piece's side is not on turn.
    #[display("It's not piece {}'s turn", _0)]
    NotYourTurn(PieceId),

    /// A double move cannot be declared right now.
    #[display("Piece {} cannot declare a double move", _0)]
    DoubleMoveUnavailable(PieceId),

    /// The piece has used up its moves for this turn.
    #[display("Piece {} already moved this turn", _0)]
    AlreadyMoved(PieceId),

    /// No direct connection to the destination.
    #[display("Station {} is not adjacent to station {}", to, from)]
    NotAdjacent {
        /// Current station.
        from: StationId,
        /// Requested destination.
        to: StationId,
    },

    /// A pursuer already stands on the destination.
    #[display("Station {} is occupied by a pursuer", _0)]
    OccupiedByPursuer(StationId),

    /// The ticket cannot ride any connection to the destination.
    #[display("{} ticket is not valid on this connection", _0)]
    WrongTicket(TicketType),

    /// The piece has no ticket of this type left.
    #[display("Piece has no {} tickets left", _0)]
    OutOfTickets(TicketType),

    /// Applying the move broke a match invariant.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MoveRejection {}
