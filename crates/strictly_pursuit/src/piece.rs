//! Pieces, sides, and participant identity.

use crate::board::StationId;
use crate::tickets::TicketLedger;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Piece identifier within a match. The evader is always piece 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PieceId(pub u32);

impl PieceId {
    /// The evader's piece.
    pub const EVADER: PieceId = PieceId(1);
}

/// Opaque identity of a connected participant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

/// The two sides of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Mr X.
    Evader,
    /// The detectives.
    Pursuers,
}

/// Display colour of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PieceColor {
    /// Evader colour.
    LightGrey,
    /// First pursuer.
    Blue,
    /// Second pursuer.
    Red,
    /// Third pursuer.
    Yellow,
    /// Fourth pursuer.
    DarkGreen,
    /// Fifth pursuer.
    White,
}

/// Pursuer colours in join order.
pub const PURSUER_COLORS: [PieceColor; 5] = [
    PieceColor::Blue,
    PieceColor::Red,
    PieceColor::Yellow,
    PieceColor::DarkGreen,
    PieceColor::White,
];

/// A piece on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub(crate) id: PieceId,
    pub(crate) station: StationId,
    pub(crate) is_evader: bool,
    pub(crate) tickets: TicketLedger,
    pub(crate) owner: ParticipantId,
    pub(crate) color: PieceColor,
}

impl Piece {
    /// Creates the evader's piece (always [`PieceId::EVADER`]).
    pub fn evader(owner: ParticipantId, station: StationId) -> Self {
        Self {
            id: PieceId::EVADER,
            station,
            is_evader: true,
            tickets: TicketLedger::evader(),
            owner,
            color: PieceColor::LightGrey,
        }
    }

    /// Creates a pursuer's piece.
    pub fn pursuer(id: PieceId, owner: ParticipantId, station: StationId, color: PieceColor) -> Self {
        Self {
            id,
            station,
            is_evader: false,
            tickets: TicketLedger::pursuer(),
            owner,
            color,
        }
    }

    /// Replaces the starting ledger.
    pub fn with_tickets(mut self, tickets: TicketLedger) -> Self {
        self.tickets = tickets;
        self
    }

    /// Piece id.
    pub fn id(&self) -> PieceId {
        self.id
    }

    /// Current station.
    pub fn station(&self) -> StationId {
        self.station
    }

    /// True for Mr X.
    pub fn is_evader(&self) -> bool {
        self.is_evader
    }

    /// Side this piece plays for.
    pub fn side(&self) -> Side {
        if self.is_evader {
            Side::Evader
        } else {
            Side::Pursuers
        }
    }

    /// Remaining tickets.
    pub fn tickets(&self) -> &TicketLedger {
        &self.tickets
    }

    /// Owning participant.
    pub fn owner(&self) -> ParticipantId {
        self.owner
    }

    /// Display colour.
    pub fn color(&self) -> PieceColor {
        self.color
    }
}
