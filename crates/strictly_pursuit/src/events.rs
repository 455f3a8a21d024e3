//! Events a match emits and who may see them.
//!
//! Redaction is decided here, by the match, and expressed in the type of
//! the position field. Collaborators only route.

use crate::board::StationId;
use crate::piece::{ParticipantId, Piece, PieceColor, PieceId, Side};
use crate::tickets::{Allowance, TicketType};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A station as a particular recipient is allowed to see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sighting {
    /// True position.
    Visible(StationId),
    /// Position withheld.
    Hidden,
}

impl Sighting {
    /// Returns the station if visible.
    pub fn station(self) -> Option<StationId> {
        match self {
            Sighting::Visible(station) => Some(station),
            Sighting::Hidden => None,
        }
    }
}

/// Something that happened in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A piece moved (or the evader declared a double move).
    MoveApplied {
        /// Acting piece.
        piece: PieceId,
        /// Destination as this recipient may see it.
        destination: Sighting,
        /// Ticket spent.
        ticket: TicketType,
    },
    /// A ticket was spent. Broadcast even when the destination is hidden.
    TicketUsed {
        /// Ticket spent.
        ticket: TicketType,
    },
    /// The turn passed to the other side.
    TurnSwitched {
        /// Side now on turn.
        now: Side,
    },
    /// The match is over.
    GameOver {
        /// Winning side.
        winner: Side,
    },
}

/// Recipients of a dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Every participant in the match.
    Everyone,
    /// A single participant.
    Only(ParticipantId),
    /// Everyone except one participant.
    AllBut(ParticipantId),
}

impl Audience {
    /// Returns true if `participant` should receive the event.
    pub fn includes(self, participant: ParticipantId) -> bool {
        match self {
            Audience::Everyone => true,
            Audience::Only(p) => p == participant,
            Audience::AllBut(p) => p != participant,
        }
    }
}

/// An event addressed to an audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    /// Who receives it.
    pub audience: Audience,
    /// What they receive.
    pub event: MatchEvent,
}

impl Dispatch {
    /// Event for every participant.
    pub fn everyone(event: MatchEvent) -> Self {
        Self {
            audience: Audience::Everyone,
            event,
        }
    }

    /// Event for one participant.
    pub fn only(participant: ParticipantId, event: MatchEvent) -> Self {
        Self {
            audience: Audience::Only(participant),
            event,
        }
    }

    /// Event for everyone except one participant.
    pub fn all_but(participant: ParticipantId, event: MatchEvent) -> Self {
        Self {
            audience: Audience::AllBut(participant),
            event,
        }
    }
}

/// A piece as shown to one participant at match start.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct PieceView {
    /// Piece id.
    id: PieceId,
    /// Station, hidden for the evader unless the viewer owns it.
    station: Sighting,
    /// True for Mr X.
    is_evader: bool,
    /// Display colour.
    color: PieceColor,
    /// Remaining tickets as ordered pairs.
    tickets: Vec<(TicketType, Allowance)>,
}

impl PieceView {
    /// Builds the view of `piece` for `viewer`.
    pub fn of(piece: &Piece, viewer: ParticipantId) -> Self {
        let station = if piece.is_evader() && piece.owner() != viewer {
            Sighting::Hidden
        } else {
            Sighting::Visible(piece.station())
        };
        Self {
            id: piece.id(),
            station,
            is_evader: piece.is_evader(),
            color: piece.color(),
            tickets: piece.tickets().entries(),
        }
    }
}
