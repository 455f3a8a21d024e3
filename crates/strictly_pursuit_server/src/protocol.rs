//! JSON wire protocol between participants and the server.
//!
//! Every message is an object tagged by a kebab-case `type` field.

use serde::{Deserialize, Serialize};
use strictly_pursuit::{
    Connection, MatchEvent, PieceId, PieceView, Side, Sighting, Station, StationId, TicketType,
};

/// Messages a participant sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Move a piece (or declare a double move).
    DeclareMove {
        /// Piece to move.
        piece_id: PieceId,
        /// Destination station.
        destination: StationId,
        /// Ticket to spend.
        ticket: TicketType,
    },
    /// Enter the matchmaking queue.
    JoinQueue {
        /// Display name shown in the lobby.
        name: String,
    },
    /// Leave the matchmaking queue.
    LeaveQueue,
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Who is playing and who is waiting.
    LobbySnapshot {
        /// Names of participants in a match.
        playing: Vec<String>,
        /// Names of queued participants, oldest first.
        searching: Vec<String>,
    },
    /// A match began; sent once per seat with that seat's view.
    MatchStarted {
        /// Board stations.
        stations: Vec<Station>,
        /// Board connections.
        connections: Vec<Connection>,
        /// Pieces as this recipient may see them.
        pieces: Vec<PieceView>,
        /// Pieces this recipient controls.
        owned_piece_ids: Vec<PieceId>,
        /// True if the evader moves first.
        is_evader_turn: bool,
    },
    /// A piece moved.
    MoveApplied {
        /// Acting piece.
        piece_id: PieceId,
        /// Destination as this recipient may see it.
        destination: Sighting,
        /// Ticket spent.
        ticket: TicketType,
    },
    /// A ticket was spent.
    TicketUsed {
        /// Ticket spent.
        ticket: TicketType,
    },
    /// The turn passed to the other side.
    TurnSwitched {
        /// Side now on turn.
        whose_turn_now: Side,
    },
    /// The match is over.
    GameOver {
        /// Winning side.
        winner: Side,
    },
}

impl From<MatchEvent> for ServerMessage {
    fn from(event: MatchEvent) -> Self {
        match event {
            MatchEvent::MoveApplied {
                piece,
                destination,
                ticket,
            } => ServerMessage::MoveApplied {
                piece_id: piece,
                destination,
                ticket,
            },
            MatchEvent::TicketUsed { ticket } => ServerMessage::TicketUsed { ticket },
            MatchEvent::TurnSwitched { now } => ServerMessage::TurnSwitched {
                whose_turn_now: now,
            },
            MatchEvent::GameOver { winner } => ServerMessage::GameOver { winner },
        }
    }
}
