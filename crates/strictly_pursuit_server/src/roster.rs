//! Binds participants to the pieces of one match and fans events out.

use crate::participant::ParticipantHandle;
use crate::protocol::ServerMessage;
use strictly_pursuit::{Dispatch, Match, ParticipantId};
use tracing::{debug, info, instrument};

/// Participants seated in one match, in join order.
///
/// A participant removed from the roster keeps its piece on the board but
/// receives nothing further.
#[derive(Debug, Clone)]
pub struct Roster {
    seats: Vec<ParticipantHandle>,
}

impl Roster {
    /// Creates a roster from seated participants.
    #[instrument(skip(seats), fields(seats = seats.len()))]
    pub fn new(seats: Vec<ParticipantHandle>) -> Self {
        info!("Roster created");
        Self { seats }
    }

    /// Participant ids still seated.
    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.seats.iter().map(|s| *s.id())
    }

    /// Returns true if `participant` is still seated.
    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.seats.iter().any(|s| *s.id() == participant)
    }

    /// Number of seated participants.
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// True once every participant has left.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Unseats a participant. Returns false if it was not seated.
    #[instrument(skip(self))]
    pub fn remove(&mut self, participant: ParticipantId) -> bool {
        let before = self.seats.len();
        self.seats.retain(|s| *s.id() != participant);
        let removed = self.seats.len() < before;
        if removed {
            info!(remaining = self.seats.len(), "Participant left match");
        }
        removed
    }

    /// Sends each seat its own view of the new match.
    #[instrument(skip_all)]
    pub fn announce_start(&self, game: &Match) {
        let board = game.board();
        for seat in &self.seats {
            seat.send(ServerMessage::MatchStarted {
                stations: board.stations().clone(),
                connections: board.connections().clone(),
                pieces: game.pieces_seen_by(*seat.id()),
                owned_piece_ids: game.pieces_owned_by(*seat.id()),
                is_evader_turn: game.is_evader_turn(),
            });
        }
        debug!(seats = self.seats.len(), "Match start announced");
    }

    /// Delivers each dispatch to the seats its audience includes.
    ///
    /// Returns the number of messages queued.
    #[instrument(skip_all, fields(dispatches = dispatches.len()))]
    pub fn deliver(&self, dispatches: &[Dispatch]) -> usize {
        let mut sent = 0;
        for dispatch in dispatches {
            let message = ServerMessage::from(dispatch.event);
            for seat in self
                .seats
                .iter()
                .filter(|s| dispatch.audience.includes(*s.id()))
            {
                if seat.send(message.clone()) {
                    sent += 1;
                }
            }
        }
        debug!(sent, "Events delivered");
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::Outbound;
    use std::sync::Arc;
    use strictly_pursuit::{
        Board, MatchEvent, MatchRules, Piece, PieceColor, PieceId, Sighting, StationId,
        TicketType,
    };
    use tokio::sync::mpsc;

    fn seat(id: u64) -> (ParticipantHandle, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            ParticipantHandle::new(ParticipantId(id), format!("p{}", id), tx),
            rx,
        )
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(item) = rx.try_recv() {
            if let Outbound::Message(msg) = item {
                out.push(msg);
            }
        }
        out
    }

    #[test]
    fn test_deliver_honours_audience() {
        let (a, mut rx_a) = seat(1);
        let (b, mut rx_b) = seat(2);
        let roster = Roster::new(vec![a, b]);

        let applied = |destination| MatchEvent::MoveApplied {
            piece: PieceId(1),
            destination,
            ticket: TicketType::Taxi,
        };
        let sent = roster.deliver(&[
            Dispatch::only(ParticipantId(1), applied(Sighting::Visible(StationId(2)))),
            Dispatch::all_but(ParticipantId(1), applied(Sighting::Hidden)),
            Dispatch::everyone(MatchEvent::TicketUsed {
                ticket: TicketType::Taxi,
            }),
        ]);
        assert_eq!(sent, 4);

        let to_a = drain(&mut rx_a);
        assert_eq!(to_a.len(), 2);
        assert!(matches!(
            to_a[0],
            ServerMessage::MoveApplied {
                destination: Sighting::Visible(StationId(2)),
                ..
            }
        ));

        let to_b = drain(&mut rx_b);
        assert_eq!(to_b.len(), 2);
        assert!(matches!(
            to_b[0],
            ServerMessage::MoveApplied {
                destination: Sighting::Hidden,
                ..
            }
        ));
    }

    #[test]
    fn test_removed_seat_receives_nothing() {
        let (a, mut rx_a) = seat(1);
        let (b, mut rx_b) = seat(2);
        let mut roster = Roster::new(vec![a, b]);
        assert!(roster.remove(ParticipantId(2)));
        assert!(!roster.remove(ParticipantId(2)));

        roster.deliver(&[Dispatch::everyone(MatchEvent::TicketUsed {
            ticket: TicketType::Bus,
        })]);
        assert_eq!(drain(&mut rx_a).len(), 1);
        assert!(drain(&mut rx_b).is_empty());
    }

    #[test]
    fn test_start_views_are_per_seat() {
        let (a, mut rx_a) = seat(1);
        let (b, mut rx_b) = seat(2);
        let game = Match::new(
            Arc::new(Board::classic()),
            vec![
                Piece::evader(ParticipantId(1), StationId(7)),
                Piece::pursuer(PieceId(2), ParticipantId(2), StationId(3), PieceColor::Blue),
            ],
            MatchRules::default(),
        )
        .expect("valid match");
        Roster::new(vec![a, b]).announce_start(&game);

        let to_a = drain(&mut rx_a);
        let ServerMessage::MatchStarted {
            pieces,
            owned_piece_ids,
            ..
        } = &to_a[0]
        else {
            panic!("expected match-started");
        };
        assert_eq!(owned_piece_ids, &vec![PieceId(1)]);
        assert_eq!(*pieces[0].station(), Sighting::Visible(StationId(7)));

        let to_b = drain(&mut rx_b);
        let ServerMessage::MatchStarted {
            pieces,
            owned_piece_ids,
            is_evader_turn,
            ..
        } = &to_b[0]
        else {
            panic!("expected match-started");
        };
        assert_eq!(owned_piece_ids, &vec![PieceId(2)]);
        assert_eq!(*pieces[0].station(), Sighting::Hidden);
        assert!(*is_evader_turn);
    }
}
