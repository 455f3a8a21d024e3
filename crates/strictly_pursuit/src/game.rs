//! The match state machine.
//!
//! A [`Match`] owns its pieces and turn state. Every mutation goes through
//! `&mut self`, so one move is fully validated, applied, and evaluated
//! before the next can begin.

use crate::action::{Move, MoveRejection};
use crate::board::{Board, StationId};
use crate::contracts::{Contract, MoveContract, Submission};
use crate::events::{Dispatch, MatchEvent, PieceView, Sighting};
use crate::invariants::{Invariant, PursuersApartInvariant};
use crate::piece::{ParticipantId, Piece, PieceId, Side};
use crate::rules::{self, MatchRules};
use crate::setup::SetupError;
use crate::tickets::TicketType;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A live match.
#[derive(Debug, Clone)]
pub struct Match {
    pub(crate) board: Arc<Board>,
    pub(crate) pieces: Vec<Piece>,
    pub(crate) evader_turn: bool,
    pub(crate) moved: Vec<PieceId>,
    pub(crate) double_move_active: bool,
    pub(crate) evader_turns: u32,
    pub(crate) rules: MatchRules,
    pub(crate) winner: Option<Side>,
}

impl Match {
    /// Creates a match from pieces already placed on the board.
    ///
    /// The evader moves first. Fails unless exactly one piece is the
    /// evader (id 1), at least one pursuer exists, ids are unique, every
    /// piece stands on a real station, and no two pursuers share one.
    #[instrument(skip(board, pieces, rules), fields(pieces = pieces.len()))]
    pub fn new(
        board: Arc<Board>,
        mut pieces: Vec<Piece>,
        rules: MatchRules,
    ) -> Result<Self, SetupError> {
        pieces.sort_by_key(|p| p.id);
        if pieces.windows(2).any(|w| w[0].id == w[1].id) {
            return Err(SetupError::DuplicatePiece);
        }
        if pieces.iter().filter(|p| p.is_evader).count() != 1
            || pieces.first().map(|p| (p.id, p.is_evader)) != Some((PieceId::EVADER, true))
        {
            return Err(SetupError::EvaderCount);
        }
        if pieces.len() < 2 {
            return Err(SetupError::TooFewParticipants(pieces.len()));
        }
        if let Some(stray) = pieces.iter().find(|p| !board.contains(p.station)) {
            return Err(SetupError::UnknownStation(stray.station));
        }

        let game = Self {
            board,
            pieces,
            evader_turn: true,
            moved: Vec::new(),
            double_move_active: false,
            evader_turns: 0,
            rules,
            winner: None,
        };
        if !PursuersApartInvariant::holds(&game) {
            return Err(SetupError::StackedPursuers);
        }

        info!(pieces = game.pieces.len(), "Match created");
        Ok(game)
    }

    // ─────────────────────────────────────────────────────────────
    //  Queries
    // ─────────────────────────────────────────────────────────────

    /// The board this match is played on.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Shared handle to the board.
    pub fn board_arc(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    /// All pieces, evader first.
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Looks a piece up by id.
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.id == id)
    }

    /// The evader's piece.
    pub fn evader(&self) -> &Piece {
        // `new` guarantees the evader sorts first.
        &self.pieces[0]
    }

    /// Pursuer pieces in id order.
    pub fn pursuers(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| !p.is_evader)
    }

    /// Pieces owned by `participant`.
    pub fn pieces_owned_by(&self, participant: ParticipantId) -> Vec<PieceId> {
        self.pieces
            .iter()
            .filter(|p| p.owner == participant)
            .map(|p| p.id)
            .collect()
    }

    /// True while the evader is on turn.
    pub fn is_evader_turn(&self) -> bool {
        self.evader_turn
    }

    /// Side currently on turn.
    pub fn side_on_turn(&self) -> Side {
        if self.evader_turn {
            Side::Evader
        } else {
            Side::Pursuers
        }
    }

    /// Piece ids recorded as moved this turn, one entry per sub-move.
    pub fn moved_this_turn(&self) -> &[PieceId] {
        &self.moved
    }

    /// Number of sub-moves `piece` has made this turn.
    pub fn moves_made_by(&self, piece: PieceId) -> usize {
        self.moved.iter().filter(|id| **id == piece).count()
    }

    /// Sub-moves `piece` may make in a turn: two for the evader under a
    /// double move, otherwise one.
    pub fn sub_move_allowance(&self, piece: &Piece) -> usize {
        if piece.is_evader && self.double_move_active {
            2
        } else {
            1
        }
    }

    /// True between a double-move declaration and the end of that turn.
    pub fn double_move_active(&self) -> bool {
        self.double_move_active
    }

    /// Completed evader turn cycles.
    pub fn evader_turns(&self) -> u32 {
        self.evader_turns
    }

    /// Rules in force.
    pub fn rules(&self) -> &MatchRules {
        &self.rules
    }

    /// Winning side, once decided.
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// True once a winner is set.
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    /// True if a pursuer stands on `station`.
    pub fn is_pursuer_at(&self, station: StationId) -> bool {
        self.pursuers().any(|p| p.station == station)
    }

    /// Pieces as `viewer` may see them.
    pub fn pieces_seen_by(&self, viewer: ParticipantId) -> Vec<PieceView> {
        self.pieces.iter().map(|p| PieceView::of(p, viewer)).collect()
    }

    // ─────────────────────────────────────────────────────────────
    //  Move pipeline
    // ─────────────────────────────────────────────────────────────

    /// Explains why a move would be refused, without mutating anything.
    pub fn check_move(&self, requester: ParticipantId, mv: &Move) -> Result<(), MoveRejection> {
        MoveContract::pre(self, &Submission::new(requester, *mv))
    }

    /// Returns true if `requester` may make `mv` now.
    pub fn is_move_legal(&self, requester: ParticipantId, mv: &Move) -> bool {
        self.check_move(requester, mv).is_ok()
    }

    /// Applies a validated move and reports its events.
    ///
    /// A double-move declaration spends the ticket and advances the turn
    /// counter without relocating anything. Any other move records the
    /// piece as moved, relocates it, and spends the ticket.
    ///
    /// # Panics
    ///
    /// Panics if the move spends a ticket the piece does not hold, or names
    /// a piece that does not exist. Validate with [`Self::check_move`]
    /// first.
    #[instrument(skip(self, mv, out), fields(mv = %mv))]
    pub fn apply_move(&mut self, mv: &Move, out: &mut Vec<Dispatch>) {
        let index = self
            .pieces
            .iter()
            .position(|p| p.id == mv.piece)
            .unwrap_or_else(|| panic!("apply_move on unknown piece {}", mv.piece));

        let destination = if mv.is_double_declaration() {
            self.double_move_active = true;
            self.evader_turns += 1;
            self.pieces[index].tickets.consume(TicketType::Double);
            debug!(evader_turns = self.evader_turns, "Double move declared");
            self.pieces[index].station
        } else {
            self.moved.push(mv.piece);
            let piece = &mut self.pieces[index];
            piece.station = mv.destination;
            piece.tickets.consume(mv.ticket);
            debug!(station = %mv.destination, "Piece relocated");
            mv.destination
        };

        let piece = &self.pieces[index];
        let applied = |sighting| MatchEvent::MoveApplied {
            piece: mv.piece,
            destination: sighting,
            ticket: mv.ticket,
        };
        if piece.is_evader {
            let revealed = self.rules.reveals_on(self.evader_turns);
            let others = if revealed {
                Sighting::Visible(destination)
            } else {
                Sighting::Hidden
            };
            debug!(revealed, turn = self.evader_turns, "Evader move disclosed");
            out.push(Dispatch::only(piece.owner, applied(Sighting::Visible(destination))));
            out.push(Dispatch::all_but(piece.owner, applied(others)));
        } else {
            out.push(Dispatch::everyone(applied(Sighting::Visible(destination))));
        }
        out.push(Dispatch::everyone(MatchEvent::TicketUsed { ticket: mv.ticket }));
    }

    /// Passes the turn when the side on turn has finished moving.
    ///
    /// Returns true if the turn switched.
    #[instrument(skip(self, out), fields(evader_turn = self.evader_turn, moved = self.moved.len()))]
    pub fn switch_turns(&mut self, out: &mut Vec<Dispatch>) -> bool {
        if self.evader_turn {
            let needed = if self.double_move_active { 2 } else { 1 };
            if self.moved.len() < needed {
                return false;
            }
            self.moved.clear();
            self.double_move_active = false;
            self.evader_turns += 1;
            self.evader_turn = false;
            info!(evader_turns = self.evader_turns, "Evader turn done");
            out.push(Dispatch::everyone(MatchEvent::TurnSwitched {
                now: Side::Pursuers,
            }));
        } else {
            if self.moved.len() < self.pieces.len() - 1 {
                return false;
            }
            self.moved.clear();
            self.evader_turn = true;
            info!("Pursuers turn done");
            out.push(Dispatch::everyone(MatchEvent::TurnSwitched {
                now: Side::Evader,
            }));
        }
        true
    }

    /// Decides the winner, if any, right after a turn switch.
    ///
    /// Capture is checked on every switch. Box-in and the turn limit only
    /// apply once the turn is back with the evader.
    #[instrument(skip(self, out))]
    pub fn evaluate_winner(&mut self, out: &mut Vec<Dispatch>) -> Option<Side> {
        if self.winner.is_some() {
            return self.winner;
        }
        let winner = if rules::is_captured(self) {
            Some(Side::Pursuers)
        } else if self.evader_turn && rules::is_boxed_in(self) {
            Some(Side::Pursuers)
        } else if self.evader_turn && rules::has_outlasted(self) {
            Some(Side::Evader)
        } else {
            None
        };

        if let Some(side) = winner {
            info!(winner = %side, evader_turns = self.evader_turns, "Game over");
            self.winner = Some(side);
            out.push(Dispatch::everyone(MatchEvent::GameOver { winner: side }));
        }
        winner
    }

    /// Validates, applies, switches turns, and evaluates the winner as one
    /// step. A rejected move changes nothing and yields no events.
    #[instrument(skip_all, fields(requester = %requester, mv = %mv))]
    pub fn submit(
        &mut self,
        requester: ParticipantId,
        mv: Move,
    ) -> Result<Vec<Dispatch>, MoveRejection> {
        if let Err(rejection) = self.check_move(requester, &mv) {
            debug!(%rejection, "Move rejected");
            return Err(rejection);
        }

        #[cfg(debug_assertions)]
        let before = self.clone();

        let mut out = Vec::new();
        self.apply_move(&mv, &mut out);
        if self.switch_turns(&mut out) {
            self.evaluate_winner(&mut out);
        }

        #[cfg(debug_assertions)]
        {
            if let Err(violation) = MoveContract::post(&before, self) {
                panic!("{}", violation);
            }
        }

        Ok(out)
    }
}
