//! Contract-based validation for pursuit moves.
//!
//! Contracts define correctness through preconditions and postconditions.
//! They formalize the Hoare-style reasoning: {P} action {Q}

use crate::action::{Move, MoveRejection};
use crate::game::Match;
use crate::invariants::{InvariantSet, PursuitInvariants};
use crate::board::Connection;
use crate::piece::{ParticipantId, Piece};
use crate::tickets::{Allowance, TicketType};
use strum::IntoEnumIterator;
use derive_new::new;
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
///
/// - Precondition: {P(state, action)} - must hold before applying action
/// - Postcondition: {Q(before, after)} - must hold after applying action
pub trait Contract<S, A> {
    /// Error produced when a condition fails.
    type Error;

    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), Self::Error>;

    /// Checks postconditions after applying the action.
    fn post(before: &S, after: &S) -> Result<(), Self::Error>;
}

/// A move together with the participant submitting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct Submission {
    /// Who sent the move.
    pub requester: ParticipantId,
    /// The declared move.
    pub mv: Move,
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: no winner has been decided.
pub struct MatchUndecided;

impl MatchUndecided {
    /// Rejects every move once the match is over.
    pub fn check(game: &Match) -> Result<(), MoveRejection> {
        match game.winner() {
            Some(_) => Err(MoveRejection::GameOver),
            None => Ok(()),
        }
    }
}

/// Precondition: the acting piece exists.
pub struct PieceExists;

impl PieceExists {
    /// Resolves the acting piece.
    pub fn check<'a>(mv: &Move, game: &'a Match) -> Result<&'a Piece, MoveRejection> {
        game.piece(mv.piece)
            .ok_or(MoveRejection::UnknownPiece(mv.piece))
    }
}

/// Precondition: the requester owns the acting piece.
pub struct OwnsPiece;

impl OwnsPiece {
    /// Compares the piece's owner with the requester.
    pub fn check(requester: ParticipantId, piece: &Piece) -> Result<(), MoveRejection> {
        if piece.owner() == requester {
            Ok(())
        } else {
            Err(MoveRejection::NotOwner(piece.id()))
        }
    }
}

/// Precondition: the piece's side is on turn.
pub struct SidesTurn;

impl SidesTurn {
    /// Compares the piece's side with the side on turn.
    pub fn check(piece: &Piece, game: &Match) -> Result<(), MoveRejection> {
        if piece.side() == game.side_on_turn() {
            Ok(())
        } else {
            Err(MoveRejection::NotYourTurn(piece.id()))
        }
    }
}

/// Gate for spending a double-move ticket.
pub struct DoubleMoveAvailable;

impl DoubleMoveAvailable {
    /// Only the evader may declare, only with a ticket in hand, and only
    /// once per turn.
    pub fn check(piece: &Piece, game: &Match) -> Result<(), MoveRejection> {
        let available = piece.is_evader()
            && !game.double_move_active()
            && piece.tickets().has(TicketType::Double);
        if available {
            Ok(())
        } else {
            Err(MoveRejection::DoubleMoveUnavailable(piece.id()))
        }
    }
}

/// Precondition: the piece still has a sub-move left this turn.
pub struct NotYetMoved;

impl NotYetMoved {
    /// Counts the piece's recorded sub-moves against its allowance.
    pub fn check(piece: &Piece, game: &Match) -> Result<(), MoveRejection> {
        if game.moves_made_by(piece.id()) < game.sub_move_allowance(piece) {
            Ok(())
        } else {
            Err(MoveRejection::AlreadyMoved(piece.id()))
        }
    }
}

/// Precondition: the destination is a real station.
pub struct StationExists;

impl StationExists {
    /// Looks the destination up on the board.
    pub fn check(mv: &Move, game: &Match) -> Result<(), MoveRejection> {
        if game.board().contains(mv.destination) {
            Ok(())
        } else {
            Err(MoveRejection::UnknownStation(mv.destination))
        }
    }
}

/// Precondition: a direct connection joins the piece to its destination.
pub struct Adjacent;

impl Adjacent {
    /// Returns every link between the two stations.
    pub fn check<'a>(
        mv: &Move,
        piece: &Piece,
        game: &'a Match,
    ) -> Result<Vec<&'a Connection>, MoveRejection> {
        let links = game.board().connections_between(piece.station(), mv.destination);
        if links.is_empty() {
            Err(MoveRejection::NotAdjacent {
                from: piece.station(),
                to: mv.destination,
            })
        } else {
            Ok(links)
        }
    }
}

/// Precondition: the ticket rides at least one of the connecting links.
pub struct TicketFitsTransit;

impl TicketFitsTransit {
    /// Checks the ticket against each link's transit type.
    pub fn check(mv: &Move, links: &[&Connection]) -> Result<(), MoveRejection> {
        if links.iter().any(|c| mv.ticket.rides(*c.transit())) {
            Ok(())
        } else {
            Err(MoveRejection::WrongTicket(mv.ticket))
        }
    }
}

/// Precondition: a pursuer may not join another pursuer.
///
/// The evader may step onto a pursuer; that is a capture, not an illegal
/// move.
pub struct PursuerFree;

impl PursuerFree {
    /// Scans pursuer positions when the acting piece is a pursuer.
    pub fn check(mv: &Move, piece: &Piece, game: &Match) -> Result<(), MoveRejection> {
        if !piece.is_evader() && game.is_pursuer_at(mv.destination) {
            Err(MoveRejection::OccupiedByPursuer(mv.destination))
        } else {
            Ok(())
        }
    }
}

/// Precondition: the piece holds the ticket it wants to spend.
pub struct HoldsTicket;

impl HoldsTicket {
    /// Consults the piece's ledger.
    pub fn check(mv: &Move, piece: &Piece) -> Result<(), MoveRejection> {
        if piece.tickets().has(mv.ticket) {
            Ok(())
        } else {
            Err(MoveRejection::OutOfTickets(mv.ticket))
        }
    }
}

/// Composite precondition: all checks, in evaluation order, short-circuiting.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions for a move.
    #[instrument(skip(game))]
    pub fn check(
        requester: ParticipantId,
        mv: &Move,
        game: &Match,
    ) -> Result<(), MoveRejection> {
        MatchUndecided::check(game)?;
        let piece = PieceExists::check(mv, game)?;
        OwnsPiece::check(requester, piece)?;
        SidesTurn::check(piece, game)?;
        if mv.is_double_declaration() {
            return DoubleMoveAvailable::check(piece, game);
        }
        NotYetMoved::check(piece, game)?;
        StationExists::check(mv, game)?;
        let links = Adjacent::check(mv, piece, game)?;
        PursuerFree::check(mv, piece, game)?;
        TicketFitsTransit::check(mv, &links)?;
        HoldsTicket::check(mv, piece)?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move submissions.
///
/// Preconditions: every check in [`LegalMove`].
///
/// Postconditions:
/// - Exactly one evader
/// - Pursuers never share a station
/// - Sub-moves this turn stay within their allowance
/// - No ledger count grows, the evader turn counter never drops, and a
///   decided winner stays decided
pub struct MoveContract;

impl Contract<Match, Submission> for MoveContract {
    type Error = MoveRejection;

    fn pre(game: &Match, action: &Submission) -> Result<(), MoveRejection> {
        LegalMove::check(action.requester, &action.mv, game)
    }

    fn post(before: &Match, after: &Match) -> Result<(), MoveRejection> {
        let mut failures = match PursuitInvariants::check_all(after) {
            Ok(()) => Vec::new(),
            Err(violations) => violations.into_iter().map(|v| v.description).collect(),
        };
        failures.extend(regressions(before, after));

        if failures.is_empty() {
            return Ok(());
        }
        let descriptions = failures.join("; ");
        warn!(%descriptions, "Postcondition failed");
        Err(MoveRejection::InvariantViolation(format!(
            "Postcondition failed: {}",
            descriptions
        )))
    }
}

/// Compares two successive states for anything that moved backwards.
fn regressions(before: &Match, after: &Match) -> Vec<String> {
    let mut found = Vec::new();

    if after.evader_turns() < before.evader_turns() {
        found.push("Evader turn counter never decreases".to_string());
    }
    if before.winner().is_some() && after.winner() != before.winner() {
        found.push("A decided winner never changes".to_string());
    }
    for old in before.pieces() {
        let Some(current) = after.piece(old.id()) else {
            found.push(format!("Piece {} never leaves the match", old.id()));
            continue;
        };
        for ticket in TicketType::iter() {
            let grew = match (old.tickets().count(ticket), current.tickets().count(ticket)) {
                (Allowance::Limited(was), Allowance::Limited(now)) => now > was,
                (Allowance::Limited(_), Allowance::Unlimited) => true,
                _ => false,
            };
            if grew {
                found.push(format!("Piece {} never gains {} tickets", old.id(), ticket));
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::classic_match;
    use crate::{PieceId, StationId};

    #[test]
    fn test_precondition_legal_evader_move() {
        let (game, evader, _) = classic_match();
        let mv = Move::new(PieceId::EVADER, StationId(2), TicketType::Taxi);
        assert!(LegalMove::check(evader, &mv, &game).is_ok());
        assert!(MoveContract::pre(&game, &Submission { requester: evader, mv }).is_ok());
    }

    #[test]
    fn test_precondition_wrong_owner() {
        let (game, _, pursuers) = classic_match();
        let mv = Move::new(PieceId::EVADER, StationId(2), TicketType::Taxi);
        assert_eq!(
            LegalMove::check(pursuers[0], &mv, &game),
            Err(MoveRejection::NotOwner(PieceId::EVADER))
        );
    }

    #[test]
    fn test_precondition_pursuer_out_of_turn() {
        let (game, _, pursuers) = classic_match();
        let mv = Move::new(PieceId(2), StationId(2), TicketType::Taxi);
        assert_eq!(
            LegalMove::check(pursuers[0], &mv, &game),
            Err(MoveRejection::NotYourTurn(PieceId(2)))
        );
    }

    #[test]
    fn test_precondition_not_adjacent() {
        let (game, evader, _) = classic_match();
        let mv = Move::new(PieceId::EVADER, StationId(7), TicketType::Taxi);
        assert_eq!(
            LegalMove::check(evader, &mv, &game),
            Err(MoveRejection::NotAdjacent {
                from: StationId(1),
                to: StationId(7)
            })
        );
    }

    #[test]
    fn test_precondition_wrong_ticket() {
        let (game, evader, _) = classic_match();
        let mv = Move::new(PieceId::EVADER, StationId(2), TicketType::Bus);
        assert_eq!(
            LegalMove::check(evader, &mv, &game),
            Err(MoveRejection::WrongTicket(TicketType::Bus))
        );
    }

    #[test]
    fn test_precondition_evader_may_step_onto_pursuer() {
        let (game, evader, _) = classic_match();
        let mv = Move::new(PieceId::EVADER, StationId(3), TicketType::Bus);
        assert_eq!(LegalMove::check(evader, &mv, &game), Ok(()));
        assert!(game.is_move_legal(evader, &mv));
    }

    #[test]
    fn test_postcondition_holds_after_move() {
        let (mut game, evader, _) = classic_match();
        let before = game.clone();
        let mv = Move::new(PieceId::EVADER, StationId(2), TicketType::Taxi);
        game.submit(evader, mv).expect("legal move");
        assert!(MoveContract::post(&before, &game).is_ok());
    }

    #[test]
    fn test_postcondition_rejects_regained_tickets() {
        let (mut game, evader, _) = classic_match();
        let before = game.clone();
        let mv = Move::new(PieceId::EVADER, StationId(2), TicketType::Black);
        game.submit(evader, mv).expect("legal move");

        // Swapping the states makes the black ticket count grow.
        let err = MoveContract::post(&game, &before).unwrap_err();
        assert!(matches!(err, MoveRejection::InvariantViolation(_)));
        assert!(err.to_string().contains("never gains"));
    }

    #[test]
    fn test_check_move_goes_through_contract() {
        let (game, evader, _) = classic_match();
        let mv = Move::new(PieceId::EVADER, StationId(7), TicketType::Taxi);
        assert_eq!(
            game.check_move(evader, &mv),
            MoveContract::pre(&game, &Submission::new(evader, mv))
        );
    }
}
