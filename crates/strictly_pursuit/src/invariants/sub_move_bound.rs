//! Sub-move bound invariant: the moved list never outgrows the turn.

use super::Invariant;
use crate::game::Match;
use std::collections::HashSet;

/// Invariant: moves recorded this turn belong to the side on turn and stay
/// below the count that would have switched the turn.
///
/// - Evader turn: fewer than one sub-move, or fewer than two under a
///   double move.
/// - Pursuer turn: distinct pieces, fewer than the number of pursuers.
pub struct SubMoveBoundInvariant;

impl Invariant<Match> for SubMoveBoundInvariant {
    fn holds(game: &Match) -> bool {
        let moved = game.moved_this_turn();
        let on_turn = game.side_on_turn();
        let right_side = moved
            .iter()
            .all(|id| game.piece(*id).is_some_and(|p| p.side() == on_turn));
        if !right_side {
            return false;
        }

        if game.is_evader_turn() {
            let limit = if game.double_move_active() { 2 } else { 1 };
            moved.len() < limit
        } else {
            let distinct: HashSet<_> = moved.iter().collect();
            distinct.len() == moved.len() && moved.len() < game.pieces().len() - 1
        }
    }

    fn description() -> &'static str {
        "Sub-moves this turn stay within the turn's allowance"
    }
}
