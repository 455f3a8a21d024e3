//! Pursuers-apart invariant: no two pursuers rest on the same station.

use super::Invariant;
use crate::game::Match;
use std::collections::HashSet;

/// Invariant: pursuer stations are pairwise distinct.
///
/// The evader may share a station with a pursuer (that is a capture).
pub struct PursuersApartInvariant;

impl Invariant<Match> for PursuersApartInvariant {
    fn holds(game: &Match) -> bool {
        let mut occupied = HashSet::new();
        game.pursuers().all(|p| occupied.insert(p.station()))
    }

    fn description() -> &'static str {
        "No two pursuers share a station"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::classic_match;

    #[test]
    fn test_evader_on_pursuer_still_holds() {
        let (mut game, _, _) = classic_match();
        game.pieces[0].station = game.pieces[1].station;
        assert!(PursuersApartInvariant::holds(&game));
    }
}
