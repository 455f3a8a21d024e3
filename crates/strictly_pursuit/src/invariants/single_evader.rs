//! Single evader invariant: exactly one piece is Mr X, and it is piece 1.

use super::Invariant;
use crate::game::Match;
use crate::piece::PieceId;

/// Invariant: exactly one piece carries the evader flag.
pub struct SingleEvaderInvariant;

impl Invariant<Match> for SingleEvaderInvariant {
    fn holds(game: &Match) -> bool {
        let mut evaders = game.pieces().iter().filter(|p| p.is_evader());
        matches!(
            (evaders.next(), evaders.next()),
            (Some(piece), None) if piece.id() == PieceId::EVADER
        )
    }

    fn description() -> &'static str {
        "Exactly one piece is the evader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::classic_match;

    #[test]
    fn test_dealt_match_holds() {
        let (game, _, _) = classic_match();
        assert!(SingleEvaderInvariant::holds(&game));
    }

    #[test]
    fn test_second_evader_violates() {
        let (mut game, _, _) = classic_match();
        game.pieces[1].is_evader = true;
        assert!(!SingleEvaderInvariant::holds(&game));
    }
}
