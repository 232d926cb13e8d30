//! Threat detection for flight responses
//!
//! Enemy pieces within manhattan range 3, crowned pieces weighing double,
//! sorted nearest first. "Safer" compares the summed threat weight at a
//! hypothetical position against the current one - no board mutation.

use crate::core::constants::{THREAT_RANGE, THREAT_WEIGHT_CROWNED, THREAT_WEIGHT_NORMAL};
use crate::core::types::{PieceId, Position, Team};
use crate::game::world::GameWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threat {
    pub piece: PieceId,
    pub distance: u32,
    pub weight: u32,
}

/// Enemies of `team` threatening the square `from`, nearest first.
pub fn threats_at(world: &GameWorld, team: Team, from: Position) -> Vec<Threat> {
    let mut threats: Vec<Threat> = world
        .pieces
        .iter()
        .filter(|p| p.is_active() && p.team != team)
        .filter(|p| p.position.manhattan(&from) <= THREAT_RANGE)
        .map(|p| Threat {
            piece: p.id,
            distance: p.position.manhattan(&from),
            weight: if p.crowned {
                THREAT_WEIGHT_CROWNED
            } else {
                THREAT_WEIGHT_NORMAL
            },
        })
        .collect();
    threats.sort_by_key(|t| (t.distance, t.piece));
    threats
}

/// Summed threat weight at a square
pub fn threat_level(world: &GameWorld, team: Team, at: Position) -> u32 {
    threats_at(world, team, at).iter().map(|t| t.weight).sum()
}

/// Strictly safer: a lower threat level than the current square
pub fn is_safer(world: &GameWorld, team: Team, candidate: Position, current: Position) -> bool {
    threat_level(world, team, candidate) < threat_level(world, team, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world() -> GameWorld {
        GameWorld::new(Board::new(10, 10), ChaCha8Rng::seed_from_u64(5))
    }

    #[test]
    fn test_range_and_sort() {
        let mut w = world();
        let near = w.spawn_piece("Near", Team::Dusk, Position::new(4, 4));
        let far = w.spawn_piece("Far", Team::Dusk, Position::new(6, 5));
        w.spawn_piece("Out", Team::Dusk, Position::new(9, 9));
        w.spawn_piece("Friendly", Team::Dawn, Position::new(3, 3));

        let threats = threats_at(&w, Team::Dawn, Position::new(3, 4));
        assert_eq!(threats.len(), 2);
        assert_eq!(threats[0].piece, near);
        assert_eq!(threats[1].piece, far);
        assert!(threats[0].distance < threats[1].distance);
    }

    #[test]
    fn test_crowned_weighs_double() {
        let mut w = world();
        let king = w.spawn_piece("King", Team::Dusk, Position::new(4, 4));
        w.piece_mut(king).unwrap().crowned = true;
        w.spawn_piece("Pawn", Team::Dusk, Position::new(4, 5));

        assert_eq!(threat_level(&w, Team::Dawn, Position::new(3, 4)), 3);
    }

    #[test]
    fn test_safer_is_strict() {
        let mut w = world();
        w.spawn_piece("Enemy", Team::Dusk, Position::new(4, 4));

        let current = Position::new(3, 4);
        let away = Position::new(0, 0);
        let sideways = Position::new(4, 3);
        assert!(is_safer(&w, Team::Dawn, away, current));
        // Same threat level is not safer
        assert!(!is_safer(&w, Team::Dawn, sideways, current));
    }
}
