//! Read-only weather prediction
//!
//! A coarse storm probability derived from how much of the board is
//! dysregulated, how low average trust sits, and how deep into the game we
//! are, bucketed for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::game::world::GameWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Forecast {
    ClearSkies,
    UneasyCalm,
    BuildingTension,
    StormImminent,
}

impl Forecast {
    pub fn id(&self) -> &'static str {
        match self {
            Self::ClearSkies => "clear_skies",
            Self::UneasyCalm => "uneasy_calm",
            Self::BuildingTension => "building_tension",
            Self::StormImminent => "storm_imminent",
        }
    }
}

/// Storm probability in [0, 1]
pub fn storm_probability(world: &GameWorld) -> f32 {
    let dysregulation = world.dysregulated_ratio() * 0.5;
    let trust = ((5.0 - world.average_trust()) / 5.0).clamp(0.0, 1.0) * 0.3;
    let fatigue = (world.turn as f32 / 100.0).min(0.2);
    (dysregulation + trust + fatigue).clamp(0.0, 1.0)
}

pub fn predict(world: &GameWorld) -> Forecast {
    let p = storm_probability(world);
    if p < 0.2 {
        Forecast::ClearSkies
    } else if p < 0.45 {
        Forecast::UneasyCalm
    } else if p < 0.7 {
        Forecast::BuildingTension
    } else {
        Forecast::StormImminent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::core::types::{Position, Team};
    use crate::emotion::state::{DysregulationKind, EmotionalState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_calm_board_reads_clear() {
        let mut w = GameWorld::new(Board::new(8, 8), ChaCha8Rng::seed_from_u64(2));
        for i in 0..4 {
            let id = w.spawn_piece(format!("P{i}"), Team::Dawn, Position::new(i, 0));
            w.piece_mut(id).unwrap().modify_trust(7.0);
        }
        assert_eq!(predict(&w), Forecast::ClearSkies);
    }

    #[test]
    fn test_troubled_board_reads_imminent() {
        let mut w = GameWorld::new(Board::new(8, 8), ChaCha8Rng::seed_from_u64(2));
        w.turn = 30;
        for i in 0..4 {
            let id = w.spawn_piece(format!("P{i}"), Team::Dawn, Position::new(i, 0));
            let p = w.piece_mut(id).unwrap();
            p.modify_trust(-3.0);
            p.set_state(EmotionalState::Dysregulated(DysregulationKind::Anxious));
        }
        assert_eq!(predict(&w), Forecast::StormImminent);
    }

    #[test]
    fn test_probability_bounded() {
        let w = GameWorld::new(Board::new(8, 8), ChaCha8Rng::seed_from_u64(2));
        let p = storm_probability(&w);
        assert!((0.0..=1.0).contains(&p));
    }
}
