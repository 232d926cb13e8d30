//! Proximity relationship updates
//!
//! Once per turn, every active piece looks at its board neighbors and
//! adjusts its own ledger by a fixed rule table. Updates are per-actor:
//! the shared-misery penalty lands only on the acting piece's ledger
//! entry, which keeps the source asymmetry observable (see the test).

use crate::core::constants::*;
use crate::emotion::piece::Piece;
use crate::game::world::GameWorld;

/// What one adjacency does to the actor's ledger and (sometimes) the
/// neighbor's: `(actor -> other delta, other -> actor delta)`.
pub fn bond_deltas(actor: &Piece, other: &Piece) -> (f32, f32) {
    if actor.team == other.team {
        match (actor.is_dysregulated(), other.is_dysregulated()) {
            (false, false) => (BOND_BOTH_REGULATED, 0.0),
            (true, false) if other.trust() >= TRUST_SUPPORT_NEIGHBOR => {
                // Leaning on a steady teammate bonds both ways
                (BOND_LEAN_ON_SUPPORT_SELF, BOND_LEAN_ON_SUPPORT_OTHER)
            }
            // Misery loves company, but it's not healthy
            (true, true) => (BOND_SHARED_MISERY, 0.0),
            _ => (0.0, 0.0),
        }
    } else if actor.relationship(other.id) > RELATIONSHIP_STRAINED {
        // Repeated non-hostile proximity builds grudging respect
        (BOND_GRUDGING_RESPECT, 0.0)
    } else {
        (0.0, 0.0)
    }
}

/// Run the proximity pass for every active piece, in id order.
/// Suppressed entirely while a storm blocks communication.
pub fn proximity_pass(world: &mut GameWorld) {
    if world.params.communication_blocked() {
        return;
    }

    for i in 0..world.pieces.len() {
        if !world.pieces[i].is_active() {
            continue;
        }
        let pos = world.pieces[i].position;
        for j in world.adjacent_indices(pos) {
            if j == i {
                continue;
            }
            let (to_other, to_actor) = bond_deltas(&world.pieces[i], &world.pieces[j]);
            let other_id = world.pieces[j].id;
            let actor_id = world.pieces[i].id;
            if to_other != 0.0 {
                world.pieces[i].update_relationship(other_id, to_other);
            }
            if to_actor != 0.0 {
                world.pieces[j].update_relationship(actor_id, to_actor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::core::params::EnvModifier;
    use crate::core::types::{PieceId, Position, Team};
    use crate::emotion::state::{DysregulationKind, EmotionalState};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world() -> GameWorld {
        GameWorld::new(Board::new(8, 8), ChaCha8Rng::seed_from_u64(3))
    }

    fn dysregulate(world: &mut GameWorld, id: PieceId) {
        world
            .piece_mut(id)
            .unwrap()
            .set_state(EmotionalState::Dysregulated(DysregulationKind::Anxious));
    }

    #[test]
    fn test_both_regulated_teammates_bond() {
        let mut w = world();
        let a = w.spawn_piece("A", Team::Dawn, Position::new(2, 2));
        let b = w.spawn_piece("B", Team::Dawn, Position::new(3, 2));
        proximity_pass(&mut w);
        // Each side ran its own pass
        assert!((w.piece(a).unwrap().relationship(b) - 0.1).abs() < 1e-6);
        assert!((w.piece(b).unwrap().relationship(a) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_leaning_on_supportive_teammate() {
        let mut w = world();
        let shaky = w.spawn_piece("Shaky", Team::Dawn, Position::new(2, 2));
        let steady = w.spawn_piece("Steady", Team::Dawn, Position::new(3, 2));
        dysregulate(&mut w, shaky);
        w.piece_mut(steady).unwrap().modify_trust(6.0);

        proximity_pass(&mut w);
        assert!((w.piece(shaky).unwrap().relationship(steady) - 0.2).abs() < 1e-6);
        assert!((w.piece(steady).unwrap().relationship(shaky) - 0.1).abs() < 1e-6);
    }

    /// The shared-misery rule only touches the acting piece's ledger.
    /// Both ledgers usually drop because both pieces act each turn, but the
    /// update itself is one-sided; this is preserved from the source design
    /// deliberately rather than symmetrized.
    #[test]
    fn test_shared_misery_is_per_actor() {
        let mut w = world();
        let a = w.spawn_piece("A", Team::Dawn, Position::new(2, 2));
        let b = w.spawn_piece("B", Team::Dawn, Position::new(3, 2));
        dysregulate(&mut w, a);
        dysregulate(&mut w, b);

        let (to_other, to_actor) = bond_deltas(w.piece(a).unwrap(), w.piece(b).unwrap());
        assert!((to_other - -0.1).abs() < 1e-6);
        assert_eq!(to_actor, 0.0);

        // Over a full pass both sides act, so both ledgers drop once each
        proximity_pass(&mut w);
        assert!((w.piece(a).unwrap().relationship(b) - -0.1).abs() < 1e-6);
        assert!((w.piece(b).unwrap().relationship(a) - -0.1).abs() < 1e-6);
    }

    #[test]
    fn test_grudging_respect_across_teams() {
        let mut w = world();
        let a = w.spawn_piece("A", Team::Dawn, Position::new(2, 2));
        let b = w.spawn_piece("B", Team::Dusk, Position::new(3, 2));
        proximity_pass(&mut w);
        assert!((w.piece(a).unwrap().relationship(b) - 0.05).abs() < 1e-6);

        // A hostile history blocks the respect rule
        w.piece_mut(a).unwrap().update_relationship(b, -3.0);
        let before = w.piece(a).unwrap().relationship(b);
        proximity_pass(&mut w);
        assert_eq!(w.piece(a).unwrap().relationship(b), before);
    }

    #[test]
    fn test_communication_block_suppresses_pass() {
        let mut w = world();
        let a = w.spawn_piece("A", Team::Dawn, Position::new(2, 2));
        let b = w.spawn_piece("B", Team::Dawn, Position::new(3, 2));
        let mut fog = EnvModifier::neutral("fog");
        fog.communication_block = true;
        w.params.push_modifier(fog);

        proximity_pass(&mut w);
        assert_eq!(w.piece(a).unwrap().relationship(b), 0.0);
    }
}
