//! Emotional contagion: distress spreading to an adjacent regulated piece
//!
//! Invoked after lash-outs and storm spread, not uniformly every turn. The
//! roll goes through the world RNG; the chance scales with the active
//! environmental contagion factor.

use rand::Rng;

use crate::core::constants::CONTAGION_BASE_CHANCE;
use crate::core::params::GameParams;
use crate::core::types::PieceId;
use crate::emotion::piece::MEM_CONTAGION;
use crate::emotion::state::{DysregulationKind, EmotionalState};
use crate::game::events::{EventLog, GameEvent};
use crate::game::world::GameWorld;

/// Effective spread probability under the current environment
pub fn contagion_chance(params: &GameParams) -> f64 {
    (CONTAGION_BASE_CHANCE * params.contagion_factor()).clamp(0.0, 1.0) as f64
}

/// Force the spread: transition a regulated target and announce it.
/// Returns false if the target cannot catch anything (captured or already
/// dysregulated).
pub fn infect(
    world: &mut GameWorld,
    events: &mut EventLog,
    source: PieceId,
    target: PieceId,
    subtype: DysregulationKind,
) -> bool {
    let turn = world.turn;
    let Some(piece) = world.piece_mut(target) else {
        return false;
    };
    if !piece.is_active() || piece.is_dysregulated() {
        return false;
    }

    piece.set_state(EmotionalState::Dysregulated(subtype));
    piece.add_memory(MEM_CONTAGION, format!("caught {subtype} nearby"), turn);
    events.record(
        turn,
        GameEvent::Contagion {
            source,
            target,
            subtype,
        },
    );
    true
}

/// Roll against the environment-scaled chance, spreading on success.
pub fn try_spread(
    world: &mut GameWorld,
    events: &mut EventLog,
    source: PieceId,
    target: PieceId,
    subtype: DysregulationKind,
) -> bool {
    let chance = contagion_chance(&world.params);
    if world.rng.gen_bool(chance) {
        infect(world, events, source, target, subtype)
    } else {
        false
    }
}
