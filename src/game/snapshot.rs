//! Read-model snapshots for the state query surface
//!
//! Everything is serializable so the excluded UI/persistence layers can
//! consume state without reaching into the engines.

use serde::Serialize;

use crate::core::error::{GameError, Result};
use crate::core::types::{PieceId, Position, Team, Turn};
use crate::emotion::piece::{Buff, MemoryRecord};
use crate::emotion::state::EmotionalState;
use crate::game::world::GameWorld;
use crate::storm::engine::{SkyState, StormEngine};
use crate::storm::forecast::{self, Forecast};
use crate::storm::templates::{StormKind, StormPhase};

#[derive(Debug, Clone, Serialize)]
pub struct PieceSnapshot {
    pub id: PieceId,
    pub name: String,
    pub team: Team,
    pub position: Position,
    pub captured: bool,
    pub crowned: bool,
    pub trust: f32,
    pub state: EmotionalState,
    pub relationships: Vec<(PieceId, f32)>,
    pub memory: Vec<MemoryRecord>,
    pub planning_defection: bool,
    pub buffs: Vec<Buff>,
    pub storm_resistance: f32,
}

pub fn piece_snapshot(world: &GameWorld, id: PieceId) -> Result<PieceSnapshot> {
    let piece = world.piece(id).ok_or(GameError::PieceNotFound(id))?;
    Ok(PieceSnapshot {
        id: piece.id,
        name: piece.name.clone(),
        team: piece.team,
        position: piece.position,
        captured: piece.captured,
        crowned: piece.crowned,
        trust: piece.trust(),
        state: piece.state(),
        relationships: piece.relationships_sorted(),
        memory: piece.memory.clone(),
        planning_defection: piece.planning_defection,
        buffs: piece.buffs.clone(),
        storm_resistance: piece.storm_resistance,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct StormStatus {
    pub kind: StormKind,
    pub name: String,
    pub phase: StormPhase,
    pub remaining: u32,
    pub duration: u32,
    pub affected: usize,
    pub epicenter: Position,
    pub average_resistance: f32,
}

pub fn storm_status(world: &GameWorld, engine: &StormEngine) -> Option<StormStatus> {
    engine.active().map(|storm| StormStatus {
        kind: storm.kind,
        name: storm.template().name.to_string(),
        phase: storm.phase,
        remaining: storm.remaining,
        duration: storm.duration,
        affected: storm.affected.len(),
        epicenter: storm.epicenter,
        average_resistance: engine.average_resistance(world),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub sky: SkyState,
    pub forecast: Forecast,
    pub probability: f32,
    pub turn: Turn,
}

pub fn weather_report(world: &GameWorld, engine: &StormEngine) -> WeatherReport {
    WeatherReport {
        sky: engine.sky,
        forecast: forecast::predict(world),
        probability: forecast::storm_probability(world),
        turn: world.turn,
    }
}
