//! Storm engine: board-wide crisis events
//!
//! At most one storm is active at a time. Trigger conditions are evaluated
//! every idle turn; an active storm spreads dysregulation by resistance
//! roll, drifts, erodes trust, resolves breakthroughs, and on ending
//! reverts its environmental changes exactly once and runs the aftermath.

use std::collections::BTreeSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::constants::*;
use crate::core::types::{PieceId, Position, Turn};
use crate::emotion::piece::{BuffKind, MEM_BREAKTHROUGH, MEM_STORM_HIT, MEM_TRAUMA_BOND};
use crate::emotion::state::{DysregulationKind, EmotionalState};
use crate::game::events::{EventLog, GameEvent};
use crate::game::world::GameWorld;
use crate::social::contagion;
use crate::storm::templates::{template, StormKind, StormPhase, StormTemplate};

/// Epicenter drift directions (cardinal)
const DRIFT: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStorm {
    pub kind: StormKind,
    pub intensity: u32,
    pub duration: u32,
    pub remaining: u32,
    pub phase: StormPhase,
    pub epicenter: Position,
    pub affected: BTreeSet<PieceId>,
}

impl ActiveStorm {
    pub fn template(&self) -> StormTemplate {
        template(self.kind)
    }

    /// Storm intensity felt at a square, decayed by distance from the
    /// epicenter
    pub fn local_intensity(&self, at: Position) -> f32 {
        let dist = self.epicenter.manhattan(&at) as f32;
        (self.intensity as f32 - STORM_INTENSITY_DISTANCE_DECAY * dist).max(STORM_INTENSITY_FLOOR)
    }
}

/// One line of storm history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormRecord {
    pub kind: StormKind,
    pub started_turn: Turn,
    pub ended_turn: Turn,
    pub affected: usize,
}

/// Board-wide weather indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyState {
    Clear,
    Storming,
    Clearing,
}

pub struct StormEngine {
    active: Option<ActiveStorm>,
    started_turn: Turn,
    pub history: Vec<StormRecord>,
    recent_failures: u32,
    pub sky: SkyState,
}

impl Default for StormEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Resistance a piece brings to a storm roll: baseline, armor, trust,
/// regulation, an undisrupted sanctuary square, and supportive neighbors.
pub fn resistance_score(world: &GameWorld, idx: usize) -> f32 {
    let piece = &world.pieces[idx];
    let mut score = piece.storm_resistance;
    if piece.has_buff(BuffKind::EmotionalArmor) {
        score += EMOTIONAL_ARMOR_RESISTANCE;
    }
    score += STORM_RESISTANCE_TRUST_FACTOR * piece.trust();
    if !piece.is_dysregulated() {
        score += STORM_RESISTANCE_REGULATED;
    }
    if world.board.is_safe(piece.position) && !world.params.sanctuary_disrupted() {
        score += STORM_RESISTANCE_SANCTUARY;
    }
    score += STORM_RESISTANCE_PER_SUPPORTER * world.supportive_neighbor_count(idx) as f32;
    score
}

/// Apply a storm hit to one piece: state effect, proportional trust
/// penalty, affected mark, memory, and template-specific extras.
pub fn strike_piece(
    world: &mut GameWorld,
    events: &mut EventLog,
    storm: &mut ActiveStorm,
    idx: usize,
    subtype: DysregulationKind,
) {
    let turn = world.turn;
    let position = world.pieces[idx].position;
    let id = world.pieces[idx].id;
    let local = storm.local_intensity(position);
    let penalty = STORM_SPREAD_TRUST_FACTOR * local / storm.intensity as f32;

    let piece = &mut world.pieces[idx];
    if !piece.is_dysregulated() {
        piece.set_state(EmotionalState::Dysregulated(subtype));
        events.record(
            turn,
            GameEvent::StormStruck {
                storm: storm.kind,
                piece: id,
                subtype,
            },
        );
    }
    piece.modify_trust(-penalty);
    piece.add_memory(
        MEM_STORM_HIT,
        format!("{} struck at intensity {local:.1}", storm.kind),
        turn,
    );
    storm.affected.insert(id);

    match storm.kind {
        StormKind::AbandonmentEcho => {
            let piece = &mut world.pieces[idx];
            if piece.trust() <= TRUST_CRISIS {
                piece.planning_defection = true;
            }
        }
        StormKind::RageWildfire => {
            let neighbors: Vec<PieceId> = world
                .adjacent_indices(position)
                .into_iter()
                .filter(|&j| j != idx)
                .map(|j| world.pieces[j].id)
                .collect();
            for other in neighbors {
                world.pieces[idx].update_relationship(other, -0.5);
            }
        }
        _ => {}
    }
}

/// Chance that an affected high-trust piece breaks through this turn
pub fn breakthrough_chance(world: &GameWorld, idx: usize) -> f64 {
    let support = world.supportive_neighbor_count(idx) as f32;
    let trust = world.pieces[idx].trust();
    ((BREAKTHROUGH_BASE_CHANCE
        + BREAKTHROUGH_PER_SUPPORTER * support
        + BREAKTHROUGH_TRUST_FACTOR * trust) as f64)
        .clamp(0.0, 1.0)
}

/// Resolve a breakthrough: regulate, armor, trust reward, ally ripple.
pub fn resolve_breakthrough(
    world: &mut GameWorld,
    events: &mut EventLog,
    storm: &mut ActiveStorm,
    idx: usize,
) {
    let turn = world.turn;
    let id = world.pieces[idx].id;
    let name = world.pieces[idx].name.clone();
    let position = world.pieces[idx].position;
    let team = world.pieces[idx].team;

    let piece = &mut world.pieces[idx];
    piece.set_state(EmotionalState::Regulated);
    piece.add_buff(BuffKind::EmotionalArmor, EMOTIONAL_ARMOR_TURNS);
    piece.modify_trust(BREAKTHROUGH_TRUST_REWARD);
    piece.add_memory(MEM_BREAKTHROUGH, "broke through the storm", turn);
    storm.affected.remove(&id);

    events.record(
        turn,
        GameEvent::Breakthrough {
            piece: id,
            message: format!("{name} finds solid ground inside the storm"),
        },
    );

    // The recovery ripples to struggling teammates close by
    let allies: Vec<usize> = world
        .adjacent_indices(position)
        .into_iter()
        .filter(|&j| j != idx && world.pieces[j].team == team && world.pieces[j].is_dysregulated())
        .collect();
    for j in allies {
        if world.rng.gen_bool(BREAKTHROUGH_RIPPLE_CHANCE) {
            world.pieces[j].set_state(EmotionalState::Regulated);
        }
        world.pieces[j].modify_trust(BREAKTHROUGH_RIPPLE_TRUST);
    }
}

impl StormEngine {
    pub fn new() -> Self {
        Self {
            active: None,
            started_turn: 0,
            history: Vec::new(),
            recent_failures: 0,
            sky: SkyState::Clear,
        }
    }

    pub fn active(&self) -> Option<&ActiveStorm> {
        self.active.as_ref()
    }

    pub fn recent_failures(&self) -> u32 {
        self.recent_failures
    }

    /// External hook: a failure (a rebuffed empathy attempt, a lost piece)
    /// happened somewhere the engine can observe only through this counter.
    pub fn record_failure(&mut self) {
        self.recent_failures += 1;
    }

    /// Mean resistance across active pieces (status surface)
    pub fn average_resistance(&self, world: &GameWorld) -> f32 {
        let indices = world.active_indices();
        if indices.is_empty() {
            return 0.0;
        }
        indices
            .iter()
            .map(|&i| resistance_score(world, i))
            .sum::<f32>()
            / indices.len() as f32
    }

    /// Independently evaluated trigger conditions, in a fixed order.
    pub fn eligible_storms(world: &GameWorld, recent_failures: u32) -> Vec<StormKind> {
        let mut eligible = Vec::new();
        let avg_trust = world.average_trust();

        if avg_trust < TRIGGER_LOW_AVG_TRUST {
            eligible.push(StormKind::AbandonmentEcho);
        }
        if recent_failures > TRIGGER_FAILURE_COUNT {
            eligible.push(StormKind::PerformancePressure);
        }
        if world
            .pieces
            .iter()
            .any(|p| p.is_active() && p.trust() <= TRIGGER_CRISIS_TRUST)
        {
            eligible.push(StormKind::InnerCriticAvalanche);
        }
        if world.dysregulated_ratio() > TRIGGER_DYSREGULATED_RATIO {
            eligible.push(StormKind::RageWildfire);
        }
        if world.turn > TRIGGER_LATE_TURN && avg_trust < TRIGGER_LATE_AVG_TRUST {
            eligible.push(StormKind::DissociationFog);
        }
        eligible
    }

    /// Activate a storm: building announcement over the most troubled
    /// piece, environmental changes pushed once, then straight to active.
    pub fn activate(&mut self, world: &mut GameWorld, events: &mut EventLog, kind: StormKind) {
        debug_assert!(self.active.is_none(), "only one storm at a time");
        let t = template(kind);
        let epicenter = world
            .most_troubled_index()
            .map(|i| world.pieces[i].position)
            .unwrap_or_else(|| world.board.center());

        world.params.push_modifier(t.env_modifier());
        events.record(
            world.turn,
            GameEvent::StormWarning {
                storm: kind,
                epicenter,
                message: t.dialogue.building.to_string(),
            },
        );
        events.record(
            world.turn,
            GameEvent::StormPhase {
                storm: kind,
                phase: StormPhase::Active,
                message: t.dialogue.active.to_string(),
            },
        );

        if kind == StormKind::PerformancePressure {
            self.recent_failures = 0;
        }
        self.started_turn = world.turn;
        self.sky = SkyState::Storming;
        self.active = Some(ActiveStorm {
            kind,
            intensity: t.intensity,
            duration: t.duration,
            remaining: t.duration,
            phase: StormPhase::Active,
            epicenter,
            affected: BTreeSet::new(),
        });
        tracing::info!(storm = kind.id(), ?epicenter, "storm activated");
    }

    /// Per-turn storm work: tick the active storm, or check triggers.
    pub fn advance(&mut self, world: &mut GameWorld, events: &mut EventLog) {
        if self.active.is_some() {
            self.tick(world, events);
            return;
        }
        if self.sky == SkyState::Clearing {
            self.sky = SkyState::Clear;
        }
        let eligible = Self::eligible_storms(world, self.recent_failures);
        if eligible.is_empty() {
            return;
        }
        let kind = eligible[world.rng.gen_range(0..eligible.len())];
        self.activate(world, events, kind);
    }

    fn tick(&mut self, world: &mut GameWorld, events: &mut EventLog) {
        let mut storm = self.active.take().expect("tick requires an active storm");
        let t = storm.template();

        // 1. Spread to not-yet-affected pieces by resistance roll
        for idx in 0..world.pieces.len() {
            let piece = &world.pieces[idx];
            if !piece.is_active() || storm.affected.contains(&piece.id) {
                continue;
            }
            let resistance = resistance_score(world, idx);
            let roll = world.rng.gen::<f32>() * STORM_RESISTANCE_ROLL_MAX;
            if roll < resistance {
                continue;
            }
            let subtype = if world.rng.gen_bool(STORM_PRIMARY_EFFECT_CHANCE) {
                t.primary
            } else {
                t.secondary
            };
            let was_regulated = !world.pieces[idx].is_dysregulated();
            strike_piece(world, events, &mut storm, idx, subtype);

            // A fresh strike can jump to regulated neighbors before they
            // face their own resistance roll
            if was_regulated {
                let source = world.pieces[idx].id;
                let position = world.pieces[idx].position;
                let neighbors: Vec<PieceId> = world
                    .adjacent_indices(position)
                    .into_iter()
                    .filter(|&j| j != idx && !world.pieces[j].is_dysregulated())
                    .map(|j| world.pieces[j].id)
                    .collect();
                for target in neighbors {
                    contagion::try_spread(world, events, source, target, subtype);
                }
            }
        }

        // 2. The epicenter wanders
        if world.rng.gen_bool(STORM_DRIFT_CHANCE) {
            let (dx, dy) = DRIFT[world.rng.gen_range(0..DRIFT.len())];
            storm.epicenter = world.board.clamp(storm.epicenter.offset(dx, dy));
        }

        // 3. Continuing erosion for pieces already inside the storm
        if storm.phase == StormPhase::Active {
            let affected: Vec<PieceId> = storm.affected.iter().copied().collect();
            for id in affected {
                if let Some(p) = world.piece_mut(id) {
                    p.modify_trust(-STORM_EROSION_PER_TURN);
                }
            }
        }

        // 4. Breakthrough rolls for high-trust affected pieces
        let candidates: Vec<usize> = storm
            .affected
            .iter()
            .filter_map(|&id| world.index_of(id))
            .filter(|&i| {
                world.pieces[i].is_active() && world.pieces[i].trust() >= BREAKTHROUGH_TRUST_GATE
            })
            .collect();
        for idx in candidates {
            let chance = breakthrough_chance(world, idx);
            if world.rng.gen_bool(chance) {
                resolve_breakthrough(world, events, &mut storm, idx);
            }
        }

        // 5. Countdown
        storm.remaining -= 1;
        if storm.remaining == 1 {
            storm.phase = StormPhase::Dissipating;
            events.record(
                world.turn,
                GameEvent::StormPhase {
                    storm: storm.kind,
                    phase: StormPhase::Dissipating,
                    message: t.dialogue.dissipating.to_string(),
                },
            );
        }
        if storm.remaining == 0 {
            self.end_storm(world, events, storm);
        } else {
            self.active = Some(storm);
        }
    }

    /// End the storm: revert environmental changes exactly once, run the
    /// aftermath pass, append history, clear the board indicator.
    fn end_storm(&mut self, world: &mut GameWorld, events: &mut EventLog, storm: ActiveStorm) {
        let reverted = world.params.remove_modifier(storm.kind.id());
        debug_assert!(reverted, "environmental changes must revert exactly once");

        self.run_aftermath(world, events, &storm);

        self.history.push(StormRecord {
            kind: storm.kind,
            started_turn: self.started_turn,
            ended_turn: world.turn,
            affected: storm.affected.len(),
        });
        self.sky = SkyState::Clearing;
        events.record(
            world.turn,
            GameEvent::StormEnded {
                storm: storm.kind,
                affected: storm.affected.len(),
                message: format!("{} has passed", storm.template().name),
            },
        );
        tracing::info!(storm = storm.kind.id(), "storm ended");
    }

    /// Interrupt the storm before its natural end. Environmental changes
    /// still revert exactly once; no aftermath runs.
    pub fn abort(&mut self, world: &mut GameWorld) {
        if let Some(storm) = self.active.take() {
            let reverted = world.params.remove_modifier(storm.kind.id());
            debug_assert!(reverted);
            self.sky = SkyState::Clear;
        }
    }

    /// Co-affected teammates standing together at storm end bond over it.
    fn run_aftermath(&mut self, world: &mut GameWorld, events: &mut EventLog, storm: &ActiveStorm) {
        let turn = world.turn;
        let ids: Vec<PieceId> = storm.affected.iter().copied().collect();
        for (a_pos, &a) in ids.iter().enumerate() {
            for &b in ids.iter().skip(a_pos + 1) {
                let (Some(ia), Some(ib)) = (world.index_of(a), world.index_of(b)) else {
                    continue;
                };
                let pa = &world.pieces[ia];
                let pb = &world.pieces[ib];
                if !pa.is_active()
                    || !pb.is_active()
                    || pa.team != pb.team
                    || !pa.position.is_adjacent(&pb.position)
                {
                    continue;
                }
                world.pieces[ia].update_relationship(b, AFTERMATH_RELATIONSHIP_GAIN);
                world.pieces[ib].update_relationship(a, AFTERMATH_RELATIONSHIP_GAIN);
                if world.rng.gen_bool(TRAUMA_BOND_CHANCE) {
                    world.pieces[ia].add_memory(MEM_TRAUMA_BOND, "we went through it together", turn);
                    world.pieces[ib].add_memory(MEM_TRAUMA_BOND, "we went through it together", turn);
                    events.record(turn, GameEvent::TraumaBond { a, b });
                }
            }
        }
    }
}
