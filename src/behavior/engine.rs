//! Autonomous behavior engine
//!
//! Runs once per turn in two phases. Check: every active piece is
//! snapshotted into its rolling memory, patterns are detected, and at most
//! one action is proposed per piece (pure eligibility first, then one
//! probability roll). Execute: the queue drains strictly FIFO; an action
//! that requires intervention suspends the queue until the operator
//! resolves it, and a blocked action is discarded with zero side effects.

use std::collections::VecDeque;

use ahash::AHashMap;
use rand::Rng;

use crate::behavior::actions::{AutonomousAction, SupportEffect};
use crate::behavior::patterns::{EmotionalMemory, StateSnapshot};
use crate::behavior::threats::{threat_level, threats_at};
use crate::board::moves::DIRECTIONS;
use crate::core::constants::*;
use crate::core::error::{GameError, Result};
use crate::core::types::{PieceId, Position};
use crate::emotion::piece::{
    BuffKind, MEM_DEFECTION, MEM_FRIENDLINESS, MEM_LASH_OUT, MEM_PANIC_MOVE, MEM_PEER_SUPPORT,
    MEM_THAW, MEM_WITHDRAWAL,
};
use crate::emotion::state::{DysregulationKind, EmotionalState};
use crate::game::events::{EventLog, GameEvent};
use crate::game::world::GameWorld;
use crate::social::contagion;

/// A proposed action whose conditions hold, before the probability roll.
/// Random target selection happens at materialization so the eligibility
/// check stays pure and testable.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligible {
    Thaw { helpers: Vec<PieceId> },
    PanicMove { to: Position },
    LashOut { candidates: Vec<PieceId> },
    Friendliness { candidates: Vec<PieceId> },
    Withdrawal,
    PeerSupport { target: PieceId },
    Defection { to: Position },
}

/// Evaluate the check-rule table for one piece. At most one rule applies,
/// tested in table order: subtype rules first, then trust bands.
pub fn eligible_action(world: &GameWorld, idx: usize) -> Option<Eligible> {
    use DysregulationKind::*;

    let piece = &world.pieces[idx];
    let adjacent = world.adjacent_indices(piece.position);

    match piece.subtype() {
        Some(Frozen) => {
            let helpers: Vec<PieceId> = adjacent
                .iter()
                .filter(|&&j| {
                    world.pieces[j].team == piece.team && !world.pieces[j].is_dysregulated()
                })
                .map(|&j| world.pieces[j].id)
                .collect();
            (helpers.len() >= THAW_HELPERS_REQUIRED).then_some(Eligible::Thaw { helpers })
        }
        Some(Flight) => {
            if threats_at(world, piece.team, piece.position).is_empty() {
                return None;
            }
            let current = threat_level(world, piece.team, piece.position);
            let mut best: Option<(u32, Position)> = None;
            for (dx, dy) in DIRECTIONS {
                let to = piece.position.offset(dx, dy);
                if !world.board.in_bounds(to) || world.is_occupied(to) {
                    continue;
                }
                let level = threat_level(world, piece.team, to);
                if level < current && best.map_or(true, |(b, _)| level < b) {
                    best = Some((level, to));
                }
            }
            best.map(|(_, to)| Eligible::PanicMove { to })
        }
        Some(Fight) => {
            let candidates: Vec<PieceId> = adjacent
                .iter()
                .filter(|&&j| world.pieces[j].team == piece.team)
                .map(|&j| world.pieces[j].id)
                .collect();
            (!candidates.is_empty()).then_some(Eligible::LashOut { candidates })
        }
        Some(Fawn) => {
            let candidates: Vec<PieceId> = adjacent
                .iter()
                .filter(|&&j| world.pieces[j].team != piece.team)
                .map(|&j| world.pieces[j].id)
                .collect();
            (!candidates.is_empty()).then_some(Eligible::Friendliness { candidates })
        }
        Some(Shutdown) => Some(Eligible::Withdrawal),
        Some(Anxious) | None => {
            if piece.trust() >= TRUST_SUPPORTIVE {
                let target = adjacent
                    .iter()
                    .find(|&&j| {
                        world.pieces[j].team == piece.team && world.pieces[j].is_dysregulated()
                    })
                    .map(|&j| world.pieces[j].id)?;
                Some(Eligible::PeerSupport { target })
            } else if piece.trust() <= TRUST_DEFECTION && piece.planning_defection {
                defection_target(world, idx).map(|to| Eligible::Defection { to })
            } else {
                None
            }
        }
    }
}

pub fn proposal_chance(eligible: &Eligible) -> f64 {
    match eligible {
        Eligible::Thaw { .. } => THAW_CHANCE,
        Eligible::PanicMove { .. } => PANIC_MOVE_CHANCE,
        Eligible::LashOut { .. } => LASH_OUT_CHANCE,
        Eligible::Friendliness { .. } => FRIENDLINESS_CHANCE,
        Eligible::Withdrawal => WITHDRAWAL_CHANCE,
        Eligible::PeerSupport { .. } => PEER_SUPPORT_CHANCE,
        Eligible::Defection { .. } => DEFECTION_CHANCE,
    }
}

/// First free square on the rival half, scanning from the rival's home rank
/// inward and from the defector's file outward. Deterministic.
pub fn defection_target(world: &GameWorld, idx: usize) -> Option<Position> {
    let piece = &world.pieces[idx];
    let board = &world.board;
    let half = board.height / 2;
    let rows: Vec<i32> = match piece.team {
        crate::core::types::Team::Dawn => (half..board.height).rev().collect(),
        crate::core::types::Team::Dusk => (0..half).collect(),
    };
    for y in rows {
        for offset in 0..board.width {
            let candidates = if offset == 0 {
                vec![0]
            } else {
                vec![offset, -offset]
            };
            for dx in candidates {
                let pos = Position::new(piece.position.x + dx, y);
                if board.in_bounds(pos) && !world.is_occupied(pos) {
                    return Some(pos);
                }
            }
        }
    }
    None
}

fn materialize(world: &mut GameWorld, idx: usize, eligible: Eligible) -> AutonomousAction {
    let piece = world.pieces[idx].id;
    match eligible {
        Eligible::Thaw { helpers } => AutonomousAction::Thaw { piece, helpers },
        Eligible::PanicMove { to } => AutonomousAction::PanicMove { piece, to },
        Eligible::LashOut { candidates } => {
            let target = candidates[world.rng.gen_range(0..candidates.len())];
            AutonomousAction::LashOut { piece, target }
        }
        Eligible::Friendliness { candidates } => {
            let target = candidates[world.rng.gen_range(0..candidates.len())];
            AutonomousAction::InappropriateFriendliness { piece, target }
        }
        Eligible::Withdrawal => AutonomousAction::CompleteWithdrawal {
            piece,
            turns: WITHDRAWAL_TURNS,
        },
        Eligible::PeerSupport { target } => AutonomousAction::PeerSupport {
            piece,
            target,
            effect: SupportEffect::default(),
        },
        Eligible::Defection { to } => AutonomousAction::DefectionAttempt { piece, to },
    }
}

/// Apply one action's side effects. The single interpreter for every
/// queued action, shared by direct execution and approved interventions.
pub fn apply_action(world: &mut GameWorld, events: &mut EventLog, action: AutonomousAction) {
    let turn = world.turn;
    events.record(
        turn,
        GameEvent::AutonomousAction {
            piece: action.piece(),
            kind: action.kind_id().to_string(),
            message: action.message(world),
        },
    );

    match action {
        AutonomousAction::Thaw { piece, helpers } => {
            let p = world.piece_mut(piece).expect("queued piece exists");
            p.set_state(EmotionalState::Regulated);
            p.add_memory(MEM_THAW, format!("{} allies helped", helpers.len()), turn);
            for helper in helpers {
                world
                    .piece_mut(piece)
                    .expect("queued piece exists")
                    .update_relationship(helper, THAW_RELATIONSHIP_SELF);
                if let Some(h) = world.piece_mut(helper) {
                    h.update_relationship(piece, THAW_RELATIONSHIP_HELPER);
                }
            }
        }
        AutonomousAction::PanicMove { piece, to } => {
            if world.is_occupied(to) {
                tracing::debug!(piece = piece.0, "panic move target occupied, dropped");
                return;
            }
            let p = world.piece_mut(piece).expect("queued piece exists");
            p.position = to;
            p.modify_trust(-PANIC_MOVE_TRUST_COST);
            p.add_memory(MEM_PANIC_MOVE, format!("fled to {to}"), turn);
        }
        AutonomousAction::LashOut { piece, target } => {
            if let Some(t) = world.piece_mut(target) {
                t.modify_trust(-LASH_OUT_TRUST_COST);
                t.update_relationship(piece, LASH_OUT_RELATIONSHIP_TARGET);
            }
            let p = world.piece_mut(piece).expect("queued piece exists");
            p.update_relationship(target, LASH_OUT_RELATIONSHIP_SELF);
            p.add_memory(MEM_LASH_OUT, "snapped at a teammate", turn);

            let target_regulated = world
                .piece(target)
                .map(|t| t.is_active() && !t.is_dysregulated())
                .unwrap_or(false);
            if target_regulated {
                contagion::try_spread(world, events, piece, target, DysregulationKind::Anxious);
            }
        }
        AutonomousAction::PeerSupport {
            piece,
            target,
            effect,
        } => {
            if let Some(t) = world.piece_mut(target) {
                t.modify_trust(effect.trust_delta);
                t.update_relationship(piece, effect.relationship_delta);
                if effect.regulate {
                    t.set_state(EmotionalState::Regulated);
                }
                t.add_memory(MEM_PEER_SUPPORT, "a teammate stayed close", turn);
            }
            let p = world.piece_mut(piece).expect("queued piece exists");
            p.update_relationship(target, effect.relationship_delta);
            p.add_memory(MEM_PEER_SUPPORT, "stayed close to a teammate", turn);
        }
        AutonomousAction::DefectionAttempt { piece, to } => {
            if world.is_occupied(to) {
                tracing::debug!(piece = piece.0, "defection square occupied, dropped");
                return;
            }
            let p = world.piece_mut(piece).expect("queued piece exists");
            let new_team = p.team.rival();
            p.team = new_team;
            p.reset_trust();
            p.position = to;
            p.planning_defection = false;
            p.add_memory(MEM_DEFECTION, "crossed the board", turn);
            events.record(
                turn,
                GameEvent::DefectionComplete {
                    piece,
                    team: new_team,
                },
            );
        }
        AutonomousAction::InappropriateFriendliness { piece, target } => {
            let p = world.piece_mut(piece).expect("queued piece exists");
            p.add_memory(
                MEM_FRIENDLINESS,
                format!("sought approval from piece {}", target.0),
                turn,
            );
        }
        AutonomousAction::CompleteWithdrawal { piece, turns } => {
            let p = world.piece_mut(piece).expect("queued piece exists");
            p.add_buff(BuffKind::Withdrawn, turns);
            p.add_memory(MEM_WITHDRAWAL, "went somewhere far inside", turn);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingDecision {
    pub id: u32,
    pub action: AutonomousAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Complete,
    AwaitingDecision(u32),
}

#[derive(Default)]
pub struct BehaviorEngine {
    queue: VecDeque<AutonomousAction>,
    pending: Option<PendingDecision>,
    next_decision: u32,
    memories: AHashMap<PieceId, EmotionalMemory>,
}

impl BehaviorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&PendingDecision> {
        self.pending.as_ref()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Push an action directly (replay and tests)
    pub fn enqueue(&mut self, action: AutonomousAction) {
        self.queue.push_back(action);
    }

    pub fn memory(&self, piece: PieceId) -> Option<&EmotionalMemory> {
        self.memories.get(&piece)
    }

    /// Phase one: snapshot memories, detect patterns, propose actions.
    pub fn check_phase(&mut self, world: &mut GameWorld, events: &mut EventLog) {
        for idx in 0..world.pieces.len() {
            if !world.pieces[idx].is_active() {
                continue;
            }

            let (id, name, snapshot) = {
                let p = &world.pieces[idx];
                (
                    p.id,
                    p.name.clone(),
                    StateSnapshot {
                        dysregulated: p.is_dysregulated(),
                        subtype: p.subtype(),
                        trust: p.trust(),
                        turn: world.turn,
                    },
                )
            };
            let memory = self.memories.entry(id).or_default();
            memory.record(snapshot);
            for tag in memory.detect() {
                events.record(
                    world.turn,
                    GameEvent::PatternDetected {
                        piece: id,
                        pattern: tag.id().to_string(),
                        message: format!("{} {}", name, tag.message()),
                    },
                );
            }

            if world.pieces[idx].is_withdrawn() {
                continue;
            }
            let Some(eligible) = eligible_action(world, idx) else {
                continue;
            };
            let chance = proposal_chance(&eligible);
            if world.rng.gen_bool(chance) {
                let action = materialize(world, idx, eligible);
                tracing::debug!(piece = id.0, kind = action.kind_id(), "action proposed");
                self.queue.push_back(action);
            }
        }
    }

    /// Phase two: drain the queue FIFO, suspending on interventions.
    pub fn execute_phase(&mut self, world: &mut GameWorld, events: &mut EventLog) -> ExecStatus {
        if let Some(p) = &self.pending {
            return ExecStatus::AwaitingDecision(p.id);
        }
        while let Some(action) = self.queue.pop_front() {
            if action.requires_intervention() {
                let id = self.next_decision;
                self.next_decision += 1;
                events.record(
                    world.turn,
                    GameEvent::InterventionRequired {
                        decision: id,
                        piece: action.piece(),
                        message: action.message(world),
                    },
                );
                self.pending = Some(PendingDecision { id, action });
                return ExecStatus::AwaitingDecision(id);
            }
            apply_action(world, events, action);
        }
        ExecStatus::Complete
    }

    /// Resolve the suspended action and continue draining the queue.
    pub fn resolve_decision(
        &mut self,
        world: &mut GameWorld,
        events: &mut EventLog,
        id: u32,
        approved: bool,
    ) -> Result<ExecStatus> {
        match self.pending.take() {
            Some(pending) if pending.id == id => {
                if approved {
                    apply_action(world, events, pending.action);
                } else {
                    events.record(
                        world.turn,
                        GameEvent::ActionBlocked {
                            decision: id,
                            piece: pending.action.piece(),
                        },
                    );
                }
                Ok(self.execute_phase(world, events))
            }
            other => {
                self.pending = other;
                Err(GameError::UnknownDecision(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::core::types::Team;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world() -> GameWorld {
        GameWorld::new(Board::new(8, 8), ChaCha8Rng::seed_from_u64(17))
    }

    fn dysregulate(world: &mut GameWorld, id: PieceId, kind: DysregulationKind) {
        world
            .piece_mut(id)
            .unwrap()
            .set_state(EmotionalState::Dysregulated(kind));
    }

    #[test]
    fn test_frozen_needs_two_regulated_allies() {
        let mut w = world();
        let frozen = w.spawn_piece("Frozen", Team::Dawn, Position::new(3, 3));
        dysregulate(&mut w, frozen, DysregulationKind::Frozen);
        w.spawn_piece("Helper1", Team::Dawn, Position::new(2, 3));

        // One ally: never eligible
        assert_eq!(eligible_action(&w, 0), None);

        let h2 = w.spawn_piece("Helper2", Team::Dawn, Position::new(4, 3));
        assert!(matches!(
            eligible_action(&w, 0),
            Some(Eligible::Thaw { .. })
        ));

        // A dysregulated second ally does not count
        dysregulate(&mut w, h2, DysregulationKind::Anxious);
        assert_eq!(eligible_action(&w, 0), None);
    }

    #[test]
    fn test_flight_needs_threat_and_safer_square() {
        let mut w = world();
        let flighty = w.spawn_piece("Flighty", Team::Dawn, Position::new(3, 3));
        dysregulate(&mut w, flighty, DysregulationKind::Flight);

        // No threats: nothing to flee
        assert_eq!(eligible_action(&w, 0), None);

        w.spawn_piece("Enemy", Team::Dusk, Position::new(4, 3));
        let eligible = eligible_action(&w, 0);
        let Some(Eligible::PanicMove { to }) = eligible else {
            panic!("expected panic move, got {eligible:?}");
        };
        // The chosen square is strictly safer than the current one
        assert!(threat_level(&w, Team::Dawn, to) < threat_level(&w, Team::Dawn, Position::new(3, 3)));
    }

    #[test]
    fn test_peer_support_gated_on_struggling_neighbor() {
        let mut w = world();
        let helper = w.spawn_piece("Helper", Team::Dawn, Position::new(3, 3));
        w.piece_mut(helper).unwrap().modify_trust(9.0);

        // High trust alone is not enough
        assert_eq!(eligible_action(&w, 0), None);

        let shaky = w.spawn_piece("Shaky", Team::Dawn, Position::new(4, 3));
        dysregulate(&mut w, shaky, DysregulationKind::Anxious);
        assert_eq!(
            eligible_action(&w, 0),
            Some(Eligible::PeerSupport { target: shaky })
        );
    }

    #[test]
    fn test_defection_needs_flag_and_low_trust() {
        let mut w = world();
        let bitter = w.spawn_piece("Bitter", Team::Dawn, Position::new(3, 1));
        w.piece_mut(bitter).unwrap().modify_trust(-5.0);
        assert_eq!(eligible_action(&w, 0), None);

        w.piece_mut(bitter).unwrap().planning_defection = true;
        let Some(Eligible::Defection { to }) = eligible_action(&w, 0) else {
            panic!("expected defection");
        };
        // Target lies in the rival half
        assert!(to.y >= w.board.height / 2);
    }

    #[test]
    fn test_lash_out_side_effects() {
        let mut w = world();
        let q = w.spawn_piece("Q", Team::Dawn, Position::new(3, 3));
        let r = w.spawn_piece("R", Team::Dawn, Position::new(4, 3));
        dysregulate(&mut w, q, DysregulationKind::Fight);
        // Suppress the contagion roll so the deltas are exact
        let mut damp = crate::core::params::EnvModifier::neutral("damp");
        damp.contagion_mult = 0.0;
        w.params.push_modifier(damp);

        let mut events = EventLog::new();
        apply_action(
            &mut w,
            &mut events,
            AutonomousAction::LashOut { piece: q, target: r },
        );

        assert!((w.piece(r).unwrap().trust() - -0.3).abs() < 1e-6);
        assert!((w.piece(q).unwrap().relationship(r) - -1.0).abs() < 1e-6);
        assert!((w.piece(r).unwrap().relationship(q) - -0.5).abs() < 1e-6);
        assert!(!w.piece(r).unwrap().is_dysregulated());
    }

    #[test]
    fn test_blocked_action_has_no_side_effects() {
        let mut w = world();
        let piece = w.spawn_piece("Jumpy", Team::Dawn, Position::new(3, 3));
        let mut engine = BehaviorEngine::new();
        let mut events = EventLog::new();

        engine.enqueue(AutonomousAction::PanicMove {
            piece,
            to: Position::new(0, 0),
        });
        let status = engine.execute_phase(&mut w, &mut events);
        let ExecStatus::AwaitingDecision(id) = status else {
            panic!("expected suspension");
        };

        let status = engine.resolve_decision(&mut w, &mut events, id, false).unwrap();
        assert_eq!(status, ExecStatus::Complete);
        assert_eq!(w.piece(piece).unwrap().position, Position::new(3, 3));
        assert_eq!(w.piece(piece).unwrap().trust(), 0.0);
        assert!(events
            .entries
            .iter()
            .any(|e| matches!(e.event, GameEvent::ActionBlocked { .. })));
    }

    #[test]
    fn test_queue_is_fifo_and_waits_on_suspension() {
        let mut w = world();
        let a = w.spawn_piece("A", Team::Dawn, Position::new(3, 3));
        let b = w.spawn_piece("B", Team::Dawn, Position::new(5, 5));
        let mut engine = BehaviorEngine::new();
        let mut events = EventLog::new();

        engine.enqueue(AutonomousAction::PanicMove {
            piece: a,
            to: Position::new(2, 2),
        });
        engine.enqueue(AutonomousAction::CompleteWithdrawal { piece: b, turns: 2 });

        let ExecStatus::AwaitingDecision(id) = engine.execute_phase(&mut w, &mut events) else {
            panic!("expected suspension");
        };
        // The later action must not run while the first is pending
        assert!(!w.piece(b).unwrap().is_withdrawn());

        engine.resolve_decision(&mut w, &mut events, id, true).unwrap();
        assert_eq!(w.piece(a).unwrap().position, Position::new(2, 2));
        assert!(w.piece(b).unwrap().is_withdrawn());
    }

    #[test]
    fn test_resolve_unknown_decision_errors() {
        let mut w = world();
        w.spawn_piece("A", Team::Dawn, Position::new(3, 3));
        let mut engine = BehaviorEngine::new();
        let mut events = EventLog::new();
        assert!(matches!(
            engine.resolve_decision(&mut w, &mut events, 7, true),
            Err(GameError::UnknownDecision(7))
        ));
    }

    #[test]
    fn test_approved_defection_flips_team_and_resets_trust() {
        let mut w = world();
        let piece = w.spawn_piece("Bitter", Team::Dawn, Position::new(3, 1));
        w.piece_mut(piece).unwrap().modify_trust(-5.0);
        w.piece_mut(piece).unwrap().planning_defection = true;
        let mut events = EventLog::new();

        apply_action(
            &mut w,
            &mut events,
            AutonomousAction::DefectionAttempt {
                piece,
                to: Position::new(3, 7),
            },
        );

        let p = w.piece(piece).unwrap();
        assert_eq!(p.team, Team::Dusk);
        assert_eq!(p.trust(), 0.0);
        assert_eq!(p.position, Position::new(3, 7));
        assert!(!p.planning_defection);
        assert!(events
            .entries
            .iter()
            .any(|e| matches!(e.event, GameEvent::DefectionComplete { .. })));
    }

    #[test]
    fn test_peer_support_interpreter_applies_data_effect() {
        let mut w = world();
        let helper = w.spawn_piece("Helper", Team::Dawn, Position::new(3, 3));
        let shaky = w.spawn_piece("Shaky", Team::Dawn, Position::new(4, 3));
        dysregulate(&mut w, shaky, DysregulationKind::Anxious);
        let mut events = EventLog::new();

        apply_action(
            &mut w,
            &mut events,
            AutonomousAction::PeerSupport {
                piece: helper,
                target: shaky,
                effect: SupportEffect {
                    trust_delta: 1.0,
                    relationship_delta: 0.5,
                    regulate: true,
                },
            },
        );

        let t = w.piece(shaky).unwrap();
        assert!((t.trust() - 1.0).abs() < 1e-6);
        assert!(!t.is_dysregulated());
        assert!((t.relationship(helper) - 0.5).abs() < 1e-6);
        assert!((w.piece(helper).unwrap().relationship(shaky) - 0.5).abs() < 1e-6);
    }
}
