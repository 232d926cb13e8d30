//! Opponent decision engine
//!
//! Enumerates legal moves for the non-human side, scores them, and samples
//! from the style's top slice - in-character play, not perfect play. If the
//! chosen piece is dysregulated the style attempts empathy first; the move
//! returns regardless of how that lands.

use ahash::AHashMap;
use rand::Rng;

use crate::board::moves::{MoveDescriptor, MoveRules};
use crate::core::constants::{EMPATHY_ESCALATE_CHANCE, EMPATHY_REGULATE_FACTOR};
use crate::core::types::{PieceId, Team};
use crate::emotion::state::{DysregulationKind, EmotionalState};
use crate::game::events::{EventLog, GameEvent};
use crate::game::world::GameWorld;
use crate::opponent::scoring::{score_move, sort_candidates, MoveCandidate};
use crate::opponent::style::OpponentStyle;

/// Per-piece empathy history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmpathyRecord {
    pub successes: u32,
    pub failures: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmpathyOutcome {
    pub piece: PieceId,
    pub success: bool,
    pub trust_delta: f32,
    pub regulated: bool,
    pub worsened: Option<DysregulationKind>,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChosenMove {
    pub piece: PieceId,
    pub descriptor: MoveDescriptor,
    pub score: f32,
    pub empathy: Option<EmpathyOutcome>,
}

/// Apply an empathy attempt whose rolls already landed. Exposed so the
/// outcome arithmetic is testable without steering the RNG.
pub fn apply_empathy_outcome(
    world: &mut GameWorld,
    events: &mut EventLog,
    style: &OpponentStyle,
    piece_id: PieceId,
    success: bool,
    regulate: bool,
    worsen: bool,
) -> EmpathyOutcome {
    let turn = world.turn;
    let subtype = world
        .piece(piece_id)
        .and_then(|p| p.subtype())
        .expect("empathy targets a dysregulated piece");
    let line = style.response_for(subtype);
    let trust_delta = if success { 1.0 } else { -1.0 } + style.trust_modifier;

    let piece = world.piece_mut(piece_id).expect("piece exists");
    piece.modify_trust(trust_delta);

    let mut regulated = false;
    let mut worsened = None;
    if success && regulate {
        piece.set_state(EmotionalState::Regulated);
        regulated = true;
    } else if !success && worsen {
        let next = subtype.worsened();
        piece.set_state(EmotionalState::Dysregulated(next));
        worsened = Some(next);
    }

    events.record(
        turn,
        GameEvent::EmpathyAttempt {
            piece: piece_id,
            style: style.name.clone(),
            line: line.clone(),
            success,
        },
    );

    EmpathyOutcome {
        piece: piece_id,
        success,
        trust_delta,
        regulated,
        worsened,
        line,
    }
}

pub struct OpponentEngine {
    pub team: Team,
    pub style: OpponentStyle,
    memory: AHashMap<PieceId, EmpathyRecord>,
}

impl OpponentEngine {
    pub fn new(team: Team, style: OpponentStyle) -> Self {
        Self {
            team,
            style,
            memory: AHashMap::new(),
        }
    }

    pub fn empathy_record(&self, piece: PieceId) -> EmpathyRecord {
        self.memory.get(&piece).copied().unwrap_or_default()
    }

    /// Roll and apply an empathy attempt against a dysregulated piece,
    /// updating the success/failure memory.
    pub fn attempt_empathy(
        &mut self,
        world: &mut GameWorld,
        events: &mut EventLog,
        piece_id: PieceId,
    ) -> EmpathyOutcome {
        let success = world.rng.gen_bool(self.style.empathy_level.clamp(0.0, 1.0));
        let regulate = success
            && world
                .rng
                .gen_bool((self.style.empathy_level * EMPATHY_REGULATE_FACTOR).clamp(0.0, 1.0));
        let worsen = !success
            && self.style.escalates_on_failure
            && world.rng.gen_bool(EMPATHY_ESCALATE_CHANCE);

        let outcome =
            apply_empathy_outcome(world, events, &self.style, piece_id, success, regulate, worsen);

        let record = self.memory.entry(piece_id).or_default();
        if success {
            record.successes += 1;
        } else {
            record.failures += 1;
        }
        outcome
    }

    /// Score every legal move and pick from the style's top slice.
    /// Returns None when the side has no move.
    pub fn choose_move(
        &mut self,
        world: &mut GameWorld,
        rules: &dyn MoveRules,
        events: &mut EventLog,
    ) -> Option<ChosenMove> {
        let mut candidates: Vec<MoveCandidate> = Vec::new();
        for idx in world.team_indices(self.team) {
            let piece = &world.pieces[idx];
            if piece.is_withdrawn() {
                continue;
            }
            let record = self.empathy_record(piece.id);
            for descriptor in rules.legal_moves(world, piece.id) {
                let score = score_move(
                    world,
                    &self.style,
                    piece,
                    &descriptor,
                    record.successes,
                    record.failures,
                );
                candidates.push(MoveCandidate {
                    piece: piece.id,
                    descriptor,
                    score,
                });
            }
        }
        if candidates.is_empty() {
            return None;
        }
        sort_candidates(&mut candidates);

        let window = self.style.selection_window.clamp(1, candidates.len());
        let pick = world.rng.gen_range(0..window);
        let chosen = candidates.swap_remove(pick);
        tracing::debug!(
            piece = chosen.piece.0,
            score = chosen.score,
            "opponent move chosen"
        );

        let empathy_target = world
            .piece(chosen.piece)
            .filter(|p| p.is_dysregulated())
            .map(|p| p.id);
        let empathy = empathy_target.map(|id| self.attempt_empathy(world, events, id));

        Some(ChosenMove {
            piece: chosen.piece,
            descriptor: chosen.descriptor,
            score: chosen.score,
            empathy,
        })
    }
}
