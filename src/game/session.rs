//! GameSession - the per-turn pipeline and the command surface
//!
//! One turn runs: autonomous behavior (check + execute) -> proximity
//! relationships -> baseline trust decay -> storm tick/trigger. The
//! pipeline suspends as a whole while an autonomous action awaits an
//! intervention decision; nothing later in the turn runs until it
//! resolves. The opponent's move is requested separately on its turn.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::behavior::engine::{BehaviorEngine, ExecStatus, PendingDecision};
use crate::board::moves::{GridMoveRules, MoveDescriptor, MoveRules};
use crate::board::Board;
use crate::core::error::{GameError, Result};
use crate::core::types::{PieceId, Position, Team};
use crate::emotion::empathy::{resolve_command, EmpathyCommand};
use crate::emotion::state::EmotionalState;
use crate::game::events::EventLog;
use crate::game::snapshot::{self, PieceSnapshot, StormStatus, WeatherReport};
use crate::game::world::GameWorld;
use crate::opponent::engine::{ChosenMove, OpponentEngine};
use crate::opponent::style::OpponentStyle;
use crate::social::relationships;
use crate::storm::engine::StormEngine;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Complete,
    AwaitingIntervention(u32),
}

/// Result of a player empathy command
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEmpathyOutcome {
    pub piece: PieceId,
    pub command: EmpathyCommand,
    pub trust_delta: f32,
    pub regulated: bool,
}

pub struct GameSession {
    pub world: GameWorld,
    pub behavior: BehaviorEngine,
    pub storm: StormEngine,
    pub opponent: OpponentEngine,
    pub events: EventLog,
    rules: Box<dyn MoveRules>,
    suspended: bool,
}

impl GameSession {
    pub fn new(board: Board, seed: u64, opponent_team: Team, style: OpponentStyle) -> Self {
        Self {
            world: GameWorld::new(board, ChaCha8Rng::seed_from_u64(seed)),
            behavior: BehaviorEngine::new(),
            storm: StormEngine::new(),
            opponent: OpponentEngine::new(opponent_team, style),
            events: EventLog::new(),
            rules: Box::new(GridMoveRules::default()),
            suspended: false,
        }
    }

    /// A standard 8x8 match: six pieces per side, a crowned piece each,
    /// two sanctuary squares near the middle, varied starting trust.
    pub fn standard(seed: u64, style: OpponentStyle) -> Self {
        let mut board = Board::new(8, 8);
        board.mark_safe(Position::new(3, 3));
        board.mark_safe(Position::new(4, 4));
        let mut session = Self::new(board, seed, Team::Dusk, style);

        const DAWN_NAMES: [&str; 6] = ["Wren", "Moss", "Fable", "Juniper", "Ash", "Briar"];
        const DUSK_NAMES: [&str; 6] = ["Slate", "Onyx", "Rook", "Vesper", "Thorn", "Cinder"];

        for (i, name) in DAWN_NAMES.iter().enumerate() {
            let x = 1 + i as i32;
            let id = session.world.spawn_piece(*name, Team::Dawn, Position::new(x, 1));
            let piece = session.world.piece_mut(id).unwrap();
            piece.modify_trust(2.0 + (i % 4) as f32);
            if i == 2 {
                piece.crowned = true;
            }
        }
        for (i, name) in DUSK_NAMES.iter().enumerate() {
            let x = 1 + i as i32;
            let id = session.world.spawn_piece(*name, Team::Dusk, Position::new(x, 6));
            let piece = session.world.piece_mut(id).unwrap();
            piece.modify_trust(2.0 + (i % 4) as f32);
            if i == 2 {
                piece.crowned = true;
            }
        }
        session
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.behavior.pending()
    }

    /// Advance one turn. Suspends (and returns the decision id) when an
    /// autonomous action needs intervention; the rest of the turn runs
    /// after `resolve_intervention`.
    pub fn advance_turn(&mut self) -> Result<TurnOutcome> {
        if self.suspended {
            return Err(GameError::DecisionPending);
        }
        self.world.turn += 1;
        tracing::debug!(turn = self.world.turn, "turn begins");

        for piece in self.world.pieces.iter_mut().filter(|p| p.is_active()) {
            piece.tick_buffs();
        }

        self.behavior.check_phase(&mut self.world, &mut self.events);
        match self.behavior.execute_phase(&mut self.world, &mut self.events) {
            ExecStatus::AwaitingDecision(id) => {
                self.suspended = true;
                Ok(TurnOutcome::AwaitingIntervention(id))
            }
            ExecStatus::Complete => {
                self.finish_turn();
                Ok(TurnOutcome::Complete)
            }
        }
    }

    /// Resolve a pending intervention and, if the queue drains, run the
    /// remainder of the suspended turn.
    pub fn resolve_intervention(&mut self, id: u32, approved: bool) -> Result<TurnOutcome> {
        let status =
            self.behavior
                .resolve_decision(&mut self.world, &mut self.events, id, approved)?;
        match status {
            ExecStatus::AwaitingDecision(next) => Ok(TurnOutcome::AwaitingIntervention(next)),
            ExecStatus::Complete => {
                self.suspended = false;
                self.finish_turn();
                Ok(TurnOutcome::Complete)
            }
        }
    }

    fn finish_turn(&mut self) {
        relationships::proximity_pass(&mut self.world);

        let decay = self.world.params.trust_decay();
        for piece in self.world.pieces.iter_mut().filter(|p| p.is_active()) {
            piece.modify_trust(-decay);
        }

        self.storm.advance(&mut self.world, &mut self.events);
    }

    /// Player empathy command against a dysregulated piece.
    pub fn submit_empathy(
        &mut self,
        piece: PieceId,
        command: EmpathyCommand,
    ) -> Result<PlayerEmpathyOutcome> {
        let idx = self.world.require_active(piece)?;
        let subtype = self.world.pieces[idx]
            .subtype()
            .ok_or(GameError::NotDysregulated(piece))?;

        let effect = resolve_command(command, subtype);
        self.world.pieces[idx].modify_trust(effect.trust_delta);
        let regulated =
            effect.regulate_chance > 0.0 && self.world.rng.gen_bool(effect.regulate_chance);
        if regulated {
            self.world.pieces[idx].set_state(EmotionalState::Regulated);
        }

        Ok(PlayerEmpathyOutcome {
            piece,
            command,
            trust_delta: effect.trust_delta,
            regulated,
        })
    }

    /// Ask the non-human side for (and apply) its move. A failed empathy
    /// attempt feeds the storm engine's failure counter.
    pub fn request_opponent_move(&mut self) -> Result<Option<ChosenMove>> {
        if self.suspended {
            return Err(GameError::DecisionPending);
        }
        let chosen =
            self.opponent
                .choose_move(&mut self.world, self.rules.as_ref(), &mut self.events);
        if let Some(chosen) = &chosen {
            if matches!(&chosen.empathy, Some(e) if !e.success) {
                self.storm.record_failure();
            }
            self.apply_move(chosen.piece, &chosen.descriptor)?;
        }
        Ok(chosen)
    }

    /// Apply a move after re-checking it against the legal enumeration.
    pub fn apply_move(&mut self, piece: PieceId, descriptor: &MoveDescriptor) -> Result<()> {
        self.world.require_active(piece)?;
        let legal = self.rules.legal_moves(&self.world, piece);
        if !legal.contains(descriptor) {
            return Err(GameError::IllegalMove {
                piece,
                to: descriptor.to,
            });
        }
        for &captured in &descriptor.captures {
            if let Some(victim) = self.world.piece_mut(captured) {
                victim.captured = true;
            }
        }
        self.world
            .piece_mut(piece)
            .expect("validated above")
            .position = descriptor.to;
        Ok(())
    }

    // Query surface

    pub fn piece_snapshot(&self, id: PieceId) -> Result<PieceSnapshot> {
        snapshot::piece_snapshot(&self.world, id)
    }

    pub fn storm_status(&self) -> Option<StormStatus> {
        snapshot::storm_status(&self.world, &self.storm)
    }

    pub fn weather_report(&self) -> WeatherReport {
        snapshot::weather_report(&self.world, &self.storm)
    }
}
