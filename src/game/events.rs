//! Outbound events and the session event log
//!
//! Everything a presentation layer needs to render an announcement without
//! reaching back into internal state: piece ids, a human-readable message,
//! and an effect summary where one applies.

use serde::{Deserialize, Serialize};

use crate::core::types::{PieceId, Position, Team, Turn};
use crate::emotion::state::DysregulationKind;
use crate::storm::templates::{StormKind, StormPhase};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A piece acted (or announced an action) on its own
    AutonomousAction {
        piece: PieceId,
        kind: String,
        message: String,
    },
    /// An irreversible autonomous action awaits an operator decision
    InterventionRequired {
        decision: u32,
        piece: PieceId,
        message: String,
    },
    /// A pending action was blocked; no side effects were applied
    ActionBlocked { decision: u32, piece: PieceId },
    /// Dysregulation spread from one piece to an adjacent one
    Contagion {
        source: PieceId,
        target: PieceId,
        subtype: DysregulationKind,
    },
    /// A rolling-memory pattern fired (at most once per piece per tag)
    PatternDetected {
        piece: PieceId,
        pattern: String,
        message: String,
    },
    /// A storm has formed (building-phase announcement)
    StormWarning {
        storm: StormKind,
        epicenter: Position,
        message: String,
    },
    /// A storm changed lifecycle phase
    StormPhase {
        storm: StormKind,
        phase: StormPhase,
        message: String,
    },
    /// A piece failed its resistance roll
    StormStruck {
        storm: StormKind,
        piece: PieceId,
        subtype: DysregulationKind,
    },
    /// A storm ended and its environmental changes were reverted
    StormEnded {
        storm: StormKind,
        affected: usize,
        message: String,
    },
    /// A piece recovered mid-storm
    Breakthrough { piece: PieceId, message: String },
    /// An approved defection completed
    DefectionComplete { piece: PieceId, team: Team },
    /// The opponent tried an empathy action before moving
    EmpathyAttempt {
        piece: PieceId,
        style: String,
        line: String,
        success: bool,
    },
    /// Two storm survivors bonded in the aftermath
    TraumaBond { a: PieceId, b: PieceId },
}

impl GameEvent {
    pub fn participants(&self) -> Vec<PieceId> {
        match self {
            Self::AutonomousAction { piece, .. }
            | Self::InterventionRequired { piece, .. }
            | Self::ActionBlocked { piece, .. }
            | Self::PatternDetected { piece, .. }
            | Self::StormStruck { piece, .. }
            | Self::Breakthrough { piece, .. }
            | Self::DefectionComplete { piece, .. }
            | Self::EmpathyAttempt { piece, .. } => vec![*piece],
            Self::Contagion { source, target, .. } => vec![*source, *target],
            Self::TraumaBond { a, b } => vec![*a, *b],
            Self::StormWarning { .. } | Self::StormPhase { .. } | Self::StormEnded { .. } => {
                Vec::new()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    pub turn: Turn,
    pub event: GameEvent,
}

/// The complete outbound event log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, turn: Turn, event: GameEvent) {
        self.entries.push(LoggedEvent { turn, event });
    }

    pub fn events_for_turn(&self, turn: Turn) -> impl Iterator<Item = &LoggedEvent> {
        self.entries.iter().filter(move |e| e.turn == turn)
    }

    pub fn events_for_piece(&self, piece: PieceId) -> impl Iterator<Item = &LoggedEvent> {
        self.entries
            .iter()
            .filter(move |e| e.event.participants().contains(&piece))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_for_piece_matches_participants() {
        let mut log = EventLog::new();
        log.record(
            1,
            GameEvent::Contagion {
                source: PieceId(0),
                target: PieceId(1),
                subtype: DysregulationKind::Anxious,
            },
        );
        log.record(
            2,
            GameEvent::Breakthrough {
                piece: PieceId(2),
                message: "steadies".into(),
            },
        );

        assert_eq!(log.events_for_piece(PieceId(1)).count(), 1);
        assert_eq!(log.events_for_piece(PieceId(2)).count(), 1);
        assert_eq!(log.events_for_piece(PieceId(3)).count(), 0);
    }

    #[test]
    fn test_events_for_turn() {
        let mut log = EventLog::new();
        log.record(
            4,
            GameEvent::TraumaBond {
                a: PieceId(0),
                b: PieceId(1),
            },
        );
        assert_eq!(log.events_for_turn(4).count(), 1);
        assert_eq!(log.events_for_turn(5).count(), 0);
    }
}
