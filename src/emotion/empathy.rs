//! Player empathy command resolution
//!
//! A small fixed menu of command tags resolved against the target's
//! dysregulation subtype. Resolution is a pure categorical table; the
//! session applies the resulting deltas and rolls the regulate chance.

use serde::{Deserialize, Serialize};

use crate::emotion::state::DysregulationKind;

/// The ordered empathy command menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmpathyCommand {
    Validate,
    Soothe,
    Encourage,
    GiveSpace,
    Listen,
}

impl EmpathyCommand {
    pub fn all() -> [EmpathyCommand; 5] {
        [
            Self::Validate,
            Self::Soothe,
            Self::Encourage,
            Self::GiveSpace,
            Self::Listen,
        ]
    }

    pub fn id(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Soothe => "soothe",
            Self::Encourage => "encourage",
            Self::GiveSpace => "give_space",
            Self::Listen => "listen",
        }
    }
}

/// Outcome of resolving one command against one subtype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmpathyEffect {
    pub trust_delta: f32,
    pub regulate_chance: f64,
}

/// Resolve a command against a subtype.
///
/// Each subtype has one preferred command with the strongest effect.
/// Pushing a frozen or shutdown piece to act backfires.
pub fn resolve_command(command: EmpathyCommand, kind: DysregulationKind) -> EmpathyEffect {
    use DysregulationKind::*;
    use EmpathyCommand::*;

    let (trust_delta, regulate_chance) = match (command, kind) {
        (Validate, Fight) => (1.2, 0.35),
        (Validate, Anxious) => (1.0, 0.3),
        (Soothe, Anxious) => (1.5, 0.4),
        (Soothe, Flight) => (1.2, 0.35),
        (Encourage, Frozen) => (1.2, 0.4),
        (Encourage, Shutdown) => (-0.5, 0.0),
        (Encourage, Anxious) => (-0.5, 0.0),
        (GiveSpace, Shutdown) => (1.5, 0.5),
        (GiveSpace, Frozen) => (0.8, 0.2),
        (Listen, Fawn) => (1.2, 0.35),
        _ => (0.5, 0.1),
    };

    EmpathyEffect {
        trust_delta,
        regulate_chance,
    }
}
