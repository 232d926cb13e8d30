//! Emotional capacity states and dysregulation subtypes
//!
//! A piece is either regulated or dysregulated with a specific distress
//! pattern. Carrying the subtype inside the variant makes "subtype defined
//! iff dysregulated" hold by construction.

use serde::{Deserialize, Serialize};

/// The specific distress pattern of a dysregulated piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DysregulationKind {
    Frozen,
    Flight,
    Fight,
    Fawn,
    Shutdown,
    Anxious,
}

impl DysregulationKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Frozen => "frozen",
            Self::Flight => "flight",
            Self::Fight => "fight",
            Self::Fawn => "fawn",
            Self::Shutdown => "shutdown",
            Self::Anxious => "anxious",
        }
    }

    /// Fixed downgrade table applied when a failed empathy attempt makes
    /// things worse. Frozen is terminal.
    pub fn worsened(&self) -> DysregulationKind {
        match self {
            Self::Fawn => Self::Anxious,
            Self::Anxious => Self::Flight,
            Self::Flight => Self::Frozen,
            Self::Fight => Self::Shutdown,
            Self::Shutdown => Self::Frozen,
            Self::Frozen => Self::Frozen,
        }
    }

    pub fn all() -> [DysregulationKind; 6] {
        [
            Self::Frozen,
            Self::Flight,
            Self::Fight,
            Self::Fawn,
            Self::Shutdown,
            Self::Anxious,
        ]
    }
}

impl std::fmt::Display for DysregulationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Binary emotional-capacity state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Regulated,
    Dysregulated(DysregulationKind),
}

impl EmotionalState {
    pub fn is_dysregulated(&self) -> bool {
        matches!(self, Self::Dysregulated(_))
    }

    pub fn subtype(&self) -> Option<DysregulationKind> {
        match self {
            Self::Regulated => None,
            Self::Dysregulated(kind) => Some(*kind),
        }
    }
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self::Regulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtype_iff_dysregulated() {
        assert_eq!(EmotionalState::Regulated.subtype(), None);
        for kind in DysregulationKind::all() {
            let state = EmotionalState::Dysregulated(kind);
            assert!(state.is_dysregulated());
            assert_eq!(state.subtype(), Some(kind));
        }
    }

    #[test]
    fn test_downgrade_shutdown_to_frozen() {
        assert_eq!(DysregulationKind::Shutdown.worsened(), DysregulationKind::Frozen);
    }

    #[test]
    fn test_downgrade_is_total_and_frozen_terminal() {
        for kind in DysregulationKind::all() {
            let _ = kind.worsened();
        }
        assert_eq!(DysregulationKind::Frozen.worsened(), DysregulationKind::Frozen);
    }
}
