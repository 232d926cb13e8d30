//! Per-piece rolling emotional memory and pattern detection
//!
//! A bounded window of state snapshots, lazily created per piece. Detected
//! patterns fire exactly once per piece: the fired-tag set makes the
//! notification idempotent by membership.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::constants::{
    CHRONIC_DYSREGULATION_COUNT, PATTERN_RECENT, PATTERN_WINDOW_CAP, STEADY_IMPROVEMENT_SLOPE,
};
use crate::core::types::Turn;
use crate::emotion::state::DysregulationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternTag {
    ChronicDysregulation,
    SteadyImprovement,
}

impl PatternTag {
    pub fn id(&self) -> &'static str {
        match self {
            Self::ChronicDysregulation => "chronic_dysregulation",
            Self::SteadyImprovement => "steady_improvement",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::ChronicDysregulation => "has been struggling for a long stretch",
            Self::SteadyImprovement => "is steadily finding its footing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub dysregulated: bool,
    pub subtype: Option<DysregulationKind>,
    pub trust: f32,
    pub turn: Turn,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmotionalMemory {
    window: VecDeque<StateSnapshot>,
    fired: BTreeSet<PatternTag>,
}

impl EmotionalMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, snapshot: StateSnapshot) {
        self.window.push_back(snapshot);
        while self.window.len() > PATTERN_WINDOW_CAP {
            self.window.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Rolling average trust across the whole window
    pub fn average_trust(&self) -> f32 {
        if self.window.is_empty() {
            return 0.0;
        }
        self.window.iter().map(|s| s.trust).sum::<f32>() / self.window.len() as f32
    }

    pub fn has_fired(&self, tag: PatternTag) -> bool {
        self.fired.contains(&tag)
    }

    /// Evaluate the last few snapshots and return tags firing for the first
    /// time. Calling this twice in a row never returns a tag twice.
    pub fn detect(&mut self) -> Vec<PatternTag> {
        if self.window.len() < PATTERN_RECENT {
            return Vec::new();
        }
        let recent: Vec<&StateSnapshot> =
            self.window.iter().rev().take(PATTERN_RECENT).rev().collect();

        let mut newly_fired = Vec::new();

        let dysregulated = recent.iter().filter(|s| s.dysregulated).count();
        if dysregulated >= CHRONIC_DYSREGULATION_COUNT
            && self.fired.insert(PatternTag::ChronicDysregulation)
        {
            newly_fired.push(PatternTag::ChronicDysregulation);
        }

        let slope = (recent[recent.len() - 1].trust - recent[0].trust) / (PATTERN_RECENT - 1) as f32;
        if slope > STEADY_IMPROVEMENT_SLOPE && self.fired.insert(PatternTag::SteadyImprovement) {
            newly_fired.push(PatternTag::SteadyImprovement);
        }

        newly_fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(dysregulated: bool, trust: f32, turn: Turn) -> StateSnapshot {
        StateSnapshot {
            dysregulated,
            subtype: dysregulated.then_some(DysregulationKind::Anxious),
            trust,
            turn,
        }
    }

    #[test]
    fn test_window_capped_at_twenty() {
        let mut mem = EmotionalMemory::new();
        for turn in 0..30 {
            mem.record(snapshot(false, 0.0, turn));
        }
        assert_eq!(mem.len(), PATTERN_WINDOW_CAP);
    }

    #[test]
    fn test_chronic_dysregulation_fires_once() {
        let mut mem = EmotionalMemory::new();
        for turn in 0..5 {
            mem.record(snapshot(turn >= 2, 0.0, turn));
        }
        assert_eq!(mem.detect(), vec![PatternTag::ChronicDysregulation]);
        // Idempotent: same window, no new firing
        assert!(mem.detect().is_empty());
        mem.record(snapshot(true, 0.0, 5));
        assert!(mem.detect().is_empty());
        assert!(mem.has_fired(PatternTag::ChronicDysregulation));
    }

    #[test]
    fn test_steady_improvement_needs_real_slope() {
        let mut mem = EmotionalMemory::new();
        for turn in 0..5 {
            mem.record(snapshot(false, turn as f32 * 0.4, turn));
        }
        // Mean successive delta 0.4 > 0.3
        assert_eq!(mem.detect(), vec![PatternTag::SteadyImprovement]);

        let mut flat = EmotionalMemory::new();
        for turn in 0..5 {
            flat.record(snapshot(false, turn as f32 * 0.2, turn));
        }
        assert!(flat.detect().is_empty());
    }

    #[test]
    fn test_short_history_detects_nothing() {
        let mut mem = EmotionalMemory::new();
        for turn in 0..4 {
            mem.record(snapshot(true, -2.0, turn));
        }
        assert!(mem.detect().is_empty());
    }

    #[test]
    fn test_average_trust_rolls_with_window() {
        let mut mem = EmotionalMemory::new();
        mem.record(snapshot(false, 2.0, 0));
        mem.record(snapshot(false, 4.0, 1));
        assert!((mem.average_trust() - 3.0).abs() < 1e-6);
    }
}
