//! The piece model: trust, emotional state, relationship ledger, memory log
//!
//! Trust and emotional state are private. Every component mutates them
//! through `modify_trust` / `set_state` so the piece stays the single
//! source of truth for history and pattern detection.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{PieceId, Position, Team, Turn};
use crate::emotion::state::{DysregulationKind, EmotionalState};

// Memory log tags. The log is flavor and read-side pattern material only;
// control flow never depends on it.
pub const MEM_STORM_HIT: &str = "storm_hit";
pub const MEM_PEER_SUPPORT: &str = "peer_support";
pub const MEM_BREAKTHROUGH: &str = "breakthrough";
pub const MEM_TRAUMA_BOND: &str = "trauma_bond";
pub const MEM_THAW: &str = "thaw";
pub const MEM_PANIC_MOVE: &str = "panic_move";
pub const MEM_LASH_OUT: &str = "lash_out";
pub const MEM_WITHDRAWAL: &str = "withdrawal";
pub const MEM_FRIENDLINESS: &str = "inappropriate_friendliness";
pub const MEM_DEFECTION: &str = "defection";
pub const MEM_CONTAGION: &str = "contagion";

/// One tagged entry in a piece's insertion-ordered memory log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub tag: String,
    pub detail: String,
    pub turn: Turn,
}

/// Temporary buff kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffKind {
    /// Extra storm resistance granted by a breakthrough
    EmotionalArmor,
    /// Piece is unselectable while withdrawn
    Withdrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Buff {
    pub kind: BuffKind,
    pub remaining: u32,
}

/// A playable unit with persistent emotional state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub name: String,
    pub team: Team,
    pub captured: bool,
    pub position: Position,
    /// King-equivalent role: weighs double in threat detection
    pub crowned: bool,
    trust: f32,
    state: EmotionalState,
    relationships: AHashMap<PieceId, f32>,
    pub memory: Vec<MemoryRecord>,
    pub planning_defection: bool,
    pub buffs: Vec<Buff>,
    /// Baseline resistance added to every storm resistance roll
    pub storm_resistance: f32,
}

impl Piece {
    pub fn new(id: PieceId, name: impl Into<String>, team: Team, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            captured: false,
            position,
            crowned: false,
            trust: 0.0,
            state: EmotionalState::Regulated,
            relationships: AHashMap::new(),
            memory: Vec::new(),
            planning_defection: false,
            buffs: Vec::new(),
            storm_resistance: 0.0,
        }
    }

    pub fn trust(&self) -> f32 {
        self.trust
    }

    /// Add `delta` to trust. No clamping: out-of-range values are signals.
    pub fn modify_trust(&mut self, delta: f32) {
        self.trust += delta;
    }

    /// Reset trust outright (defection). Everything else goes through
    /// `modify_trust`.
    pub fn reset_trust(&mut self) {
        self.trust = 0.0;
    }

    pub fn state(&self) -> EmotionalState {
        self.state
    }

    pub fn set_state(&mut self, state: EmotionalState) {
        self.state = state;
    }

    pub fn is_dysregulated(&self) -> bool {
        self.state.is_dysregulated()
    }

    pub fn subtype(&self) -> Option<DysregulationKind> {
        self.state.subtype()
    }

    /// Directed ledger entry toward `other`; absent entries read as 0.
    pub fn relationship(&self, other: PieceId) -> f32 {
        self.relationships.get(&other).copied().unwrap_or(0.0)
    }

    pub fn update_relationship(&mut self, other: PieceId, delta: f32) {
        *self.relationships.entry(other).or_insert(0.0) += delta;
    }

    pub fn is_friend_of(&self, other: PieceId) -> bool {
        self.relationship(other) > crate::core::constants::RELATIONSHIP_FRIEND
    }

    pub fn is_strained_with(&self, other: PieceId) -> bool {
        self.relationship(other) < crate::core::constants::RELATIONSHIP_STRAINED
    }

    pub fn add_memory(&mut self, tag: &str, detail: impl Into<String>, turn: Turn) {
        self.memory.push(MemoryRecord {
            tag: tag.to_string(),
            detail: detail.into(),
            turn,
        });
    }

    /// First occurrence of a tag, in insertion order.
    pub fn first_memory(&self, tag: &str) -> Option<&MemoryRecord> {
        self.memory.iter().find(|m| m.tag == tag)
    }

    pub fn has_buff(&self, kind: BuffKind) -> bool {
        self.buffs.iter().any(|b| b.kind == kind)
    }

    pub fn add_buff(&mut self, kind: BuffKind, turns: u32) {
        // Refresh instead of stacking
        if let Some(existing) = self.buffs.iter_mut().find(|b| b.kind == kind) {
            existing.remaining = existing.remaining.max(turns);
        } else {
            self.buffs.push(Buff { kind, remaining: turns });
        }
    }

    /// Count down buff durations; expired buffs drop off.
    pub fn tick_buffs(&mut self) {
        for buff in &mut self.buffs {
            buff.remaining = buff.remaining.saturating_sub(1);
        }
        self.buffs.retain(|b| b.remaining > 0);
    }

    pub fn is_withdrawn(&self) -> bool {
        self.has_buff(BuffKind::Withdrawn)
    }

    /// Active and present on the board
    pub fn is_active(&self) -> bool {
        !self.captured
    }

    /// Sorted copy of the ledger for snapshots (stable output order)
    pub fn relationships_sorted(&self) -> Vec<(PieceId, f32)> {
        let mut entries: Vec<_> = self.relationships.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(id, _)| *id);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece() -> Piece {
        Piece::new(PieceId(1), "Wren", Team::Dawn, Position::new(2, 2))
    }

    #[test]
    fn test_trust_unclamped() {
        let mut p = piece();
        p.modify_trust(-8.0);
        assert_eq!(p.trust(), -8.0);
        p.modify_trust(25.0);
        assert_eq!(p.trust(), 17.0);
    }

    #[test]
    fn test_relationship_defaults_to_zero() {
        let p = piece();
        assert_eq!(p.relationship(PieceId(99)), 0.0);
    }

    #[test]
    fn test_relationship_updates_are_directed() {
        let mut p = piece();
        p.update_relationship(PieceId(2), 1.5);
        p.update_relationship(PieceId(2), -0.5);
        assert_eq!(p.relationship(PieceId(2)), 1.0);
        // Nothing implied about the reverse direction
        assert_eq!(p.relationship(PieceId(1)), 0.0);
    }

    #[test]
    fn test_memory_preserves_insertion_order() {
        let mut p = piece();
        p.add_memory(MEM_STORM_HIT, "first", 3);
        p.add_memory(MEM_BREAKTHROUGH, "after", 5);
        p.add_memory(MEM_STORM_HIT, "second", 7);
        assert_eq!(p.first_memory(MEM_STORM_HIT).unwrap().turn, 3);
        assert_eq!(p.memory.len(), 3);
    }

    #[test]
    fn test_buffs_expire() {
        let mut p = piece();
        p.add_buff(BuffKind::Withdrawn, 2);
        assert!(p.is_withdrawn());
        p.tick_buffs();
        assert!(p.is_withdrawn());
        p.tick_buffs();
        assert!(!p.is_withdrawn());
    }

    #[test]
    fn test_buff_refresh_does_not_stack() {
        let mut p = piece();
        p.add_buff(BuffKind::EmotionalArmor, 2);
        p.add_buff(BuffKind::EmotionalArmor, 3);
        assert_eq!(p.buffs.len(), 1);
        assert_eq!(p.buffs[0].remaining, 3);
    }

    #[test]
    fn test_state_transitions() {
        use crate::emotion::state::{DysregulationKind, EmotionalState};
        let mut p = piece();
        assert!(!p.is_dysregulated());
        p.set_state(EmotionalState::Dysregulated(DysregulationKind::Anxious));
        assert_eq!(p.subtype(), Some(DysregulationKind::Anxious));
        p.set_state(EmotionalState::Regulated);
        assert_eq!(p.subtype(), None);
    }
}
