//! Shared environmental parameters with an explicit modifier stack
//!
//! Storms never mutate a parameter in place. They push a named modifier
//! record on activation and remove it exactly once on end; the effective
//! value is always base x product of active modifiers. Flags are OR'd.

use serde::{Deserialize, Serialize};

/// A named multiplier/flag block contributed by one environmental source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvModifier {
    /// Stable id of the contributing source (storm template id)
    pub source: String,
    pub trust_decay_mult: f32,
    pub movement_mult: f32,
    pub contagion_mult: f32,
    pub communication_block: bool,
    pub sanctuary_disrupted: bool,
}

impl EnvModifier {
    /// Identity modifier: multiplies by 1, sets no flags.
    pub fn neutral(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            trust_decay_mult: 1.0,
            movement_mult: 1.0,
            contagion_mult: 1.0,
            communication_block: false,
            sanctuary_disrupted: false,
        }
    }
}

/// Board-wide tunables shared by every engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameParams {
    /// Baseline per-turn trust erosion applied to every active piece
    pub base_trust_decay: f32,
    /// Baseline movement range factor consumed by move enumeration
    pub base_movement: f32,
    /// Baseline contagion chance factor
    pub base_contagion: f32,
    modifiers: Vec<EnvModifier>,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            base_trust_decay: 0.02,
            base_movement: 1.0,
            base_contagion: 1.0,
            modifiers: Vec::new(),
        }
    }
}

impl GameParams {
    pub fn trust_decay(&self) -> f32 {
        self.base_trust_decay * self.product(|m| m.trust_decay_mult)
    }

    pub fn movement_factor(&self) -> f32 {
        self.base_movement * self.product(|m| m.movement_mult)
    }

    pub fn contagion_factor(&self) -> f32 {
        self.base_contagion * self.product(|m| m.contagion_mult)
    }

    pub fn communication_blocked(&self) -> bool {
        self.modifiers.iter().any(|m| m.communication_block)
    }

    pub fn sanctuary_disrupted(&self) -> bool {
        self.modifiers.iter().any(|m| m.sanctuary_disrupted)
    }

    pub fn active_modifiers(&self) -> &[EnvModifier] {
        &self.modifiers
    }

    pub fn push_modifier(&mut self, modifier: EnvModifier) {
        self.modifiers.push(modifier);
    }

    /// Remove every modifier contributed by `source`. Returns true if any
    /// was removed, so callers can assert the revert happened exactly once.
    pub fn remove_modifier(&mut self, source: &str) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.source != source);
        self.modifiers.len() != before
    }

    fn product(&self, f: impl Fn(&EnvModifier) -> f32) -> f32 {
        self.modifiers.iter().map(f).product()
    }
}
