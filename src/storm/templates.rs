//! Storm templates - static crisis records
//!
//! Each storm is a named template: trigger description, severity, duration,
//! the dysregulation patterns it induces, the environmental-changes block it
//! pushes for its lifetime, and one announcement line per lifecycle phase.

use serde::{Deserialize, Serialize};

use crate::core::params::EnvModifier;
use crate::emotion::state::DysregulationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormKind {
    AbandonmentEcho,
    PerformancePressure,
    InnerCriticAvalanche,
    RageWildfire,
    DissociationFog,
}

impl StormKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::AbandonmentEcho => "abandonment_echo",
            Self::PerformancePressure => "performance_pressure",
            Self::InnerCriticAvalanche => "inner_critic_avalanche",
            Self::RageWildfire => "rage_wildfire",
            Self::DissociationFog => "dissociation_fog",
        }
    }

    pub fn all() -> [StormKind; 5] {
        [
            Self::AbandonmentEcho,
            Self::PerformancePressure,
            Self::InnerCriticAvalanche,
            Self::RageWildfire,
            Self::DissociationFog,
        ]
    }
}

impl std::fmt::Display for StormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Storm lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StormPhase {
    Building,
    Active,
    Dissipating,
}

#[derive(Debug, Clone, Copy)]
pub struct StormDialogue {
    pub building: &'static str,
    pub active: &'static str,
    pub dissipating: &'static str,
}

#[derive(Debug, Clone)]
pub struct StormTemplate {
    pub kind: StormKind,
    pub name: &'static str,
    pub trigger: &'static str,
    pub intensity: u32,
    pub duration: u32,
    pub primary: DysregulationKind,
    pub secondary: DysregulationKind,
    pub trust_decay_mult: f32,
    pub movement_mult: f32,
    pub contagion_mult: f32,
    pub communication_block: bool,
    pub sanctuary_disrupted: bool,
    pub dialogue: StormDialogue,
}

impl StormTemplate {
    /// The environmental-changes block, ready for the params modifier stack
    pub fn env_modifier(&self) -> EnvModifier {
        EnvModifier {
            source: self.kind.id().to_string(),
            trust_decay_mult: self.trust_decay_mult,
            movement_mult: self.movement_mult,
            contagion_mult: self.contagion_mult,
            communication_block: self.communication_block,
            sanctuary_disrupted: self.sanctuary_disrupted,
        }
    }
}

pub fn template(kind: StormKind) -> StormTemplate {
    use DysregulationKind::*;

    match kind {
        StormKind::AbandonmentEcho => StormTemplate {
            kind,
            name: "Abandonment Echo",
            trigger: "board-wide trust has worn thin",
            intensity: 3,
            duration: 4,
            primary: Anxious,
            secondary: Flight,
            trust_decay_mult: 1.5,
            movement_mult: 1.0,
            contagion_mult: 1.0,
            communication_block: false,
            sanctuary_disrupted: false,
            dialogue: StormDialogue {
                building: "A hollow wind rises. Every piece remembers being left behind.",
                active: "The echo howls: 'they will leave you too.'",
                dissipating: "The wind thins. Some pieces are still listening for it.",
            },
        },
        StormKind::PerformancePressure => StormTemplate {
            kind,
            name: "Performance Pressure",
            trigger: "too many recent failures in a row",
            intensity: 2,
            duration: 3,
            primary: Frozen,
            secondary: Anxious,
            trust_decay_mult: 1.0,
            movement_mult: 0.5,
            contagion_mult: 1.0,
            communication_block: false,
            sanctuary_disrupted: false,
            dialogue: StormDialogue {
                building: "The air tightens. Every square feels like a stage.",
                active: "The pressure bears down: 'do not get this wrong.'",
                dissipating: "The weight lifts, one rank at a time.",
            },
        },
        StormKind::InnerCriticAvalanche => StormTemplate {
            kind,
            name: "Inner Critic Avalanche",
            trigger: "a piece has fallen into crisis-level trust",
            intensity: 4,
            duration: 3,
            primary: Shutdown,
            secondary: Frozen,
            trust_decay_mult: 2.0,
            movement_mult: 1.0,
            contagion_mult: 1.0,
            communication_block: false,
            sanctuary_disrupted: true,
            dialogue: StormDialogue {
                building: "A rumble starts somewhere high and cold: 'not good enough.'",
                active: "The avalanche roars. Nowhere on the board feels safe.",
                dissipating: "The roar fades to a murmur. The murmur stays.",
            },
        },
        StormKind::RageWildfire => StormTemplate {
            kind,
            name: "Rage Wildfire",
            trigger: "most of the board is dysregulated",
            intensity: 4,
            duration: 4,
            primary: Fight,
            secondary: Anxious,
            trust_decay_mult: 1.0,
            movement_mult: 1.0,
            contagion_mult: 2.0,
            communication_block: false,
            sanctuary_disrupted: false,
            dialogue: StormDialogue {
                building: "Heat shimmers between the pieces. Old grievances catch.",
                active: "The fire leaps square to square, looking for someone to blame.",
                dissipating: "Embers. Everyone is counting what burned.",
            },
        },
        StormKind::DissociationFog => StormTemplate {
            kind,
            name: "Dissociation Fog",
            trigger: "a long game with little trust to show for it",
            intensity: 2,
            duration: 5,
            primary: Shutdown,
            secondary: Fawn,
            trust_decay_mult: 1.0,
            movement_mult: 0.8,
            contagion_mult: 1.0,
            communication_block: true,
            sanctuary_disrupted: false,
            dialogue: StormDialogue {
                building: "A grey fog creeps in from the edges of the board.",
                active: "Pieces drift in the fog, present and not present.",
                dissipating: "Shapes return. Nobody is sure how long it has been.",
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_well_formed() {
        for kind in StormKind::all() {
            let t = template(kind);
            assert_eq!(t.kind, kind);
            assert!(t.intensity > 0);
            assert!(t.duration > 0);
            assert_ne!(t.primary, t.secondary);
            assert!(!t.dialogue.building.is_empty());
        }
    }

    #[test]
    fn test_env_modifier_source_matches_id() {
        let t = template(StormKind::DissociationFog);
        let m = t.env_modifier();
        assert_eq!(m.source, "dissociation_fog");
        assert!(m.communication_block);
    }

    #[test]
    fn test_scenario_storm_induces_anxiety_or_flight() {
        let t = template(StormKind::AbandonmentEcho);
        assert_eq!(t.primary, DysregulationKind::Anxious);
        assert_eq!(t.secondary, DysregulationKind::Flight);
        assert_eq!(t.intensity, 3);
    }
}
