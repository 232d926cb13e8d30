//! Emotional-core constants - all tunable values in one place
//!
//! Probabilities are per-turn unless noted. Trust is unclamped; the
//! thresholds below are signal levels, not bounds.

// Trust signal thresholds
pub const TRUST_CRISIS: f32 = -3.0;
pub const TRUST_SUPPORTIVE: f32 = 8.0;
pub const TRUST_DEFECTION: f32 = -4.0;
/// Minimum trust of a regulated teammate that counts as a supportive neighbor
pub const TRUST_SUPPORT_NEIGHBOR: f32 = 5.0;

// Relationship signal thresholds
pub const RELATIONSHIP_FRIEND: f32 = 3.0;
pub const RELATIONSHIP_STRAINED: f32 = -2.0;

// Proximity relationship deltas (per adjacent pair, per turn)
pub const BOND_BOTH_REGULATED: f32 = 0.1;
pub const BOND_LEAN_ON_SUPPORT_SELF: f32 = 0.2;
pub const BOND_LEAN_ON_SUPPORT_OTHER: f32 = 0.1;
pub const BOND_SHARED_MISERY: f32 = -0.1;
pub const BOND_GRUDGING_RESPECT: f32 = 0.05;

// Autonomous behavior proposal chances
pub const THAW_CHANCE: f64 = 0.3;
pub const PANIC_MOVE_CHANCE: f64 = 0.4;
pub const LASH_OUT_CHANCE: f64 = 0.3;
pub const FRIENDLINESS_CHANCE: f64 = 0.3;
pub const WITHDRAWAL_CHANCE: f64 = 0.2;
pub const PEER_SUPPORT_CHANCE: f64 = 0.5;
pub const DEFECTION_CHANCE: f64 = 0.2;

// Autonomous behavior side effects
pub const THAW_HELPERS_REQUIRED: usize = 2;
pub const THAW_RELATIONSHIP_SELF: f32 = 2.0;
pub const THAW_RELATIONSHIP_HELPER: f32 = 1.0;
pub const PANIC_MOVE_TRUST_COST: f32 = 0.5;
pub const LASH_OUT_TRUST_COST: f32 = 0.3;
pub const LASH_OUT_RELATIONSHIP_SELF: f32 = -1.0;
pub const LASH_OUT_RELATIONSHIP_TARGET: f32 = -0.5;
pub const WITHDRAWAL_TURNS: u32 = 3;
pub const PEER_SUPPORT_TRUST: f32 = 1.0;
pub const PEER_SUPPORT_RELATIONSHIP: f32 = 0.5;

// Threat detection
pub const THREAT_RANGE: u32 = 3;
pub const THREAT_WEIGHT_CROWNED: u32 = 2;
pub const THREAT_WEIGHT_NORMAL: u32 = 1;

// Pattern detection (rolling window)
pub const PATTERN_WINDOW_CAP: usize = 20;
pub const PATTERN_RECENT: usize = 5;
pub const CHRONIC_DYSREGULATION_COUNT: usize = 3;
pub const STEADY_IMPROVEMENT_SLOPE: f32 = 0.3;

// Contagion
pub const CONTAGION_BASE_CHANCE: f32 = 0.3;

// Storms
pub const STORM_RESISTANCE_TRUST_FACTOR: f32 = 0.5;
pub const STORM_RESISTANCE_REGULATED: f32 = 2.0;
pub const STORM_RESISTANCE_SANCTUARY: f32 = 3.0;
pub const STORM_RESISTANCE_PER_SUPPORTER: f32 = 0.5;
pub const STORM_RESISTANCE_ROLL_MAX: f32 = 10.0;
pub const STORM_PRIMARY_EFFECT_CHANCE: f64 = 0.7;
pub const STORM_SPREAD_TRUST_FACTOR: f32 = 0.5;
pub const STORM_INTENSITY_DISTANCE_DECAY: f32 = 0.4;
pub const STORM_INTENSITY_FLOOR: f32 = 0.5;
pub const STORM_DRIFT_CHANCE: f64 = 0.3;
pub const STORM_EROSION_PER_TURN: f32 = 0.1;
pub const BREAKTHROUGH_TRUST_GATE: f32 = 6.0;
pub const BREAKTHROUGH_BASE_CHANCE: f32 = 0.1;
pub const BREAKTHROUGH_PER_SUPPORTER: f32 = 0.1;
pub const BREAKTHROUGH_TRUST_FACTOR: f32 = 0.02;
pub const BREAKTHROUGH_TRUST_REWARD: f32 = 2.0;
pub const BREAKTHROUGH_RIPPLE_CHANCE: f64 = 0.3;
pub const BREAKTHROUGH_RIPPLE_TRUST: f32 = 0.5;
pub const EMOTIONAL_ARMOR_TURNS: u32 = 3;
pub const EMOTIONAL_ARMOR_RESISTANCE: f32 = 2.0;
pub const AFTERMATH_RELATIONSHIP_GAIN: f32 = 1.0;
pub const TRAUMA_BOND_CHANCE: f64 = 0.3;

// Storm trigger conditions
pub const TRIGGER_LOW_AVG_TRUST: f32 = 3.0;
pub const TRIGGER_FAILURE_COUNT: u32 = 3;
pub const TRIGGER_CRISIS_TRUST: f32 = -3.0;
pub const TRIGGER_DYSREGULATED_RATIO: f32 = 0.6;
pub const TRIGGER_LATE_TURN: u64 = 15;
pub const TRIGGER_LATE_AVG_TRUST: f32 = 5.0;

// Opponent scoring
pub const SCORE_PER_CAPTURE: f32 = 10.0;
pub const SCORE_CENTRALITY_BASE: f32 = 7.0;
pub const SCORE_FORWARD_PROGRESS: f32 = 3.0;
pub const EMO_MULT_FROZEN: f32 = 0.1;
pub const EMO_MULT_ANXIOUS: f32 = 0.6;
pub const EMO_MULT_FIGHT_CAPTURE: f32 = 1.3;
pub const EMO_MULT_FLIGHT_RETREAT: f32 = 1.4;
pub const EMO_MULT_FAWN: f32 = 0.8;
pub const EMO_MULT_SHUTDOWN: f32 = 0.2;
pub const TRUST_MULT_HIGH_GATE: f32 = 7.0;
pub const TRUST_MULT_HIGH: f32 = 1.3;
pub const TRUST_MULT_LOW_GATE: f32 = -3.0;
pub const TRUST_MULT_LOW: f32 = 0.5;
pub const MEMORY_FAILURES_GATE: u32 = 2;
pub const MEMORY_FAILURE_MULT: f32 = 0.8;
pub const MEMORY_SUCCESSES_GATE: u32 = 3;
pub const MEMORY_SUCCESS_MULT: f32 = 1.2;
pub const EMPATHY_REGULATE_FACTOR: f64 = 0.5;
pub const EMPATHY_ESCALATE_CHANCE: f64 = 0.3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chances_are_probabilities() {
        for chance in [
            THAW_CHANCE,
            PANIC_MOVE_CHANCE,
            LASH_OUT_CHANCE,
            FRIENDLINESS_CHANCE,
            WITHDRAWAL_CHANCE,
            PEER_SUPPORT_CHANCE,
            DEFECTION_CHANCE,
            STORM_PRIMARY_EFFECT_CHANCE,
            STORM_DRIFT_CHANCE,
            TRAUMA_BOND_CHANCE,
            EMPATHY_ESCALATE_CHANCE,
        ] {
            assert!((0.0..=1.0).contains(&chance));
        }
    }

    #[test]
    fn test_threshold_ordering() {
        assert!(TRUST_DEFECTION < TRUST_CRISIS);
        assert!(TRUST_CRISIS < TRUST_SUPPORT_NEIGHBOR);
        assert!(TRUST_SUPPORT_NEIGHBOR < TRUST_SUPPORTIVE);
        assert!(RELATIONSHIP_STRAINED < RELATIONSHIP_FRIEND);
    }

    #[test]
    fn test_intensity_floor_positive() {
        assert!(STORM_INTENSITY_FLOOR > 0.0);
        assert!(STORM_RESISTANCE_ROLL_MAX > 0.0);
    }
}
