//! Opponent style configuration
//!
//! A style bundles an empathy baseline, a trust modifier, tactical biases,
//! a selection-window width, and canned response lines. Five presets ship
//! built in; styles are also loadable from `data/opponent_styles/{name}.toml`
//! with serde defaults filling anything a file leaves out.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::emotion::state::DysregulationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    Nurturing,
    Patient,
    Guarded,
    Erratic,
    Harsh,
}

impl StyleKind {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Nurturing => "nurturing",
            Self::Patient => "patient",
            Self::Guarded => "guarded",
            Self::Erratic => "erratic",
            Self::Harsh => "harsh",
        }
    }

    pub fn all() -> [StyleKind; 5] {
        [
            Self::Nurturing,
            Self::Patient,
            Self::Guarded,
            Self::Erratic,
            Self::Harsh,
        ]
    }

    pub fn from_name(name: &str) -> Option<StyleKind> {
        Self::all().into_iter().find(|k| k.id() == name)
    }
}

fn default_empathy() -> f64 {
    0.5
}
fn default_mult() -> f32 {
    1.0
}
fn default_window() -> usize {
    3
}

/// Complete opponent style configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentStyle {
    /// Name of this style (set from filename when loaded)
    #[serde(default)]
    pub name: String,
    /// Chance an empathy attempt lands (0.1 to 0.9 across presets)
    #[serde(default = "default_empathy")]
    pub empathy_level: f64,
    /// Added to the +-1 empathy trust change
    #[serde(default)]
    pub trust_modifier: f32,
    /// Multiplier on capture moves
    #[serde(default = "default_mult")]
    pub capture_bias: f32,
    /// Multiplier applied when the moving piece's trust is negative
    #[serde(default = "default_mult")]
    pub low_trust_penalty: f32,
    /// Discounts moves that would traumatize a piece this side has a
    /// positive relationship with
    #[serde(default)]
    pub protects_bonded: bool,
    /// Multiplier on retreating moves
    #[serde(default = "default_mult")]
    pub retreat_bias: f32,
    /// Width of the top score slice moves are sampled from
    #[serde(default = "default_window")]
    pub selection_window: usize,
    /// Failed empathy may worsen the subtype (the harsh temperament)
    #[serde(default)]
    pub escalates_on_failure: bool,
    /// Response lines keyed by subtype id
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
}

impl Default for OpponentStyle {
    fn default() -> Self {
        preset(StyleKind::Guarded)
    }
}

impl OpponentStyle {
    /// The line this style delivers to a piece in the given state
    pub fn response_for(&self, kind: DysregulationKind) -> String {
        self.responses
            .get(kind.id())
            .cloned()
            .unwrap_or_else(|| format!("...{}.", kind.id()))
    }
}

fn lines(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Built-in style table
pub fn preset(kind: StyleKind) -> OpponentStyle {
    match kind {
        StyleKind::Nurturing => OpponentStyle {
            name: "nurturing".to_string(),
            empathy_level: 0.9,
            trust_modifier: 1.0,
            capture_bias: 0.8,
            low_trust_penalty: 1.0,
            protects_bonded: true,
            retreat_bias: 1.0,
            selection_window: 2,
            escalates_on_failure: false,
            responses: lines(&[
                ("frozen", "Take all the time you need. I'm not going anywhere."),
                ("flight", "You're allowed to stay. You're also allowed to go."),
                ("fight", "That anger makes sense. Tell me about it."),
                ("fawn", "You don't have to earn your place here."),
                ("shutdown", "No words needed. I'll sit with you."),
                ("anxious", "One square at a time. We'll manage."),
            ]),
        },
        StyleKind::Patient => OpponentStyle {
            name: "patient".to_string(),
            empathy_level: 0.7,
            trust_modifier: 0.5,
            capture_bias: 1.0,
            low_trust_penalty: 1.0,
            protects_bonded: true,
            retreat_bias: 1.1,
            selection_window: 2,
            escalates_on_failure: false,
            responses: lines(&[
                ("frozen", "We can wait. The board isn't going anywhere."),
                ("flight", "If you need distance, take it slowly."),
                ("fight", "I hear you. Let's not decide anything yet."),
                ("fawn", "You don't need my approval to stand there."),
                ("shutdown", "When you're ready. Not before."),
                ("anxious", "Breathe first. Move second."),
            ]),
        },
        StyleKind::Guarded => OpponentStyle {
            name: "guarded".to_string(),
            empathy_level: 0.5,
            trust_modifier: 0.0,
            capture_bias: 1.1,
            low_trust_penalty: 0.9,
            protects_bonded: false,
            retreat_bias: 1.2,
            selection_window: 3,
            escalates_on_failure: false,
            responses: lines(&[
                ("frozen", "You'll move when you move, I suppose."),
                ("flight", "Running has its uses. So does staying."),
                ("fight", "Careful where you point that."),
                ("fawn", "You don't need to perform for me."),
                ("shutdown", "Fine. Silence, then."),
                ("anxious", "Steady. Nothing here bites. Probably."),
            ]),
        },
        StyleKind::Erratic => OpponentStyle {
            name: "erratic".to_string(),
            empathy_level: 0.3,
            trust_modifier: -1.0,
            capture_bias: 1.2,
            low_trust_penalty: 0.9,
            protects_bonded: false,
            retreat_bias: 0.9,
            selection_window: 5,
            escalates_on_failure: false,
            responses: lines(&[
                ("frozen", "Why are you just standing there? Oh. Oh no."),
                ("flight", "Wait, where are you going? Was it me?"),
                ("fight", "Whoa, whoa! I didn't mean - or did I?"),
                ("fawn", "You like me? I mean. Good? Good."),
                ("shutdown", "Hello? Anyone home? ...I'll come back."),
                ("anxious", "Don't panic! I'm panicking. Don't copy me."),
            ]),
        },
        StyleKind::Harsh => OpponentStyle {
            name: "harsh".to_string(),
            empathy_level: 0.1,
            trust_modifier: -2.0,
            capture_bias: 1.5,
            low_trust_penalty: 0.7,
            protects_bonded: false,
            retreat_bias: 0.8,
            selection_window: 3,
            escalates_on_failure: true,
            responses: lines(&[
                ("frozen", "Move. The board doesn't wait for feelings."),
                ("flight", "Cowardice. Pick a square and hold it."),
                ("fight", "Good. Use that. Aim it at them, not us."),
                ("fawn", "Stop simpering. It convinces no one."),
                ("shutdown", "Silence won't save you from the clock."),
                ("anxious", "Your nerves are not my problem."),
            ]),
        },
    }
}

/// Resolve a style by name: presets first, then a TOML file.
pub fn style_by_name(name: &str) -> Result<OpponentStyle> {
    if let Some(kind) = StyleKind::from_name(name) {
        return Ok(preset(kind));
    }
    load_style(name)
}

/// Load a style from `data/opponent_styles/{name}.toml`
pub fn load_style(name: &str) -> Result<OpponentStyle> {
    let path = style_path(name);
    let contents = fs::read_to_string(&path)
        .map_err(|e| GameError::StyleLoad(format!("failed to read {path:?}: {e}")))?;
    let mut style: OpponentStyle = toml::from_str(&contents)?;
    style.name = name.to_string();
    Ok(style)
}

fn style_path(name: &str) -> PathBuf {
    PathBuf::from("data/opponent_styles").join(format!("{name}.toml"))
}
