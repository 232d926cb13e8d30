//! Autonomous action variants
//!
//! A closed set of things a piece can decide to do on its own. Two of them
//! (`PanicMove`, `DefectionAttempt`) are irreversible and must suspend for
//! an operator decision before touching state. Peer support carries a
//! data-described effect applied by the engine's single interpreter, so
//! queued actions stay serializable and replayable.

use serde::{Deserialize, Serialize};

use crate::core::constants::{PEER_SUPPORT_RELATIONSHIP, PEER_SUPPORT_TRUST};
use crate::core::types::{PieceId, Position};
use crate::game::world::GameWorld;

/// Declarative support effect: deltas plus an optional regulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportEffect {
    pub trust_delta: f32,
    pub relationship_delta: f32,
    pub regulate: bool,
}

impl Default for SupportEffect {
    fn default() -> Self {
        Self {
            trust_delta: PEER_SUPPORT_TRUST,
            relationship_delta: PEER_SUPPORT_RELATIONSHIP,
            regulate: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonomousAction {
    /// Ally-assisted recovery from a frozen state
    Thaw {
        piece: PieceId,
        helpers: Vec<PieceId>,
    },
    /// Bolt to a safer square (requires intervention)
    PanicMove { piece: PieceId, to: Position },
    /// Snap at a random adjacent ally
    LashOut { piece: PieceId, target: PieceId },
    /// Comfort a struggling teammate
    PeerSupport {
        piece: PieceId,
        target: PieceId,
        effect: SupportEffect,
    },
    /// Cross to the other side of the board (requires intervention)
    DefectionAttempt { piece: PieceId, to: Position },
    /// Seek approval from an enemy piece
    InappropriateFriendliness { piece: PieceId, target: PieceId },
    /// Become unselectable for a while
    CompleteWithdrawal { piece: PieceId, turns: u32 },
}

impl AutonomousAction {
    pub fn piece(&self) -> PieceId {
        match self {
            Self::Thaw { piece, .. }
            | Self::PanicMove { piece, .. }
            | Self::LashOut { piece, .. }
            | Self::PeerSupport { piece, .. }
            | Self::DefectionAttempt { piece, .. }
            | Self::InappropriateFriendliness { piece, .. }
            | Self::CompleteWithdrawal { piece, .. } => *piece,
        }
    }

    pub fn kind_id(&self) -> &'static str {
        match self {
            Self::Thaw { .. } => "thaw",
            Self::PanicMove { .. } => "panic_move",
            Self::LashOut { .. } => "lash_out",
            Self::PeerSupport { .. } => "peer_support",
            Self::DefectionAttempt { .. } => "defection_attempt",
            Self::InappropriateFriendliness { .. } => "inappropriate_friendliness",
            Self::CompleteWithdrawal { .. } => "complete_withdrawal",
        }
    }

    /// Irreversible actions suspend the queue for an operator decision
    pub fn requires_intervention(&self) -> bool {
        matches!(
            self,
            Self::PanicMove { .. } | Self::DefectionAttempt { .. }
        )
    }

    pub fn message(&self, world: &GameWorld) -> String {
        let name = |id: PieceId| {
            world
                .piece(id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("piece {}", id.0))
        };
        match self {
            Self::Thaw { piece, helpers } => format!(
                "{} thaws with {} allies close by",
                name(*piece),
                helpers.len()
            ),
            Self::PanicMove { piece, to } => {
                format!("{} wants to bolt to {}", name(*piece), to)
            }
            Self::LashOut { piece, target } => {
                format!("{} lashes out at {}", name(*piece), name(*target))
            }
            Self::PeerSupport { piece, target, .. } => {
                format!("{} steadies {}", name(*piece), name(*target))
            }
            Self::DefectionAttempt { piece, .. } => {
                format!("{} is about to cross the board", name(*piece))
            }
            Self::InappropriateFriendliness { piece, target } => format!(
                "{} sidles up to {} hoping to be liked",
                name(*piece),
                name(*target)
            ),
            Self::CompleteWithdrawal { piece, turns } => {
                format!("{} withdraws completely for {} turns", name(*piece), turns)
            }
        }
    }
}
