use thiserror::Error;

use crate::core::types::{PieceId, Position};

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Piece not found: {0:?}")]
    PieceNotFound(PieceId),

    #[error("Piece {0:?} has been captured")]
    PieceCaptured(PieceId),

    #[error("Piece {0:?} is not dysregulated")]
    NotDysregulated(PieceId),

    #[error("No pending decision with id {0}")]
    UnknownDecision(u32),

    #[error("Illegal move for piece {piece:?} to {to}")]
    IllegalMove { piece: PieceId, to: Position },

    #[error("A decision is pending; resolve it before advancing")]
    DecisionPending,

    #[error("Style load error: {0}")]
    StyleLoad(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
