//! Move enumeration seam
//!
//! Movement legality is an external concern; the engines only need "all
//! legal moves for this piece". `MoveRules` is that seam, and
//! `GridMoveRules` is the stand-in implementation the demo and tests use:
//! straight-line steps in any of the eight directions, capture by landing
//! on an enemy square. Storm movement restriction shrinks the step range.

use serde::{Deserialize, Serialize};

use crate::core::types::{PieceId, Position};
use crate::game::world::GameWorld;

/// Scan order for move directions (fixed for determinism)
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveDescriptor {
    pub from: Position,
    pub to: Position,
    pub captures: Vec<PieceId>,
}

impl MoveDescriptor {
    pub fn is_capture(&self) -> bool {
        !self.captures.is_empty()
    }
}

pub trait MoveRules {
    fn legal_moves(&self, world: &GameWorld, piece: PieceId) -> Vec<MoveDescriptor>;
}

#[derive(Debug, Clone)]
pub struct GridMoveRules {
    pub base_range: u32,
}

impl Default for GridMoveRules {
    fn default() -> Self {
        Self { base_range: 2 }
    }
}

impl GridMoveRules {
    fn effective_range(&self, world: &GameWorld) -> u32 {
        let scaled = (self.base_range as f32 * world.params.movement_factor()).floor() as u32;
        scaled.max(1)
    }
}

impl MoveRules for GridMoveRules {
    fn legal_moves(&self, world: &GameWorld, piece: PieceId) -> Vec<MoveDescriptor> {
        let Some(p) = world.piece(piece) else {
            return Vec::new();
        };
        if !p.is_active() {
            return Vec::new();
        }

        let range = self.effective_range(world);
        let mut moves = Vec::new();

        for (dx, dy) in DIRECTIONS {
            for step in 1..=range as i32 {
                let to = p.position.offset(dx * step, dy * step);
                if !world.board.in_bounds(to) {
                    break;
                }
                match world.piece_at(to) {
                    Some(occupant) if occupant.team == p.team => break,
                    Some(occupant) => {
                        moves.push(MoveDescriptor {
                            from: p.position,
                            to,
                            captures: vec![occupant.id],
                        });
                        break;
                    }
                    None => moves.push(MoveDescriptor {
                        from: p.position,
                        to,
                        captures: Vec::new(),
                    }),
                }
            }
        }

        moves
    }
}
