//! Board abstraction: a rectangular grid where pieces occupy squares and
//! some squares are marked safe ("sanctuaries"). Movement legality lives
//! behind the `MoveRules` seam in `moves`.

pub mod moves;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::Position;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    safe_squares: AHashSet<Position>,
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            safe_squares: AHashSet::new(),
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    pub fn mark_safe(&mut self, pos: Position) {
        if self.in_bounds(pos) {
            self.safe_squares.insert(pos);
        }
    }

    pub fn is_safe(&self, pos: Position) -> bool {
        self.safe_squares.contains(&pos)
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    /// Clamp a position to board bounds (storm epicenter drift)
    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(0, self.width - 1),
            pos.y.clamp(0, self.height - 1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let board = Board::new(8, 8);
        assert!(board.in_bounds(Position::new(0, 0)));
        assert!(board.in_bounds(Position::new(7, 7)));
        assert!(!board.in_bounds(Position::new(8, 0)));
        assert!(!board.in_bounds(Position::new(0, -1)));
    }

    #[test]
    fn test_safe_squares() {
        let mut board = Board::new(8, 8);
        board.mark_safe(Position::new(3, 3));
        board.mark_safe(Position::new(99, 99)); // Out of bounds, ignored
        assert!(board.is_safe(Position::new(3, 3)));
        assert!(!board.is_safe(Position::new(99, 99)));
    }

    #[test]
    fn test_clamp() {
        let board = Board::new(8, 8);
        assert_eq!(board.clamp(Position::new(-2, 9)), Position::new(0, 7));
    }
}
