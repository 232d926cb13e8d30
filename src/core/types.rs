//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Unique identifier for pieces
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceId(pub u32);

impl PieceId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Game turn counter (simulation time unit)
pub type Turn = u64;

/// Team affiliation. Dawn advances toward increasing y, Dusk toward decreasing y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Dawn,
    Dusk,
}

impl Team {
    pub fn rival(&self) -> Team {
        match self {
            Team::Dawn => Team::Dusk,
            Team::Dusk => Team::Dawn,
        }
    }

    /// Direction of forward progress along the y axis
    pub fn forward_dir(&self) -> i32 {
        match self {
            Team::Dawn => 1,
            Team::Dusk => -1,
        }
    }

    /// The rank this team is trying to reach (the rival's home rank)
    pub fn goal_rank(&self, board_height: i32) -> i32 {
        match self {
            Team::Dawn => board_height - 1,
            Team::Dusk => 0,
        }
    }
}

/// Grid position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &Self) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    pub fn chebyshev(&self, other: &Self) -> u32 {
        (self.x - other.x).abs().max((self.y - other.y).abs()) as u32
    }

    /// Board adjacency: the eight surrounding squares
    pub fn is_adjacent(&self, other: &Self) -> bool {
        self != other && self.chebyshev(other) <= 1
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_id_equality() {
        let a = PieceId(1);
        let b = PieceId(1);
        let c = PieceId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_piece_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<PieceId, &str> = HashMap::new();
        map.insert(PieceId(1), "vanguard");
        assert_eq!(map.get(&PieceId(1)), Some(&"vanguard"));
    }

    #[test]
    fn test_team_rival() {
        assert_eq!(Team::Dawn.rival(), Team::Dusk);
        assert_eq!(Team::Dusk.rival(), Team::Dawn);
    }

    #[test]
    fn test_forward_directions_oppose() {
        assert_eq!(Team::Dawn.forward_dir(), -Team::Dusk.forward_dir());
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.manhattan(&b), 7);
        assert_eq!(b.manhattan(&a), 7);
    }

    #[test]
    fn test_chebyshev_adjacency() {
        let center = Position::new(4, 4);
        assert!(center.is_adjacent(&Position::new(5, 5)));
        assert!(center.is_adjacent(&Position::new(4, 3)));
        assert!(!center.is_adjacent(&Position::new(4, 4))); // Not adjacent to itself
        assert!(!center.is_adjacent(&Position::new(6, 4)));
    }
}
