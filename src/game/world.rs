//! GameWorld - the shared state container every engine reads and writes
//!
//! Owns the board, the piece roster, the environmental parameters, and the
//! single deterministic RNG. Engines hold only their own persistent state
//! and borrow the world per phase.

use rand_chacha::ChaCha8Rng;

use crate::board::Board;
use crate::core::constants;
use crate::core::error::{GameError, Result};
use crate::core::params::GameParams;
use crate::core::types::{PieceId, Position, Team, Turn};
use crate::emotion::piece::Piece;

pub struct GameWorld {
    pub board: Board,
    /// Roster indexed by dense id: `pieces[i].id == PieceId(i)`
    pub pieces: Vec<Piece>,
    pub params: GameParams,
    pub turn: Turn,
    /// Random number generator (deterministic, seeded once)
    pub rng: ChaCha8Rng,
}

impl GameWorld {
    pub fn new(board: Board, rng: ChaCha8Rng) -> Self {
        Self {
            board,
            pieces: Vec::new(),
            params: GameParams::default(),
            turn: 0,
            rng,
        }
    }

    pub fn spawn_piece(
        &mut self,
        name: impl Into<String>,
        team: Team,
        position: Position,
    ) -> PieceId {
        let id = PieceId(self.pieces.len() as u32);
        self.pieces.push(Piece::new(id, name, team, position));
        id
    }

    pub fn index_of(&self, id: PieceId) -> Option<usize> {
        let idx = id.0 as usize;
        (idx < self.pieces.len()).then_some(idx)
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.index_of(id).map(|i| &self.pieces[i])
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.index_of(id).map(move |i| &mut self.pieces[i])
    }

    /// Resolve a command-surface reference, rejecting unknown and captured
    /// pieces synchronously.
    pub fn require_active(&self, id: PieceId) -> Result<usize> {
        let idx = self.index_of(id).ok_or(GameError::PieceNotFound(id))?;
        if self.pieces[idx].captured {
            return Err(GameError::PieceCaptured(id));
        }
        Ok(idx)
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.is_active() && p.position == pos)
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.piece_at(pos).is_some()
    }

    /// Active pieces adjacent to `pos`, in id order (deterministic)
    pub fn adjacent_indices(&self, pos: Position) -> Vec<usize> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active() && p.position.is_adjacent(&pos))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn team_indices(&self, team: Team) -> Vec<usize> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active() && p.team == team)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn average_trust(&self) -> f32 {
        let active: Vec<&Piece> = self.pieces.iter().filter(|p| p.is_active()).collect();
        if active.is_empty() {
            return 0.0;
        }
        active.iter().map(|p| p.trust()).sum::<f32>() / active.len() as f32
    }

    pub fn dysregulated_ratio(&self) -> f32 {
        let active: Vec<&Piece> = self.pieces.iter().filter(|p| p.is_active()).collect();
        if active.is_empty() {
            return 0.0;
        }
        let dysregulated = active.iter().filter(|p| p.is_dysregulated()).count();
        dysregulated as f32 / active.len() as f32
    }

    /// The piece a storm forms over: highest `10 x dysregulated - trust`,
    /// ties broken by lowest id.
    pub fn most_troubled_index(&self) -> Option<usize> {
        self.pieces
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active())
            .max_by(|(ia, a), (ib, b)| {
                let score = |p: &Piece| {
                    (if p.is_dysregulated() { 10.0 } else { 0.0 }) - p.trust()
                };
                score(a)
                    .partial_cmp(&score(b))
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // max_by keeps the later of equal elements; prefer the
                    // lower index on ties
                    .then(ib.cmp(ia))
            })
            .map(|(i, _)| i)
    }

    /// Adjacent same-team regulated pieces with trust high enough to lean on
    pub fn supportive_neighbor_count(&self, idx: usize) -> usize {
        let piece = &self.pieces[idx];
        self.adjacent_indices(piece.position)
            .into_iter()
            .filter(|&j| {
                j != idx
                    && self.pieces[j].team == piece.team
                    && !self.pieces[j].is_dysregulated()
                    && self.pieces[j].trust() >= constants::TRUST_SUPPORT_NEIGHBOR
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::state::{DysregulationKind, EmotionalState};
    use rand::SeedableRng;

    fn world() -> GameWorld {
        GameWorld::new(Board::new(8, 8), ChaCha8Rng::seed_from_u64(7))
    }

    #[test]
    fn test_spawn_assigns_dense_ids() {
        let mut w = world();
        let a = w.spawn_piece("Ash", Team::Dawn, Position::new(0, 0));
        let b = w.spawn_piece("Bay", Team::Dusk, Position::new(1, 1));
        assert_eq!(a, PieceId(0));
        assert_eq!(b, PieceId(1));
        assert_eq!(w.piece(b).unwrap().name, "Bay");
    }

    #[test]
    fn test_require_active_rejects_captured() {
        let mut w = world();
        let id = w.spawn_piece("Ash", Team::Dawn, Position::new(0, 0));
        assert!(w.require_active(id).is_ok());
        w.piece_mut(id).unwrap().captured = true;
        assert!(matches!(
            w.require_active(id),
            Err(GameError::PieceCaptured(_))
        ));
        assert!(matches!(
            w.require_active(PieceId(42)),
            Err(GameError::PieceNotFound(_))
        ));
    }

    #[test]
    fn test_adjacent_indices_ordered_and_exclude_captured() {
        let mut w = world();
        w.spawn_piece("A", Team::Dawn, Position::new(3, 3));
        let b = w.spawn_piece("B", Team::Dawn, Position::new(4, 4));
        w.spawn_piece("C", Team::Dusk, Position::new(4, 3));
        w.spawn_piece("D", Team::Dusk, Position::new(6, 6));
        w.piece_mut(b).unwrap().captured = true;

        let adj = w.adjacent_indices(Position::new(3, 3));
        assert_eq!(adj, vec![2]); // Only C; B captured, D too far
    }

    #[test]
    fn test_most_troubled_prefers_dysregulated_then_low_trust() {
        let mut w = world();
        let a = w.spawn_piece("A", Team::Dawn, Position::new(0, 0));
        let b = w.spawn_piece("B", Team::Dawn, Position::new(1, 0));
        let c = w.spawn_piece("C", Team::Dawn, Position::new(2, 0));
        w.piece_mut(a).unwrap().modify_trust(-4.0);
        w.piece_mut(b)
            .unwrap()
            .set_state(EmotionalState::Dysregulated(DysregulationKind::Anxious));
        w.piece_mut(c).unwrap().modify_trust(9.0);

        // B scores 10, A scores 4, C scores -9
        assert_eq!(w.most_troubled_index(), Some(1));
    }

    #[test]
    fn test_most_troubled_tie_breaks_to_lowest_id() {
        let mut w = world();
        w.spawn_piece("A", Team::Dawn, Position::new(0, 0));
        w.spawn_piece("B", Team::Dawn, Position::new(1, 0));
        assert_eq!(w.most_troubled_index(), Some(0));
    }

    #[test]
    fn test_supportive_neighbor_count() {
        let mut w = world();
        let center = w.spawn_piece("Hub", Team::Dawn, Position::new(3, 3));
        let s1 = w.spawn_piece("S1", Team::Dawn, Position::new(2, 3));
        let s2 = w.spawn_piece("S2", Team::Dawn, Position::new(4, 3));
        let weak = w.spawn_piece("Weak", Team::Dawn, Position::new(3, 4));
        w.spawn_piece("Enemy", Team::Dusk, Position::new(3, 2));

        w.piece_mut(s1).unwrap().modify_trust(6.0);
        w.piece_mut(s2).unwrap().modify_trust(5.0);
        w.piece_mut(weak).unwrap().modify_trust(2.0); // Below the bar

        let idx = w.index_of(center).unwrap();
        assert_eq!(w.supportive_neighbor_count(idx), 2);
    }
}
