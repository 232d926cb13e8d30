//! Move candidate scoring
//!
//! Base tactical value (captures, centrality, forward progress) reshaped by
//! the style's biases, the moving piece's emotional state and trust band,
//! and the per-piece empathy memory. Higher is better; scores are
//! unbounded.

use ordered_float::OrderedFloat;

use crate::board::moves::MoveDescriptor;
use crate::core::constants::*;
use crate::core::types::{PieceId, Team};
use crate::emotion::piece::Piece;
use crate::emotion::state::DysregulationKind;
use crate::game::world::GameWorld;
use crate::opponent::style::OpponentStyle;

#[derive(Debug, Clone, PartialEq)]
pub struct MoveCandidate {
    pub piece: PieceId,
    pub descriptor: MoveDescriptor,
    pub score: f32,
}

fn progress(team: Team, mv: &MoveDescriptor) -> i32 {
    (mv.to.y - mv.from.y) * team.forward_dir()
}

pub fn is_forward(team: Team, mv: &MoveDescriptor) -> bool {
    progress(team, mv) > 0
}

pub fn is_retreat(team: Team, mv: &MoveDescriptor) -> bool {
    progress(team, mv) < 0
}

/// Tactical baseline: +10 per capture, centrality, forward progress.
pub fn base_score(world: &GameWorld, piece: &Piece, mv: &MoveDescriptor) -> f32 {
    let mut score = mv.captures.len() as f32 * SCORE_PER_CAPTURE;
    let center = world.board.center();
    score += SCORE_CENTRALITY_BASE - mv.to.manhattan(&center) as f32;
    if is_forward(piece.team, mv) {
        score += SCORE_FORWARD_PROGRESS;
    }
    score
}

/// The style's tactical temperament
pub fn style_multiplier(style: &OpponentStyle, piece: &Piece, mv: &MoveDescriptor) -> f32 {
    let mut m = 1.0;
    if mv.is_capture() {
        m *= style.capture_bias;
    }
    if piece.trust() < 0.0 {
        m *= style.low_trust_penalty;
    }
    if style.protects_bonded && mv.captures.iter().any(|&c| piece.relationship(c) > 0.0) {
        // This side would rather not hurt someone this piece respects
        m *= 0.5;
    }
    if is_retreat(piece.team, mv) {
        m *= style.retreat_bias;
    }
    m
}

/// How the piece's own state colors the move
pub fn emotional_multiplier(piece: &Piece, mv: &MoveDescriptor) -> f32 {
    use DysregulationKind::*;

    let mut m = match piece.subtype() {
        Some(Frozen) => EMO_MULT_FROZEN,
        Some(Anxious) => EMO_MULT_ANXIOUS,
        Some(Fight) if mv.is_capture() => EMO_MULT_FIGHT_CAPTURE,
        Some(Flight) if is_retreat(piece.team, mv) => EMO_MULT_FLIGHT_RETREAT,
        Some(Fawn) => EMO_MULT_FAWN,
        Some(Shutdown) => EMO_MULT_SHUTDOWN,
        Some(Fight) | Some(Flight) | None => 1.0,
    };
    if piece.trust() >= TRUST_MULT_HIGH_GATE {
        m *= TRUST_MULT_HIGH;
    } else if piece.trust() <= TRUST_MULT_LOW_GATE {
        m *= TRUST_MULT_LOW;
    }
    m
}

/// Past empathy outcomes with this piece adjust willingness to use it
pub fn memory_multiplier(successes: u32, failures: u32, style: &OpponentStyle) -> f32 {
    let mut m = 1.0;
    if failures >= MEMORY_FAILURES_GATE && style.empathy_level > 0.5 {
        m *= MEMORY_FAILURE_MULT;
    }
    if successes >= MEMORY_SUCCESSES_GATE {
        m *= MEMORY_SUCCESS_MULT;
    }
    m
}

/// Score one candidate through every stage
pub fn score_move(
    world: &GameWorld,
    style: &OpponentStyle,
    piece: &Piece,
    mv: &MoveDescriptor,
    successes: u32,
    failures: u32,
) -> f32 {
    base_score(world, piece, mv)
        * style_multiplier(style, piece, mv)
        * emotional_multiplier(piece, mv)
        * memory_multiplier(successes, failures, style)
}

/// Sort candidates best-first (stable tie-break by piece id then target)
pub fn sort_candidates(candidates: &mut [MoveCandidate]) {
    candidates.sort_by_key(|c| {
        (
            std::cmp::Reverse(OrderedFloat(c.score)),
            c.piece,
            c.descriptor.to,
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::core::types::Position;
    use crate::emotion::state::EmotionalState;
    use crate::opponent::style::{preset, StyleKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world() -> GameWorld {
        GameWorld::new(Board::new(8, 8), ChaCha8Rng::seed_from_u64(29))
    }

    fn mv(from: Position, to: Position, captures: Vec<PieceId>) -> MoveDescriptor {
        MoveDescriptor { from, to, captures }
    }

    #[test]
    fn test_base_score_components() {
        let mut w = world();
        let id = w.spawn_piece("P", Team::Dusk, Position::new(4, 5));
        let piece = w.piece(id).unwrap();

        // Forward (toward y=0 for Dusk) into the center, no capture
        let forward = mv(Position::new(4, 5), Position::new(4, 4), vec![]);
        // 7 - 0 centrality + 3 forward
        assert!((base_score(&w, piece, &forward) - 10.0).abs() < 1e-6);

        let capture = mv(Position::new(4, 5), Position::new(4, 4), vec![PieceId(9)]);
        assert!((base_score(&w, piece, &capture) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_harsh_multiplies_captures() {
        let mut w = world();
        let id = w.spawn_piece("P", Team::Dusk, Position::new(4, 5));
        let piece = w.piece(id).unwrap();
        let harsh = preset(StyleKind::Harsh);

        let capture = mv(Position::new(4, 5), Position::new(4, 4), vec![PieceId(9)]);
        assert!((style_multiplier(&harsh, piece, &capture) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_bonded_protection_discounts() {
        let mut w = world();
        let id = w.spawn_piece("P", Team::Dusk, Position::new(4, 5));
        w.piece_mut(id).unwrap().update_relationship(PieceId(9), 1.0);
        let piece = w.piece(id).unwrap();
        let nurturing = preset(StyleKind::Nurturing);

        let capture = mv(Position::new(4, 5), Position::new(4, 4), vec![PieceId(9)]);
        // capture_bias 0.8 x bonded 0.5
        assert!((style_multiplier(&nurturing, piece, &capture) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_emotional_table() {
        let mut w = world();
        let id = w.spawn_piece("P", Team::Dusk, Position::new(4, 5));
        let plain = mv(Position::new(4, 5), Position::new(4, 4), vec![]);
        let capture = mv(Position::new(4, 5), Position::new(4, 4), vec![PieceId(9)]);
        let retreat = mv(Position::new(4, 5), Position::new(4, 6), vec![]);

        let set = |w: &mut GameWorld, kind| {
            w.piece_mut(id)
                .unwrap()
                .set_state(EmotionalState::Dysregulated(kind));
        };

        set(&mut w, DysregulationKind::Frozen);
        assert!((emotional_multiplier(w.piece(id).unwrap(), &plain) - 0.1).abs() < 1e-6);

        set(&mut w, DysregulationKind::Fight);
        assert!((emotional_multiplier(w.piece(id).unwrap(), &capture) - 1.3).abs() < 1e-6);
        assert!((emotional_multiplier(w.piece(id).unwrap(), &plain) - 1.0).abs() < 1e-6);

        set(&mut w, DysregulationKind::Flight);
        assert!((emotional_multiplier(w.piece(id).unwrap(), &retreat) - 1.4).abs() < 1e-6);
    }

    #[test]
    fn test_trust_band_multipliers() {
        let mut w = world();
        let id = w.spawn_piece("P", Team::Dusk, Position::new(4, 5));
        let plain = mv(Position::new(4, 5), Position::new(4, 4), vec![]);

        w.piece_mut(id).unwrap().modify_trust(7.5);
        assert!((emotional_multiplier(w.piece(id).unwrap(), &plain) - 1.3).abs() < 1e-6);

        w.piece_mut(id).unwrap().modify_trust(-11.0); // Down to -3.5
        assert!((emotional_multiplier(w.piece(id).unwrap(), &plain) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_memory_adjustment_gates() {
        let patient = preset(StyleKind::Patient); // empathy 0.7
        let harsh = preset(StyleKind::Harsh); // empathy 0.1

        assert!((memory_multiplier(0, 2, &patient) - 0.8).abs() < 1e-6);
        // Low-empathy styles don't second-guess failures
        assert!((memory_multiplier(0, 2, &harsh) - 1.0).abs() < 1e-6);
        assert!((memory_multiplier(3, 0, &patient) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let d = mv(Position::new(0, 0), Position::new(1, 1), vec![]);
        let mut candidates = vec![
            MoveCandidate { piece: PieceId(1), descriptor: d.clone(), score: 3.0 },
            MoveCandidate { piece: PieceId(0), descriptor: d.clone(), score: 9.0 },
            MoveCandidate { piece: PieceId(2), descriptor: d, score: 9.0 },
        ];
        sort_candidates(&mut candidates);
        assert_eq!(candidates[0].piece, PieceId(0));
        assert_eq!(candidates[1].piece, PieceId(2));
        assert_eq!(candidates[2].piece, PieceId(1));
    }
}
