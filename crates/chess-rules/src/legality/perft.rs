//! Perft node counting.
//!
//! Perft counts the leaf nodes of the legal move tree to a fixed depth.
//! Known counts for well-studied positions catch legality defects that
//! hand-written cases miss.

use super::{legal_moves, recompute_legality};
use crate::execute::apply_move;
use crate::position::Position;

/// Counts leaf nodes at `depth` below a position whose legality is current.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = legal_moves(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for m in moves {
        let mut next = position.clone();
        if apply_move(&mut next, m.origin, m.destination, m.promotion).is_ok() {
            recompute_legality(&mut next);
            nodes += perft(&next, depth - 1);
        }
    }
    nodes
}

/// Node counts per root move in coordinate notation, sorted by move.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = legal_moves(position)
        .into_iter()
        .filter_map(|m| {
            let mut next = position.clone();
            apply_move(&mut next, m.origin, m.destination, m.promotion).ok()?;
            recompute_legality(&mut next);
            Some((m.to_coordinate(), perft(&next, depth.saturating_sub(1))))
        })
        .collect();
    results.sort();
    results
}
