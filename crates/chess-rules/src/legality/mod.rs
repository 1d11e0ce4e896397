//! Legal move computation.
//!
//! Legality is computed in two passes over the position. The first scans
//! the side not to move as attackers and collects the squares it covers,
//! the pieces checking the king, the squares between a line checker and the
//! king, and the pieces pinned to the king. The second builds each piece's
//! geometric destinations and narrows them with those constraints:
//!
//! 1. Two checkers leave only king moves.
//! 2. One checker restricts other pieces to capturing or blocking it.
//! 3. A pinned piece stays on its pin line.
//! 4. The king never steps onto a covered square, and castles only out of
//!    check over uncovered squares.
//!
//! The result is written into every piece's `legal_moves`, so no move is
//! ever tried and undone.

mod attacks;
pub mod perft;

use crate::position::{Piece, PieceId, Position, SpecialFlag};
use crate::square_set::SquareSet;
use attacks::{
    scan, slide_directions, slides_along, AttackScan, KING_STEPS, KNIGHT_STEPS, LINES,
};
use chess_core::{Color, Move, PieceKind, Square};

/// Rebuilds every piece's constraint fields and destination set for the
/// side to move.
pub fn recompute_legality(position: &mut Position) {
    position.reset_constraints();

    let mover = position.turn();
    let scan = scan(position, mover.opposite());
    let king_id = position.king(mover).id();
    let check_count = scan.checkers.len();

    let updates: Vec<(PieceId, SquareSet, Option<SquareSet>)> = position
        .pieces_of(mover)
        .map(|piece| {
            let pin = scan.pin_line(piece.id());
            let moves = constrained_destinations(position, piece, &scan, pin);
            (piece.id(), moves, pin)
        })
        .collect();

    for (id, moves, pin) in updates {
        let piece = position.piece_mut(id);
        piece.legal_moves = moves;
        if let Some(line) = pin {
            piece.pin_line = line;
        }
    }

    let king = position.piece_mut(king_id);
    king.checkers = scan.checkers;
    if check_count == 1 {
        king.block_squares = scan.block_squares;
    }
    position.attacked = scan.attacked;
}

/// Every legal move of the side to move, one per promotion kind for
/// promoting pawn moves. Reads the destination sets written by the last
/// [`recompute_legality`].
pub fn legal_moves(position: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for piece in position.pieces_of(position.turn()) {
        let promotes_on = piece.color().promotion_rank();
        for to in piece.legal_moves() {
            if piece.kind() == PieceKind::Pawn && to.rank_index() == promotes_on {
                for kind in PieceKind::PROMOTIONS {
                    moves.push(Move::new(piece.position(), to, Some(kind)));
                }
            } else {
                moves.push(Move::normal(piece.position(), to));
            }
        }
    }
    moves
}

fn constrained_destinations(
    position: &Position,
    piece: &Piece,
    scan: &AttackScan,
    pin: Option<SquareSet>,
) -> SquareSet {
    let mut moves = pseudo_destinations(position, piece);

    if piece.kind() == PieceKind::King {
        moves &= !scan.attacked;
        if scan.checkers.is_empty() {
            moves |= castling_destinations(position, piece, scan.attacked);
        }
        return moves;
    }

    match scan.checkers.len() {
        0 => {}
        1 => {
            let mut allowed = scan.checkers | scan.block_squares;
            if piece.kind() == PieceKind::Pawn {
                if let Some(target) = checking_pawn_skip_square(position, scan.checkers) {
                    allowed.insert(target);
                }
            }
            moves &= allowed;
        }
        _ => return SquareSet::EMPTY,
    }

    if let Some(line) = pin {
        moves &= line;
    }

    if piece.kind() == PieceKind::Pawn {
        moves = drop_exposing_en_passant(position, piece, moves);
    }

    moves
}

/// Destinations from movement geometry and occupancy alone.
fn pseudo_destinations(position: &Position, piece: &Piece) -> SquareSet {
    let from = piece.position();
    let color = piece.color();
    let mut moves = SquareSet::EMPTY;

    let step = |to: Square, moves: &mut SquareSet| {
        if position.piece_at(to).map_or(true, |p| p.color() != color) {
            moves.insert(to);
        }
    };

    match piece.kind() {
        PieceKind::Pawn => pawn_destinations(position, piece, &mut moves),
        PieceKind::Knight => {
            for (dr, df) in KNIGHT_STEPS {
                if let Some(to) = from.offset(dr, df) {
                    step(to, &mut moves);
                }
            }
        }
        PieceKind::King => {
            for (dr, df) in KING_STEPS {
                if let Some(to) = from.offset(dr, df) {
                    step(to, &mut moves);
                }
            }
        }
        kind => {
            for &(dr, df) in slide_directions(kind) {
                let mut cur = from;
                while let Some(to) = cur.offset(dr, df) {
                    match position.piece_at(to) {
                        None => moves.insert(to),
                        Some(p) => {
                            if p.color() != color {
                                moves.insert(to);
                            }
                            break;
                        }
                    }
                    cur = to;
                }
            }
        }
    }

    moves
}

fn pawn_destinations(position: &Position, pawn: &Piece, moves: &mut SquareSet) {
    let from = pawn.position();
    let color = pawn.color();
    let forward = color.sign();

    if let Some(one) = from.offset(forward, 0) {
        if position.board().is_empty(one) {
            moves.insert(one);
            if from.rank_index() == color.pawn_rank() {
                if let Some(two) = one.offset(forward, 0) {
                    if position.board().is_empty(two) {
                        moves.insert(two);
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        let Some(diagonal) = from.offset(forward, df) else {
            continue;
        };
        match position.piece_at(diagonal) {
            Some(target) if target.color() != color => moves.insert(diagonal),
            Some(_) => {}
            None => {
                if en_passant_victim(position, pawn, diagonal).is_some() {
                    moves.insert(diagonal);
                }
            }
        }
    }
}

/// The enemy pawn an en passant capture onto `destination` would remove.
///
/// Only a pawn captures en passant. The victim stands beside the capturer,
/// on the destination's file, and double-stepped over `destination` on the
/// previous ply.
pub(crate) fn en_passant_victim<'a>(
    position: &'a Position,
    pawn: &Piece,
    destination: Square,
) -> Option<&'a Piece> {
    if pawn.kind() != PieceKind::Pawn {
        return None;
    }
    let from = pawn.position();
    let dr = destination.rank_index() as i8 - from.rank_index() as i8;
    let df = destination.file_index() as i8 - from.file_index() as i8;
    if dr != pawn.color().sign() || df.abs() != 1 || !position.board().is_empty(destination) {
        return None;
    }
    let beside = from.offset(0, df)?;
    position.piece_at(beside).filter(|victim| {
        victim.kind() == PieceKind::Pawn
            && victim.color() != pawn.color()
            && victim.flag() == SpecialFlag::JustDoubleStepped(destination)
    })
}

/// When the single checker is a pawn that just double-stepped, capturing
/// it en passant resolves the check; returns the square that capture lands
/// on.
fn checking_pawn_skip_square(position: &Position, checkers: SquareSet) -> Option<Square> {
    let checker = position.piece_at(checkers.first()?)?;
    match (checker.kind(), checker.flag()) {
        (PieceKind::Pawn, SpecialFlag::JustDoubleStepped(skipped)) => Some(skipped),
        _ => None,
    }
}

/// Removes en passant captures that would leave the king attacked along a
/// line once both pawns are gone from their squares.
fn drop_exposing_en_passant(position: &Position, pawn: &Piece, moves: SquareSet) -> SquareSet {
    let king = position.king(pawn.color()).position();
    let mut kept = moves;
    for destination in moves {
        let Some(victim) = en_passant_victim(position, pawn, destination) else {
            continue;
        };
        let vacated = [pawn.position(), victim.position()];
        if line_attacked_after(position, king, pawn.color(), vacated, destination) {
            kept.remove(destination);
        }
    }
    kept
}

/// Looks along every line from `king` with `vacated` treated as empty and
/// `filled` as occupied, for an enemy slider.
fn line_attacked_after(
    position: &Position,
    king: Square,
    defender: Color,
    vacated: [Square; 2],
    filled: Square,
) -> bool {
    for (dr, df) in LINES {
        let diagonal = dr != 0 && df != 0;
        let mut cur = king;
        while let Some(next) = cur.offset(dr, df) {
            cur = next;
            if next == filled {
                break;
            }
            if vacated.contains(&next) {
                continue;
            }
            if let Some(p) = position.piece_at(next) {
                if p.color() != defender && slides_along(p.kind(), diagonal) {
                    return true;
                }
                break;
            }
        }
    }
    false
}

fn castling_destinations(position: &Position, king: &Piece, attacked: SquareSet) -> SquareSet {
    let mut moves = SquareSet::EMPTY;
    let color = king.color();
    let rank = color.back_rank() as i8;

    if king.flag() != SpecialFlag::CanCastle || king.position().file_index() != 4 {
        return moves;
    }
    if king.position().rank_index() != color.back_rank() {
        return moves;
    }

    // (rook file, squares that must be empty, squares the king crosses, landing file)
    let sides: [(i8, &[i8], &[i8], i8); 2] =
        [(7, &[5, 6], &[5, 6], 6), (0, &[1, 2, 3], &[3, 2], 2)];

    for (rook_file, between, transit, landing) in sides {
        let rook_ready = Square::from_coords(rank, rook_file)
            .and_then(|sq| position.piece_at(sq))
            .is_some_and(|rook| {
                rook.kind() == PieceKind::Rook
                    && rook.color() == color
                    && rook.flag() == SpecialFlag::CanCastle
            });
        if !rook_ready {
            continue;
        }
        let clear = between
            .iter()
            .filter_map(|&file| Square::from_coords(rank, file))
            .all(|sq| position.board().is_empty(sq));
        let safe = transit
            .iter()
            .filter_map(|&file| Square::from_coords(rank, file))
            .all(|sq| !attacked.contains(sq));
        if clear && safe {
            if let Some(to) = Square::from_coords(rank, landing) {
                moves.insert(to);
            }
        }
    }

    moves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn legal(fen: &str) -> Position {
        let mut pos = Position::from_fen(fen).unwrap();
        recompute_legality(&mut pos);
        pos
    }

    fn moves_of(pos: &Position, s: &str) -> SquareSet {
        pos.piece_at(sq(s)).unwrap().legal_moves()
    }

    fn set(squares: &[&str]) -> SquareSet {
        squares.iter().map(|s| sq(s)).collect()
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let pos = legal(chess_core::Fen::STARTPOS);
        let total: usize = pos.pieces_of(Color::White).map(|p| p.legal_moves().len()).sum();
        assert_eq!(total, 20);
        assert!(pos.pieces_of(Color::Black).all(|p| p.legal_moves().is_empty()));
        assert_eq!(moves_of(&pos, "g1"), set(&["f3", "h3"]));
        assert_eq!(moves_of(&pos, "e2"), set(&["e3", "e4"]));
    }

    #[test]
    fn pinned_rook_stays_on_line() {
        let pos = legal("4k3/4r3/8/8/8/8/8/4R1K1 b - - 0 1");
        let rook = pos.piece_at(sq("e7")).unwrap();
        assert!(rook.is_pinned());
        assert_eq!(rook.legal_moves(), set(&["e6", "e5", "e4", "e3", "e2", "e1"]));
    }

    #[test]
    fn pinned_knight_cannot_move() {
        let pos = legal("4k3/8/8/8/4n3/8/8/4RK2 b - - 0 1");
        assert!(moves_of(&pos, "e4").is_empty());
    }

    #[test]
    fn single_check_capture_or_block() {
        // Rook on e1 checks e8. The bishop can only block; the queen can
        // block on e5 or capture along the a5-e1 diagonal.
        let pos = legal("4k3/3b4/8/q7/8/8/8/4R2K b - - 0 1");
        assert_eq!(moves_of(&pos, "d7"), set(&["e6"]));
        assert_eq!(moves_of(&pos, "a5"), set(&["e5", "e1"]));
        let king = pos.king(Color::Black);
        assert_eq!(king.checkers(), set(&["e1"]));
        assert_eq!(king.block_squares(), set(&["e2", "e3", "e4", "e5", "e6", "e7"]));
    }

    #[test]
    fn king_cannot_retreat_along_checking_line() {
        let pos = legal("8/8/8/8/4k3/8/8/4R2K b - - 0 1");
        assert!(!moves_of(&pos, "e4").contains(sq("e5")));
        assert_eq!(moves_of(&pos, "e4"), set(&["d5", "f5", "d4", "f4", "d3", "f3"]));
    }

    #[test]
    fn double_check_leaves_only_king_moves() {
        let pos = legal("1n2k3/pp4pp/8/7B/Q7/8/8/3K4 b - - 0 1");
        for piece in pos.pieces_of(Color::Black) {
            if piece.kind() != PieceKind::King {
                assert!(piece.legal_moves().is_empty(), "{:?}", piece.position());
            }
        }
        assert_eq!(moves_of(&pos, "e8"), set(&["d8", "e7", "f8"]));
        assert_eq!(pos.king(Color::Black).checkers().len(), 2);
        assert!(pos.king(Color::Black).block_squares().is_empty());
    }

    #[test]
    fn king_cannot_capture_defended_piece() {
        let pos = legal("4k3/8/8/8/8/8/3q4/3rK3 w - - 0 1");
        assert!(!moves_of(&pos, "e1").contains(sq("d2")));
        assert!(!moves_of(&pos, "e1").contains(sq("d1")));
    }

    #[test]
    fn castling_both_sides() {
        let pos = legal("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let king = moves_of(&pos, "e1");
        assert!(king.contains(Square::G1));
        assert!(king.contains(Square::C1));
    }

    #[test]
    fn no_castling_through_attacked_square() {
        let pos = legal("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1");
        let king = moves_of(&pos, "e1");
        assert!(!king.contains(Square::G1));
        assert!(king.contains(Square::C1));
    }

    #[test]
    fn queenside_b_file_may_be_attacked() {
        let pos = legal("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert!(moves_of(&pos, "e1").contains(Square::C1));
    }

    #[test]
    fn no_castling_out_of_check() {
        let pos = legal("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let king = moves_of(&pos, "e1");
        assert!(!king.contains(Square::G1));
        assert!(!king.contains(Square::C1));
    }

    #[test]
    fn en_passant_available_right_after_double_step() {
        let pos = legal("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        assert!(moves_of(&pos, "e5").contains(sq("d6")));
    }

    #[test]
    fn en_passant_resolves_pawn_check() {
        let pos = legal("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        assert!(moves_of(&pos, "e4").contains(sq("d3")));
        assert_eq!(moves_of(&pos, "e4"), set(&["d3"]));
    }

    #[test]
    fn en_passant_exposing_rank_is_illegal() {
        let pos = legal("8/8/8/KPp4r/8/8/8/4k3 w - c6 0 1");
        assert!(!moves_of(&pos, "b5").contains(sq("c6")));
        assert!(moves_of(&pos, "b5").contains(sq("b6")));
    }

    #[test]
    fn attacked_squares_recorded() {
        let pos = legal("4k3/8/8/8/8/8/8/r3K3 w - - 0 1");
        assert!(pos.attacked_squares().contains(sq("f1")));
        assert!(pos.in_check());
    }
}
