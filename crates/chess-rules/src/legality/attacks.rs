//! Attacker-side scan: coverage, checks and pins.

use crate::position::{PieceId, Position};
use crate::square_set::SquareSet;
use chess_core::{Color, PieceKind, Square};

/// Rank and file steps of a rook.
pub(crate) const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Rank and file steps of a bishop.
pub(crate) const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Every line direction, orthogonals first.
pub(crate) const LINES: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub(crate) const KNIGHT_STEPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

pub(crate) const KING_STEPS: [(i8, i8); 8] = LINES;

/// Ray directions of a sliding piece; empty for the others.
pub(crate) fn slide_directions(kind: PieceKind) -> &'static [(i8, i8)] {
    match kind {
        PieceKind::Bishop => &DIAGONAL,
        PieceKind::Rook => &ORTHOGONAL,
        PieceKind::Queen => &LINES,
        _ => &[],
    }
}

/// Returns true if `kind` slides along lines of the given shape.
pub(crate) fn slides_along(kind: PieceKind, diagonal: bool) -> bool {
    match kind {
        PieceKind::Queen => true,
        PieceKind::Bishop => diagonal,
        PieceKind::Rook => !diagonal,
        _ => false,
    }
}

/// Result of scanning one side's pieces as attackers.
#[derive(Debug, Default)]
pub(crate) struct AttackScan {
    /// Squares the attacker covers. Includes squares of its own pieces
    /// (defended) and the square directly behind a king in check along a
    /// line.
    pub attacked: SquareSet,
    /// Squares of pieces giving check to the defending king.
    pub checkers: SquareSet,
    /// Empty squares between a line checker and the defending king.
    pub block_squares: SquareSet,
    /// Defending pieces pinned to their king, with the squares they may
    /// still move on.
    pub pins: Vec<(PieceId, SquareSet)>,
}

impl AttackScan {
    pub fn pin_line(&self, id: PieceId) -> Option<SquareSet> {
        self.pins
            .iter()
            .find(|(pinned, _)| *pinned == id)
            .map(|(_, line)| *line)
    }
}

/// Scans every piece of `attacker` against the defending side.
pub(crate) fn scan(position: &Position, attacker: Color) -> AttackScan {
    let mut scan = AttackScan::default();

    for piece in position.pieces_of(attacker) {
        let from = piece.position();
        match piece.kind() {
            PieceKind::Pawn => {
                for df in [-1, 1] {
                    if let Some(to) = from.offset(attacker.sign(), df) {
                        mark_step(position, attacker, from, to, &mut scan);
                    }
                }
            }
            PieceKind::Knight => {
                for (dr, df) in KNIGHT_STEPS {
                    if let Some(to) = from.offset(dr, df) {
                        mark_step(position, attacker, from, to, &mut scan);
                    }
                }
            }
            PieceKind::King => {
                for (dr, df) in KING_STEPS {
                    if let Some(to) = from.offset(dr, df) {
                        scan.attacked.insert(to);
                    }
                }
            }
            kind => {
                for &dir in slide_directions(kind) {
                    trace_ray(position, attacker, from, dir, &mut scan);
                }
            }
        }
    }

    scan
}

fn mark_step(
    position: &Position,
    attacker: Color,
    from: Square,
    to: Square,
    scan: &mut AttackScan,
) {
    scan.attacked.insert(to);
    if is_enemy_king(position, attacker, to) {
        scan.checkers.insert(from);
    }
}

fn is_enemy_king(position: &Position, attacker: Color, sq: Square) -> bool {
    position
        .piece_at(sq)
        .is_some_and(|p| p.color() != attacker && p.kind() == PieceKind::King)
}

/// Follows one ray from a slider.
///
/// Empty squares are collected into the path. The first occupant ends the
/// ray, except that a check also covers the square behind the king, and a
/// defender with its king further along the line is recorded as pinned.
fn trace_ray(
    position: &Position,
    attacker: Color,
    from: Square,
    (dr, df): (i8, i8),
    scan: &mut AttackScan,
) {
    let mut path = SquareSet::EMPTY;
    let mut cur = from;

    while let Some(next) = cur.offset(dr, df) {
        scan.attacked.insert(next);
        let Some(occupant) = position.piece_at(next) else {
            path.insert(next);
            cur = next;
            continue;
        };

        if occupant.color() != attacker {
            if occupant.kind() == PieceKind::King {
                scan.checkers.insert(from);
                scan.block_squares |= path;
                if let Some(behind) = next.offset(dr, df) {
                    scan.attacked.insert(behind);
                }
            } else if let Some(beyond) = king_beyond(position, attacker, next, (dr, df)) {
                let line = path | beyond | SquareSet::from_square(from);
                scan.pins.push((occupant.id(), line));
            }
        }
        return;
    }
}

/// Empty squares between `pinned` and the defending king along a direction,
/// or `None` if something else comes first.
fn king_beyond(
    position: &Position,
    attacker: Color,
    pinned: Square,
    (dr, df): (i8, i8),
) -> Option<SquareSet> {
    let mut gap = SquareSet::EMPTY;
    let mut cur = pinned;
    while let Some(next) = cur.offset(dr, df) {
        match position.piece_at(next) {
            None => gap.insert(next),
            Some(_) if is_enemy_king(position, attacker, next) => return Some(gap),
            Some(_) => return None,
        }
        cur = next;
    }
    None
}
