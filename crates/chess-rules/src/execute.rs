//! Move execution.

use crate::error::MoveError;
use crate::legality::en_passant_victim;
use crate::position::{Position, SpecialFlag};
use chess_core::{Color, Move, PieceKind, Square};
use tracing::debug;

/// Side of the board a King castled toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    /// Notation for this castle: "O-O" or "O-O-O".
    pub const fn notation(self) -> &'static str {
        match self {
            CastleSide::Kingside => "O-O",
            CastleSide::Queenside => "O-O-O",
        }
    }

    /// King destination for `color`.
    pub fn king_destination(self, color: Color) -> Square {
        match (self, color) {
            (CastleSide::Kingside, Color::White) => Square::G1,
            (CastleSide::Queenside, Color::White) => Square::C1,
            (CastleSide::Kingside, Color::Black) => Square::G8,
            (CastleSide::Queenside, Color::Black) => Square::C8,
        }
    }

    /// Rook origin and destination for `color`.
    fn rook_squares(self, color: Color) -> (Square, Square) {
        match (self, color) {
            (CastleSide::Kingside, Color::White) => (Square::H1, Square::F1),
            (CastleSide::Queenside, Color::White) => (Square::A1, Square::D1),
            (CastleSide::Kingside, Color::Black) => (Square::H8, Square::F8),
            (CastleSide::Queenside, Color::Black) => (Square::A8, Square::D8),
        }
    }
}

/// What an applied move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The move, with the promotion actually made.
    pub mov: Move,
    pub color: Color,
    /// Kind of the moving piece before any promotion.
    pub kind: PieceKind,
    pub captured: Option<PieceKind>,
    pub en_passant: bool,
    pub castle: Option<CastleSide>,
}

impl MoveOutcome {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

/// Castling side if a King moves two files from `origin` to `destination`.
pub(crate) fn castle_side(
    kind: PieceKind,
    origin: Square,
    destination: Square,
) -> Option<CastleSide> {
    if kind != PieceKind::King || origin.rank_index() != destination.rank_index() {
        return None;
    }
    match destination.file_index() as i8 - origin.file_index() as i8 {
        2 => Some(CastleSide::Kingside),
        -2 => Some(CastleSide::Queenside),
        _ => None,
    }
}

/// Promotion a move from `origin` to `destination` makes, with Queen as the
/// default. Errors if a promotion is requested for a move that cannot
/// promote.
pub(crate) fn effective_promotion(
    position: &Position,
    origin: Square,
    destination: Square,
    requested: Option<PieceKind>,
) -> Result<Option<PieceKind>, MoveError> {
    let promotes = position.piece_at(origin).is_some_and(|p| {
        p.kind() == PieceKind::Pawn && destination.rank_index() == p.color().promotion_rank()
    });
    match (promotes, requested) {
        (true, None) => Ok(Some(PieceKind::Queen)),
        (true, Some(kind)) if kind.is_promotion_target() => Ok(Some(kind)),
        (false, None) => Ok(None),
        _ => Err(MoveError::InvalidMove(
            Move::new(origin, destination, requested).to_coordinate(),
        )),
    }
}

/// Applies a move whose destination is in the origin piece's current
/// legal set.
///
/// Nothing is changed when the move is rejected. Legality is not
/// recomputed afterwards; the position's destination sets are stale until
/// [`recompute_legality`](crate::legality::recompute_legality) runs.
pub fn apply_move(
    position: &mut Position,
    origin: Square,
    destination: Square,
    promotion: Option<PieceKind>,
) -> Result<MoveOutcome, MoveError> {
    let rejected =
        || MoveError::InvalidMove(Move::new(origin, destination, promotion).to_coordinate());

    let mover = position
        .piece_at(origin)
        .filter(|p| p.color() == position.turn())
        .ok_or_else(rejected)?;
    if !mover.legal_moves().contains(destination) {
        return Err(rejected());
    }
    let promotion = effective_promotion(position, origin, destination, promotion)?;

    let id = mover.id();
    let color = mover.color();
    let kind = mover.kind();
    let victim_square = en_passant_victim(position, mover, destination).map(|p| p.position());
    let castle = castle_side(kind, origin, destination);

    for piece in position.pieces_mut() {
        if matches!(piece.flag(), SpecialFlag::JustDoubleStepped(_)) {
            piece.set_flag(SpecialFlag::None);
        }
    }

    let captured = position
        .capture(victim_square.unwrap_or(destination))
        .map(|piece| piece.kind());
    position.relocate(id, destination);

    if let Some(side) = castle {
        let (rook_from, rook_to) = side.rook_squares(color);
        if let Some(rook_id) = position.board().get(rook_from) {
            position.relocate(rook_id, rook_to);
            position.piece_mut(rook_id).set_flag(SpecialFlag::None);
        }
    }

    let piece = position.piece_mut(id);
    match kind {
        PieceKind::King | PieceKind::Rook => piece.set_flag(SpecialFlag::None),
        PieceKind::Pawn if origin.rank_index().abs_diff(destination.rank_index()) == 2 => {
            if let Some(skipped) = origin.offset(color.sign(), 0) {
                piece.set_flag(SpecialFlag::JustDoubleStepped(skipped));
            }
        }
        _ => {}
    }
    if let Some(promoted) = promotion {
        piece.set_kind(promoted);
    }

    if kind == PieceKind::Pawn || captured.is_some() {
        position.set_halfmove_clock(0);
    } else {
        position.set_halfmove_clock(position.halfmove_clock() + 1);
    }
    position.finish_ply();

    let outcome = MoveOutcome {
        mov: Move::new(origin, destination, promotion),
        color,
        kind,
        captured,
        en_passant: victim_square.is_some(),
        castle,
    };
    debug!(
        mv = %outcome.mov,
        color = %color,
        piece = %kind,
        captured = ?captured,
        en_passant = outcome.en_passant,
        castle = ?castle,
        halfmove_clock = position.halfmove_clock(),
        "move applied"
    );
    Ok(outcome)
}
