//! Board and piece model.
//!
//! A [`Position`] owns every [`Piece`] in an arena indexed by [`PieceId`].
//! The [`Board`] is a derived index: each cell holds the id of its occupant,
//! never the piece itself. Capturing a piece empties its arena slot and its
//! cell together; the id is never handed out again.

use crate::square_set::SquareSet;
use chess_core::{CastlingField, Color, Fen, FenError, PieceKind, Square};

/// Stable identity of a piece, assigned when the position is set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u8);

impl PieceId {
    /// Arena slot of this piece.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-piece rule state that depends on the piece's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialFlag {
    None,
    /// King or rook that has not moved yet.
    CanCastle,
    /// Pawn that advanced two squares on the previous ply; holds the square
    /// it skipped, which is where an en passant capture lands.
    JustDoubleStepped(Square),
}

/// A piece and its per-ply constraint bookkeeping.
///
/// `pin_line`, `checkers`, `block_squares` and `legal_moves` are rebuilt
/// from scratch by [`recompute_legality`](crate::legality::recompute_legality)
/// every ply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    color: Color,
    kind: PieceKind,
    position: Square,
    flag: SpecialFlag,
    pub(crate) pin_line: SquareSet,
    pub(crate) checkers: SquareSet,
    pub(crate) block_squares: SquareSet,
    pub(crate) legal_moves: SquareSet,
}

impl Piece {
    fn new(id: PieceId, kind: PieceKind, color: Color, position: Square) -> Self {
        Piece {
            id,
            color,
            kind,
            position,
            flag: SpecialFlag::None,
            pin_line: SquareSet::EMPTY,
            checkers: SquareSet::EMPTY,
            block_squares: SquareSet::EMPTY,
            legal_moves: SquareSet::EMPTY,
        }
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn position(&self) -> Square {
        self.position
    }

    pub fn flag(&self) -> SpecialFlag {
        self.flag
    }

    /// Squares a pinned piece may still occupy; empty when not pinned.
    pub fn pin_line(&self) -> SquareSet {
        self.pin_line
    }

    /// Squares of the pieces giving check. Only kings carry checkers.
    pub fn checkers(&self) -> SquareSet {
        self.checkers
    }

    /// Empty squares between a single checker and this king.
    pub fn block_squares(&self) -> SquareSet {
        self.block_squares
    }

    /// Current destination set. Empty for the side not to move.
    pub fn legal_moves(&self) -> SquareSet {
        self.legal_moves
    }

    pub fn is_pinned(&self) -> bool {
        !self.pin_line.is_empty()
    }

    pub(crate) fn set_flag(&mut self, flag: SpecialFlag) {
        self.flag = flag;
    }

    pub(crate) fn set_kind(&mut self, kind: PieceKind) {
        self.kind = kind;
    }

    fn reset_constraints(&mut self) {
        self.pin_line = SquareSet::EMPTY;
        self.checkers = SquareSet::EMPTY;
        self.block_squares = SquareSet::EMPTY;
        self.legal_moves = SquareSet::EMPTY;
    }
}

/// 8×8 grid of piece ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<PieceId>; 64],
}

impl Board {
    fn empty() -> Self {
        Board { cells: [None; 64] }
    }

    /// Id of the piece on `sq`, if any.
    #[inline]
    pub fn get(&self, sq: Square) -> Option<PieceId> {
        self.cells[sq.index() as usize]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.get(sq).is_none()
    }

    fn set(&mut self, sq: Square, id: PieceId) {
        self.cells[sq.index() as usize] = Some(id);
    }

    fn clear(&mut self, sq: Square) {
        self.cells[sq.index() as usize] = None;
    }
}

/// Snapshot of a position for repetition counting: every occupied square's
/// kind, color and special flag, plus the side to move. Piece ids and move
/// counters are left out.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    cells: [Option<(PieceKind, Color, SpecialFlag)>; 64],
    turn: Color,
}

/// Complete game position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pieces: Vec<Option<Piece>>,
    board: Board,
    turn: Color,
    halfmove_clock: u32,
    fullmove_number: u32,
    pub(crate) attacked: SquareSet,
}

impl Position {
    /// Creates the standard starting position.
    pub fn startpos() -> Self {
        Self::from_fen_record(&Fen::default())
    }

    /// Creates a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_fen_record(&Fen::parse(fen)?))
    }

    /// Creates a position from a parsed FEN record. Ids follow square order.
    pub fn from_fen_record(fen: &Fen) -> Self {
        let mut position = Position {
            pieces: Vec::with_capacity(32),
            board: Board::empty(),
            turn: fen.active_color,
            halfmove_clock: fen.halfmove_clock,
            fullmove_number: fen.fullmove_number.max(1),
            attacked: SquareSet::EMPTY,
        };

        for (index, occupant) in fen.placement.iter().enumerate() {
            let Some((kind, color)) = *occupant else {
                continue;
            };
            let Some(sq) = Square::from_index(index as u8) else {
                continue;
            };
            let id = PieceId(position.pieces.len() as u8);
            let mut piece = Piece::new(id, kind, color, sq);
            piece.flag = initial_flag(kind, color, sq, fen.castling);
            position.board.set(sq, id);
            position.pieces.push(Some(piece));
        }

        if let Some(target) = fen.en_passant {
            let mover = fen.active_color.opposite();
            if let Some(pawn_sq) = target.offset(mover.sign(), 0) {
                if let Some(id) = position.board.get(pawn_sq) {
                    let pawn = position.piece_mut(id);
                    if pawn.kind == PieceKind::Pawn && pawn.color == mover {
                        pawn.flag = SpecialFlag::JustDoubleStepped(target);
                    }
                }
            }
        }

        position
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = [None; 64];
        let mut en_passant = None;
        for piece in self.pieces() {
            placement[piece.position.index() as usize] = Some((piece.kind, piece.color));
            if let SpecialFlag::JustDoubleStepped(target) = piece.flag {
                en_passant = Some(target);
            }
        }

        let castling = CastlingField {
            white_kingside: self.castling_available(Color::White, 7),
            white_queenside: self.castling_available(Color::White, 0),
            black_kingside: self.castling_available(Color::Black, 7),
            black_queenside: self.castling_available(Color::Black, 0),
        };

        Fen {
            placement,
            active_color: self.turn,
            castling,
            en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    fn castling_available(&self, color: Color, rook_file: i8) -> bool {
        let rank = color.back_rank() as i8;
        let unmoved = |file: i8, kind: PieceKind| {
            Square::from_coords(rank, file)
                .and_then(|sq| self.piece_at(sq))
                .is_some_and(|p| {
                    p.kind == kind && p.color == color && p.flag == SpecialFlag::CanCastle
                })
        };
        unmoved(4, PieceKind::King) && unmoved(rook_file, PieceKind::Rook)
    }

    /// Side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Plies since the last pawn move or capture.
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Squares the side not to move attacks, from the last legality pass.
    pub fn attacked_squares(&self) -> SquareSet {
        self.attacked
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Piece with the given id, `None` once captured.
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index()).and_then(Option::as_ref)
    }

    /// Piece standing on `sq`.
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.board.get(sq).and_then(|id| self.piece(id))
    }

    /// Every piece still on the board, in id order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().flatten()
    }

    /// Pieces of one color, in id order.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces().filter(move |p| p.color == color)
    }

    /// The king of `color`.
    ///
    /// # Panics
    ///
    /// Panics if that king is missing, which no legal sequence of moves can
    /// produce.
    pub fn king(&self, color: Color) -> &Piece {
        match self
            .pieces_of(color)
            .find(|p| p.kind == PieceKind::King)
        {
            Some(king) => king,
            None => panic!("position invariant violated: no {} king", color),
        }
    }

    /// Returns true if the side to move is in check.
    pub fn in_check(&self) -> bool {
        !self.king(self.turn).checkers.is_empty()
    }

    /// Union of the destination sets of the side to move.
    pub fn all_destinations(&self) -> SquareSet {
        self.pieces_of(self.turn)
            .fold(SquareSet::EMPTY, |acc, p| acc | p.legal_moves)
    }

    /// Snapshot used for repetition detection.
    pub fn key(&self) -> PositionKey {
        let mut cells = [None; 64];
        for piece in self.pieces() {
            cells[piece.position.index() as usize] = Some((piece.kind, piece.color, piece.flag));
        }
        PositionKey {
            cells,
            turn: self.turn,
        }
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        match self.pieces.get_mut(id.index()).and_then(Option::as_mut) {
            Some(piece) => piece,
            None => panic!("position invariant violated: piece {:?} is not on the board", id),
        }
    }

    pub(crate) fn pieces_mut(&mut self) -> impl Iterator<Item = &mut Piece> + '_ {
        self.pieces.iter_mut().flatten()
    }

    pub(crate) fn reset_constraints(&mut self) {
        for piece in self.pieces_mut() {
            piece.reset_constraints();
        }
        self.attacked = SquareSet::EMPTY;
    }

    /// Moves a piece to an empty square, keeping board and piece in sync.
    pub(crate) fn relocate(&mut self, id: PieceId, to: Square) {
        let from = self.piece_mut(id).position;
        debug_assert!(self.board.is_empty(to), "relocating onto occupied {}", to);
        self.board.clear(from);
        self.board.set(to, id);
        self.piece_mut(id).position = to;
    }

    /// Removes the piece on `sq` from board and arena at once.
    pub(crate) fn capture(&mut self, sq: Square) -> Option<Piece> {
        let id = self.board.get(sq)?;
        self.board.clear(sq);
        let captured = self.pieces.get_mut(id.index()).and_then(Option::take);
        assert!(
            captured.as_ref().map_or(true, |p| p.kind != PieceKind::King),
            "position invariant violated: king captured on {}",
            sq
        );
        captured
    }

    pub(crate) fn set_halfmove_clock(&mut self, clock: u32) {
        self.halfmove_clock = clock;
    }

    pub(crate) fn finish_ply(&mut self) {
        if self.turn == Color::Black {
            self.fullmove_number += 1;
        }
        self.turn = self.turn.opposite();
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

fn initial_flag(kind: PieceKind, color: Color, sq: Square, castling: CastlingField) -> SpecialFlag {
    let home = sq.rank_index() == color.back_rank();
    let can_castle = match (kind, sq.file_index()) {
        (PieceKind::King, 4) => castling.kingside(color) || castling.queenside(color),
        (PieceKind::Rook, 7) => castling.kingside(color),
        (PieceKind::Rook, 0) => castling.queenside(color),
        _ => false,
    };
    if home && can_castle {
        SpecialFlag::CanCastle
    } else {
        SpecialFlag::None
    }
}
