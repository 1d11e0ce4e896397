//! Game management: move submission, history and status.
//!
//! [`Game`] drives the per-ply cycle. A submitted token is resolved by the
//! notation translator, applied by the executor, and followed by a fresh
//! legality pass and status evaluation. Every position reached is logged for
//! repetition detection.

use crate::error::MoveError;
use crate::execute::{self, effective_promotion, MoveOutcome};
use crate::legality::{legal_moves, recompute_legality};
use crate::notation::{self, canonical_notation, move_to_san, Translation};
use crate::position::{Piece, Position, PositionKey};
use crate::render::{render_board, BoardStyle};
use crate::square_set::SquareSet;
use crate::status::{evaluate, Evaluation, Status};
use chess_core::{Color, FenError, Move, PieceKind, Square};
use tracing::{debug, info};

/// A move in game history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMove {
    /// Text the move was submitted as; coordinate notation for moves
    /// applied by squares.
    pub token: String,
    pub mov: Move,
    /// Fully disambiguated notation.
    pub canonical: String,
    /// Short algebraic notation with check suffix.
    pub san: String,
    /// Move number the move belongs to.
    pub fullmove: u32,
    pub outcome: MoveOutcome,
}

impl GameMove {
    pub fn color(&self) -> Color {
        self.outcome.color
    }
}

/// Result of a successfully applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveApplied {
    pub mov: Move,
    pub canonical: String,
    pub san: String,
    pub outcome: MoveOutcome,
    /// Status after the move.
    pub status: Status,
}

/// A chess game.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    history: Vec<GameMove>,
    position_log: Vec<PositionKey>,
    status: Status,
    evaluation: Evaluation,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a game from the standard starting position, White to move.
    pub fn new() -> Self {
        Self::from_position(Position::startpos())
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    /// Creates a game from a position. The position may already be final,
    /// e.g. a stalemate.
    pub fn from_position(position: Position) -> Self {
        let mut game = Game {
            position_log: vec![position.key()],
            position,
            history: Vec::new(),
            status: Status::InProgress,
            evaluation: Evaluation::default(),
        };
        game.advance_ply();
        game
    }

    /// Recomputes legality for the side to move and re-evaluates the
    /// termination conditions.
    ///
    /// Runs after every applied move and once at creation; calling it again
    /// between moves changes nothing. A resignation or timeout stays in
    /// force.
    pub fn advance_ply(&mut self) -> Status {
        recompute_legality(&mut self.position);
        self.evaluation = evaluate(&self.position, &self.position_log);

        if matches!(self.status, Status::Resigned { .. } | Status::TimedOut { .. }) {
            return self.status;
        }
        let status = self.evaluation.status(self.position.turn());
        if status != self.status {
            info!(%status, fen = %self.position.to_fen(), "game status changed");
            self.status = status;
        }
        status
    }

    /// Resolves and applies a move written in algebraic notation.
    pub fn submit_move(&mut self, token: &str) -> Result<MoveApplied, MoveError> {
        self.ensure_in_progress()?;
        let translation = notation::translate(&self.position, token)?;
        self.commit(token.trim().to_string(), translation.to_move())
    }

    /// Applies a move given by squares. A promoting move without a
    /// promotion kind promotes to a Queen.
    pub fn apply_move(
        &mut self,
        origin: Square,
        destination: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveApplied, MoveError> {
        self.ensure_in_progress()?;
        let promotion = effective_promotion(&self.position, origin, destination, promotion)?;
        let mov = Move::new(origin, destination, promotion);
        self.commit(mov.to_coordinate(), mov)
    }

    /// Resolves a token without applying it.
    pub fn parse(&self, token: &str) -> Result<Translation, MoveError> {
        notation::translate(&self.position, token)
    }

    /// `color` resigns.
    pub fn resign(&mut self, color: Color) -> Result<Status, MoveError> {
        self.terminate(Status::Resigned { loser: color })
    }

    /// `color` ran out of time.
    pub fn time_out(&mut self, color: Color) -> Result<Status, MoveError> {
        self.terminate(Status::TimedOut { loser: color })
    }

    fn terminate(&mut self, status: Status) -> Result<Status, MoveError> {
        self.ensure_in_progress()?;
        info!(%status, "game ended by caller");
        self.status = status;
        Ok(status)
    }

    fn ensure_in_progress(&self) -> Result<(), MoveError> {
        if self.status.is_terminal() {
            Err(MoveError::GameOver(self.status))
        } else {
            Ok(())
        }
    }

    fn commit(&mut self, token: String, mov: Move) -> Result<MoveApplied, MoveError> {
        let before = self.position.clone();
        let outcome =
            execute::apply_move(&mut self.position, mov.origin, mov.destination, mov.promotion)?;

        let canonical = canonical_notation(&before, outcome.mov);
        let san = move_to_san(&before, outcome.mov);
        debug!(%token, %canonical, %san, "move recorded");

        self.position_log.push(self.position.key());
        self.history.push(GameMove {
            token,
            mov: outcome.mov,
            canonical: canonical.clone(),
            san: san.clone(),
            fullmove: before.fullmove_number(),
            outcome,
        });
        let status = self.advance_ply();

        Ok(MoveApplied {
            mov: outcome.mov,
            canonical,
            san,
            outcome,
            status,
        })
    }

    /// Destinations of the piece on `origin`; empty unless it belongs to
    /// the side to move.
    pub fn legal_destinations(&self, origin: Square) -> SquareSet {
        self.position
            .piece_at(origin)
            .map_or(SquareSet::EMPTY, Piece::legal_moves)
    }

    /// Every legal move of the side to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.status.is_terminal() {
            return Vec::new();
        }
        legal_moves(&self.position)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Outcome of each termination check from the last evaluation.
    pub fn evaluation(&self) -> Evaluation {
        self.evaluation
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn history(&self) -> &[GameMove] {
        &self.history
    }

    /// Snapshots of every position reached, the starting one first.
    pub fn position_log(&self) -> &[PositionKey] {
        &self.position_log
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.position.halfmove_clock()
    }

    pub fn fullmove_number(&self) -> u32 {
        self.position.fullmove_number()
    }

    pub fn in_check(&self) -> bool {
        self.position.in_check()
    }

    /// Squares attacked by the side not to move.
    pub fn attacked_squares(&self) -> SquareSet {
        self.position.attacked_squares()
    }

    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.position.piece_at(sq)
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.position.pieces()
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Board diagram with Unicode pieces.
    pub fn render_board(&self) -> String {
        render_board(&self.position, BoardStyle::Unicode)
    }

    pub fn render_board_with(&self, style: BoardStyle) -> String {
        render_board(&self.position, style)
    }
}
