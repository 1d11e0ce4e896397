//! Game termination detection.

use crate::position::{Position, PositionKey};
use chess_core::{Color, PieceKind};
use std::fmt;

/// Plies without a pawn move or capture after which the game is drawn.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Occurrences of one position that draw the game.
pub const REPETITION_LIMIT: usize = 3;

/// State of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    DrawRepetition,
    DrawInsufficientMaterial,
    DrawFiftyMove,
    Resigned { loser: Color },
    TimedOut { loser: Color },
}

impl Status {
    /// Returns true once no further moves may be played.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Status::InProgress)
    }

    /// The winning side, if the game ended decisively.
    pub const fn winner(self) -> Option<Color> {
        match self {
            Status::Checkmate { winner } => Some(winner),
            Status::Resigned { loser } | Status::TimedOut { loser } => Some(loser.opposite()),
            _ => None,
        }
    }

    /// Returns true for the drawn outcomes.
    pub const fn is_draw(self) -> bool {
        matches!(
            self,
            Status::Stalemate
                | Status::DrawRepetition
                | Status::DrawInsufficientMaterial
                | Status::DrawFiftyMove
        )
    }

    /// Result marker as used in recorded games: "1-0", "0-1", "1/2-1/2" or "*".
    pub fn result_marker(self) -> &'static str {
        match self.winner() {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None if self.is_draw() => "1/2-1/2",
            None => "*",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::InProgress => write!(f, "in progress"),
            Status::Checkmate { winner } => write!(f, "checkmate, {} wins", winner),
            Status::Stalemate => write!(f, "draw by stalemate"),
            Status::DrawRepetition => write!(f, "draw by threefold repetition"),
            Status::DrawInsufficientMaterial => write!(f, "draw by insufficient material"),
            Status::DrawFiftyMove => write!(f, "draw by the fifty-move rule"),
            Status::Resigned { loser } => write!(f, "{} resigned", loser),
            Status::TimedOut { loser } => write!(f, "{} ran out of time", loser),
        }
    }
}

/// Outcome of every termination check from one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// The side to move has no legal destination.
    pub no_legal_moves: bool,
    /// The side to move is in check.
    pub in_check: bool,
    /// How often the current position occurs in the log.
    pub repetitions: usize,
    pub insufficient_material: bool,
    pub fifty_move: bool,
}

impl Evaluation {
    /// Status for `side_to_move`; the first matching condition wins.
    pub fn status(&self, side_to_move: Color) -> Status {
        if self.no_legal_moves {
            if self.in_check {
                Status::Checkmate {
                    winner: side_to_move.opposite(),
                }
            } else {
                Status::Stalemate
            }
        } else if self.repetitions >= REPETITION_LIMIT {
            Status::DrawRepetition
        } else if self.insufficient_material {
            Status::DrawInsufficientMaterial
        } else if self.fifty_move {
            Status::DrawFiftyMove
        } else {
            Status::InProgress
        }
    }
}

/// Runs every termination check against a position whose legality is
/// current. `log` holds the snapshots of all positions reached so far,
/// the current one included.
pub fn evaluate(position: &Position, log: &[PositionKey]) -> Evaluation {
    let current = position.key();
    Evaluation {
        no_legal_moves: position.all_destinations().is_empty(),
        in_check: position.in_check(),
        repetitions: log.iter().filter(|key| **key == current).count(),
        insufficient_material: is_insufficient_material(position),
        fifty_move: position.halfmove_clock() >= FIFTY_MOVE_PLIES,
    }
}

/// Returns true if each side has a lone King, or a King with a single
/// Knight or Bishop.
pub fn is_insufficient_material(position: &Position) -> bool {
    Color::BOTH.into_iter().all(|color| {
        let mut minors = 0;
        for piece in position.pieces_of(color) {
            match piece.kind() {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors += 1,
                _ => return false,
            }
        }
        minors <= 1
    })
}
