//! Errors reported when a move cannot be applied.

use crate::status::Status;
use thiserror::Error;

/// A rejected move. The game is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    /// The token does not match the move grammar.
    #[error("cannot parse move '{0}'")]
    ParseError(String),

    /// The token is well formed but names no legal move.
    #[error("illegal move '{0}'")]
    InvalidMove(String),

    /// More than one piece could make the named move.
    #[error("ambiguous move '{0}'")]
    AmbiguousMove(String),

    /// The game has already ended.
    #[error("game is over: {0}")]
    GameOver(Status),
}

/// A transcript token that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("move {} ('{token}') rejected: {error}", .index + 1)]
pub struct ReplayError {
    /// Zero-based position of the token in the transcript.
    pub index: usize,
    pub token: String,
    #[source]
    pub error: MoveError,
}
