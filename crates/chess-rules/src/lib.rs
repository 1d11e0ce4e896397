//! Chess rules engine.
//!
//! This crate provides:
//! - [`Position`] - piece arena, board index, side to move and clocks
//! - [`recompute_legality`] - two-pass legal move computation under checks,
//!   pins, castling and en passant
//! - [`apply_move`] - atomic move execution
//! - [`translate`] - algebraic notation with disambiguation
//! - [`Game`] - move submission, history and termination status
//! - [`transcript`] - tokenizing, replaying and rendering recorded games
//!
//! # Architecture
//!
//! Every piece carries its own constraint state: a pin line, the checkers
//! of its king, the block squares of a single check and its legal
//! destinations. After each ply the attack scan of the side not to move
//! rebuilds those fields from scratch, so queries never generate and undo
//! moves.
//!
//! # Example
//!
//! ```
//! use chess_rules::{Game, Status};
//!
//! let mut game = Game::new();
//! for token in ["f3", "e5", "g4"] {
//!     game.submit_move(token).unwrap();
//! }
//! let applied = game.submit_move("Qh4").unwrap();
//! assert_eq!(applied.san, "Qh4#");
//! assert!(matches!(game.status(), Status::Checkmate { .. }));
//! println!("{}", game.render_board());
//! ```

mod error;
mod execute;
mod game;
pub mod legality;
pub mod notation;
mod position;
mod render;
mod square_set;
mod status;
pub mod transcript;

pub use error::{MoveError, ReplayError};
pub use execute::{apply_move, CastleSide, MoveOutcome};
pub use game::{Game, GameMove, MoveApplied};
pub use legality::{legal_moves, recompute_legality};
pub use notation::{canonical_notation, move_to_san, translate, Translation};
pub use position::{Board, Piece, PieceId, Position, PositionKey, SpecialFlag};
pub use render::{render_board, turn_caption, BoardStyle};
pub use square_set::{SquareSet, SquareSetIter};
pub use status::{
    evaluate, is_insufficient_material, Evaluation, Status, FIFTY_MOVE_PLIES, REPETITION_LIMIT,
};
pub use transcript::replay_transcript;
