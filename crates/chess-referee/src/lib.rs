//! Chess referee.
//!
//! Runs games through the rules engine in `chess-rules` from the command
//! line.
//!
//! # Modules
//!
//! - [`config`] - `referee.toml` settings
//! - [`record`] - reading and writing PGN-style game records
//! - [`replay`] - replaying a record from its starting position
//! - [`play`] - interactive play with an optional per-move time limit
//! - [`summary`] - JSON summaries of finished or interrupted games

pub mod config;
pub mod play;
pub mod record;
pub mod replay;
pub mod summary;
