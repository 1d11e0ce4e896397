//! Core types for chess.
//!
//! This crate provides the vocabulary shared by the rules engine and its
//! callers:
//! - [`Color`] and [`PieceKind`] for piece identity
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`] for a resolved (origin, destination, promotion) triple
//! - FEN parsing into a [`Fen`] description

mod color;
mod fen;
mod kind;
mod mov;
mod square;

pub use color::Color;
pub use fen::{CastlingField, Fen, FenError};
pub use kind::PieceKind;
pub use mov::Move;
pub use square::{File, Rank, Square};
