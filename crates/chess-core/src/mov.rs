//! Move representation.

use crate::{PieceKind, Square};
use std::fmt;

/// A resolved move: origin, destination and the promotion kind if the move
/// promotes a pawn.
///
/// Castling is expressed as the King's two-file step; en passant as the
/// pawn's diagonal step onto the empty target square. The rules engine
/// infers the side effects from the position.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub origin: Square,
    pub destination: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a move.
    #[inline]
    pub const fn new(origin: Square, destination: Square, promotion: Option<PieceKind>) -> Self {
        Move {
            origin,
            destination,
            promotion,
        }
    }

    /// Creates a move without promotion.
    #[inline]
    pub const fn normal(origin: Square, destination: Square) -> Self {
        Self::new(origin, destination, None)
    }

    /// Coordinate notation, e.g. "e2e4" or "e7e8q".
    pub fn to_coordinate(self) -> String {
        match self.promotion {
            Some(kind) => format!(
                "{}{}{}",
                self.origin,
                self.destination,
                kind.letter().to_ascii_lowercase()
            ),
            None => format!("{}{}", self.origin, self.destination),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_coordinate())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_coordinate())
    }
}
