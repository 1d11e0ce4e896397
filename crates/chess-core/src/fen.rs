//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use crate::{Color, PieceKind, Square};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// Castling availability as written in the third FEN field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingField {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingField {
    /// All four castling options available.
    pub const ALL: CastlingField = CastlingField {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    /// Kingside availability for a color.
    pub const fn kingside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    /// Queenside availability for a color.
    pub const fn queenside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn parse(field: &str) -> Result<Self, FenError> {
        let mut castling = CastlingField::default();
        if field == "-" {
            return Ok(castling);
        }
        for c in field.chars() {
            let slot = match c {
                'K' => &mut castling.white_kingside,
                'Q' => &mut castling.white_queenside,
                'k' => &mut castling.black_kingside,
                'q' => &mut castling.black_queenside,
                _ => {
                    return Err(FenError::InvalidCastlingRights(format!(
                        "invalid character '{}'",
                        c
                    )))
                }
            };
            *slot = true;
        }
        Ok(castling)
    }

    fn to_field(self) -> String {
        let field: String = [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ]
        .iter()
        .filter(|(set, _)| *set)
        .map(|(_, c)| *c)
        .collect();
        if field.is_empty() {
            "-".to_string()
        } else {
            field
        }
    }
}

/// A parsed FEN record.
///
/// Holds the decoded fields; the rules engine turns this into its own
/// piece arena and board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Occupant of each square, indexed by [`Square::index`].
    pub placement: [Option<(PieceKind, Color)>; 64],
    /// Side to move.
    pub active_color: Color,
    /// Castling availability.
    pub castling: CastlingField,
    /// Square a pawn skipped over on the previous ply, if any.
    pub en_passant: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u32,
    /// Fullmove number, starting at 1.
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let placement = parse_placement(parts[0])?;

        let active_color = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = CastlingField::parse(parts[2])?;
        let en_passant = parse_en_passant(parts[3])?;

        let halfmove_clock = parts[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;

        let fullmove_number = parts[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(Fen {
            placement,
            active_color,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Serializes back to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut rows = Vec::with_capacity(8);
        for rank in (0..8u8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8u8 {
                match self.placement[(rank * 8 + file) as usize] {
                    Some((kind, color)) => {
                        if empty > 0 {
                            row.push_str(&empty.to_string());
                            empty = 0;
                        }
                        row.push(kind.to_fen_char(color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = match self.active_color {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let en_passant = self
            .en_passant
            .map(Square::to_algebraic)
            .unwrap_or_else(|| "-".to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            self.castling.to_field(),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for Fen {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}

fn parse_placement(field: &str) -> Result<[Option<(PieceKind, Color)>; 64], FenError> {
    let rows: Vec<&str> = field.split('/').collect();
    if rows.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            rows.len()
        )));
    }

    let mut placement = [None; 64];
    for (i, row) in rows.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0usize;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += skip as usize;
            } else if let Some(occupant) = PieceKind::from_fen_char(c) {
                if file < 8 {
                    placement[rank * 8 + file] = Some(occupant);
                }
                file += 1;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{}' in rank {}",
                    c,
                    rank + 1
                )));
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {} has {} squares, expected 8",
                rank + 1,
                file
            )));
        }
    }

    for color in Color::BOTH {
        let kings = placement
            .iter()
            .filter(|sq| **sq == Some((PieceKind::King, color)))
            .count();
        if kings != 1 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected one {} king, found {}",
                color, kings
            )));
        }
    }

    Ok(placement)
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    match Square::from_algebraic(field) {
        Some(sq) if sq.rank_index() == 2 || sq.rank_index() == 5 => Ok(Some(sq)),
        _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
    }
}
