//! Text rendering of the board.

use crate::position::Position;
use chess_core::{Color, File, Square};

/// Piece symbols used by [`render_board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardStyle {
    /// Chess glyphs, e.g. ♔ and ♚.
    #[default]
    Unicode,
    /// FEN letters: uppercase for White, lowercase for Black.
    Ascii,
}

/// Draws the board with rank 8 at the top. Each row starts with its rank
/// digit; empty squares are `.`; a file line closes the diagram.
///
/// ```text
/// 8 r n b q k b n r
/// 7 p p p p p p p p
/// 6 . . . . . . . .
/// ...
///   a b c d e f g h
/// ```
pub fn render_board(position: &Position, style: BoardStyle) -> String {
    let mut out = String::with_capacity(9 * 18);

    for rank in (0..8i8).rev() {
        out.push(char::from(b'1' + rank as u8));
        for file in 0..8i8 {
            out.push(' ');
            let symbol = Square::from_coords(rank, file)
                .and_then(|sq| position.piece_at(sq))
                .map(|p| match style {
                    BoardStyle::Unicode => p.kind().symbol(p.color()),
                    BoardStyle::Ascii => p.kind().to_fen_char(p.color()),
                });
            out.push(symbol.unwrap_or('.'));
        }
        out.push('\n');
    }

    out.push(' ');
    for file in File::ALL {
        out.push(' ');
        out.push(file.to_char());
    }
    out.push('\n');
    out
}

/// One-line caption naming the side to move.
pub fn turn_caption(color: Color) -> String {
    format!("{} to move", color)
}
