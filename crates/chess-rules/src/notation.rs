//! Algebraic notation.
//!
//! Tokens follow short algebraic notation: an optional piece letter, an
//! optional origin file and rank, an optional `x`, the destination, an
//! optional `=Q|R|B|N` promotion and an optional `+` or `#`. Castling is
//! written `O-O` / `O-O-O` (or with zeros). Examples: "e4", "Nf3", "Bxc6",
//! "Nbd2", "R1e1", "exd6", "e8=N", "O-O+".
//!
//! Tokens are resolved against the destination sets of the side to move,
//! so a position must have current legality before translation.

use crate::error::MoveError;
use crate::execute::{apply_move, castle_side, effective_promotion, CastleSide};
use crate::legality::{en_passant_victim, recompute_legality};
use crate::position::Position;
use chess_core::{File, Move, PieceKind, Rank, Square};

/// A token resolved to a concrete move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub origin: Square,
    pub destination: Square,
    /// Promotion the move makes; Queen when a promoting token omits it.
    pub promotion: Option<PieceKind>,
    /// Fully disambiguated notation of the move.
    pub canonical: String,
}

impl Translation {
    pub fn to_move(&self) -> Move {
        Move::new(self.origin, self.destination, self.promotion)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Castle(CastleSide),
    Piece(PieceToken),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PieceToken {
    kind: PieceKind,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    destination: Square,
    promotion: Option<PieceKind>,
}

/// Resolves `token` to the single legal move it names for the side to
/// move.
pub fn translate(position: &Position, token: &str) -> Result<Translation, MoveError> {
    let token = token.trim();
    match parse_token(token)? {
        Token::Castle(side) => translate_castle(position, token, side),
        Token::Piece(parsed) => translate_piece_move(position, token, &parsed),
    }
}

fn translate_castle(
    position: &Position,
    token: &str,
    side: CastleSide,
) -> Result<Translation, MoveError> {
    let king = position.king(position.turn());
    let destination = side.king_destination(king.color());
    if castle_side(king.kind(), king.position(), destination) != Some(side)
        || !king.legal_moves().contains(destination)
    {
        return Err(MoveError::InvalidMove(token.to_string()));
    }
    Ok(Translation {
        origin: king.position(),
        destination,
        promotion: None,
        canonical: side.notation().to_string(),
    })
}

fn translate_piece_move(
    position: &Position,
    token: &str,
    parsed: &PieceToken,
) -> Result<Translation, MoveError> {
    let destination = parsed.destination;
    let from_file = match (parsed.kind, parsed.from_file) {
        (PieceKind::Pawn, None) => Some(destination.file()),
        (_, file) => file,
    };

    let candidates: Vec<Square> = position
        .pieces_of(position.turn())
        .filter(|p| p.kind() == parsed.kind && p.legal_moves().contains(destination))
        .filter(|p| from_file.map_or(true, |f| p.position().file() == f))
        .filter(|p| parsed.from_rank.map_or(true, |r| p.position().rank() == r))
        .map(|p| p.position())
        .collect();

    let origin = match candidates.as_slice() {
        [] => return Err(MoveError::InvalidMove(token.to_string())),
        [origin] => *origin,
        _ => return Err(MoveError::AmbiguousMove(token.to_string())),
    };

    let promotion = effective_promotion(position, origin, destination, parsed.promotion)
        .map_err(|_| MoveError::InvalidMove(token.to_string()))?;

    Ok(Translation {
        origin,
        destination,
        promotion,
        canonical: canonical_notation(position, Move::new(origin, destination, promotion)),
    })
}

fn parse_token(token: &str) -> Result<Token, MoveError> {
    let parse_error = || MoveError::ParseError(token.to_string());

    let body = token
        .strip_suffix('#')
        .or_else(|| token.strip_suffix('+'))
        .unwrap_or(token);

    match body {
        "O-O-O" | "0-0-0" => return Ok(Token::Castle(CastleSide::Queenside)),
        "O-O" | "0-0" => return Ok(Token::Castle(CastleSide::Kingside)),
        _ => {}
    }

    let (body, promotion) = match body.rsplit_once('=') {
        Some((rest, letter)) => {
            let mut chars = letter.chars();
            let kind = match (chars.next(), chars.next()) {
                (Some(c), None) => PieceKind::from_letter(c),
                _ => None,
            }
            .filter(|k| k.is_promotion_target())
            .ok_or_else(parse_error)?;
            (rest, Some(kind))
        }
        None => (body, None),
    };

    let chars: Vec<char> = body.chars().collect();
    let (kind, rest) = match chars.split_first() {
        Some((&c, rest)) if c.is_ascii_uppercase() => {
            (PieceKind::from_letter(c).ok_or_else(parse_error)?, rest)
        }
        Some(_) => (PieceKind::Pawn, chars.as_slice()),
        None => return Err(parse_error()),
    };

    let [prefix @ .., file, rank] = rest else {
        return Err(parse_error());
    };
    let destination = match (File::from_char(*file), Rank::from_char(*rank)) {
        (Some(f), Some(r)) => Square::new(f, r),
        _ => return Err(parse_error()),
    };

    // Prefix grammar: [file][rank][x], each part optional, in that order.
    let mut prefix = prefix.iter().copied().peekable();
    let from_file = prefix.next_if(|c| File::from_char(*c).is_some()).and_then(File::from_char);
    let from_rank = prefix.next_if(|c| Rank::from_char(*c).is_some()).and_then(Rank::from_char);
    // The capture marker is optional and not checked against the board.
    let _ = prefix.next_if_eq(&'x');
    if prefix.next().is_some() {
        return Err(parse_error());
    }

    Ok(Token::Piece(PieceToken {
        kind,
        from_file,
        from_rank,
        destination,
        promotion,
    }))
}

fn is_capture(position: &Position, mv: Move) -> bool {
    if position.piece_at(mv.destination).is_some() {
        return true;
    }
    position
        .piece_at(mv.origin)
        .is_some_and(|p| en_passant_victim(position, p, mv.destination).is_some())
}

/// Fully disambiguated notation for a legal move: piece letter (none for
/// pawns), origin square, `x` on captures, destination and promotion, or
/// `O-O` / `O-O-O` for castling.
pub fn canonical_notation(position: &Position, mv: Move) -> String {
    let Some(piece) = position.piece_at(mv.origin) else {
        return mv.to_coordinate();
    };
    if let Some(side) = castle_side(piece.kind(), mv.origin, mv.destination) {
        return side.notation().to_string();
    }

    let mut text = String::with_capacity(8);
    if piece.kind() != PieceKind::Pawn {
        text.push(piece.kind().letter());
    }
    text.push_str(&mv.origin.to_algebraic());
    if is_capture(position, mv) {
        text.push('x');
    }
    text.push_str(&mv.destination.to_algebraic());
    if let Some(kind) = mv.promotion {
        text.push('=');
        text.push(kind.letter());
    }
    text
}

/// Short algebraic notation for a legal move, with minimal disambiguation
/// and a `+` or `#` suffix.
///
/// The position must be the one before the move, with current legality.
pub fn move_to_san(position: &Position, mv: Move) -> String {
    let Some(piece) = position.piece_at(mv.origin) else {
        return mv.to_coordinate();
    };

    let mut san = String::with_capacity(8);
    if let Some(side) = castle_side(piece.kind(), mv.origin, mv.destination) {
        san.push_str(side.notation());
    } else {
        if piece.kind() == PieceKind::Pawn {
            if is_capture(position, mv) {
                san.push(mv.origin.file().to_char());
                san.push('x');
            }
        } else {
            san.push(piece.kind().letter());
            san.push_str(&disambiguation(position, mv));
            if is_capture(position, mv) {
                san.push('x');
            }
        }
        san.push_str(&mv.destination.to_algebraic());
        if let Some(kind) = mv.promotion {
            san.push('=');
            san.push(kind.letter());
        }
    }

    let mut next = position.clone();
    if apply_move(&mut next, mv.origin, mv.destination, mv.promotion).is_ok() {
        recompute_legality(&mut next);
        if next.in_check() {
            san.push(if next.all_destinations().is_empty() { '#' } else { '+' });
        }
    }
    san
}

fn disambiguation(position: &Position, mv: Move) -> String {
    let Some(piece) = position.piece_at(mv.origin) else {
        return String::new();
    };
    let rivals: Vec<Square> = position
        .pieces_of(piece.color())
        .filter(|p| p.kind() == piece.kind() && p.id() != piece.id())
        .filter(|p| p.legal_moves().contains(mv.destination))
        .map(|p| p.position())
        .collect();

    if rivals.is_empty() {
        String::new()
    } else if rivals.iter().all(|sq| sq.file() != mv.origin.file()) {
        mv.origin.file().to_char().to_string()
    } else if rivals.iter().all(|sq| sq.rank() != mv.origin.rank()) {
        mv.origin.rank().to_char().to_string()
    } else {
        mv.origin.to_algebraic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn ready(fen: &str) -> Position {
        let mut pos = Position::from_fen(fen).unwrap();
        recompute_legality(&mut pos);
        pos
    }

    #[test]
    fn grammar_accepts() {
        let t = parse_token("Nbd2").unwrap();
        assert_eq!(
            t,
            Token::Piece(PieceToken {
                kind: PieceKind::Knight,
                from_file: Some(File::B),
                from_rank: None,
                destination: sq("d2"),
                promotion: None,
            })
        );
        assert!(
            matches!(parse_token("R1e1"), Ok(Token::Piece(p)) if p.from_rank == Some(Rank::R1))
        );
        assert!(matches!(
            parse_token("exd6"),
            Ok(Token::Piece(p)) if p.from_file == Some(File::E) && p.destination == sq("d6")
        ));
        assert!(matches!(
            parse_token("e8=N+"),
            Ok(Token::Piece(p)) if p.promotion == Some(PieceKind::Knight)
        ));
        assert!(matches!(parse_token("Pe4"), Ok(Token::Piece(p)) if p.kind == PieceKind::Pawn));
        assert_eq!(parse_token("O-O#"), Ok(Token::Castle(CastleSide::Kingside)));
        assert_eq!(parse_token("0-0-0"), Ok(Token::Castle(CastleSide::Queenside)));
    }

    #[test]
    fn grammar_rejects() {
        for bad in [
            "", "xyz", "Zf3", "e9", "Nf", "e8=K", "e8=", "Ng1xxf3", "e4++", "nf3", "O-O-O-O",
        ] {
            assert_eq!(
                parse_token(bad),
                Err(MoveError::ParseError(bad.to_string())),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn pawn_push_and_capture() {
        let pos = ready(chess_core::Fen::STARTPOS);
        let t = translate(&pos, "e4").unwrap();
        assert_eq!((t.origin, t.destination), (sq("e2"), sq("e4")));
        assert_eq!(t.canonical, "e2e4");

        let pos = ready("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let t = translate(&pos, "exd5").unwrap();
        assert_eq!(t.origin, sq("e4"));
        assert_eq!(t.canonical, "e4xd5");
        // A pawn token without a file only means a push.
        assert_eq!(translate(&pos, "d5"), Err(MoveError::InvalidMove("d5".into())));
    }

    #[test]
    fn ambiguity_and_disambiguation() {
        let pos = ready("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1");
        assert_eq!(translate(&pos, "Nd2"), Err(MoveError::AmbiguousMove("Nd2".into())));
        assert_eq!(translate(&pos, "Nbd2").unwrap().origin, sq("b1"));
        assert_eq!(translate(&pos, "N1d2"), Err(MoveError::AmbiguousMove("N1d2".into())));
        assert_eq!(translate(&pos, "Nf1d2").unwrap().canonical, "Nf1d2");
    }

    #[test]
    fn castling_tokens() {
        let pos = ready("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let t = translate(&pos, "O-O").unwrap();
        assert_eq!((t.origin, t.destination), (Square::E1, Square::G1));
        assert_eq!(t.canonical, "O-O");
        assert_eq!(translate(&pos, "0-0-0").unwrap().destination, Square::C1);

        let pos = ready("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert_eq!(translate(&pos, "O-O"), Err(MoveError::InvalidMove("O-O".into())));
    }

    #[test]
    fn promotion_tokens() {
        let pos = ready("8/4P3/8/8/8/8/8/k3K3 w - - 0 1");
        let t = translate(&pos, "e8").unwrap();
        assert_eq!(t.promotion, Some(PieceKind::Queen));
        assert_eq!(t.canonical, "e7e8=Q");
        assert_eq!(translate(&pos, "e8=R").unwrap().promotion, Some(PieceKind::Rook));
        assert_eq!(
            translate(&pos, "Kd1=Q"),
            Err(MoveError::InvalidMove("Kd1=Q".into()))
        );
    }

    #[test]
    fn canonical_reparses_to_same_move() {
        let pos = ready("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        for mv in crate::legality::legal_moves(&pos) {
            let text = canonical_notation(&pos, mv);
            let back = translate(&pos, &text).unwrap();
            assert_eq!(back.to_move(), mv, "{text}");
            assert_eq!(back.canonical, text);
        }
    }

    #[test]
    fn san_generation() {
        let pos = ready(chess_core::Fen::STARTPOS);
        assert_eq!(move_to_san(&pos, Move::normal(sq("g1"), sq("f3"))), "Nf3");
        assert_eq!(move_to_san(&pos, Move::normal(sq("e2"), sq("e4"))), "e4");

        let pos = ready("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1");
        assert_eq!(move_to_san(&pos, Move::normal(sq("b1"), sq("d2"))), "Nbd2");

        let pos = ready("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2");
        assert_eq!(move_to_san(&pos, Move::normal(sq("d8"), sq("h4"))), "Qh4#");

        let pos = ready("4k3/8/8/8/8/8/8/R3K3 w Q - 0 1");
        assert_eq!(move_to_san(&pos, Move::normal(Square::E1, Square::C1)), "O-O-O");
        assert_eq!(move_to_san(&pos, Move::normal(sq("a1"), sq("a8"))), "Ra8+");
    }
}
