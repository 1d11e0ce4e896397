//! Rule scenarios played through the public `Game` API.

use chess_core::{Color, PieceKind, Square};
use chess_rules::{transcript, Game, MoveError, ReplayError, SquareSet, Status};

fn sq(s: &str) -> Square {
    Square::from_algebraic(s).unwrap()
}

fn squares(list: &[&str]) -> SquareSet {
    list.iter().map(|s| sq(s)).collect()
}

fn play(game: &mut Game, tokens: &[&str]) {
    for token in tokens {
        game.submit_move(token)
            .unwrap_or_else(|e| panic!("{token} rejected: {e}"));
    }
}

fn destination_count(game: &Game, color: Color) -> usize {
    game.pieces()
        .filter(|p| p.color() == color)
        .map(|p| game.legal_destinations(p.position()).len())
        .sum()
}

#[test]
fn start_position_has_twenty_moves() {
    let game = Game::new();
    assert_eq!(destination_count(&game, Color::White), 20);
    assert_eq!(game.pieces().count(), 32);
    assert_eq!(game.status(), Status::InProgress);
}

#[test]
fn reply_after_king_pawn_opening() {
    let mut game = Game::new();
    play(&mut game, &["e4"]);
    assert!(game.legal_destinations(sq("e7")).contains(sq("e5")));
    play(&mut game, &["e5"]);
    assert_eq!(game.turn(), Color::White);
}

#[test]
fn king_avoids_attacked_squares() {
    let mut game = Game::new();
    play(&mut game, &["e4", "e5", "Qh5"]);
    let king = game.legal_destinations(sq("e8"));
    assert!((king & game.attacked_squares()).is_empty());
    assert!(game.attacked_squares().contains(sq("f7")));
    assert_eq!(king, squares(&["e7"]));
}

#[test]
fn pinned_rook_moves_only_along_pin() {
    let mut game = Game::from_fen("4k3/4r3/8/8/8/8/8/4R1K1 b - - 0 1").unwrap();
    let rook = game.piece_at(sq("e7")).unwrap();
    assert!(rook.is_pinned());
    assert!(rook.legal_moves().is_subset(rook.pin_line()));
    assert_eq!(game.legal_destinations(sq("e7")).len(), 6);

    assert_eq!(game.submit_move("Ra7"), Err(MoveError::InvalidMove("Ra7".into())));
    game.submit_move("Rxe1+").unwrap();
}

#[test]
fn double_check_allows_only_king_moves() {
    let game = Game::from_fen("1n2k3/pp4pp/8/7B/Q7/8/8/3K4 b - - 0 1").unwrap();
    for piece in game.pieces().filter(|p| p.color() == Color::Black) {
        if piece.kind() != PieceKind::King {
            assert!(game.legal_destinations(piece.position()).is_empty());
        }
    }
    assert_eq!(game.legal_destinations(sq("e8")), squares(&["d8", "e7", "f8"]));
    assert!(game.in_check());
}

#[test]
fn fools_mate() {
    let mut game = Game::new();
    play(&mut game, &["f3", "e5", "g4", "Qh4#"]);
    assert_eq!(
        game.status(),
        Status::Checkmate {
            winner: Color::Black
        }
    );
    assert_eq!(destination_count(&game, Color::White), 0);
    let king = game.piece_at(Square::E1).unwrap();
    assert_eq!(king.checkers(), squares(&["h4"]));
    assert_eq!(game.submit_move("a3"), Err(MoveError::GameOver(game.status())));
}

#[test]
fn scholars_mate_san() {
    let mut game = Game::new();
    play(&mut game, &["e4", "e5", "Bc4", "Nc6", "Qh5", "Nf6", "Qxf7"]);
    assert_eq!(game.history().last().unwrap().san, "Qxf7#");
    assert_eq!(
        transcript::render(game.history()),
        "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#"
    );
    assert_eq!(game.status().winner(), Some(Color::White));
}

#[test]
fn threefold_repetition_on_third_occurrence() {
    let mut game = Game::new();
    let shuffle = ["Nf3", "Nf6", "Ng1", "Ng8"];
    play(&mut game, &shuffle);
    assert_eq!(game.status(), Status::InProgress);
    assert_eq!(game.evaluation().repetitions, 2);
    play(&mut game, &shuffle[..3]);
    assert_eq!(game.status(), Status::InProgress);
    play(&mut game, &shuffle[3..]);
    assert_eq!(game.status(), Status::DrawRepetition);
    assert_eq!(game.evaluation().repetitions, 3);
}

#[test]
fn stalemate() {
    let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(game.status(), Status::Stalemate);
    assert!(!game.in_check());
}

#[test]
fn stalemate_by_move() {
    let mut game = Game::from_fen("7k/8/6K1/8/8/8/5Q2/8 w - - 0 1").unwrap();
    let applied = game.submit_move("Qf7").unwrap();
    assert_eq!(applied.status, Status::Stalemate);
}

#[test]
fn fifty_move_rule() {
    let mut game = Game::from_fen("8/8/8/8/8/8/8/R3K2k w - - 99 1").unwrap();
    assert_eq!(game.status(), Status::InProgress);
    play(&mut game, &["Ra2"]);
    assert_eq!(game.halfmove_clock(), 100);
    assert_eq!(game.status(), Status::DrawFiftyMove);
}

#[test]
fn capture_resets_the_clock() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/p7/R3K3 w - - 98 1").unwrap();
    play(&mut game, &["Rxa2"]);
    assert_eq!(game.halfmove_clock(), 0);
    assert_eq!(game.status(), Status::InProgress);
}

#[test]
fn insufficient_material() {
    let game = Game::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1").unwrap();
    assert_eq!(game.status(), Status::DrawInsufficientMaterial);

    let mut game = Game::from_fen("4k3/8/8/8/8/2n5/8/1R2K3 b - - 0 1").unwrap();
    assert_eq!(game.status(), Status::InProgress);
    play(&mut game, &["Nxb1"]);
    assert_eq!(game.status(), Status::DrawInsufficientMaterial);
    assert!(game.evaluation().insufficient_material);
}

#[test]
fn ambiguous_knights() {
    let mut game = Game::from_fen("8/8/8/8/8/8/8/1N1K1N1k w - - 0 1").unwrap();
    assert_eq!(game.submit_move("Nd2"), Err(MoveError::AmbiguousMove("Nd2".into())));
    let applied = game.submit_move("Nbd2").unwrap();
    assert_eq!(applied.canonical, "Nb1d2");
    assert_eq!(applied.san, "Nbd2");
}

#[test]
fn en_passant_only_on_next_ply() {
    let mut game = Game::new();
    play(&mut game, &["e4", "a6", "e5", "d5"]);
    assert!(game.legal_destinations(sq("e5")).contains(sq("d6")));
    let applied = game.submit_move("exd6").unwrap();
    assert!(applied.outcome.en_passant);
    assert!(game.piece_at(sq("d5")).is_none());

    let mut game = Game::new();
    play(&mut game, &["e4", "a6", "e5", "d5", "a3", "h6"]);
    assert!(!game.legal_destinations(sq("e5")).contains(sq("d6")));
    assert_eq!(game.submit_move("exd6"), Err(MoveError::InvalidMove("exd6".into())));
}

#[test]
fn pieces_beside_a_double_stepped_pawn_do_not_capture_it() {
    let mut game = Game::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
    play(&mut game, &["g4"]);
    let applied = game.submit_move("Kg3").unwrap();
    assert_eq!(applied.san, "Kg3");
    assert!(!applied.outcome.is_capture());
    assert_eq!(game.to_fen(), "8/2p5/3p4/KP5r/1R3pP1/6k1/4P3/8 w - - 1 2");
    assert!(game.legal_destinations(sq("g4")).contains(sq("g5")));

    let mut game = Game::from_fen("4k3/8/8/8/3b4/8/4P3/7K w - - 0 1").unwrap();
    play(&mut game, &["e4"]);
    let applied = game.submit_move("Be3").unwrap();
    assert_eq!(applied.canonical, "Bd4e3");
    assert_eq!(applied.san, "Be3");
    assert_eq!(game.piece_at(sq("e4")).unwrap().kind(), PieceKind::Pawn);

    let mut game = Game::from_fen("4k3/8/8/8/3q4/8/4P3/7K w - - 0 1").unwrap();
    play(&mut game, &["e4"]);
    let applied = game.submit_move("Qe3").unwrap();
    assert_eq!(applied.san, "Qe3");
    assert_eq!(applied.outcome.captured, None);
    assert!(game.piece_at(sq("e4")).is_some());
}

#[test]
fn castling_rules() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, &["O-O", "O-O-O"]);
    assert_eq!(game.to_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");

    // Passing through an attacked square.
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1").unwrap();
    assert_eq!(game.submit_move("O-O"), Err(MoveError::InvalidMove("O-O".into())));
    game.submit_move("O-O-O").unwrap();

    // The king has moved.
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, &["Kd1", "Kd8", "Ke1", "Ke8"]);
    assert_eq!(game.submit_move("O-O"), Err(MoveError::InvalidMove("O-O".into())));
}

#[test]
fn promotion_choices() {
    let mut game = Game::from_fen("8/4P3/8/8/8/8/8/k3K3 w - - 0 1").unwrap();
    let applied = game.submit_move("e8=N").unwrap();
    assert_eq!(applied.mov.promotion, Some(PieceKind::Knight));
    assert_eq!(game.piece_at(sq("e8")).unwrap().kind(), PieceKind::Knight);

    let mut game = Game::from_fen("8/4P3/8/8/8/8/8/k3K3 w - - 0 1").unwrap();
    let applied = game.apply_move(sq("e7"), sq("e8"), None).unwrap();
    assert_eq!(applied.canonical, "e7e8=Q");
    assert_eq!(applied.san, "e8=Q");
}

#[test]
fn parse_errors() {
    let mut game = Game::new();
    for token in ["", "xyz", "Zf3", "e4=Q=Q", "Nf3!?"] {
        assert_eq!(
            game.submit_move(token),
            Err(MoveError::ParseError(token.to_string())),
            "{token:?}"
        );
    }
    assert_eq!(game.history().len(), 0);
}

#[test]
fn parse_does_not_apply() {
    let game = Game::new();
    let translation = game.parse("Nc3").unwrap();
    assert_eq!(translation.origin, sq("b1"));
    assert_eq!(translation.canonical, "Nb1c3");
    assert_eq!(game.history().len(), 0);
}

#[test]
fn replay_reports_failing_index() {
    let tokens = transcript::tokenize("1. e4 e5 2. Nf3 Nc6 3. Bb5 Nf3");
    let err = chess_rules::replay_transcript(Game::new(), &tokens).unwrap_err();
    assert_eq!(
        err,
        ReplayError {
            index: 5,
            token: "Nf3".into(),
            error: MoveError::InvalidMove("Nf3".into()),
        }
    );
}

#[test]
fn timeout_ends_game() {
    let mut game = Game::new();
    play(&mut game, &["d4"]);
    assert_eq!(
        game.time_out(Color::Black),
        Ok(Status::TimedOut {
            loser: Color::Black
        })
    );
    assert_eq!(game.status().result_marker(), "1-0");
    assert!(matches!(game.resign(Color::White), Err(MoveError::GameOver(_))));
}

#[test]
fn fen_roundtrip_through_game() {
    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let game = Game::from_fen(fen).unwrap();
    assert_eq!(game.to_fen(), fen);
    assert!(Game::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
}
