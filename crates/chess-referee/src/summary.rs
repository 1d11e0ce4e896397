//! JSON summaries of refereed games.
//!
//! ```json
//! {
//!   "status": "checkmate, Black wins",
//!   "result": "0-1",
//!   "winner": "black",
//!   "fen": "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
//!   "halfmove_clock": 1,
//!   "moves": [{ "ply": 1, "color": "white", "token": "f3", "canonical": "f2f3", "san": "f3" }],
//!   "movetext": "1. f3 e5 2. g4 Qh4#"
//! }
//! ```

use chess_core::Color;
use chess_rules::{transcript, Game, GameMove, ReplayError};
use serde::Serialize;
use std::io::Write;

/// Final state of a game, with the move that stopped a replay if any.
#[derive(Debug, Serialize)]
pub struct GameSummary {
    pub status: String,
    /// `1-0`, `0-1`, `1/2-1/2` or `*`.
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<&'static str>,
    pub fen: String,
    pub halfmove_clock: u32,
    pub moves: Vec<MoveSummary>,
    pub movetext: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<RejectedMove>,
}

#[derive(Debug, Serialize)]
pub struct MoveSummary {
    pub ply: usize,
    pub color: &'static str,
    pub token: String,
    pub canonical: String,
    pub san: String,
}

/// Transcript token that was not applied.
#[derive(Debug, Serialize)]
pub struct RejectedMove {
    /// One-based, as a reader counts moves in the transcript.
    pub number: usize,
    pub token: String,
    pub reason: String,
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

impl MoveSummary {
    fn new(ply: usize, mv: &GameMove) -> Self {
        MoveSummary {
            ply,
            color: color_name(mv.color()),
            token: mv.token.clone(),
            canonical: mv.canonical.clone(),
            san: mv.san.clone(),
        }
    }
}

impl GameSummary {
    pub fn new(game: &Game, rejected: Option<&ReplayError>) -> Self {
        let status = game.status();
        GameSummary {
            status: status.to_string(),
            result: status.result_marker(),
            winner: status.winner().map(color_name),
            fen: game.to_fen(),
            halfmove_clock: game.halfmove_clock(),
            moves: game
                .history()
                .iter()
                .enumerate()
                .map(|(i, mv)| MoveSummary::new(i + 1, mv))
                .collect(),
            movetext: transcript::render(game.history()),
            rejected: rejected.map(|e| RejectedMove {
                number: e.index + 1,
                token: e.token.clone(),
                reason: e.error.to_string(),
            }),
        }
    }

    /// Writes the summary as pretty-printed JSON followed by a newline.
    pub fn write_json<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(&mut out, self)?;
        writeln!(out)
    }
}
