//! Recorded games.
//!
//! A transcript is PGN-style movetext such as
//! `1. e4 e5 2. Nf3 {main line} Nc6 3. Bb5 a6 1-0`. [`tokenize`] reduces it
//! to move tokens, [`replay_transcript`] plays them, and [`render`] writes a
//! game history back out.

use crate::error::ReplayError;
use crate::game::{Game, GameMove};
use chess_core::Color;
use std::fmt::Write;

const RESULT_MARKERS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Splits movetext into move tokens.
///
/// Drops tag pair lines (`[Event "..."]`), brace and semicolon comments,
/// move numbers (`12.` and `12...`, also when glued to the move), numeric
/// annotation glyphs (`$1`), `!`/`?` suffixes and result markers.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();

    for line in strip_brace_comments(text).lines() {
        let line = line.trim_start();
        if line.starts_with('[') {
            continue;
        }
        let line = line.split(';').next().unwrap_or_default();

        for word in line.split_whitespace() {
            if RESULT_MARKERS.contains(&word) || word.starts_with('$') {
                continue;
            }
            let word = strip_move_number(word).trim_end_matches(['!', '?']);
            if !word.is_empty() {
                tokens.push(word.to_string());
            }
        }
    }

    tokens
}

fn strip_brace_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                out.push(' ');
            }
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// "12.", "12...", "12.e4" lose their number; "0-0" keeps its zeros.
fn strip_move_number(word: &str) -> &str {
    let digits = word.len() - word.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    let rest = &word[digits..];
    if digits > 0 && rest.starts_with('.') {
        rest.trim_start_matches('.')
    } else {
        word
    }
}

/// Numbered movetext of a game history, using short algebraic notation.
/// A history that starts with Black opens with `n...`.
pub fn render(history: &[GameMove]) -> String {
    let mut out = String::new();
    for (i, mv) in history.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        match mv.color() {
            Color::White => {
                let _ = write!(out, "{}. ", mv.fullmove);
            }
            Color::Black if i == 0 => {
                let _ = write!(out, "{}... ", mv.fullmove);
            }
            Color::Black => {}
        }
        out.push_str(&mv.san);
    }
    out
}

/// Plays `tokens` in order on `game`, stopping at the first rejected one.
pub fn replay_transcript<I>(mut game: Game, tokens: I) -> Result<Game, ReplayError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for (index, token) in tokens.into_iter().enumerate() {
        let token = token.as_ref();
        game.submit_move(token).map_err(|error| ReplayError {
            index,
            token: token.to_string(),
            error,
        })?;
    }
    Ok(game)
}
