//! Game record files.
//!
//! A record is PGN-style text: tag pair lines, a blank line, then numbered
//! movetext closed by the result marker. Games that start from a custom
//! position carry `SetUp` and `FEN` tags so they replay from the same
//! place.

use chess_rules::{transcript, Game};
use std::io::Write;
use std::path::Path;

const LINE_WIDTH: usize = 80;

/// A record read back from text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    /// Value of the `FEN` tag, if present.
    pub fen: Option<String>,
    /// Move tokens in play order.
    pub tokens: Vec<String>,
}

impl Record {
    /// Splits record text into its starting position and move tokens.
    pub fn parse(text: &str) -> Self {
        Record {
            fen: tag_value(text, "FEN"),
            tokens: transcript::tokenize(text),
        }
    }

    /// Reads and parses the record at `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Ok(Self::parse(&std::fs::read_to_string(path)?))
    }
}

/// Value of the first `[name "value"]` tag pair.
fn tag_value(text: &str, name: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let inner = line.trim().strip_prefix('[')?.strip_suffix(']')?;
        let (tag, value) = inner.split_once(char::is_whitespace)?;
        if tag != name {
            return None;
        }
        let value = value.trim().strip_prefix('"')?.strip_suffix('"')?;
        Some(value.to_string())
    })
}

/// Writes `game` as a record. `start_fen` is the position the game began
/// from, when that was not the standard one.
pub fn write_record<W: Write>(
    mut out: W,
    game: &Game,
    start_fen: Option<&str>,
) -> std::io::Result<()> {
    let result = game.status().result_marker();

    writeln!(out, "[Event \"Refereed game\"]")?;
    writeln!(out, "[Site \"local\"]")?;
    writeln!(out, "[Result \"{}\"]", result)?;
    if let Some(fen) = start_fen {
        writeln!(out, "[SetUp \"1\"]")?;
        writeln!(out, "[FEN \"{}\"]", fen)?;
    }
    writeln!(out)?;

    let movetext = transcript::render(game.history());
    let mut line = String::new();
    for word in movetext.split_whitespace().chain([result]) {
        if !line.is_empty() && line.len() + 1 + word.len() > LINE_WIDTH {
            writeln!(out, "{}", line)?;
            line.clear();
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    writeln!(out, "{}", line)?;

    Ok(())
}

/// Writes the record of `game` to a file at `path`.
pub fn save_record<P: AsRef<Path>>(
    path: P,
    game: &Game,
    start_fen: Option<&str>,
) -> std::io::Result<()> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_record(&mut out, game, start_fen)?;
    out.flush()
}
