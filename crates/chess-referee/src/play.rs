//! Interactive games on the terminal.
//!
//! [`PlaySession`] alternates between the two sides, reading one move per
//! line. Lines arrive over a channel so a per-move time limit can be
//! enforced with [`Receiver::recv_timeout`] while the reader thread blocks
//! on input.

use chess_rules::{move_to_san, turn_caption, BoardStyle, Game, Status};
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Line that resigns for the side to move.
pub const RESIGN: &str = "resign";
/// Line that lists the legal moves.
pub const LIST_MOVES: &str = "moves";

/// Forwards every line of `reader` to the returned channel. The channel
/// disconnects at end of input.
pub fn spawn_line_reader<R>(reader: R) -> Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Drives one game between two people sharing a terminal.
///
/// # Example
///
/// ```ignore
/// let input = spawn_line_reader(std::io::stdin().lock());
/// let mut session = PlaySession::new(Game::new(), BoardStyle::Unicode, None);
/// let status = session.play(&input, std::io::stdout())?;
/// ```
pub struct PlaySession {
    game: Game,
    style: BoardStyle,
    move_timeout: Option<Duration>,
}

/// What the next line of input turned out to be.
enum Input {
    Line(String),
    TimedOut,
    Closed,
}

impl PlaySession {
    pub fn new(game: Game, style: BoardStyle, move_timeout: Option<Duration>) -> Self {
        Self {
            game,
            style,
            move_timeout,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn into_game(self) -> Game {
        self.game
    }

    /// Plays until the game ends or input closes, writing prompts and
    /// replies to `out`. Returns the final status; an unfinished game
    /// reports [`Status::InProgress`].
    pub fn play<W: Write>(&mut self, input: &Receiver<String>, mut out: W) -> io::Result<Status> {
        while !self.game.is_over() {
            self.prompt(&mut out)?;

            let line = match self.next_input(input) {
                Input::Line(line) => line,
                Input::Closed => {
                    debug!("input closed");
                    break;
                }
                Input::TimedOut => {
                    let loser = self.game.turn();
                    if let Err(e) = self.game.time_out(loser) {
                        writeln!(out, "{}", e)?;
                    }
                    writeln!(out)?;
                    break;
                }
            };

            self.handle_line(line.trim(), &mut out)?;
        }

        self.finish(&mut out)?;
        Ok(self.game.status())
    }

    fn prompt<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        write!(out, "{}", self.game.render_board_with(self.style))?;
        let check = if self.game.in_check() { " (check)" } else { "" };
        writeln!(out, "{}{}", turn_caption(self.game.turn()), check)?;
        write!(out, "> ")?;
        out.flush()
    }

    fn next_input(&self, input: &Receiver<String>) -> Input {
        match self.move_timeout {
            Some(limit) => match input.recv_timeout(limit) {
                Ok(line) => Input::Line(line),
                Err(RecvTimeoutError::Timeout) => Input::TimedOut,
                Err(RecvTimeoutError::Disconnected) => Input::Closed,
            },
            None => input.recv().map_or(Input::Closed, Input::Line),
        }
    }

    fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<()> {
        match line {
            "" => Ok(()),
            RESIGN => {
                let color = self.game.turn();
                match self.game.resign(color) {
                    Ok(status) => info!(%status, "resignation"),
                    Err(e) => writeln!(out, "{}", e)?,
                }
                Ok(())
            }
            LIST_MOVES => {
                let position = self.game.position();
                let moves: Vec<String> = self
                    .game
                    .legal_moves()
                    .into_iter()
                    .map(|mv| move_to_san(position, mv))
                    .collect();
                writeln!(out, "{}", moves.join(" "))
            }
            token => match self.game.submit_move(token) {
                Ok(applied) => writeln!(out, "{} plays {}", applied.outcome.color, applied.san),
                Err(e) => writeln!(out, "{}", e),
            },
        }
    }

    fn finish<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let status = self.game.status();
        writeln!(out)?;
        write!(out, "{}", self.game.render_board_with(self.style))?;
        if status.is_terminal() {
            writeln!(out, "Game over: {} ({})", status, status.result_marker())?;
        } else {
            writeln!(out, "Game adjourned")?;
        }
        let movetext = chess_rules::transcript::render(self.game.history());
        if !movetext.is_empty() {
            writeln!(out, "{}", movetext)?;
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Color;
    use std::sync::mpsc::Sender;

    fn feed(lines: &[&str]) -> (Sender<String>, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        for line in lines {
            tx.send(line.to_string()).unwrap();
        }
        (tx, rx)
    }

    fn run(session: &mut PlaySession, lines: &[&str]) -> (Status, String) {
        let (tx, rx) = feed(lines);
        drop(tx);
        let mut out = Vec::new();
        let status = session.play(&rx, &mut out).unwrap();
        (status, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_play_to_checkmate() {
        let mut session = PlaySession::new(Game::new(), BoardStyle::Ascii, None);
        let (status, out) = run(&mut session, &["f3", "e5", "g4", "Qh4#", "a3"]);

        assert_eq!(
            status,
            Status::Checkmate {
                winner: Color::Black
            }
        );
        assert!(out.contains("White to move"));
        assert!(out.contains("Black plays Qh4#"));
        assert!(out.contains("Game over: checkmate, Black wins (0-1)"));
        assert!(out.contains("1. f3 e5 2. g4 Qh4#"));
        assert_eq!(session.game().history().len(), 4);
    }

    #[test]
    fn test_errors_reprompt_without_changing_the_game() {
        let mut session = PlaySession::new(Game::new(), BoardStyle::Ascii, None);
        let (status, out) = run(&mut session, &["", "Ke2", "zz9", "  e4  "]);

        assert_eq!(status, Status::InProgress);
        assert!(out.contains("illegal move 'Ke2'"));
        assert!(out.contains("cannot parse move 'zz9'"));
        assert!(out.contains("White plays e4"));
        assert!(out.contains("Game adjourned"));
        assert_eq!(session.game().history().len(), 1);
        assert_eq!(session.game().turn(), Color::Black);
    }

    #[test]
    fn test_resign() {
        let mut session = PlaySession::new(Game::new(), BoardStyle::Unicode, None);
        let (status, out) = run(&mut session, &["e4", RESIGN]);

        assert_eq!(
            status,
            Status::Resigned {
                loser: Color::Black
            }
        );
        assert!(out.contains("Game over: Black resigned (1-0)"));
    }

    #[test]
    fn test_list_moves() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let mut session = PlaySession::new(game, BoardStyle::Ascii, None);
        let (_, out) = run(&mut session, &[LIST_MOVES]);

        assert!(out.contains("O-O"));
        assert!(out.contains("Rh8+"));
        assert!(out.contains("Kd1"));
    }

    #[test]
    fn test_check_is_announced() {
        let mut session = PlaySession::new(Game::new(), BoardStyle::Ascii, None);
        let (_, out) = run(&mut session, &["e4", "f5", "Qh5"]);
        assert!(out.contains("Black to move (check)"));
    }

    #[test]
    fn test_move_timeout() {
        let mut session =
            PlaySession::new(Game::new(), BoardStyle::Ascii, Some(Duration::from_millis(20)));
        // Keep the sender alive so the channel times out instead of closing.
        let (_tx, rx) = feed(&["d4"]);
        let mut out = Vec::new();
        let status = session.play(&rx, &mut out).unwrap();

        assert_eq!(
            status,
            Status::TimedOut {
                loser: Color::Black
            }
        );
        assert_eq!(status.result_marker(), "1-0");
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Black ran out of time"));
    }

    #[test]
    fn test_line_reader_forwards_lines() {
        let rx = spawn_line_reader(io::Cursor::new("e4\ne5\n"));
        let lines: Vec<String> = rx.iter().collect();
        assert_eq!(lines, vec!["e4", "e5"]);
    }

    #[test]
    fn test_finished_game_is_not_played() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut session = PlaySession::new(game, BoardStyle::Ascii, None);
        let (status, out) = run(&mut session, &["Kg8"]);

        assert_eq!(status, Status::Stalemate);
        assert!(!out.contains("> "));
        assert!(session.into_game().history().is_empty());
    }
}
