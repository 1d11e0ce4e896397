//! Replaying recorded games.

use crate::record::Record;
use chess_core::FenError;
use chess_rules::{replay_transcript, Game, ReplayError};
use tracing::{debug, warn};

/// Outcome of replaying a record.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    /// The game after every accepted move.
    pub game: Game,
    /// The first token that was rejected; later tokens were not tried.
    pub rejected: Option<ReplayError>,
}

impl ReplayReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_none()
    }
}

/// New game from `fen`, or from the standard position.
pub fn starting_game(fen: Option<&str>) -> Result<Game, FenError> {
    match fen {
        Some(fen) => Game::from_fen(fen),
        None => Ok(Game::new()),
    }
}

/// Replays `record` from `fen` if given, else from the record's own `FEN`
/// tag, else from the standard position.
pub fn replay_record(record: &Record, fen: Option<&str>) -> Result<ReplayReport, FenError> {
    let start = starting_game(fen.or(record.fen.as_deref()))?;
    debug!(tokens = record.tokens.len(), fen = %start.to_fen(), "replaying record");

    match replay_transcript(start.clone(), &record.tokens) {
        Ok(game) => Ok(ReplayReport {
            game,
            rejected: None,
        }),
        Err(rejected) => {
            warn!(%rejected, "replay stopped");
            // Every token before the rejected one was accepted.
            let game = replay_transcript(start.clone(), &record.tokens[..rejected.index])
                .unwrap_or(start);
            Ok(ReplayReport {
                game,
                rejected: Some(rejected),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{MoveError, Status};

    #[test]
    fn test_complete_replay() {
        let record = Record::parse("1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6?? 4. Qxf7# 1-0");
        let report = replay_record(&record, None).unwrap();

        assert!(report.is_complete());
        assert_eq!(
            report.game.status(),
            Status::Checkmate {
                winner: chess_core::Color::White
            }
        );
    }

    #[test]
    fn test_rejected_token_keeps_earlier_moves() {
        let record = Record::parse("1. d4 d5 2. d5");
        let report = replay_record(&record, None).unwrap();

        let rejected = report.rejected.unwrap();
        assert_eq!(rejected.index, 2);
        assert_eq!(rejected.error, MoveError::InvalidMove("d5".into()));
        assert_eq!(report.game.history().len(), 2);
        assert_eq!(report.game.turn(), chess_core::Color::White);
    }

    #[test]
    fn test_moves_after_game_end_are_rejected() {
        let record = Record::parse("1. f3 e5 2. g4 Qh4 3. a3");
        let report = replay_record(&record, None).unwrap();

        let rejected = report.rejected.unwrap();
        assert_eq!(rejected.index, 4);
        assert!(matches!(rejected.error, MoveError::GameOver(_)));
        assert!(report.game.is_over());
    }

    #[test]
    fn test_fen_tag_and_override() {
        let text = "[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 1\"]\n\n1... Kd7 2. e4 *";
        let record = Record::parse(text);

        let report = replay_record(&record, None).unwrap();
        assert!(report.is_complete());

        // From the standard position Black cannot open.
        let report = replay_record(&record, Some(chess_core::Fen::STARTPOS)).unwrap();
        assert_eq!(report.rejected.map(|r| r.index), Some(0));
    }

    #[test]
    fn test_bad_fen_is_an_error() {
        let record = Record::default();
        assert!(replay_record(&record, Some("not a fen")).is_err());
    }
}
