//! Configuration file loading for the referee.
//!
//! Settings live in an optional `referee.toml`, looked up in the current
//! directory and then in each parent. Every field has a default, so an
//! empty or missing file yields [`RefereeConfig::default`].

use chess_rules::BoardStyle;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "referee.toml";

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or has fields of the wrong type.
    #[error("failed to parse config file {}: {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Piece glyphs for board diagrams, as written in the config file.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoardStyleSetting {
    #[default]
    Unicode,
    Ascii,
}

impl From<BoardStyleSetting> for BoardStyle {
    fn from(setting: BoardStyleSetting) -> Self {
        match setting {
            BoardStyleSetting::Unicode => BoardStyle::Unicode,
            BoardStyleSetting::Ascii => BoardStyle::Ascii,
        }
    }
}

/// Referee settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RefereeConfig {
    /// Glyphs used when printing the board. Defaults to `unicode`.
    #[serde(default)]
    pub board_style: BoardStyleSetting,
    /// Seconds a player has for each move in `play`. No limit when absent.
    #[serde(default)]
    pub move_timeout_secs: Option<u64>,
    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            board_style: BoardStyleSetting::default(),
            move_timeout_secs: None,
            log_filter: default_log_filter(),
        }
    }
}

impl RefereeConfig {
    /// Loads `referee.toml` from the current directory or the nearest
    /// parent that has one. Returns the defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if a file is found but cannot be
    /// read, or [`ConfigError::ParseError`] if it is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::ReadError {
            path: PathBuf::from("."),
            source,
        })?;
        match Self::find(&cwd) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Searches `start` and its ancestors for the config file.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE))
            .find(|candidate| candidate.is_file())
    }

    /// Loads the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Per-move time limit, if one is configured.
    pub fn move_timeout(&self) -> Option<Duration> {
        self.move_timeout_secs.map(Duration::from_secs)
    }

    pub fn board_style(&self) -> BoardStyle {
        self.board_style.into()
    }
}
