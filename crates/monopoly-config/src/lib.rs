#![deny(warnings)]

//! Loaders for the board, card and rules files of a game.
//!
//! Board and card files are small line-oriented text formats; the optional
//! rules file is YAML. Every error names the file and, where it applies, the
//! offending line.

use monopoly_core::{Board, Deck, GameRules, RulesError};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

mod board;
mod cards;

pub use board::parse_board;
pub use cards::parse_cards;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{file}: cannot read: {message}")]
    Io { file: String, message: String },
    #[error("{file}:{line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },
    #[error("{file}: {message}")]
    Invalid { file: String, message: String },
    #[error("{file}: {source}")]
    Rules {
        file: String,
        #[source]
        source: RulesError,
    },
}

impl ConfigError {
    pub(crate) fn syntax(file: &str, line: usize, message: impl Into<String>) -> Self {
        ConfigError::Syntax {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn invalid(file: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            file: file.to_string(),
            message: message.into(),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| ConfigError::Io {
        file: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Both card decks.
#[derive(Clone, Debug)]
pub struct Decks {
    pub chance: Deck,
    pub community: Deck,
}

/// Everything a game needs before players join.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: Board,
    pub decks: Decks,
    pub rules: GameRules,
}

impl GameConfig {
    /// Loads the board and card files and, when given, the rules file.
    pub fn load(board: &Path, cards: &Path, rules: Option<&Path>) -> Result<Self, ConfigError> {
        let board_text = read(board)?;
        let board = parse_board(&board.display().to_string(), &board_text)?;
        let cards_text = read(cards)?;
        let decks = parse_cards(&cards.display().to_string(), &cards_text)?;
        let rules = match rules {
            Some(path) => load_rules(path)?,
            None => GameRules::default(),
        };
        info!(
            cells = board.len(),
            chance = decks.chance.len(),
            community = decks.community.len(),
            "configuration loaded"
        );
        Ok(Self {
            board,
            decks,
            rules,
        })
    }
}

/// Parses a YAML rules document. Missing fields keep their defaults.
pub fn parse_rules(file: &str, text: &str) -> Result<GameRules, ConfigError> {
    let rules: GameRules = if text.trim().is_empty() {
        GameRules::default()
    } else {
        serde_yaml::from_str(text).map_err(|e| ConfigError::invalid(file, e.to_string()))?
    };
    rules.validate().map_err(|source| ConfigError::Rules {
        file: file.to_string(),
        source,
    })?;
    Ok(rules)
}

pub fn load_rules(path: &Path) -> Result<GameRules, ConfigError> {
    parse_rules(&path.display().to_string(), &read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_override_defaults() {
        let rules = parse_rules("rules.yaml", "rng_seed: 9\nmax_players: 4\n").unwrap();
        assert_eq!(rules.rng_seed, 9);
        assert_eq!(rules.max_players, 4);
        assert_eq!(rules.first_solar_price, 600_000);
        assert_eq!(parse_rules("empty.yaml", "  \n").unwrap(), GameRules::default());
    }

    #[test]
    fn invalid_rules_are_rejected() {
        let err = parse_rules("rules.yaml", "min_players: 1\n").unwrap_err();
        assert!(err.to_string().starts_with("rules.yaml:"));
        assert!(matches!(
            err,
            ConfigError::Rules { source: RulesError::MinPlayers(1), .. }
        ));
        let err = parse_rules("rules.yaml", "inflation_pct: -1\n").unwrap_err();
        let source = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(
            source.as_deref(),
            Some("inflation_pct must not be negative, got -1")
        );
        assert!(parse_rules("rules.yaml", "first_solar_price: [1]\n").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GameConfig::load(
            Path::new("/nonexistent/board.txt"),
            Path::new("/nonexistent/cards.txt"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { ref file, .. } if file.ends_with("board.txt")));
    }

    #[test]
    fn shipped_assets_load() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let config = GameConfig::load(&root.join("board.txt"), &root.join("cards.txt"), None).unwrap();
        assert_eq!(config.board.len(), 40);
        assert_eq!(config.decks.chance.len(), 6);
        assert_eq!(config.decks.community.len(), 6);
    }
}
