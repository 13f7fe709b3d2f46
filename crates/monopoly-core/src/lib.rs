#![deny(warnings)]

//! Core domain models and state machines for the board game simulation.
//!
//! This crate holds the serializable data shared by every other crate (board,
//! properties, players, cards) together with the pure avatar movement state
//! machine. It never moves money itself; that is the job of `monopoly-econ`.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod avatar;
pub mod board;
pub mod card;
pub mod dice;
pub mod error;
pub mod movement;
pub mod player;
pub mod property;

pub use avatar::{Archetype, Avatar, PendingHop, Step};
pub use board::{Board, Cell, CellKind, Group};
pub use card::{Card, CardEffect, Deck, DeckKind};
pub use dice::Dice;
pub use error::{CommandError, FatalError, FundsError, GameError, GameResult, RulesError};
pub use movement::MovementStrategy;
pub use player::{Player, PlayerStats};
pub use property::{Building, BuildingKind, Property, PropertyKind};

/// Whole currency units. Every amount in the game is integral.
pub type Money = i64;

/// Stable identifier of a player for the whole game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Holder of a property or receiver of a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Bank,
    Player(PlayerId),
}

impl Owner {
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Owner::Bank => None,
            Owner::Player(id) => Some(*id),
        }
    }
}

/// Tunable rules of a game. Every field has a default so a partial rules
/// file is enough.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    /// Price of every solar in the first solar group.
    pub first_solar_price: Money,
    pub min_players: usize,
    pub max_players: usize,
    /// Seed of the deterministic random source.
    pub rng_seed: u64,
    /// Laps every player must complete between two inflation events.
    pub inflation_laps: u32,
    /// Percentage added to unsold solar prices on each inflation event.
    pub inflation_pct: i64,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            first_solar_price: 600_000,
            min_players: 2,
            max_players: 6,
            rng_seed: 42,
            inflation_laps: 4,
            inflation_pct: 5,
        }
    }
}

impl GameRules {
    /// Validates the rules before a game is built from them.
    pub fn validate(&self) -> Result<(), RulesError> {
        if self.first_solar_price <= 0 {
            return Err(RulesError::FirstSolarPrice(self.first_solar_price));
        }
        if self.min_players < 2 {
            return Err(RulesError::MinPlayers(self.min_players));
        }
        if self.max_players < self.min_players {
            return Err(RulesError::MaxPlayers {
                min: self.min_players,
                max: self.max_players,
            });
        }
        if self.inflation_laps == 0 {
            return Err(RulesError::InflationLaps);
        }
        if self.inflation_pct < 0 {
            return Err(RulesError::InflationPct(self.inflation_pct));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_valid() {
        let rules = GameRules::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.first_solar_price, 600_000);
    }

    #[test]
    fn rules_reject_inverted_player_bounds() {
        let rules = GameRules {
            min_players: 4,
            max_players: 3,
            ..GameRules::default()
        };
        assert_eq!(
            rules.validate(),
            Err(RulesError::MaxPlayers { min: 4, max: 3 })
        );
    }

    #[test]
    fn rules_name_the_rejected_field() {
        let cases = [
            (
                GameRules { first_solar_price: 0, ..GameRules::default() },
                RulesError::FirstSolarPrice(0),
            ),
            (
                GameRules { min_players: 1, ..GameRules::default() },
                RulesError::MinPlayers(1),
            ),
            (
                GameRules { inflation_laps: 0, ..GameRules::default() },
                RulesError::InflationLaps,
            ),
            (
                GameRules { inflation_pct: -5, ..GameRules::default() },
                RulesError::InflationPct(-5),
            ),
        ];
        for (rules, expected) in cases {
            assert_eq!(rules.validate(), Err(expected));
        }
    }

    #[test]
    fn partial_rules_fill_defaults() {
        let rules: GameRules = serde_json::from_str(r#"{"rng_seed": 7}"#).unwrap();
        assert_eq!(rules.rng_seed, 7);
        assert_eq!(rules.max_players, 6);
    }

    #[test]
    fn owner_exposes_player() {
        assert_eq!(Owner::Bank.player(), None);
        assert_eq!(Owner::Player(PlayerId(2)).player(), Some(PlayerId(2)));
    }
}
