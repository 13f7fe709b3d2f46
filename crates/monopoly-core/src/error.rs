//! Error taxonomy shared by every crate of the simulation.
//!
//! Commands and fortune errors are ordinary values: the caller reports them and
//! play continues with the state exactly as it was. Fatal errors mean the game
//! can no longer be trusted and the process should abort.

use crate::Money;
use thiserror::Error;

/// Invalid usage of a game operation (kind a).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("the game has not started")]
    NotStarted,
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("not enough players to start (minimum {0})")]
    NotEnoughPlayers(usize),
    #[error("the maximum number of players is {0}")]
    TooManyPlayers(usize),
    #[error("a player named {0} already exists")]
    DuplicatePlayer(String),
    #[error("invalid player name: {0:?}")]
    InvalidName(String),
    #[error("unknown player: {0}")]
    UnknownPlayer(String),
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("unknown avatar type: {0}")]
    UnknownArchetype(String),
    #[error("no throws left, the turn must be ended")]
    NoThrowsLeft,
    #[error("{0} still has {1} throw(s) left")]
    ThrowsRemaining(String, u32),
    #[error("cannot continue while jailed")]
    ContinueWhileJailed,
    #[error("cannot continue after rolling doubles, roll again")]
    ContinueAfterDoubles,
    #[error("there is no pending movement to continue")]
    NothingToContinue,
    #[error("a pending movement must be finished before rolling again")]
    PendingMovement,
    #[error("the car is recovering: wait {0} turn(s) to move")]
    Cooldown(u32),
    #[error("cannot change movement mode in the middle of a special movement")]
    ModeChangeMidMove,
    #[error("the avatar is not in jail")]
    NotJailed,
    #[error("{0} is in debt: pay it off or declare bankruptcy")]
    Indebted(String),
    #[error("{0} is not the current cell")]
    NotCurrentCell(String),
    #[error("{0} cannot be bought")]
    NotForSale(String),
    #[error("{0} already belongs to {1}")]
    AlreadyOwned(String, String),
    #[error("only one purchase per turn is allowed for this avatar")]
    PurchaseLimit,
    #[error("{0} does not own {1}")]
    NotOwner(String, String),
    #[error("{0} is mortgaged")]
    Mortgaged(String),
    #[error("{0} is not mortgaged")]
    NotMortgaged(String),
    #[error("{0} has buildings and cannot be mortgaged")]
    HasBuildings(String),
    #[error("buildings can only be placed on solars")]
    NotASolar,
    #[error("cannot build: {0}")]
    BuildRule(String),
    #[error("only {available} {kind}(s) available to sell")]
    NotEnoughBuildings { kind: String, available: usize },
    #[error("unknown trade: {0}")]
    UnknownTrade(String),
    #[error("trade {0} is no longer pending")]
    TradeClosed(String),
    #[error("trade {0} is addressed to another player")]
    NotTradeTarget(String),
    #[error("trade {0} can only be withdrawn by its proposer")]
    NotTradeProposer(String),
    #[error("invalid trade: {0}")]
    InvalidTrade(String),
    #[error("the game is over")]
    GameOver,
}

/// Money related rejection (kind b).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FundsError {
    #[error("{name} cannot afford {amount} (balance {balance})")]
    Insufficient {
        name: String,
        amount: Money,
        balance: Money,
    },
    #[error("amount must be positive, got {0}")]
    NonPositiveCharge(Money),
    #[error("amount must not be negative, got {0}")]
    NegativeCredit(Money),
}

/// Unrecoverable inconsistency (kind c).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FatalError {
    #[error("required value is not set: {0}")]
    Unset(&'static str),
    #[error("unknown player id {0}")]
    MissingPlayer(usize),
    #[error("cell {0} is out of range")]
    MissingCell(usize),
    #[error("internal invariant broken: {0}")]
    Invariant(String),
    #[error("invalid rules: {0}")]
    Rules(#[from] RulesError),
}

/// A rejected field of `GameRules`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("first_solar_price must be positive, got {0}")]
    FirstSolarPrice(Money),
    #[error("min_players must be at least 2, got {0}")]
    MinPlayers(usize),
    #[error("max_players ({max}) must not be below min_players ({min})")]
    MaxPlayers { min: usize, max: usize },
    #[error("inflation_laps must be positive")]
    InflationLaps,
    #[error("inflation_pct must not be negative, got {0}")]
    InflationPct(i64),
}

/// Any error produced by a game operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Funds(#[from] FundsError),
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl GameError {
    /// True when the game must abort.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::Fatal(_))
    }
}

pub type GameResult<T> = Result<T, GameError>;
