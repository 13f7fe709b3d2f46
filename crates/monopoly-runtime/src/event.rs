//! Events reported back to the front end after each game operation.

use monopoly_core::{BuildingKind, DeckKind, Dice, Money};
use serde::Serialize;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined { player: String, avatar: char, archetype: String },
    Started { first: String },
    Rolled { player: String, dice: Dice },
    StillJailed { player: String },
    ReleasedFromJail { player: String },
    BailPaid { player: String, amount: Money, forced: bool },
    Jailed { player: String },
    PassedGo { player: String, bonus: Money },
    BackPastGo { player: String, charge: Money },
    Moved { player: String, cell: String, position: usize },
    TaxPaid { player: String, amount: Money },
    PotCollected { player: String, amount: Money },
    CardDrawn { player: String, deck: DeckKind, description: String },
    Credited { player: String, amount: Money },
    Charged { player: String, amount: Money },
    Paid { from: String, to: String, amount: Money },
    RentPaid { payer: String, owner: String, property: String, amount: Money },
    RentWaived { payer: String, property: String },
    InDebt { player: String, balance: Money, creditor: String },
    Bought { player: String, property: String, price: Money },
    Built { player: String, property: String, kind: BuildingKind, count: usize, cost: Money },
    Sold { player: String, property: String, kind: BuildingKind, count: usize, refund: Money },
    Mortgaged { player: String, property: String, value: Money },
    Unmortgaged { player: String, property: String, cost: Money },
    ModeChanged { player: String, special: bool },
    TradeProposed { id: String, proposer: String, target: String },
    TradeAccepted { id: String },
    TradeWithdrawn { id: String },
    Inflation { round: u32, repriced: usize },
    TurnEnded { player: String, next: String },
    Bankrupt { player: String, heir: String },
    Winner { player: String },
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use GameEvent::*;
        match self {
            PlayerJoined { player, avatar, archetype } => {
                write!(f, "{player} joins with the {archetype} avatar {avatar}")
            }
            Started { first } => write!(f, "the game starts; {first} plays first"),
            Rolled { player, dice } => write!(f, "{player} rolls {dice}"),
            StillJailed { player } => write!(f, "{player} stays in jail"),
            ReleasedFromJail { player } => write!(f, "{player} leaves jail"),
            BailPaid { player, amount, forced: true } => {
                write!(f, "{player} served three turns and must pay {amount} bail")
            }
            BailPaid { player, amount, .. } => write!(f, "{player} pays {amount} bail"),
            Jailed { player } => write!(f, "{player} goes to jail"),
            PassedGo { player, bonus } => write!(f, "{player} passes Go and collects {bonus}"),
            BackPastGo { player, charge } => {
                write!(f, "{player} moves back past Go and returns {charge}")
            }
            Moved { player, cell, position } => write!(f, "{player} lands on {cell} ({position})"),
            TaxPaid { player, amount } => write!(f, "{player} pays {amount} in taxes"),
            PotCollected { player, amount } => {
                write!(f, "{player} collects the {amount} waiting on Parking")
            }
            CardDrawn { player, deck, description } => {
                write!(f, "{player} draws a {deck} card: {description}")
            }
            Credited { player, amount } => write!(f, "{player} receives {amount}"),
            Charged { player, amount } => write!(f, "{player} pays {amount} to the Bank"),
            Paid { from, to, amount } => write!(f, "{from} pays {amount} to {to}"),
            RentPaid { payer, owner, property, amount } => {
                write!(f, "{payer} pays {amount} rent to {owner} for {property}")
            }
            RentWaived { payer, property } => write!(f, "{payer} stays at {property} for free"),
            InDebt { player, balance, creditor } => {
                write!(f, "{player} owes {creditor}: balance {balance}")
            }
            Bought { player, property, price } => write!(f, "{player} buys {property} for {price}"),
            Built { player, property, kind, count, cost } => {
                write!(f, "{player} builds {count} {kind}(s) on {property} for {cost}")
            }
            Sold { player, property, kind, count, refund } => {
                write!(f, "{player} sells {count} {kind}(s) on {property} for {refund}")
            }
            Mortgaged { player, property, value } => {
                write!(f, "{player} mortgages {property} for {value}")
            }
            Unmortgaged { player, property, cost } => {
                write!(f, "{player} lifts the mortgage on {property} for {cost}")
            }
            ModeChanged { player, special: true } => write!(f, "{player} switches to special movement"),
            ModeChanged { player, .. } => write!(f, "{player} switches to basic movement"),
            TradeProposed { id, proposer, target } => {
                write!(f, "{proposer} offers {id} to {target}")
            }
            TradeAccepted { id } => write!(f, "{id} accepted"),
            TradeWithdrawn { id } => write!(f, "{id} withdrawn"),
            Inflation { round, repriced } => {
                write!(f, "inflation #{round}: {repriced} unsold solars are now more expensive")
            }
            TurnEnded { player, next } => write!(f, "{player} ends the turn; {next} plays"),
            Bankrupt { player, heir } => write!(f, "{player} is bankrupt; {heir} takes the estate"),
            Winner { player } => write!(f, "{player} wins the game"),
        }
    }
}
