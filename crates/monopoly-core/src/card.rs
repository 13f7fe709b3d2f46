//! Chance and Community cards.

use crate::property::BuildingKind;
use crate::Money;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two card decks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckKind {
    Chance,
    Community,
}

impl DeckKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chance" => Some(DeckKind::Chance),
            "community" => Some(DeckKind::Community),
            _ => None,
        }
    }
}

impl fmt::Display for DeckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckKind::Chance => f.write_str("Chance"),
            DeckKind::Community => f.write_str("Community"),
        }
    }
}

/// What happens to the player who draws a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEffect {
    /// The Bank pays the player.
    Credit(Money),
    /// The player pays the Bank.
    Charge(Money),
    /// The player pays the Bank for every building they own.
    BuildingLevy,
    /// The player pays every other active player.
    PayEachPlayer(Money),
    /// Every other active player pays the player.
    CollectFromEachPlayer(Money),
}

impl CardEffect {
    /// Effect bound to a card id. Ids outside the table have no effect and
    /// are rejected when the card file is loaded.
    pub fn lookup(deck: DeckKind, id: u32) -> Option<Self> {
        use CardEffect::*;
        match (deck, id) {
            (DeckKind::Chance, 3) => Some(Credit(500_000)),
            (DeckKind::Chance, 6) => Some(Credit(1_000_000)),
            (DeckKind::Chance, 7) => Some(Charge(1_500_000)),
            (DeckKind::Chance, 8) => Some(BuildingLevy),
            (DeckKind::Chance, 10) => Some(PayEachPlayer(250_000)),
            (DeckKind::Chance, 12) => Some(Charge(150_000)),
            (DeckKind::Community, 1) => Some(Charge(150_000)),
            (DeckKind::Community, 4) => Some(Credit(2_000_000)),
            (DeckKind::Community, 5) => Some(Charge(1_000_000)),
            (DeckKind::Community, 6) => Some(Credit(500_000)),
            (DeckKind::Community, 8) => Some(CollectFromEachPlayer(250_000)),
            (DeckKind::Community, 9) => Some(Credit(1_000_000)),
            _ => None,
        }
    }

    /// Levy charged per building by [`CardEffect::BuildingLevy`].
    pub fn levy(kind: BuildingKind) -> Money {
        match kind {
            BuildingKind::House => 4_000_000,
            BuildingKind::Hotel => 1_500_000,
            BuildingKind::Pool => 200_000,
            BuildingKind::SportsCourt => 750_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub deck: DeckKind,
    pub id: u32,
    pub description: String,
    pub effect: CardEffect,
}

/// A deck is never exhausted: cards are shuffled before every draw and the
/// drawn card stays in the deck.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deck {
    pub kind: DeckKind,
    cards: Vec<Card>,
}

impl Deck {
    pub fn new(kind: DeckKind, cards: Vec<Card>) -> Self {
        Self { kind, cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Card at a 1-based index chosen by the player.
    pub fn pick(&self, index: usize) -> Option<&Card> {
        index.checked_sub(1).and_then(|i| self.cards.get(i))
    }
}
