use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Faces of a single die.
pub const FACES: u8 = 6;

/// The outcome of throwing two dice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    first: u8,
    second: u8,
}

impl Dice {
    /// A fixed roll. Returns `None` when a value is outside [1, 6].
    pub fn new(first: u8, second: u8) -> Option<Self> {
        let valid = |v: u8| (1..=FACES).contains(&v);
        if valid(first) && valid(second) {
            Some(Self { first, second })
        } else {
            None
        }
    }

    /// Throw both dice using the given random source.
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            first: rng.gen_range(1..=FACES),
            second: rng.gen_range(1..=FACES),
        }
    }

    pub fn values(&self) -> (u8, u8) {
        (self.first, self.second)
    }

    pub fn sum(&self) -> u8 {
        self.first + self.second
    }

    pub fn is_double(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] = {}", self.first, self.second, self.sum())
    }
}
