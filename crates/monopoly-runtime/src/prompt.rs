use monopoly_core::DeckKind;
use std::collections::VecDeque;

/// Interactive choices the game asks of the front end.
pub trait Prompter {
    /// Picks one of `count` freshly shuffled cards, 1-based.
    fn choose_card(&mut self, player: &str, deck: DeckKind, count: usize) -> usize;
}

/// Always takes the top card.
#[derive(Clone, Copy, Debug, Default)]
pub struct TopCard;

impl Prompter for TopCard {
    fn choose_card(&mut self, _player: &str, _deck: DeckKind, _count: usize) -> usize {
        1
    }
}

/// Replays a fixed list of picks, then falls back to the top card.
#[derive(Clone, Debug, Default)]
pub struct Scripted {
    picks: VecDeque<usize>,
}

impl Scripted {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

impl Prompter for Scripted {
    fn choose_card(&mut self, _player: &str, _deck: DeckKind, _count: usize) -> usize {
        self.picks.pop_front().unwrap_or(1)
    }
}
