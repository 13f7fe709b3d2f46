//! Card file parser: one `Kind:id:description` entry per line.

use crate::{ConfigError, Decks};
use monopoly_core::{Card, CardEffect, Deck, DeckKind};

pub fn parse_cards(file: &str, text: &str) -> Result<Decks, ConfigError> {
    let mut chance = Vec::new();
    let mut community = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |msg: String| ConfigError::syntax(file, line_no, msg);
        let mut parts = line.splitn(3, ':');
        let (Some(kind), Some(id), Some(description)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(err("expected `Kind:id:description`".into()));
        };
        let deck = DeckKind::parse(kind).ok_or_else(|| err(format!("unknown deck `{}`", kind.trim())))?;
        let id = id
            .trim()
            .parse::<u32>()
            .map_err(|_| err(format!("invalid card id `{}`", id.trim())))?;
        let effect = CardEffect::lookup(deck, id)
            .ok_or_else(|| err(format!("{deck} card {id} has no effect")))?;
        let card = Card {
            deck,
            id,
            description: description.trim().to_string(),
            effect,
        };
        match deck {
            DeckKind::Chance => chance.push(card),
            DeckKind::Community => community.push(card),
        }
    }

    if chance.is_empty() || community.is_empty() {
        return Err(ConfigError::invalid(file, "both decks need at least one card"));
    }
    Ok(Decks {
        chance: Deck::new(DeckKind::Chance, chance),
        community: Deck::new(DeckKind::Community, community),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_cards_by_deck() {
        let text = "Chance:3:Lottery win: collect the prize\n# skip\nCommunity:1:Pay the doctor\n";
        let decks = parse_cards("cards.txt", text).unwrap();
        assert_eq!(decks.chance.len(), 1);
        assert_eq!(decks.chance.cards()[0].description, "Lottery win: collect the prize");
        assert_eq!(decks.community.cards()[0].effect, CardEffect::Charge(150_000));
    }

    #[test]
    fn card_without_effect_is_a_config_error() {
        let text = "Chance:3:ok\nCommunity:2:nothing happens\n";
        let err = parse_cards("cards.txt", text).unwrap_err();
        assert_eq!(err.to_string(), "cards.txt:2: Community card 2 has no effect");
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(parse_cards("c.txt", "Chance 3\n").is_err());
        assert!(parse_cards("c.txt", "Luck:3:x\n").is_err());
        assert!(parse_cards("c.txt", "Chance:x:y\n").is_err());
        assert!(matches!(
            parse_cards("c.txt", "Chance:3:x\n"),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
