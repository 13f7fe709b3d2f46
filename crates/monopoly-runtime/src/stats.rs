//! End-of-game and on-demand summaries.

use monopoly_core::{Board, Money, Owner, Player};
use monopoly_econ::Ledger;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A named record holder and its score.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub name: String,
    pub value: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GameStats {
    pub most_profitable_property: Option<Highlight>,
    pub most_profitable_group: Option<Highlight>,
    pub most_visited_cell: Option<Highlight>,
    pub most_laps: Option<Highlight>,
    pub most_throws: Option<Highlight>,
    /// Balance plus property values; mortgaged properties count for half.
    pub richest: Option<Highlight>,
}

/// The first entry with the highest positive score.
fn best(entries: impl IntoIterator<Item = (String, i64)>) -> Option<Highlight> {
    entries
        .into_iter()
        .filter(|(_, value)| *value > 0)
        .fold(None, |top: Option<Highlight>, (name, value)| match top {
            Some(t) if t.value >= value => Some(t),
            _ => Some(Highlight { name, value }),
        })
}

pub fn net_worth(board: &Board, player: &Player) -> Money {
    let estate: Money = board
        .owned_by(Owner::Player(player.id))
        .into_iter()
        .filter_map(|pos| board.property(pos))
        .map(|p| {
            let price = p.price().unwrap_or_default();
            if p.mortgaged {
                price / 2
            } else {
                price
            }
        })
        .sum();
    player.balance + estate
}

impl GameStats {
    pub fn collect(board: &Board, ledger: &Ledger) -> Self {
        let properties = || board.cells().iter().filter_map(|c| c.property());

        let mut groups: BTreeMap<usize, Money> = BTreeMap::new();
        for p in properties() {
            *groups.entry(p.group).or_default() += p.rent_collected;
        }
        let group_name = |g: usize| board.group(g).map_or_else(|| format!("group {g}"), |g| g.name.clone());

        Self {
            most_profitable_property: best(properties().map(|p| (p.name.clone(), p.rent_collected))),
            most_profitable_group: best(groups.into_iter().map(|(g, rent)| (group_name(g), rent))),
            most_visited_cell: best(
                board
                    .cells()
                    .iter()
                    .map(|c| (c.name.clone(), i64::from(c.visits()))),
            ),
            most_laps: best(ledger.active().map(|p| (p.name.clone(), i64::from(p.stats.laps)))),
            most_throws: best(ledger.active().map(|p| (p.name.clone(), i64::from(p.stats.throws)))),
            richest: best(ledger.active().map(|p| (p.name.clone(), net_worth(board, p)))),
        }
    }
}

impl fmt::Display for GameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = [
            ("most profitable property", &self.most_profitable_property),
            ("most profitable group", &self.most_profitable_group),
            ("most visited cell", &self.most_visited_cell),
            ("most laps", &self.most_laps),
            ("most throws", &self.most_throws),
            ("richest player", &self.richest),
        ];
        for (label, row) in rows {
            match row {
                Some(h) => writeln!(f, "{label:<26} {} ({})", h.name, h.value)?,
                None => writeln!(f, "{label:<26} -")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_keep_the_first_entry() {
        let top = best([("a".to_string(), 3), ("b".to_string(), 3), ("c".to_string(), 1)]);
        assert_eq!(top.map(|h| h.name), Some("a".to_string()));
        assert_eq!(best([("a".to_string(), 0)]), None);
    }

    #[test]
    fn empty_stats_render_dashes() {
        let text = GameStats::default().to_string();
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().all(|l| l.ends_with('-')));
    }
}
