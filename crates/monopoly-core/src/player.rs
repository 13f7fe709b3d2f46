//! Players and their running statistics.

use crate::avatar::Avatar;
use crate::{Money, Owner, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Counters reported by the `stats` command.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Spent on purchases, buildings and un-mortgaging.
    pub investment: Money,
    pub taxes: Money,
    pub rent_paid: Money,
    pub rent_received: Money,
    pub go_bonuses: Money,
    pub prizes: Money,
    /// Every debit, whatever its reason.
    pub expenses: Money,
    pub laps: u32,
    pub throws: u32,
    pub jail_visits: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Negative while the player is in debt.
    pub balance: Money,
    /// Board positions of the owned properties.
    pub properties: BTreeSet<usize>,
    pub avatar: Avatar,
    /// Who gets paid when the debt is settled or the player goes bankrupt.
    pub creditor: Option<Owner>,
    pub stats: PlayerStats,
    /// False once the player went bankrupt.
    pub active: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, avatar: Avatar) -> Self {
        Self {
            id,
            name: name.into(),
            balance: 0,
            properties: BTreeSet::new(),
            avatar,
            creditor: None,
            stats: PlayerStats::default(),
            active: true,
        }
    }

    pub fn is_indebted(&self) -> bool {
        self.balance < 0
    }

    pub fn owns(&self, position: usize) -> bool {
        self.properties.contains(&position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::Archetype;

    #[test]
    fn new_player_is_active_and_solvent() {
        let p = Player::new(PlayerId(0), "ana", Avatar::new('A', Archetype::Hat, 0));
        assert!(p.active);
        assert!(!p.is_indebted());
        assert!(p.creditor.is_none());
        assert!(!p.owns(1));
        assert_eq!(p.stats, PlayerStats::default());
    }
}
