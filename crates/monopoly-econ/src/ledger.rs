//! Player balances, debt and the Bank pot.

use monopoly_core::{
    Avatar, FatalError, FundsError, GameResult, Money, Owner, Player, PlayerId,
};
use serde::{Deserialize, Serialize};

/// How a charge treats a payer that cannot cover it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeMode {
    /// Rejected without any change when the balance is too low.
    Voluntary,
    /// Always debited; a negative balance records `creditor`.
    Mandatory { creditor: Owner },
}

/// Outcome of a successful charge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payment {
    Paid,
    /// The payer's balance is now negative.
    Indebted,
}

/// Owns every player record and all money movements between them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ledger {
    players: Vec<Player>,
    /// Taxes, bail and card charges waiting on the Parking cell.
    pot: Money,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_player(&mut self, name: impl Into<String>, avatar: Avatar) -> PlayerId {
        let id = PlayerId(self.players.len());
        self.players.push(Player::new(id, name, avatar));
        id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn active(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().filter(|p| p.active)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, FatalError> {
        self.players.get(id.0).ok_or(FatalError::MissingPlayer(id.0))
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, FatalError> {
        self.players
            .get_mut(id.0)
            .ok_or(FatalError::MissingPlayer(id.0))
    }

    /// Case-insensitive lookup among active players.
    pub fn find(&self, name: &str) -> Option<PlayerId> {
        self.active()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.id)
    }

    pub fn owner_name(&self, owner: Owner) -> String {
        match owner {
            Owner::Bank => "the Bank".to_string(),
            Owner::Player(id) => self
                .players
                .get(id.0)
                .map_or_else(|| id.to_string(), |p| p.name.clone()),
        }
    }

    pub fn pot(&self) -> Money {
        self.pot
    }

    pub fn add_to_pot(&mut self, amount: Money) {
        self.pot += amount;
    }

    pub fn take_pot(&mut self) -> Money {
        std::mem::take(&mut self.pot)
    }

    /// Checks that a voluntary charge of `amount` would be accepted.
    pub fn check_affordable(&self, payer: PlayerId, amount: Money) -> GameResult<()> {
        if amount <= 0 {
            return Err(FundsError::NonPositiveCharge(amount).into());
        }
        let p = self.player(payer)?;
        if p.balance < amount {
            return Err(FundsError::Insufficient {
                name: p.name.clone(),
                amount,
                balance: p.balance,
            }
            .into());
        }
        Ok(())
    }

    /// Debits `amount` from `payer`. The money leaves the game unless the
    /// caller credits it somewhere.
    pub fn charge(&mut self, payer: PlayerId, amount: Money, mode: ChargeMode) -> GameResult<Payment> {
        match mode {
            ChargeMode::Voluntary => self.check_affordable(payer, amount)?,
            ChargeMode::Mandatory { .. } if amount <= 0 => {
                return Err(FundsError::NonPositiveCharge(amount).into())
            }
            ChargeMode::Mandatory { .. } => {}
        }
        let p = self.player_mut(payer)?;
        p.balance -= amount;
        p.stats.expenses += amount;
        if p.balance >= 0 {
            return Ok(Payment::Paid);
        }
        if let ChargeMode::Mandatory { creditor } = mode {
            p.creditor = Some(creditor);
            tracing::info!(player = %p.name, balance = p.balance, "player is in debt");
        }
        Ok(Payment::Indebted)
    }

    /// Pays `amount` into a player's balance. Settling a debt clears the
    /// creditor.
    pub fn credit(&mut self, who: PlayerId, amount: Money) -> GameResult<()> {
        if amount < 0 {
            return Err(FundsError::NegativeCredit(amount).into());
        }
        let p = self.player_mut(who)?;
        p.balance += amount;
        if p.balance >= 0 {
            p.creditor = None;
        }
        Ok(())
    }

    /// Mandatory payment to the Bank that feeds the pot.
    pub fn pay_to_pot(&mut self, payer: PlayerId, amount: Money) -> GameResult<Payment> {
        let payment = self.charge(
            payer,
            amount,
            ChargeMode::Mandatory {
                creditor: Owner::Bank,
            },
        )?;
        self.add_to_pot(amount);
        Ok(payment)
    }

    /// Moves money between two players. The receiver gets the full amount
    /// even when the payer goes into debt.
    pub fn transfer(
        &mut self,
        from: PlayerId,
        to: PlayerId,
        amount: Money,
        mode: ChargeMode,
    ) -> GameResult<Payment> {
        if from == to {
            return Err(FatalError::Invariant(format!("{from} cannot pay itself")).into());
        }
        self.player(to)?;
        let payment = self.charge(from, amount, mode)?;
        self.credit(to, amount)?;
        Ok(payment)
    }

    pub fn pay_rent(&mut self, payer: PlayerId, owner: PlayerId, amount: Money) -> GameResult<Payment> {
        let mode = ChargeMode::Mandatory {
            creditor: Owner::Player(owner),
        };
        let payment = self.transfer(payer, owner, amount, mode)?;
        self.player_mut(payer)?.stats.rent_paid += amount;
        self.player_mut(owner)?.stats.rent_received += amount;
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monopoly_core::{Archetype, GameError};
    use proptest::prelude::*;

    fn ledger(balances: &[Money]) -> Ledger {
        let mut l = Ledger::new();
        for (i, &b) in balances.iter().enumerate() {
            let id = l.add_player(format!("p{i}"), Avatar::new('A', Archetype::Hat, 0));
            l.player_mut(id).unwrap().balance = b;
        }
        l
    }

    #[test]
    fn mandatory_charge_records_creditor() {
        let mut l = ledger(&[100, 0]);
        let creditor = Owner::Player(PlayerId(1));
        let r = l.charge(PlayerId(0), 150, ChargeMode::Mandatory { creditor });
        assert_eq!(r, Ok(Payment::Indebted));
        let p = l.player(PlayerId(0)).unwrap();
        assert_eq!(p.balance, -50);
        assert_eq!(p.creditor, Some(creditor));
        assert_eq!(p.stats.expenses, 150);
    }

    #[test]
    fn voluntary_charge_is_rejected_when_short() {
        let mut l = ledger(&[100]);
        let r = l.charge(PlayerId(0), 150, ChargeMode::Voluntary);
        assert!(matches!(r, Err(GameError::Funds(FundsError::Insufficient { .. }))));
        assert_eq!(l.player(PlayerId(0)).unwrap().balance, 100);
        assert_eq!(l.player(PlayerId(0)).unwrap().stats.expenses, 0);
    }

    #[test]
    fn amounts_are_validated() {
        let mut l = ledger(&[100]);
        assert_eq!(
            l.charge(PlayerId(0), 0, ChargeMode::Voluntary),
            Err(FundsError::NonPositiveCharge(0).into())
        );
        assert_eq!(
            l.credit(PlayerId(0), -1),
            Err(FundsError::NegativeCredit(-1).into())
        );
        assert!(l.credit(PlayerId(0), 0).is_ok());
    }

    #[test]
    fn settling_debt_clears_creditor() {
        let mut l = ledger(&[0]);
        l.pay_to_pot(PlayerId(0), 40).unwrap();
        assert_eq!(l.player(PlayerId(0)).unwrap().creditor, Some(Owner::Bank));
        assert_eq!(l.pot(), 40);
        l.credit(PlayerId(0), 10).unwrap();
        assert!(l.player(PlayerId(0)).unwrap().creditor.is_some());
        l.credit(PlayerId(0), 30).unwrap();
        assert!(l.player(PlayerId(0)).unwrap().creditor.is_none());
        assert_eq!(l.take_pot(), 40);
        assert_eq!(l.pot(), 0);
    }

    #[test]
    fn rent_goes_in_full_to_owner() {
        let mut l = ledger(&[100, 0]);
        assert_eq!(l.pay_rent(PlayerId(0), PlayerId(1), 150), Ok(Payment::Indebted));
        assert_eq!(l.player(PlayerId(1)).unwrap().balance, 150);
        assert_eq!(l.player(PlayerId(1)).unwrap().stats.rent_received, 150);
        assert_eq!(l.player(PlayerId(0)).unwrap().stats.rent_paid, 150);
        assert_eq!(
            l.player(PlayerId(0)).unwrap().creditor,
            Some(Owner::Player(PlayerId(1)))
        );
    }

    #[test]
    fn find_ignores_case_and_bankrupt_players() {
        let mut l = ledger(&[0, 0]);
        assert_eq!(l.find("P1"), Some(PlayerId(1)));
        l.player_mut(PlayerId(1)).unwrap().active = false;
        assert_eq!(l.find("p1"), None);
        assert_eq!(l.owner_name(Owner::Bank), "the Bank");
    }

    proptest! {
        #[test]
        fn mandatory_charge_debits_exactly(balance in -1_000_000i64..1_000_000, amount in 1i64..1_000_000) {
            let mut l = ledger(&[balance]);
            l.charge(PlayerId(0), amount, ChargeMode::Mandatory { creditor: Owner::Bank }).unwrap();
            prop_assert_eq!(l.player(PlayerId(0)).unwrap().balance, balance - amount);
        }

        #[test]
        fn voluntary_charge_never_goes_negative(balance in 0i64..1_000_000, amount in 1i64..1_000_000) {
            let mut l = ledger(&[balance]);
            let r = l.charge(PlayerId(0), amount, ChargeMode::Voluntary);
            let after = l.player(PlayerId(0)).unwrap().balance;
            prop_assert!(after >= 0);
            prop_assert_eq!(r.is_ok(), amount <= balance);
            if r.is_err() {
                prop_assert_eq!(after, balance);
            }
        }
    }
}
