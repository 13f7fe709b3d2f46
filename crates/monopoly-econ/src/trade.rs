//! Bilateral trade contracts.
//!
//! A trade is lowered to a list of legs (property or cash moving from one
//! party to the other). Acceptance validates every leg before applying any,
//! so a trade is either applied completely or not at all.

use crate::assets::transfer_property;
use crate::ledger::{ChargeMode, Ledger};
use monopoly_core::{
    Board, CommandError, FundsError, GameResult, Money, Owner, PlayerId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What each side gives. Properties are board positions; `give` always
/// leaves the proposer and `take` always leaves the target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TradeKind {
    PropertyForProperty { give: usize, take: usize },
    PropertyForCash { give: usize, cash: Money },
    CashForProperty { cash: Money, take: usize },
    /// The target adds `cash` to its property.
    PropertyForPropertyAndCash { give: usize, take: usize, cash: Money },
    /// The proposer adds `cash` to its property.
    PropertyAndCashForProperty { give: usize, cash: Money, take: usize },
    /// A swap where the proposer also pays no rent on the target's `waived`
    /// property for `turns` of its own turns.
    PropertyForPropertyWithRentWaiver {
        give: usize,
        take: usize,
        waived: usize,
        turns: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeState {
    Pending,
    Accepted,
    Withdrawn,
}

impl fmt::Display for TradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeState::Pending => f.write_str("pending"),
            TradeState::Accepted => f.write_str("accepted"),
            TradeState::Withdrawn => f.write_str("withdrawn"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Leg {
    Property { position: usize, from: PlayerId, to: PlayerId },
    Cash { amount: Money, from: PlayerId, to: PlayerId },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub proposer: PlayerId,
    pub target: PlayerId,
    pub kind: TradeKind,
    pub state: TradeState,
    /// Proposer turns left under the rent waiver once accepted.
    pub waiver_turns: u32,
}

impl Trade {
    fn legs(&self) -> Vec<Leg> {
        let (a, b) = (self.proposer, self.target);
        let prop = |position, from, to| Leg::Property { position, from, to };
        let cash = |amount, from, to| Leg::Cash { amount, from, to };
        match self.kind {
            TradeKind::PropertyForProperty { give, take }
            | TradeKind::PropertyForPropertyWithRentWaiver { give, take, .. } => {
                vec![prop(give, a, b), prop(take, b, a)]
            }
            TradeKind::PropertyForCash { give, cash: c } => vec![prop(give, a, b), cash(c, b, a)],
            TradeKind::CashForProperty { cash: c, take } => vec![cash(c, a, b), prop(take, b, a)],
            TradeKind::PropertyForPropertyAndCash { give, take, cash: c } => {
                vec![prop(give, a, b), prop(take, b, a), cash(c, b, a)]
            }
            TradeKind::PropertyAndCashForProperty { give, cash: c, take } => {
                vec![prop(give, a, b), cash(c, a, b), prop(take, b, a)]
            }
        }
    }

    /// The waived property, if this trade carries a waiver.
    pub fn waived(&self) -> Option<usize> {
        match self.kind {
            TradeKind::PropertyForPropertyWithRentWaiver { waived, .. } => Some(waived),
            _ => None,
        }
    }
}

/// Checks ownership of every property leg and, when `cash_of` matches the
/// paying side (or is `None`), that every cash leg can be covered.
fn validate(
    board: &Board,
    ledger: &Ledger,
    legs: &[Leg],
    cash_of: Option<PlayerId>,
) -> GameResult<()> {
    for leg in legs {
        match *leg {
            Leg::Property { position, from, .. } => {
                let p = board.property(position).ok_or_else(|| {
                    CommandError::InvalidTrade(format!("cell {position} is not a property"))
                })?;
                if p.owner != Owner::Player(from) {
                    let name = ledger.player(from)?.name.clone();
                    return Err(CommandError::NotOwner(name, p.name.clone()).into());
                }
            }
            Leg::Cash { amount, from, .. } => {
                if amount <= 0 {
                    return Err(FundsError::NonPositiveCharge(amount).into());
                }
                if cash_of.map_or(true, |who| who == from) {
                    ledger.check_affordable(from, amount)?;
                }
            }
        }
    }
    Ok(())
}

/// Every trade of a game, in proposal order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TradeBook {
    trades: Vec<Trade>,
}

impl TradeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn pending(&self) -> impl Iterator<Item = &Trade> + '_ {
        self.trades.iter().filter(|t| t.state == TradeState::Pending)
    }

    pub fn get(&self, id: &str) -> Result<&Trade, CommandError> {
        self.trades
            .iter()
            .find(|t| t.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| CommandError::UnknownTrade(id.to_string()))
    }

    fn index(&self, id: &str) -> Result<usize, CommandError> {
        self.trades
            .iter()
            .position(|t| t.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| CommandError::UnknownTrade(id.to_string()))
    }

    /// Records a new pending trade after checking that the proposer owns what
    /// it gives, the target owns what it gives, and the proposer can pay.
    pub fn propose(
        &mut self,
        board: &Board,
        ledger: &Ledger,
        proposer: PlayerId,
        target: PlayerId,
        kind: TradeKind,
    ) -> GameResult<&Trade> {
        if proposer == target {
            return Err(CommandError::InvalidTrade("cannot trade with yourself".into()).into());
        }
        if !ledger.player(target)?.active {
            let name = ledger.player(target)?.name.clone();
            return Err(CommandError::UnknownPlayer(name).into());
        }
        let mut trade = Trade {
            id: format!("trade-{}", self.trades.len() + 1),
            proposer,
            target,
            kind,
            state: TradeState::Pending,
            waiver_turns: 0,
        };
        if let TradeKind::PropertyForPropertyWithRentWaiver { take, waived, turns, .. } = trade.kind {
            if turns == 0 {
                return Err(CommandError::InvalidTrade("a waiver needs at least one turn".into()).into());
            }
            if waived == take {
                return Err(CommandError::InvalidTrade(
                    "the waived property cannot be part of the swap".into(),
                )
                .into());
            }
            validate(
                board,
                ledger,
                &[Leg::Property { position: waived, from: target, to: target }],
                None,
            )?;
            trade.waiver_turns = turns;
        }
        validate(board, ledger, &trade.legs(), Some(proposer))?;
        tracing::info!(id = %trade.id, %proposer, %target, "trade proposed");
        self.trades.push(trade);
        Ok(&self.trades[self.trades.len() - 1])
    }

    /// Applies a pending trade. Only its target may accept it.
    pub fn accept(
        &mut self,
        board: &mut Board,
        ledger: &mut Ledger,
        id: &str,
        by: PlayerId,
    ) -> GameResult<()> {
        let index = self.index(id)?;
        let trade = &self.trades[index];
        if trade.state != TradeState::Pending {
            return Err(CommandError::TradeClosed(trade.id.clone()).into());
        }
        if trade.target != by {
            return Err(CommandError::NotTradeTarget(trade.id.clone()).into());
        }
        let legs = trade.legs();
        validate(board, ledger, &legs, None)?;
        if let Some(waived) = trade.waived() {
            validate(
                board,
                ledger,
                &[Leg::Property { position: waived, from: trade.target, to: trade.target }],
                None,
            )?;
        }
        for leg in &legs {
            if let Leg::Cash { amount, from, to } = *leg {
                ledger.transfer(from, to, amount, ChargeMode::Voluntary)?;
            }
        }
        for leg in &legs {
            if let Leg::Property { position, to, .. } = *leg {
                transfer_property(board, ledger, position, Owner::Player(to))?;
            }
        }
        let trade = &mut self.trades[index];
        trade.state = TradeState::Accepted;
        tracing::info!(id = %trade.id, "trade accepted");
        Ok(())
    }

    /// Cancels a pending trade. Only its proposer may withdraw it.
    pub fn withdraw(&mut self, id: &str, by: PlayerId) -> GameResult<()> {
        let index = self.index(id)?;
        let trade = &mut self.trades[index];
        if trade.state != TradeState::Pending {
            return Err(CommandError::TradeClosed(trade.id.clone()).into());
        }
        if trade.proposer != by {
            return Err(CommandError::NotTradeProposer(trade.id.clone()).into());
        }
        trade.state = TradeState::Withdrawn;
        Ok(())
    }

    /// Withdraws every pending trade involving `player`.
    pub fn withdraw_involving(&mut self, player: PlayerId) -> usize {
        let mut withdrawn = 0;
        for trade in &mut self.trades {
            if trade.state == TradeState::Pending && (trade.proposer == player || trade.target == player) {
                trade.state = TradeState::Withdrawn;
                withdrawn += 1;
            }
        }
        withdrawn
    }

    /// True when `payer` owes no rent on `position` held by `owner`.
    pub fn waives_rent(&self, payer: PlayerId, owner: PlayerId, position: usize) -> bool {
        self.trades.iter().any(|t| {
            t.state == TradeState::Accepted
                && t.proposer == payer
                && t.target == owner
                && t.waiver_turns > 0
                && t.waived() == Some(position)
        })
    }

    /// Counts down the waivers that benefit `player` at the end of its turn.
    pub fn end_turn(&mut self, player: PlayerId) {
        for trade in &mut self.trades {
            if trade.state == TradeState::Accepted && trade.proposer == player {
                trade.waiver_turns = trade.waiver_turns.saturating_sub(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::fixture;
    use monopoly_core::GameError;
    use proptest::prelude::*;

    const A: PlayerId = PlayerId(0);
    const B: PlayerId = PlayerId(1);

    fn setup(balances: &[Money]) -> (Board, Ledger) {
        let (mut board, mut ledger) = fixture(balances);
        transfer_property(&mut board, &mut ledger, 1, Owner::Player(A)).unwrap();
        transfer_property(&mut board, &mut ledger, 2, Owner::Player(B)).unwrap();
        transfer_property(&mut board, &mut ledger, 3, Owner::Player(B)).unwrap();
        (board, ledger)
    }

    fn balances(ledger: &Ledger) -> (Money, Money) {
        (
            ledger.player(A).unwrap().balance,
            ledger.player(B).unwrap().balance,
        )
    }

    #[test]
    fn swap_with_cash_moves_everything() {
        let (mut board, mut ledger) = setup(&[1_000, 1_000]);
        let mut book = TradeBook::new();
        let kind = TradeKind::PropertyAndCashForProperty { give: 1, cash: 400, take: 2 };
        let id = book.propose(&board, &ledger, A, B, kind).unwrap().id.clone();
        assert_eq!(id, "trade-1");
        book.accept(&mut board, &mut ledger, &id, B).unwrap();
        assert_eq!(board.property(1).unwrap().owner, Owner::Player(B));
        assert_eq!(board.property(2).unwrap().owner, Owner::Player(A));
        assert_eq!(balances(&ledger), (600, 1_400));
        assert!(ledger.player(A).unwrap().owns(2));
        assert_eq!(book.get(&id).unwrap().state, TradeState::Accepted);
    }

    #[test]
    fn only_target_accepts_and_only_proposer_withdraws() {
        let (mut board, mut ledger) = setup(&[1_000, 1_000]);
        let mut book = TradeBook::new();
        let kind = TradeKind::PropertyForProperty { give: 1, take: 2 };
        book.propose(&board, &ledger, A, B, kind).unwrap();
        assert!(matches!(
            book.accept(&mut board, &mut ledger, "trade-1", A),
            Err(GameError::Command(CommandError::NotTradeTarget(_)))
        ));
        assert!(matches!(
            book.withdraw("trade-1", B),
            Err(GameError::Command(CommandError::NotTradeProposer(_)))
        ));
        book.withdraw("trade-1", A).unwrap();
        assert!(matches!(
            book.accept(&mut board, &mut ledger, "trade-1", B),
            Err(GameError::Command(CommandError::TradeClosed(_)))
        ));
    }

    #[test]
    fn proposal_checks_ownership_and_cash() {
        let (board, ledger) = setup(&[100, 1_000]);
        let mut book = TradeBook::new();
        let steal = TradeKind::PropertyForProperty { give: 2, take: 3 };
        assert!(book.propose(&board, &ledger, A, B, steal).is_err());
        let broke = TradeKind::CashForProperty { cash: 500, take: 2 };
        assert!(matches!(
            book.propose(&board, &ledger, A, B, broke),
            Err(GameError::Funds(FundsError::Insufficient { .. }))
        ));
        let selfish = TradeKind::PropertyForCash { give: 1, cash: 10 };
        assert!(book.propose(&board, &ledger, A, A, selfish).is_err());
        assert!(book.trades().is_empty());
    }

    #[test]
    fn acceptance_is_all_or_nothing() {
        let (mut board, mut ledger) = setup(&[1_000, 100]);
        let mut book = TradeBook::new();
        let kind = TradeKind::PropertyForPropertyAndCash { give: 1, take: 2, cash: 500 };
        book.propose(&board, &ledger, A, B, kind).unwrap();
        assert!(book.accept(&mut board, &mut ledger, "trade-1", B).is_err());
        assert_eq!(board.property(1).unwrap().owner, Owner::Player(A));
        assert_eq!(board.property(2).unwrap().owner, Owner::Player(B));
        assert_eq!(balances(&ledger), (1_000, 100));
        assert_eq!(book.get("trade-1").unwrap().state, TradeState::Pending);
    }

    #[test]
    fn waiver_lasts_for_proposer_turns() {
        let (mut board, mut ledger) = setup(&[0, 0]);
        let mut book = TradeBook::new();
        let kind = TradeKind::PropertyForPropertyWithRentWaiver { give: 1, take: 2, waived: 3, turns: 2 };
        book.propose(&board, &ledger, A, B, kind).unwrap();
        assert!(!book.waives_rent(A, B, 3));
        book.accept(&mut board, &mut ledger, "trade-1", B).unwrap();
        assert!(book.waives_rent(A, B, 3));
        assert!(!book.waives_rent(B, A, 3));
        book.end_turn(B);
        book.end_turn(A);
        assert!(book.waives_rent(A, B, 3));
        book.end_turn(A);
        assert!(!book.waives_rent(A, B, 3));
    }

    #[test]
    fn bankrupt_player_trades_are_withdrawn() {
        let (board, ledger) = setup(&[1_000, 1_000]);
        let mut book = TradeBook::new();
        book.propose(&board, &ledger, A, B, TradeKind::PropertyForCash { give: 1, cash: 5 }).unwrap();
        book.propose(&board, &ledger, B, A, TradeKind::PropertyForCash { give: 2, cash: 5 }).unwrap();
        assert_eq!(book.withdraw_involving(B), 2);
        assert_eq!(book.pending().count(), 0);
    }

    proptest! {
        #[test]
        fn accepted_trades_preserve_cash(a in 0i64..5_000, b in 0i64..5_000, cash in 1i64..5_000) {
            let (mut board, mut ledger) = setup(&[a, b]);
            let mut book = TradeBook::new();
            let kind = TradeKind::PropertyForPropertyAndCash { give: 1, take: 2, cash };
            book.propose(&board, &ledger, A, B, kind).unwrap();
            let result = book.accept(&mut board, &mut ledger, "trade-1", B);
            let (x, y) = balances(&ledger);
            prop_assert_eq!(x + y, a + b);
            prop_assert_eq!(result.is_ok(), cash <= b);
            let swapped = board.property(1).unwrap().owner == Owner::Player(B);
            prop_assert_eq!(swapped, result.is_ok());
        }
    }
}
