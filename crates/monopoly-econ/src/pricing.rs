//! Prices and derived values computed once the board is known.

use monopoly_core::{Board, CellKind, FatalError, Money, Owner, PropertyKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Values derived from the solar prices of a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Valuation {
    pub go_bonus: Money,
    pub bail: Money,
    pub initial_balance: Money,
}

/// Price of a solar in the `rank`-th solar group (0-based).
pub fn solar_price(first_solar_price: Money, rank: usize) -> Money {
    first_solar_price * (10 + 3 * rank as Money) / 10
}

/// Assigns every price on the board and returns the derived values.
///
/// Solar groups are ranked in declaration order. The Go bonus is the average
/// solar price; transports cost the bonus and services three quarters of it.
/// The i-th tax cell charges i half-bonuses.
pub fn price_board(board: &mut Board, first_solar_price: Money) -> Result<Valuation, FatalError> {
    if first_solar_price <= 0 {
        return Err(FatalError::Invariant(format!(
            "first solar price must be positive, got {first_solar_price}"
        )));
    }
    let ranks: BTreeMap<usize, usize> = board
        .properties_of_kind(PropertyKind::Solar)
        .map(|p| p.group)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .enumerate()
        .map(|(rank, group)| (group, rank))
        .collect();

    let mut total = 0;
    let mut count = 0;
    for position in 0..board.len() {
        if let Some(p) = board.property_mut(position) {
            if p.kind == PropertyKind::Solar {
                let rank = ranks.get(&p.group).copied().unwrap_or_default();
                let price = solar_price(first_solar_price, rank);
                p.set_price(price);
                total += price;
                count += 1;
            }
        }
    }
    if count == 0 {
        return Err(FatalError::Invariant("the board has no solar".into()));
    }

    let go_bonus = total / count;
    let mut taxes = 0;
    for position in 0..board.len() {
        let cell = board.cell_mut(position)?;
        match &mut cell.kind {
            CellKind::Property(p) if p.kind == PropertyKind::Transport => p.set_price(go_bonus),
            CellKind::Property(p) if p.kind == PropertyKind::Service => {
                p.set_price(go_bonus * 3 / 4)
            }
            CellKind::Tax { amount } => {
                taxes += 1;
                *amount = Some(taxes * go_bonus / 2);
            }
            _ => {}
        }
    }
    board.set_go_bonus(go_bonus);
    let bail = go_bonus / 4;
    board.set_bail(bail);
    let valuation = Valuation {
        go_bonus,
        bail,
        initial_balance: total / 3,
    };
    tracing::debug!(?valuation, solars = count, "board priced");
    Ok(valuation)
}

/// Raises the price of every unsold solar by `pct` percent. Returns how many
/// solars were repriced.
pub fn inflate_unsold(board: &mut Board, pct: Money) -> Result<usize, FatalError> {
    let mut repriced = 0;
    for position in 0..board.len() {
        if let Some(p) = board.property_mut(position) {
            if p.kind == PropertyKind::Solar && p.owner == Owner::Bank {
                p.inflate(100 + pct, 100)?;
                repriced += 1;
            }
        }
    }
    Ok(repriced)
}
