//! Property operations: purchase, construction, mortgage and transfers.
//!
//! Every operation validates completely before it touches the board or the
//! ledger, so a rejected call changes nothing.

use crate::ledger::{ChargeMode, Ledger};
use crate::rent::{building_price, sale_refund};
use monopoly_core::{
    Board, Building, BuildingKind, CommandError, FatalError, GameResult, Money, Owner, PlayerId,
    Property, PropertyKind,
};

/// Houses a solar holds before its group has a hotel on every solar.
pub const MAX_HOUSES: usize = 4;
/// Houses retired by each hotel.
pub const HOUSES_PER_HOTEL: usize = 4;
/// Landings that allow building without the group monopoly.
pub const LANDINGS_TO_BUILD: usize = 2;

/// Resolves a property name to its position.
pub fn locate(board: &Board, name: &str) -> Result<usize, CommandError> {
    board
        .find_property(name)
        .ok_or_else(|| CommandError::UnknownProperty(name.to_string()))
}

fn property(board: &Board, position: usize) -> Result<&Property, FatalError> {
    board
        .property(position)
        .ok_or_else(|| FatalError::Invariant(format!("cell {position} is not a property")))
}

fn require_owner(board: &Board, ledger: &Ledger, who: PlayerId, position: usize) -> GameResult<()> {
    let p = property(board, position)?;
    if p.owner != Owner::Player(who) {
        let name = ledger.player(who)?.name.clone();
        return Err(CommandError::NotOwner(name, p.name.clone()).into());
    }
    Ok(())
}

fn require_solvent(ledger: &Ledger, who: PlayerId) -> GameResult<()> {
    let player = ledger.player(who)?;
    if player.is_indebted() {
        return Err(CommandError::Indebted(player.name.clone()).into());
    }
    Ok(())
}

/// Changes the owner of a property, keeping the players' holdings in sync.
/// A property returned to the Bank is no longer mortgaged.
pub fn transfer_property(
    board: &mut Board,
    ledger: &mut Ledger,
    position: usize,
    to: Owner,
) -> Result<(), FatalError> {
    let from = property(board, position)?.owner;
    if let Owner::Player(id) = from {
        ledger.player_mut(id)?.properties.remove(&position);
    }
    if let Owner::Player(id) = to {
        ledger.player_mut(id)?.properties.insert(position);
    }
    let p = board
        .property_mut(position)
        .ok_or(FatalError::MissingCell(position))?;
    p.owner = to;
    if to == Owner::Bank {
        p.mortgaged = false;
    }
    Ok(())
}

/// Buys the Bank-owned property the buyer's avatar stands on.
pub fn buy(board: &mut Board, ledger: &mut Ledger, buyer: PlayerId) -> GameResult<Money> {
    require_solvent(ledger, buyer)?;
    let player = ledger.player(buyer)?;
    let position = player.avatar.position();
    let cell = board.cell(position)?;
    let p = cell
        .property()
        .ok_or_else(|| CommandError::NotForSale(cell.name.clone()))?;
    if !p.is_for_sale() {
        return Err(CommandError::AlreadyOwned(p.name.clone(), ledger.owner_name(p.owner)).into());
    }
    if !player.avatar.may_buy() {
        return Err(CommandError::PurchaseLimit.into());
    }
    let price = p.price()?;
    let name = p.name.clone();
    ledger.charge(buyer, price, ChargeMode::Voluntary)?;
    transfer_property(board, ledger, position, Owner::Player(buyer))?;
    let player = ledger.player_mut(buyer)?;
    player.stats.investment += price;
    player.avatar.record_purchase();
    tracing::info!(player = %player.name, property = %name, price, "property bought");
    Ok(price)
}

/// Checks the group caps for adding `n` buildings of `kind` on `position`.
fn check_caps(board: &Board, position: usize, kind: BuildingKind, n: usize) -> Result<(), CommandError> {
    let Some(p) = board.property(position) else {
        return Err(CommandError::NotASolar);
    };
    let size = board.group(p.group).map_or(0, |g| g.members.len());
    let in_group = |k| board.group_buildings(p.group, k);
    let rule = |msg: String| Err(CommandError::BuildRule(msg));
    match kind {
        BuildingKind::House => {
            if in_group(BuildingKind::Hotel) < size {
                if p.count_buildings(BuildingKind::House) + n > MAX_HOUSES {
                    return rule(format!("at most {MAX_HOUSES} houses per solar"));
                }
            } else if in_group(BuildingKind::House) + n > size {
                return rule(format!("at most {size} houses in this group"));
            }
        }
        BuildingKind::Hotel => {
            if p.count_buildings(BuildingKind::House) < HOUSES_PER_HOTEL * n {
                return rule(format!("each hotel needs {HOUSES_PER_HOTEL} houses on the solar"));
            }
            if in_group(BuildingKind::Hotel) + n > size {
                return rule(format!("at most {size} hotels in this group"));
            }
        }
        BuildingKind::Pool => {
            if in_group(BuildingKind::Hotel) < 1 || in_group(BuildingKind::House) < 2 {
                return rule("a pool needs a hotel and two houses in the group".into());
            }
            if in_group(BuildingKind::Pool) + n > size {
                return rule(format!("at most {size} pools in this group"));
            }
        }
        BuildingKind::SportsCourt => {
            if in_group(BuildingKind::Hotel) < 2 {
                return rule("a sports court needs two hotels in the group".into());
            }
            if in_group(BuildingKind::SportsCourt) + n > size {
                return rule(format!("at most {size} sports courts in this group"));
            }
        }
    }
    Ok(())
}

/// Builds `n` buildings on the solar the builder's avatar stands on.
pub fn build(
    board: &mut Board,
    ledger: &mut Ledger,
    builder: PlayerId,
    kind: BuildingKind,
    n: usize,
) -> GameResult<Money> {
    if n == 0 {
        return Err(CommandError::BuildRule("nothing to build".into()).into());
    }
    require_solvent(ledger, builder)?;
    let player = ledger.player(builder)?;
    let position = player.avatar.position();
    let p = match board.property(position) {
        Some(p) if p.kind == PropertyKind::Solar => p,
        _ => return Err(CommandError::NotASolar.into()),
    };
    require_owner(board, ledger, builder, position)?;
    if p.mortgaged {
        return Err(CommandError::Mortgaged(p.name.clone()).into());
    }
    let landings = player.avatar.history().iter().filter(|&&h| h == position).count();
    if !board.is_monopoly(p.group, Owner::Player(builder)) && landings < LANDINGS_TO_BUILD {
        return Err(CommandError::BuildRule(format!(
            "own the whole group or land on {} {LANDINGS_TO_BUILD} times",
            p.name
        ))
        .into());
    }
    check_caps(board, position, kind, n)?;
    let cost = building_price(kind, p.price()?) * n as Money;
    let name = p.name.clone();

    ledger.charge(builder, cost, ChargeMode::Voluntary)?;
    let ids: Vec<u32> = (0..n).map(|_| board.next_building_id()).collect();
    let p = board
        .property_mut(position)
        .ok_or(FatalError::MissingCell(position))?;
    if kind == BuildingKind::Hotel {
        p.demolish(BuildingKind::House, HOUSES_PER_HOTEL * n);
    }
    p.buildings.extend(ids.into_iter().map(|id| Building { id, kind }));
    let player = ledger.player_mut(builder)?;
    player.stats.investment += cost;
    tracing::info!(player = %player.name, property = %name, %kind, n, cost, "built");
    Ok(cost)
}

/// Sells `n` buildings of `kind` back to the Bank for half their price.
pub fn sell(
    board: &mut Board,
    ledger: &mut Ledger,
    seller: PlayerId,
    position: usize,
    kind: BuildingKind,
    n: usize,
) -> GameResult<Money> {
    require_owner(board, ledger, seller, position)?;
    let p = property(board, position)?;
    let available = p.count_buildings(kind);
    if n == 0 || available < n {
        return Err(CommandError::NotEnoughBuildings {
            kind: kind.to_string(),
            available,
        }
        .into());
    }
    let refund = sale_refund(kind, p.price()?) * n as Money;
    board
        .property_mut(position)
        .ok_or(FatalError::MissingCell(position))?
        .demolish(kind, n);
    ledger.credit(seller, refund)?;
    tracing::info!(player = %seller, %kind, n, refund, "buildings sold");
    Ok(refund)
}

/// Mortgages a property for half its price.
pub fn mortgage(board: &mut Board, ledger: &mut Ledger, who: PlayerId, position: usize) -> GameResult<Money> {
    require_owner(board, ledger, who, position)?;
    let p = property(board, position)?;
    if p.mortgaged {
        return Err(CommandError::Mortgaged(p.name.clone()).into());
    }
    if !p.buildings.is_empty() {
        return Err(CommandError::HasBuildings(p.name.clone()).into());
    }
    let value = p.price()? / 2;
    board
        .property_mut(position)
        .ok_or(FatalError::MissingCell(position))?
        .mortgaged = true;
    ledger.credit(who, value)?;
    tracing::info!(player = %who, position, value, "property mortgaged");
    Ok(value)
}

/// Cost of lifting a mortgage: the mortgage value plus ten percent.
pub fn unmortgage_cost(price: Money) -> Money {
    price / 2 * 11 / 10
}

pub fn unmortgage(board: &mut Board, ledger: &mut Ledger, who: PlayerId, position: usize) -> GameResult<Money> {
    require_owner(board, ledger, who, position)?;
    require_solvent(ledger, who)?;
    let p = property(board, position)?;
    if !p.mortgaged {
        return Err(CommandError::NotMortgaged(p.name.clone()).into());
    }
    let cost = unmortgage_cost(p.price()?);
    ledger.charge(who, cost, ChargeMode::Voluntary)?;
    board
        .property_mut(position)
        .ok_or(FatalError::MissingCell(position))?
        .mortgaged = false;
    ledger.player_mut(who)?.stats.investment += cost;
    Ok(cost)
}

/// Hands every property of a bankrupt player, buildings included, to its
/// creditor (or the Bank when the creditor is gone) and takes the avatar off
/// the board. Returns who received the estate.
pub fn liquidate(board: &mut Board, ledger: &mut Ledger, debtor: PlayerId) -> Result<Owner, FatalError> {
    let player = ledger.player(debtor)?;
    let heir = match player.creditor {
        Some(Owner::Player(id))
            if id != debtor && ledger.players().get(id.0).is_some_and(|p| p.active) =>
        {
            Owner::Player(id)
        }
        _ => Owner::Bank,
    };
    let estate: Vec<usize> = player.properties.iter().copied().collect();
    for position in estate {
        transfer_property(board, ledger, position, heir)?;
    }
    board.remove_avatar(debtor);
    let player = ledger.player_mut(debtor)?;
    player.active = false;
    player.creditor = None;
    tracing::info!(player = %player.name, heir = ?heir, "player is bankrupt");
    Ok(heir)
}
