//! Rent and building valuation.
//!
//! All figures are integer ratios of the property price, truncated toward
//! zero.

use monopoly_core::{Board, BuildingKind, Dice, FatalError, Money, Owner, Property, PropertyKind};

/// House rent multipliers of the base rent, by number of houses (1 to 4+).
pub const HOUSE_RENT: [Money; 4] = [5, 15, 35, 50];
pub const HOTEL_RENT: Money = 70;
pub const POOL_RENT: Money = 25;
pub const COURT_RENT: Money = 25;

/// Service rent is `sum * price * SERVICE_NUM * m / SERVICE_DEN`.
const SERVICE_NUM: Money = 285;
const SERVICE_DEN: Money = 20_000;
const SERVICE_SINGLE: Money = 4;
const SERVICE_BOTH: Money = 10;

/// Price of one building on a solar of the given price.
pub fn building_price(kind: BuildingKind, solar_price: Money) -> Money {
    match kind {
        BuildingKind::House | BuildingKind::Hotel => solar_price * 6 / 10,
        BuildingKind::Pool => solar_price * 4 / 10,
        BuildingKind::SportsCourt => solar_price * 115 / 100,
    }
}

/// Refund for selling one building back.
pub fn sale_refund(kind: BuildingKind, solar_price: Money) -> Money {
    building_price(kind, solar_price) / 2
}

/// Rent owed by a visitor who reached `position` with `dice`.
///
/// Non-property cells, Bank-owned and mortgaged properties yield nothing.
pub fn rent(board: &Board, position: usize, dice: Dice) -> Result<Money, FatalError> {
    let Some(property) = board.property(position) else {
        return Ok(0);
    };
    if property.mortgaged || property.owner == Owner::Bank {
        return Ok(0);
    }
    match property.kind {
        PropertyKind::Solar => solar_rent(board, property),
        PropertyKind::Service => service_rent(board, property, dice),
        PropertyKind::Transport => transport_rent(board, property),
    }
}

fn solar_rent(board: &Board, property: &Property) -> Result<Money, FatalError> {
    let base = property.price()? / 10;
    let mut rent = if board.is_monopoly(property.group, property.owner) {
        base * 2
    } else {
        base
    };
    let houses = property.count_buildings(BuildingKind::House);
    if houses > 0 {
        rent += base * HOUSE_RENT[houses.min(HOUSE_RENT.len()) - 1];
    }
    let count = |kind| property.count_buildings(kind) as Money;
    rent += base * HOTEL_RENT * count(BuildingKind::Hotel);
    rent += base * POOL_RENT * count(BuildingKind::Pool);
    rent += base * COURT_RENT * count(BuildingKind::SportsCourt);
    Ok(rent)
}

fn service_rent(board: &Board, property: &Property, dice: Dice) -> Result<Money, FatalError> {
    let multiplier = if board.is_monopoly(property.group, property.owner) {
        SERVICE_BOTH
    } else {
        SERVICE_SINGLE
    };
    let sum = Money::from(dice.sum());
    Ok(sum * property.price()? * SERVICE_NUM * multiplier / SERVICE_DEN)
}

fn transport_rent(board: &Board, property: &Property) -> Result<Money, FatalError> {
    let total = board
        .group(property.group)
        .map_or(0, |g| g.members.len()) as Money;
    if total == 0 {
        return Err(FatalError::Invariant(format!(
            "{} belongs to an empty group",
            property.name
        )));
    }
    let owned = board.owned_in_group(property.group, property.owner) as Money;
    Ok(property.price()? * owned / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use monopoly_core::{Building, Cell, CellKind, Group, PlayerId};

    const P: Owner = Owner::Player(PlayerId(0));

    fn property(name: &str, kind: PropertyKind, group: usize, price: Money) -> Cell {
        let mut p = Property::new(name, kind, group);
        p.set_price(price);
        Cell::new(0, name, CellKind::Property(p))
    }

    fn board() -> Board {
        let cells = vec![
            Cell::new(0, "Go", CellKind::Go),
            property("Alpha", PropertyKind::Solar, 0, 600_000),
            property("Beta", PropertyKind::Solar, 0, 600_000),
            property("Power", PropertyKind::Service, 1, 1_000_000),
            property("Water", PropertyKind::Service, 1, 1_000_000),
            Cell::new(0, "Jail", CellKind::Jail),
            property("North", PropertyKind::Transport, 2, 800_000),
            property("South", PropertyKind::Transport, 2, 800_000),
            property("East", PropertyKind::Transport, 2, 800_000),
            property("West", PropertyKind::Transport, 2, 800_000),
        ];
        let groups = vec![
            Group::new("Brown", 94),
            Group::new("Services", 37),
            Group::new("Transports", 90),
        ];
        Board::new(cells, groups).unwrap()
    }

    fn own(board: &mut Board, positions: &[usize]) {
        for &pos in positions {
            board.property_mut(pos).unwrap().owner = P;
        }
    }

    fn dice(a: u8, b: u8) -> Dice {
        Dice::new(a, b).unwrap()
    }

    #[test]
    fn one_service_of_two() {
        let mut b = board();
        own(&mut b, &[3]);
        assert_eq!(rent(&b, 3, dice(2, 3)).unwrap(), 285_000);
        own(&mut b, &[4]);
        assert_eq!(rent(&b, 3, dice(2, 3)).unwrap(), 712_500);
    }

    #[test]
    fn monopoly_doubles_solar_rent() {
        let mut b = board();
        own(&mut b, &[1]);
        let single = rent(&b, 1, dice(1, 2)).unwrap();
        assert_eq!(single, 60_000);
        own(&mut b, &[2]);
        assert_eq!(rent(&b, 1, dice(1, 2)).unwrap(), single * 2);
    }

    #[test]
    fn buildings_add_to_rent() {
        let mut b = board();
        own(&mut b, &[1, 2]);
        let p = b.property_mut(1).unwrap();
        for (id, kind) in [
            (1, BuildingKind::House),
            (2, BuildingKind::House),
            (3, BuildingKind::Hotel),
            (4, BuildingKind::Pool),
        ] {
            p.buildings.push(Building { id, kind });
        }
        let base = 60_000;
        assert_eq!(
            rent(&b, 1, dice(1, 2)).unwrap(),
            base * 2 + base * 15 + base * 70 + base * 25
        );
    }

    #[test]
    fn transport_rent_scales_with_holdings() {
        let mut b = board();
        own(&mut b, &[6, 7, 8]);
        assert_eq!(rent(&b, 6, dice(1, 2)).unwrap(), 600_000);
    }

    #[test]
    fn no_rent_for_bank_or_mortgaged() {
        let mut b = board();
        assert_eq!(rent(&b, 1, dice(1, 2)).unwrap(), 0);
        own(&mut b, &[1]);
        b.property_mut(1).unwrap().mortgaged = true;
        assert_eq!(rent(&b, 1, dice(1, 2)).unwrap(), 0);
        assert_eq!(rent(&b, 0, dice(1, 2)).unwrap(), 0);
    }

    #[test]
    fn building_prices() {
        assert_eq!(building_price(BuildingKind::House, 1_000_000), 600_000);
        assert_eq!(building_price(BuildingKind::Hotel, 1_000_000), 600_000);
        assert_eq!(building_price(BuildingKind::Pool, 1_000_000), 400_000);
        assert_eq!(building_price(BuildingKind::SportsCourt, 1_000_000), 1_150_000);
        assert_eq!(sale_refund(BuildingKind::House, 1_000_000), 300_000);
    }
}
