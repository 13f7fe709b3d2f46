//! Ownable cells and the buildings placed on them.

use crate::error::FatalError;
use crate::{Money, Owner};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of ownable cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Buildable land; rent depends on price, monopoly and buildings.
    Solar,
    /// Rent depends on the dice that brought the visitor here.
    Service,
    /// Rent depends on how many transports the owner holds.
    Transport,
}

/// Kinds of buildings a Solar can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Hotel,
    Pool,
    SportsCourt,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 4] = [
        BuildingKind::House,
        BuildingKind::Hotel,
        BuildingKind::Pool,
        BuildingKind::SportsCourt,
    ];

    /// Parses the names accepted by the command surface.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "h" | "house" | "houses" => Some(BuildingKind::House),
            "hotel" | "hotels" => Some(BuildingKind::Hotel),
            "p" | "pool" | "pools" => Some(BuildingKind::Pool),
            "c" | "court" | "courts" | "sportscourt" => Some(BuildingKind::SportsCourt),
            _ => None,
        }
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildingKind::House => "house",
            BuildingKind::Hotel => "hotel",
            BuildingKind::Pool => "pool",
            BuildingKind::SportsCourt => "sports court",
        };
        f.write_str(s)
    }
}

/// A single building with a unique id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub id: u32,
    pub kind: BuildingKind,
}

/// Ownable part of a property cell.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub kind: PropertyKind,
    /// Index into `Board::groups`.
    pub group: usize,
    /// Price assigned at configuration time; `None` until then.
    base_price: Option<Money>,
    /// Price after inflation events.
    price: Option<Money>,
    pub mortgaged: bool,
    pub owner: Owner,
    pub buildings: Vec<Building>,
    /// Rent collected over the whole game.
    pub rent_collected: Money,
}

impl Property {
    pub fn new(name: impl Into<String>, kind: PropertyKind, group: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            group,
            base_price: None,
            price: None,
            mortgaged: false,
            owner: Owner::Bank,
            buildings: Vec::new(),
            rent_collected: 0,
        }
    }

    /// Sets both the base and the current price.
    pub fn set_price(&mut self, price: Money) {
        self.base_price = Some(price);
        self.price = Some(price);
    }

    /// Current price. Reading it before configuration assigned one is fatal.
    pub fn price(&self) -> Result<Money, FatalError> {
        self.price.ok_or(FatalError::Unset("property price"))
    }

    pub fn base_price(&self) -> Result<Money, FatalError> {
        self.base_price.ok_or(FatalError::Unset("property base price"))
    }

    /// Scales the current price by `num / den`.
    pub fn inflate(&mut self, num: Money, den: Money) -> Result<(), FatalError> {
        if num <= 0 || den <= 0 {
            return Err(FatalError::Invariant(format!(
                "inflation factor {num}/{den} must be positive"
            )));
        }
        let price = self.price()?;
        self.price = Some(price * num / den);
        Ok(())
    }

    pub fn count_buildings(&self, kind: BuildingKind) -> usize {
        self.buildings.iter().filter(|b| b.kind == kind).count()
    }

    /// Removes up to `n` buildings of a kind, returning how many were removed.
    pub fn demolish(&mut self, kind: BuildingKind, n: usize) -> usize {
        let mut removed = 0;
        self.buildings.retain(|b| {
            if removed < n && b.kind == kind {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    pub fn is_for_sale(&self) -> bool {
        self.owner == Owner::Bank
    }
}
