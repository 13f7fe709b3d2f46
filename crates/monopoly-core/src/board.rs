//! The cyclic board: cells, groups and avatar occupancy.

use crate::error::FatalError;
use crate::property::{BuildingKind, Property, PropertyKind};
use crate::{Money, Owner, PlayerId};
use serde::{Deserialize, Serialize};

/// A named, colored partition of property cells.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    /// Terminal color code used by front ends.
    pub color: u8,
    /// Positions of the member cells, in board order.
    pub members: Vec<usize>,
}

impl Group {
    pub fn new(name: impl Into<String>, color: u8) -> Self {
        Self {
            name: name.into(),
            color,
            members: Vec::new(),
        }
    }
}

/// What a cell does when an avatar lands on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CellKind {
    Go,
    Jail,
    GoToJail,
    Tax { amount: Option<Money> },
    Parking,
    Chance,
    Community,
    Property(Property),
}

/// A single board position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub position: usize,
    pub name: String,
    pub kind: CellKind,
    occupants: Vec<PlayerId>,
    visits: u32,
}

impl Cell {
    pub fn new(position: usize, name: impl Into<String>, kind: CellKind) -> Self {
        Self {
            position,
            name: name.into(),
            kind,
            occupants: Vec::new(),
            visits: 0,
        }
    }

    pub fn occupants(&self) -> &[PlayerId] {
        &self.occupants
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    pub fn property(&self) -> Option<&Property> {
        match &self.kind {
            CellKind::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn property_mut(&mut self) -> Option<&mut Property> {
        match &mut self.kind {
            CellKind::Property(p) => Some(p),
            _ => None,
        }
    }
}

/// The full board with its derived economic values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Cell>,
    groups: Vec<Group>,
    go: usize,
    jail: usize,
    go_bonus: Option<Money>,
    bail: Option<Money>,
    building_seq: u32,
}

impl Board {
    /// Builds a board, wiring group membership from the property cells.
    ///
    /// Exactly one Go and one Jail cell are required.
    pub fn new(mut cells: Vec<Cell>, mut groups: Vec<Group>) -> Result<Self, FatalError> {
        let mut go = None;
        let mut jail = None;
        for (i, cell) in cells.iter_mut().enumerate() {
            cell.position = i;
            match &cell.kind {
                CellKind::Go => {
                    if go.replace(i).is_some() {
                        return Err(FatalError::Invariant("more than one Go cell".into()));
                    }
                }
                CellKind::Jail => {
                    if jail.replace(i).is_some() {
                        return Err(FatalError::Invariant("more than one Jail cell".into()));
                    }
                }
                CellKind::Property(p) => {
                    let group = groups.get_mut(p.group).ok_or_else(|| {
                        FatalError::Invariant(format!("{} refers to a missing group", p.name))
                    })?;
                    group.members.push(i);
                }
                _ => {}
            }
        }
        Ok(Self {
            cells,
            groups,
            go: go.ok_or(FatalError::Unset("Go cell"))?,
            jail: jail.ok_or(FatalError::Unset("Jail cell"))?,
            go_bonus: None,
            bail: None,
            building_seq: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Maps an unbounded position onto the board.
    pub fn wrap(&self, raw: i64) -> usize {
        raw.rem_euclid(self.cells.len() as i64) as usize
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&Group> {
        self.groups.get(index)
    }

    pub fn cell(&self, position: usize) -> Result<&Cell, FatalError> {
        self.cells.get(position).ok_or(FatalError::MissingCell(position))
    }

    pub fn cell_mut(&mut self, position: usize) -> Result<&mut Cell, FatalError> {
        self.cells
            .get_mut(position)
            .ok_or(FatalError::MissingCell(position))
    }

    pub fn property(&self, position: usize) -> Option<&Property> {
        self.cells.get(position).and_then(Cell::property)
    }

    pub fn property_mut(&mut self, position: usize) -> Option<&mut Property> {
        self.cells.get_mut(position).and_then(Cell::property_mut)
    }

    /// Finds a property cell by case-insensitive name.
    pub fn find_property(&self, name: &str) -> Option<usize> {
        self.cells.iter().position(|c| {
            c.property()
                .is_some_and(|p| p.name.eq_ignore_ascii_case(name))
        })
    }

    /// Positions of every property held by `owner`.
    pub fn owned_by(&self, owner: Owner) -> Vec<usize> {
        self.cells
            .iter()
            .filter(|c| c.property().is_some_and(|p| p.owner == owner))
            .map(|c| c.position)
            .collect()
    }

    pub fn go_position(&self) -> usize {
        self.go
    }

    pub fn jail_position(&self) -> usize {
        self.jail
    }

    pub fn go_bonus(&self) -> Result<Money, FatalError> {
        self.go_bonus.ok_or(FatalError::Unset("Go bonus"))
    }

    pub fn set_go_bonus(&mut self, amount: Money) {
        self.go_bonus = Some(amount);
    }

    pub fn bail(&self) -> Result<Money, FatalError> {
        self.bail.ok_or(FatalError::Unset("jail bail"))
    }

    pub fn set_bail(&mut self, amount: Money) {
        self.bail = Some(amount);
    }

    /// Hands out unique building ids.
    pub fn next_building_id(&mut self) -> u32 {
        self.building_seq += 1;
        self.building_seq
    }

    /// Number of properties of a group held by `owner`.
    pub fn owned_in_group(&self, group: usize, owner: Owner) -> usize {
        self.group_properties(group)
            .filter(|p| p.owner == owner)
            .count()
    }

    /// True when a player holds every property of the group. The Bank never
    /// holds a monopoly.
    pub fn is_monopoly(&self, group: usize, owner: Owner) -> bool {
        if owner == Owner::Bank {
            return false;
        }
        let size = self.group(group).map_or(0, |g| g.members.len());
        size > 0 && self.owned_in_group(group, owner) == size
    }

    pub fn group_buildings(&self, group: usize, kind: BuildingKind) -> usize {
        self.group_properties(group)
            .map(|p| p.count_buildings(kind))
            .sum()
    }

    fn group_properties(&self, group: usize) -> impl Iterator<Item = &Property> + '_ {
        self.group(group)
            .into_iter()
            .flat_map(|g| g.members.iter())
            .filter_map(|&pos| self.property(pos))
    }

    /// Property cells of a given kind.
    pub fn properties_of_kind(&self, kind: PropertyKind) -> impl Iterator<Item = &Property> + '_ {
        self.cells
            .iter()
            .filter_map(Cell::property)
            .filter(move |p| p.kind == kind)
    }

    /// Puts an avatar on a cell without counting a visit (game setup).
    pub fn place(&mut self, player: PlayerId, position: usize) -> Result<(), FatalError> {
        self.cell_mut(position)?.occupants.push(player);
        Ok(())
    }

    /// Moves an avatar between cells and counts the visit.
    pub fn relocate(&mut self, player: PlayerId, from: usize, to: usize) -> Result<(), FatalError> {
        self.cell(to)?;
        self.cell_mut(from)?.occupants.retain(|&p| p != player);
        let cell = self.cell_mut(to)?;
        cell.occupants.push(player);
        cell.visits += 1;
        Ok(())
    }

    /// Takes an avatar off the board entirely.
    pub fn remove_avatar(&mut self, player: PlayerId) -> bool {
        let mut removed = false;
        for cell in &mut self.cells {
            let before = cell.occupants.len();
            cell.occupants.retain(|&p| p != player);
            removed |= cell.occupants.len() != before;
        }
        removed
    }

    pub fn avatar_count(&self) -> usize {
        self.cells.iter().map(|c| c.occupants.len()).sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Small board: Go, two solars of group 0, Jail, a transport, Tax.
    pub(crate) fn small_board() -> Board {
        let mut a = Property::new("Alpha", PropertyKind::Solar, 0);
        a.set_price(600_000);
        let mut b = Property::new("Beta", PropertyKind::Solar, 0);
        b.set_price(600_000);
        let mut t = Property::new("Rail", PropertyKind::Transport, 1);
        t.set_price(1_000_000);
        let cells = vec![
            Cell::new(0, "Go", CellKind::Go),
            Cell::new(0, "Alpha", CellKind::Property(a)),
            Cell::new(0, "Beta", CellKind::Property(b)),
            Cell::new(0, "Jail", CellKind::Jail),
            Cell::new(0, "Rail", CellKind::Property(t)),
            Cell::new(0, "Tax", CellKind::Tax { amount: Some(100) }),
        ];
        let groups = vec![Group::new("Brown", 94), Group::new("Transport", 90)];
        Board::new(cells, groups).unwrap()
    }

    #[test]
    fn positions_and_groups_are_wired() {
        let board = small_board();
        assert_eq!(board.len(), 6);
        assert_eq!(board.go_position(), 0);
        assert_eq!(board.jail_position(), 3);
        assert_eq!(board.group(0).unwrap().members, vec![1, 2]);
        assert_eq!(board.find_property("beta"), Some(2));
        assert_eq!(board.find_property("Tax"), None);
    }

    #[test]
    fn wrap_handles_negative_positions() {
        let board = small_board();
        assert_eq!(board.wrap(7), 1);
        assert_eq!(board.wrap(-1), 5);
        assert_eq!(board.wrap(6), 0);
    }

    #[test]
    fn monopoly_requires_whole_group_and_never_bank() {
        let mut board = small_board();
        let p = Owner::Player(PlayerId(0));
        assert!(!board.is_monopoly(0, Owner::Bank));
        board.property_mut(1).unwrap().owner = p;
        assert!(!board.is_monopoly(0, p));
        board.property_mut(2).unwrap().owner = p;
        assert!(board.is_monopoly(0, p));
        assert_eq!(board.owned_by(p), vec![1, 2]);
    }

    #[test]
    fn relocation_counts_visits() {
        let mut board = small_board();
        let id = PlayerId(3);
        board.place(id, 0).unwrap();
        board.relocate(id, 0, 4).unwrap();
        assert!(board.cell(0).unwrap().occupants().is_empty());
        assert_eq!(board.cell(4).unwrap().occupants(), &[id]);
        assert_eq!(board.cell(4).unwrap().visits(), 1);
        assert!(board.remove_avatar(id));
        assert_eq!(board.avatar_count(), 0);
    }

    #[test]
    fn missing_derived_values_are_fatal() {
        let board = small_board();
        assert!(board.go_bonus().is_err());
        assert!(board.bail().is_err());
    }

    #[test]
    fn board_needs_go_and_jail() {
        let cells = vec![Cell::new(0, "Go", CellKind::Go)];
        assert_eq!(
            Board::new(cells, vec![]).unwrap_err(),
            FatalError::Unset("Jail cell")
        );
    }
}
