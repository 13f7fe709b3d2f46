//! Board file parser.
//!
//! ```text
//! # comment
//! group: Brown, 94
//! Go
//! Old Kent Road, 1
//! Community
//! Electric Company, 9, Service
//! ```
//!
//! Groups are numbered from 1 in declaration order and must be declared
//! before use. A line with a comma is a property (`name, group[, kind]`), a
//! single word is a special cell.

use crate::ConfigError;
use monopoly_core::{Board, Cell, CellKind, Group, Property, PropertyKind};

fn special(word: &str) -> Option<CellKind> {
    let kind = match word.to_ascii_lowercase().as_str() {
        "go" => CellKind::Go,
        "jail" => CellKind::Jail,
        "gotojail" => CellKind::GoToJail,
        "tax" => CellKind::Tax { amount: None },
        "parking" => CellKind::Parking,
        "chance" => CellKind::Chance,
        "community" => CellKind::Community,
        _ => return None,
    };
    Some(kind)
}

fn property_kind(word: &str) -> Option<PropertyKind> {
    match word.to_ascii_lowercase().as_str() {
        "solar" => Some(PropertyKind::Solar),
        "service" => Some(PropertyKind::Service),
        "transport" => Some(PropertyKind::Transport),
        _ => None,
    }
}

pub fn parse_board(file: &str, text: &str) -> Result<Board, ConfigError> {
    let mut groups: Vec<Group> = Vec::new();
    let mut cells: Vec<Cell> = Vec::new();
    let mut seen_go = false;
    let mut seen_jail = false;
    let mut solars = 0;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let err = |msg: String| ConfigError::syntax(file, line_no, msg);

        if let Some(rest) = line.strip_prefix("group:") {
            let (name, color) = rest
                .split_once(',')
                .ok_or_else(|| err("expected `group: Name, colorCode`".into()))?;
            let color = color
                .trim()
                .parse::<u8>()
                .map_err(|_| err(format!("invalid color code `{}`", color.trim())))?;
            groups.push(Group::new(name.trim(), color));
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let cell = match fields.as_slice() {
            [word] => {
                let kind = special(word).ok_or_else(|| err(format!("unknown cell `{word}`")))?;
                match kind {
                    CellKind::Go if seen_go => return Err(err("a second Go cell".into())),
                    CellKind::Jail if seen_jail => return Err(err("a second Jail cell".into())),
                    CellKind::Go => seen_go = true,
                    CellKind::Jail => seen_jail = true,
                    _ => {}
                }
                Cell::new(cells.len(), *word, kind)
            }
            [name, group, rest @ ..] if rest.len() <= 1 => {
                if name.is_empty() {
                    return Err(err("property without a name".into()));
                }
                let number = group
                    .parse::<usize>()
                    .map_err(|_| err(format!("invalid group number `{group}`")))?;
                if number == 0 || number > groups.len() {
                    return Err(err(format!("group {number} is not declared")));
                }
                let kind = match rest.first() {
                    Some(word) => property_kind(word)
                        .ok_or_else(|| err(format!("unknown property kind `{word}`")))?,
                    None => PropertyKind::Solar,
                };
                if kind == PropertyKind::Solar {
                    solars += 1;
                }
                let property = Property::new(*name, kind, number - 1);
                Cell::new(cells.len(), *name, CellKind::Property(property))
            }
            _ => return Err(err("expected `Name, group[, kind]`".into())),
        };
        cells.push(cell);
    }

    if !seen_go || !seen_jail {
        return Err(ConfigError::invalid(file, "the board needs one Go and one Jail cell"));
    }
    if solars == 0 {
        return Err(ConfigError::invalid(file, "the board needs at least one solar"));
    }
    Board::new(cells, groups).map_err(|e| ConfigError::invalid(file, e.to_string()))
}
