//! Avatar movement state machine.
//!
//! An avatar is Free, Jailed, or done for the turn (no throws left). Every
//! call to [`Avatar::advance`] is validated before anything changes, then
//! produces a [`Step`] that the game applies to the board and the ledger.
//! The avatar itself never touches money or cells.

use crate::dice::Dice;
use crate::error::{CommandError, GameError};
use crate::movement::{BallMovement, CarMovement, HatMovement, MovementStrategy, SphinxMovement};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consecutive doubles that send an avatar to jail.
pub const MAX_DOUBLES: u32 = 3;
/// Jailed turns after which bail becomes due.
pub const MAX_JAIL_TURNS: u32 = 3;
/// Turn ends a Car must wait after moving backward (including the current one).
pub const CAR_COOLDOWN: u32 = 3;

/// The four avatar kinds, differing only in their special movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Car,
    Ball,
    Sphinx,
    Hat,
}

impl Archetype {
    pub fn parse(s: &str) -> Result<Self, CommandError> {
        match s.to_ascii_lowercase().as_str() {
            "car" => Ok(Archetype::Car),
            "ball" => Ok(Archetype::Ball),
            "sphinx" => Ok(Archetype::Sphinx),
            "hat" => Ok(Archetype::Hat),
            _ => Err(CommandError::UnknownArchetype(s.to_string())),
        }
    }

    pub fn strategy(&self) -> &'static dyn MovementStrategy {
        match self {
            Archetype::Car => &CarMovement,
            Archetype::Ball => &BallMovement,
            Archetype::Sphinx => &SphinxMovement,
            Archetype::Hat => &HatMovement,
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Archetype::Car => "car",
            Archetype::Ball => "ball",
            Archetype::Sphinx => "sphinx",
            Archetype::Hat => "hat",
        };
        f.write_str(s)
    }
}

/// A Ball movement split into hops, remembered between throws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingHop {
    /// Cells left before the remembered target.
    pub remaining: u8,
    /// Dice of the throw that started the movement.
    pub dice: Dice,
}

/// What a single advance produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Still in jail; the turn is over.
    StillJailed(Dice),
    /// Released by a double; one fresh throw granted.
    Released(Dice),
    /// Third jailed turn: released, and bail must be charged.
    BailDue(Dice),
    /// The avatar is now jailed and must be moved to the Jail cell.
    SentToJail(Dice),
    /// Move from `from` to the unbounded `target`; a target past the board
    /// end crossed Go forward, a negative one crossed it backward.
    Move { from: usize, target: i64, dice: Dice },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Avatar {
    pub id: char,
    pub archetype: Archetype,
    pub(crate) position: usize,
    pub(crate) jailed: bool,
    pub(crate) jail_turns: u32,
    pub(crate) doubles: u32,
    pub(crate) throws: u32,
    pub(crate) special: bool,
    pub(crate) history: Vec<usize>,
    pub(crate) cooldown: u32,
    pub(crate) can_buy: bool,
    pub(crate) pending: Option<PendingHop>,
}

impl Avatar {
    pub fn new(id: char, archetype: Archetype, start: usize) -> Self {
        Self {
            id,
            archetype,
            position: start,
            jailed: false,
            jail_turns: 0,
            doubles: 0,
            throws: 1,
            special: false,
            history: vec![start],
            cooldown: 0,
            can_buy: true,
            pending: None,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_jailed(&self) -> bool {
        self.jailed
    }

    pub fn jail_turns(&self) -> u32 {
        self.jail_turns
    }

    pub fn doubles(&self) -> u32 {
        self.doubles
    }

    pub fn throws_remaining(&self) -> u32 {
        self.throws
    }

    pub fn is_special(&self) -> bool {
        self.special
    }

    pub fn history(&self) -> &[usize] {
        &self.history
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn pending(&self) -> Option<PendingHop> {
        self.pending
    }

    /// Throws a fresh turn starts with.
    fn turn_throws(&self) -> u32 {
        if self.special && !self.jailed {
            self.archetype.strategy().special_throws()
        } else {
            1
        }
    }

    /// Rolls (`Some`) or continues a pending movement (`None`).
    pub fn advance(&mut self, roll: Option<Dice>) -> Result<Step, GameError> {
        self.check_advance(roll.is_some())?;
        self.throws -= 1;
        let strategy = self.archetype.strategy();
        let step = match roll {
            None => strategy.resume(self)?,
            Some(dice) if self.jailed => self.jail_roll(dice),
            Some(dice) if self.special && self.doubles == 0 => strategy.special_step(self, dice),
            Some(dice) => self.basic_step(dice),
        };
        tracing::debug!(avatar = %self.id, ?step, "advance");
        Ok(step)
    }

    /// Checks that a fresh roll would be accepted, without consuming a throw.
    pub fn check_roll(&self) -> Result<(), CommandError> {
        self.check_advance(true)
    }

    fn check_advance(&self, rolling: bool) -> Result<(), CommandError> {
        if self.cooldown > 0 {
            return Err(CommandError::Cooldown(self.cooldown));
        }
        if self.throws == 0 {
            return Err(CommandError::NoThrowsLeft);
        }
        match rolling {
            false if self.jailed => Err(CommandError::ContinueWhileJailed),
            false if self.pending.is_none() && self.doubles > 0 => {
                Err(CommandError::ContinueAfterDoubles)
            }
            false if self.pending.is_none() => Err(CommandError::NothingToContinue),
            true if self.pending.is_some() => Err(CommandError::PendingMovement),
            _ => Ok(()),
        }
    }

    fn jail_roll(&mut self, dice: Dice) -> Step {
        self.jail_turns += 1;
        if dice.is_double() {
            self.release();
            Step::Released(dice)
        } else if self.jail_turns >= MAX_JAIL_TURNS {
            self.release();
            Step::BailDue(dice)
        } else {
            Step::StillJailed(dice)
        }
    }

    pub(crate) fn basic_step(&mut self, dice: Dice) -> Step {
        if self.apply_doubles(dice) {
            return Step::SentToJail(dice);
        }
        self.step_by(i64::from(dice.sum()), dice)
    }

    pub(crate) fn step_by(&self, delta: i64, dice: Dice) -> Step {
        Step::Move {
            from: self.position,
            target: self.position as i64 + delta,
            dice,
        }
    }

    /// Counts a double: an extra throw, or jail on the third in a row.
    /// Returns true when the avatar was jailed.
    pub(crate) fn apply_doubles(&mut self, dice: Dice) -> bool {
        if !dice.is_double() {
            self.doubles = 0;
            return false;
        }
        self.doubles += 1;
        if self.doubles >= MAX_DOUBLES {
            self.imprison();
            return true;
        }
        self.throws += 1;
        false
    }

    /// Marks the avatar as jailed and ends its turn. The caller moves it to
    /// the Jail cell.
    pub fn imprison(&mut self) {
        self.jailed = true;
        self.jail_turns = 0;
        self.doubles = 0;
        self.throws = 0;
        self.pending = None;
    }

    fn release(&mut self) {
        self.jailed = false;
        self.jail_turns = 0;
        self.throws = 1;
    }

    /// Voluntary release after bail was paid.
    pub fn release_on_bail(&mut self) -> Result<(), CommandError> {
        if !self.jailed {
            return Err(CommandError::NotJailed);
        }
        self.release();
        Ok(())
    }

    pub fn check_bail(&self) -> Result<(), CommandError> {
        if self.jailed {
            Ok(())
        } else {
            Err(CommandError::NotJailed)
        }
    }

    /// Records the arrival on a cell.
    pub fn land(&mut self, position: usize) {
        self.position = position;
        self.history.push(position);
    }

    pub fn toggle_mode(&mut self) -> Result<bool, CommandError> {
        let special_throws = self.archetype.strategy().special_throws();
        let mid_sequence = self.special && (1..special_throws).contains(&self.throws);
        if self.pending.is_some() || mid_sequence {
            return Err(CommandError::ModeChangeMidMove);
        }
        self.special = !self.special;
        if self.throws > 0 && self.doubles == 0 && !self.jailed {
            self.throws = self.turn_throws();
        }
        Ok(self.special)
    }

    /// Whether a purchase is allowed right now. A Car in special mode buys
    /// at most once per turn.
    pub fn may_buy(&self) -> bool {
        !(self.archetype == Archetype::Car && self.special) || self.can_buy
    }

    pub fn record_purchase(&mut self) {
        self.can_buy = false;
    }

    pub fn check_end_turn(&self) -> Result<(), CommandError> {
        if self.throws > 0 && self.cooldown == 0 {
            return Err(CommandError::ThrowsRemaining(self.id.to_string(), self.throws));
        }
        Ok(())
    }

    pub fn end_turn(&mut self) -> Result<(), CommandError> {
        self.check_end_turn()?;
        self.cooldown = self.cooldown.saturating_sub(1);
        self.doubles = 0;
        self.can_buy = true;
        self.pending = None;
        self.throws = self.turn_throws();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dice(a: u8, b: u8) -> Dice {
        Dice::new(a, b).unwrap()
    }

    /// Applies a move the way the game does, wrapping on a 40 cell board.
    fn walk(avatar: &mut Avatar, roll: Option<Dice>) -> Step {
        let step = avatar.advance(roll).unwrap();
        match step {
            Step::Move { target, .. } => avatar.land(target.rem_euclid(40) as usize),
            Step::SentToJail(_) => avatar.land(10),
            _ => {}
        }
        step
    }

    #[test]
    fn three_doubles_send_to_jail() {
        let mut a = Avatar::new('A', Archetype::Hat, 0);
        walk(&mut a, Some(dice(3, 3)));
        assert_eq!((a.position(), a.doubles(), a.throws_remaining()), (6, 1, 1));
        walk(&mut a, Some(dice(2, 2)));
        assert_eq!((a.position(), a.doubles(), a.throws_remaining()), (10, 2, 1));
        let step = walk(&mut a, Some(dice(1, 1)));
        assert_eq!(step, Step::SentToJail(dice(1, 1)));
        assert!(a.is_jailed());
        assert_eq!(a.throws_remaining(), 0);
        assert_eq!(a.history(), &[0, 6, 10, 10]);
    }

    #[test]
    fn rejected_advance_leaves_state_untouched() {
        let mut a = Avatar::new('A', Archetype::Sphinx, 0);
        walk(&mut a, Some(dice(2, 3)));
        let before = a.clone();
        assert_eq!(
            a.advance(Some(dice(1, 2))),
            Err(CommandError::NoThrowsLeft.into())
        );
        assert_eq!(a.history(), before.history());
        assert_eq!(a.throws_remaining(), 0);
    }

    #[test]
    fn check_roll_matches_advance_without_spending() {
        let mut a = Avatar::new('A', Archetype::Hat, 0);
        assert_eq!(a.check_roll(), Ok(()));
        assert_eq!(a.throws_remaining(), 1);
        walk(&mut a, Some(dice(1, 3)));
        assert_eq!(a.check_roll(), Err(CommandError::NoThrowsLeft));

        let mut car = Avatar::new('C', Archetype::Car, 0);
        car.cooldown = 2;
        assert_eq!(car.check_roll(), Err(CommandError::Cooldown(2)));
    }

    #[test]
    fn continue_is_rejected_without_pending_movement() {
        let mut a = Avatar::new('A', Archetype::Ball, 0);
        assert_eq!(a.advance(None), Err(CommandError::NothingToContinue.into()));
        walk(&mut a, Some(dice(2, 2)));
        assert_eq!(a.advance(None), Err(CommandError::ContinueAfterDoubles.into()));
        a.imprison();
        a.throws = 1;
        assert_eq!(a.advance(None), Err(CommandError::ContinueWhileJailed.into()));
    }

    #[test]
    fn jail_releases_on_double_or_third_turn() {
        let mut a = Avatar::new('A', Archetype::Hat, 10);
        a.imprison();
        a.end_turn().unwrap();
        assert_eq!(walk(&mut a, Some(dice(1, 2))), Step::StillJailed(dice(1, 2)));
        a.end_turn().unwrap();
        assert_eq!(walk(&mut a, Some(dice(4, 4))), Step::Released(dice(4, 4)));
        assert!(!a.is_jailed());
        assert_eq!(a.throws_remaining(), 1);

        let mut b = Avatar::new('B', Archetype::Hat, 10);
        b.imprison();
        for _ in 0..2 {
            b.end_turn().unwrap();
            walk(&mut b, Some(dice(1, 2)));
        }
        b.end_turn().unwrap();
        assert_eq!(walk(&mut b, Some(dice(5, 6))), Step::BailDue(dice(5, 6)));
        assert!(!b.is_jailed());
        assert_eq!(b.throws_remaining(), 1);
    }

    #[test]
    fn bail_requires_jail() {
        let mut a = Avatar::new('A', Archetype::Car, 0);
        assert_eq!(a.release_on_bail(), Err(CommandError::NotJailed));
        a.imprison();
        a.release_on_bail().unwrap();
        assert!(!a.is_jailed());
        assert_eq!(a.throws_remaining(), 1);
    }

    #[test]
    fn end_turn_requires_spent_throws() {
        let mut a = Avatar::new('A', Archetype::Hat, 0);
        assert!(matches!(
            a.end_turn(),
            Err(CommandError::ThrowsRemaining(_, 1))
        ));
        walk(&mut a, Some(dice(1, 3)));
        a.end_turn().unwrap();
        assert_eq!(a.throws_remaining(), 1);
        assert_eq!(a.doubles(), 0);
    }

    #[test]
    fn car_mode_switch_resets_throw_budget() {
        let mut a = Avatar::new('C', Archetype::Car, 0);
        assert!(a.toggle_mode().unwrap());
        assert_eq!(a.throws_remaining(), 4);
        walk(&mut a, Some(dice(2, 3)));
        assert_eq!(a.toggle_mode(), Err(CommandError::ModeChangeMidMove));
        assert!(a.is_special());
    }

    #[test]
    fn car_purchase_limit_only_in_special_mode() {
        let mut a = Avatar::new('C', Archetype::Car, 0);
        a.record_purchase();
        assert!(a.may_buy());
        a.toggle_mode().unwrap();
        assert!(!a.may_buy());
        a.throws = 0;
        a.end_turn().unwrap();
        assert!(a.may_buy());
    }

    proptest! {
        #[test]
        fn basic_mode_never_exceeds_one_throw(rolls in prop::collection::vec((1u8..=6, 1u8..=6), 1..40)) {
            let mut a = Avatar::new('P', Archetype::Hat, 0);
            for (x, y) in rolls {
                if a.throws_remaining() == 0 {
                    a.end_turn().unwrap();
                }
                walk(&mut a, Some(dice(x, y)));
                prop_assert!(a.throws_remaining() <= 1);
                prop_assert!(a.doubles() < MAX_DOUBLES);
                prop_assert!(a.position() < 40);
            }
        }
    }
}
