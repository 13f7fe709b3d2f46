//! Special movement modes of the avatar archetypes.

use crate::avatar::{Avatar, PendingHop, Step, CAR_COOLDOWN};
use crate::dice::Dice;
use crate::error::FatalError;

/// Throw sums below this move the avatar backward in special mode.
const BACKWARD_BELOW: u8 = 4;
/// Length of the first Ball hop.
const BALL_FIRST_HOP: u8 = 5;
/// Maximum length of every following Ball hop.
const BALL_HOP: u8 = 2;

/// Special-mode behaviour of an archetype. Basic mode is shared and lives on
/// [`Avatar`]; a strategy only decides what a throw means in special mode.
pub trait MovementStrategy: Sync {
    /// Throws granted per turn in special mode.
    fn special_throws(&self) -> u32 {
        1
    }

    /// Interprets a throw. The throw counter was already decremented.
    fn special_step(&self, avatar: &mut Avatar, dice: Dice) -> Step;

    /// Continues a movement started by an earlier throw.
    fn resume(&self, _avatar: &mut Avatar) -> Result<Step, FatalError> {
        Err(FatalError::Invariant(
            "this archetype has no multi-step movement".into(),
        ))
    }
}

/// Backward on low throws; doubles rule otherwise.
fn backward_or(avatar: &mut Avatar, dice: Dice, forward: i64) -> Step {
    if avatar.apply_doubles(dice) {
        return Step::SentToJail(dice);
    }
    if dice.sum() < BACKWARD_BELOW {
        avatar.step_by(-i64::from(dice.sum()), dice)
    } else {
        avatar.step_by(forward, dice)
    }
}

/// Four throws per turn. A low throw reverses the car and stalls it.
pub struct CarMovement;

impl MovementStrategy for CarMovement {
    fn special_throws(&self) -> u32 {
        4
    }

    fn special_step(&self, avatar: &mut Avatar, dice: Dice) -> Step {
        if dice.sum() < BACKWARD_BELOW {
            avatar.throws = 0;
            avatar.cooldown = CAR_COOLDOWN;
            return avatar.step_by(-i64::from(dice.sum()), dice);
        }
        if avatar.throws == 0 && avatar.apply_doubles(dice) {
            return Step::SentToJail(dice);
        }
        avatar.step_by(i64::from(dice.sum()), dice)
    }
}

/// Long throws bounce across the board, one hop per throw.
pub struct BallMovement;

impl MovementStrategy for BallMovement {
    fn special_step(&self, avatar: &mut Avatar, dice: Dice) -> Step {
        let sum = dice.sum();
        if sum <= BALL_FIRST_HOP {
            return backward_or(avatar, dice, i64::from(sum));
        }
        avatar.pending = Some(PendingHop {
            remaining: sum - BALL_FIRST_HOP,
            dice,
        });
        avatar.throws = 1;
        avatar.step_by(i64::from(BALL_FIRST_HOP), dice)
    }

    fn resume(&self, avatar: &mut Avatar) -> Result<Step, FatalError> {
        let pending = avatar
            .pending
            .take()
            .ok_or_else(|| FatalError::Invariant("ball resumed without a pending hop".into()))?;
        let hop = pending.remaining.min(BALL_HOP);
        if hop == 0 {
            return Err(FatalError::Invariant("ball hop of zero cells".into()));
        }
        let remaining = pending.remaining - hop;
        if remaining > 0 {
            avatar.pending = Some(PendingHop {
                remaining,
                dice: pending.dice,
            });
            avatar.throws = 1;
        } else if avatar.apply_doubles(pending.dice) {
            return Ok(Step::SentToJail(pending.dice));
        }
        Ok(avatar.step_by(i64::from(hop), pending.dice))
    }
}

/// Backward on low throws, forward by the sum otherwise.
pub struct SphinxMovement;

impl MovementStrategy for SphinxMovement {
    fn special_step(&self, avatar: &mut Avatar, dice: Dice) -> Step {
        backward_or(avatar, dice, i64::from(dice.sum()))
    }
}

/// Backward on low throws, otherwise forward to the next even count.
pub struct HatMovement;

impl MovementStrategy for HatMovement {
    fn special_step(&self, avatar: &mut Avatar, dice: Dice) -> Step {
        let sum = i64::from(dice.sum());
        backward_or(avatar, dice, (sum + 1) / 2 * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::Archetype;
    use crate::error::{CommandError, GameError};

    fn dice(a: u8, b: u8) -> Dice {
        Dice::new(a, b).unwrap()
    }

    fn special(archetype: Archetype, at: usize) -> Avatar {
        let mut a = Avatar::new('X', archetype, at);
        a.toggle_mode().unwrap();
        a
    }

    fn land(a: &mut Avatar, step: Step) {
        if let Step::Move { target, .. } = step {
            a.land(target.rem_euclid(40) as usize);
        }
    }

    #[test]
    fn car_moves_four_times_then_applies_doubles() {
        let mut a = special(Archetype::Car, 0);
        for roll in [dice(2, 3), dice(3, 3), dice(4, 2)] {
            let step = a.advance(Some(roll)).unwrap();
            land(&mut a, step);
        }
        assert_eq!(a.position(), 17);
        assert_eq!(a.doubles(), 0);
        let step = a.advance(Some(dice(5, 5))).unwrap();
        land(&mut a, step);
        assert_eq!(a.position(), 27);
        assert_eq!(a.doubles(), 1);
        assert_eq!(a.throws_remaining(), 1);
    }

    #[test]
    fn car_backward_throw_stalls_two_turns() {
        let mut a = special(Archetype::Car, 12);
        let step = a.advance(Some(dice(1, 2))).unwrap();
        assert_eq!(
            step,
            Step::Move { from: 12, target: 9, dice: dice(1, 2) }
        );
        assert_eq!(a.throws_remaining(), 0);
        a.end_turn().unwrap();
        for _ in 0..2 {
            assert!(matches!(
                a.advance(Some(dice(3, 4))),
                Err(GameError::Command(CommandError::Cooldown(_)))
            ));
            a.end_turn().unwrap();
        }
        assert!(a.advance(Some(dice(3, 4))).is_ok());
    }

    #[test]
    fn ball_hops_to_its_target() {
        let mut a = special(Archetype::Ball, 0);
        let step = a.advance(Some(dice(6, 5))).unwrap();
        assert_eq!(step, Step::Move { from: 0, target: 5, dice: dice(6, 5) });
        land(&mut a, step);
        assert_eq!(a.pending().map(|p| p.remaining), Some(6));
        assert_eq!(
            a.advance(Some(dice(1, 1))),
            Err(CommandError::PendingMovement.into())
        );
        let mut stops = Vec::new();
        while a.pending().is_some() {
            let step = a.advance(None).unwrap();
            land(&mut a, step);
            stops.push(a.position());
        }
        assert_eq!(stops, vec![7, 9, 11]);
        assert_eq!(a.throws_remaining(), 0);
        assert!(a.toggle_mode().is_ok());
    }

    #[test]
    fn ball_arrival_applies_remembered_double() {
        let mut a = special(Archetype::Ball, 0);
        let step = a.advance(Some(dice(4, 4))).unwrap();
        land(&mut a, step);
        assert_eq!(a.toggle_mode(), Err(CommandError::ModeChangeMidMove));
        let step = a.advance(None).unwrap();
        land(&mut a, step);
        let step = a.advance(None).unwrap();
        land(&mut a, step);
        assert_eq!(a.position(), 8);
        assert_eq!(a.doubles(), 1);
        assert_eq!(a.throws_remaining(), 1);
    }

    #[test]
    fn low_throws_go_backward() {
        for archetype in [Archetype::Ball, Archetype::Sphinx, Archetype::Hat] {
            let mut a = special(archetype, 20);
            let step = a.advance(Some(dice(1, 2))).unwrap();
            assert_eq!(step, Step::Move { from: 20, target: 17, dice: dice(1, 2) });
        }
    }

    #[test]
    fn hat_rounds_up_to_even() {
        let mut a = special(Archetype::Hat, 0);
        let step = a.advance(Some(dice(3, 4))).unwrap();
        assert_eq!(step, Step::Move { from: 0, target: 8, dice: dice(3, 4) });
        let mut b = special(Archetype::Sphinx, 0);
        let step = b.advance(Some(dice(3, 4))).unwrap();
        assert_eq!(step, Step::Move { from: 0, target: 7, dice: dice(3, 4) });
    }
}
