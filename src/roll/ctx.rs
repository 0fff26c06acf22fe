use super::{
    num::Number,
    roller::Roller,
    value::{Die, Roll},
};
use crate::common::*;
use crate::error::{RResult, RollError};

pub type DefaultRoller = rand::prelude::ThreadRng;

/// Number of dice an evaluation may produce unless told otherwise.
pub const DEFAULT_MAX_ROLLS: usize = 10_000;

/// Everything an evaluation needs besides the tree: the randomness source
/// and the budget of dice it may produce.
pub struct RollContext<R = DefaultRoller> {
    max_rolls: Option<usize>,
    rolls: usize,
    roller: R,
}

impl<R: Roller> RollContext<R> {
    pub fn new(max_rolls: Option<usize>, roller: R) -> Self {
        Self {
            max_rolls,
            rolls: 0,
            roller,
        }
    }

    pub fn new_bounded(max_rolls: usize, roller: R) -> Self {
        Self::new(Some(max_rolls), roller)
    }

    pub fn new_unbounded(roller: R) -> Self {
        Self::new(None, roller)
    }

    /// Dice produced since the last reset.
    pub fn rolls(&self) -> usize {
        self.rolls
    }

    pub fn reset(&mut self) {
        self.rolls = 0;
    }

    pub fn roller_mut(&mut self) -> &mut R {
        &mut self.roller
    }

    pub(crate) fn count_rolls(&mut self, n: usize) -> RResult<()> {
        self.rolls = self.rolls.saturating_add(n);
        if self.max_rolls.map_or(false, |max| self.rolls > max) {
            Err(RollError::TooManyRolls)
        } else {
            Ok(())
        }
    }

    /// Roll one die, counted against the budget.
    pub fn single_die(&mut self, die: &Die) -> RResult<Number> {
        self.count_rolls(1)?;
        let value = match die {
            Die::Sides(sides) => self.roller.roll(*sides).into(),
            Die::Faces(faces) => faces.as_slice()[self.face_index(faces.len())?],
        };
        log::trace!("rolled {} on a {}", value, die);
        Ok(value)
    }

    /// Roll `num` dice into a sorted [`Roll`].
    pub fn roll_dice(&mut self, num: usize, die: Die) -> RResult<Roll> {
        self.count_rolls(num)?;
        let rolls = match &die {
            Die::Sides(sides) => self
                .roller
                .roll_n(num, *sides)
                .into_iter()
                .map(Number::from)
                .collect(),
            Die::Faces(faces) => {
                let sides = Self::index_sides(faces.len())?;
                self.roller
                    .roll_n(num, sides)
                    .into_iter()
                    .map(|i| faces.as_slice()[i as usize - 1])
                    .collect()
            }
        };
        let roll = Roll::new(rolls, die);
        log::debug!("rolled {}", roll);
        Ok(roll)
    }

    fn face_index(&mut self, len: usize) -> RResult<usize> {
        let sides = Self::index_sides(len)?;
        Ok(self.roller.roll(sides) as usize - 1)
    }

    fn index_sides(len: usize) -> RResult<NonZeroUInt> {
        UInt::try_from(len)
            .ok()
            .and_then(NonZeroUInt::new)
            .ok_or_else(|| RollError::value_error(format!("cannot roll a die with {} faces", len)))
    }
}

impl Default for RollContext {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_ROLLS), rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use crate::roll::roller::SequenceRoller;
    use crate::roll::value::Faces;

    fn d(n: UInt) -> Die {
        Die::Sides(NonZeroUInt::new(n).unwrap())
    }

    #[test]
    fn test_roll_dice_sorted() {
        let mut ctx = RollContext::new_unbounded(SequenceRoller::new([4, 1, 3, 2]));
        let roll = ctx.roll_dice(4, d(6)).unwrap();
        assert_eq!(roll.rolls(), ints(&[1, 2, 3, 4]).as_slice());
        assert_eq!(ctx.rolls(), 4);
    }

    #[test]
    fn test_roll_faces() {
        let mut ctx = RollContext::new_unbounded(SequenceRoller::new([3, 1, 2]));
        let roll = ctx.roll_dice(2, Die::Faces(Faces::fudge())).unwrap();
        assert_eq!(roll.rolls(), ints(&[-1, 1]).as_slice());
        assert_eq!(ctx.single_die(&Die::Faces(Faces::fudge())).unwrap(), 0);
    }

    #[test]
    fn test_too_many_rolls() {
        let mut ctx = RollContext::new_bounded(5, SequenceRoller::constant(1));
        assert!(ctx.roll_dice(5, d(6)).is_ok());
        assert_eq!(ctx.single_die(&d(6)), Err(RollError::TooManyRolls));
        ctx.reset();
        assert_eq!(ctx.roll_dice(6, d(6)), Err(RollError::TooManyRolls));
    }
}
