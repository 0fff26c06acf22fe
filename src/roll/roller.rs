use crate::common::{NonZeroUInt, UInt};
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};

/// A source of die outcomes.
///
/// Every [`rand::Rng`] is a `Roller`; tests substitute deterministic ones.
pub trait Roller {
    /// Roll a single die, returning a value in `1..=sides`.
    fn roll(&mut self, sides: NonZeroUInt) -> UInt;

    fn roll_n(&mut self, num: usize, sides: NonZeroUInt) -> Vec<UInt> {
        (0..num).map(|_| self.roll(sides)).collect()
    }
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        self.gen_range(1..=sides.get())
    }

    fn roll_n(&mut self, num: usize, sides: NonZeroUInt) -> Vec<UInt> {
        Uniform::new_inclusive(1, sides.get())
            .sample_iter(self)
            .take(num)
            .collect()
    }
}

#[cfg(test)]
pub(crate) use sequence::SequenceRoller;
