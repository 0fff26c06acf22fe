//! Operations that rework an existing [`Roll`].
//!
//! All of them leave the kept values sorted ascending and record whatever
//! they remove or overwrite as discards.

use super::{
    ctx::RollContext,
    num::Number,
    roller::Roller,
    value::{Die, Roll},
};
use crate::error::{RResult, RollError};

/// Which kept values a reroll applies to, relative to its target.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Compare {
    Equal,
    Lower,
    Higher,
}

impl Compare {
    pub fn matches(self, value: Number, target: Number) -> bool {
        match self {
            Self::Equal => value == target,
            Self::Lower => value < target,
            Self::Higher => value > target,
        }
    }
}

impl Die {
    /// Whether some face of this die does not match `cmp` against `target`.
    /// Numbered dice have exactly the faces `1..=n`, so no scan is needed.
    pub(crate) fn can_escape(&self, cmp: Compare, target: Number) -> bool {
        match self {
            Self::Sides(n) => match cmp {
                Compare::Equal => n.get() > 1 || target != Number::ONE,
                Compare::Lower => Number::from(n.get()) >= target,
                Compare::Higher => target >= Number::ONE,
            },
            Self::Faces(faces) => faces
                .as_slice()
                .iter()
                .any(|&x| !cmp.matches(x, target)),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Repeat {
    Once,
    Always,
}

impl Roll {
    /// Keep the `n` highest values. Does nothing if there are `n` or fewer.
    pub fn keep_high(&mut self, n: usize) {
        if self.len() > n {
            let dropped = self.len() - n;
            self.discards.extend(self.rolls.drain(..dropped));
        }
    }

    /// Keep the `n` lowest values. Does nothing if there are `n` or fewer.
    pub fn keep_low(&mut self, n: usize) {
        if self.len() > n {
            self.discards.extend(self.rolls.drain(n..));
        }
    }

    /// Raise every value below `bound` up to it.
    pub fn floor(&mut self, bound: Number) {
        self.clamp_where(bound, |x| x < bound);
    }

    /// Lower every value above `bound` down to it.
    pub fn ceil(&mut self, bound: Number) {
        self.clamp_where(bound, |x| x > bound);
    }

    fn clamp_where(&mut self, bound: Number, pred: impl Fn(Number) -> bool) {
        for i in 0..self.rolls.len() {
            if pred(self.rolls[i]) {
                let old = std::mem::replace(&mut self.rolls[i], bound);
                self.discards.push(old);
            }
        }
        self.sort();
    }

    /// Count successes: every value becomes 1 if it is at least `target`
    /// (or at most, with `Compare::Lower`), otherwise 0.
    pub fn threshold(&mut self, target: Number, direction: Compare) {
        let successes = self
            .rolls
            .iter()
            .map(|&x| match direction {
                Compare::Lower => Number::from_bool(x <= target),
                _ => Number::from_bool(x >= target),
            })
            .collect();
        let originals = std::mem::replace(&mut self.rolls, successes);
        self.discards.extend(originals);
        self.sort();
    }

    /// Reroll values matching `cmp` against `target`, either once or until
    /// they stop matching.
    pub fn reroll<R: Roller>(
        &mut self,
        ctx: &mut RollContext<R>,
        target: Number,
        cmp: Compare,
        repeat: Repeat,
    ) -> RResult<()> {
        if repeat == Repeat::Always && !self.die.can_escape(cmp, target) {
            return Err(RollError::value_error(format!(
                "every face of {} would be rerolled forever",
                self.die
            )));
        }
        for i in 0..self.rolls.len() {
            while cmp.matches(self.rolls[i], target) {
                let new = ctx.single_die(&self.die)?;
                self.replace(i, new)?;
                if repeat == Repeat::Once {
                    break;
                }
            }
        }
        self.sort();
        Ok(())
    }
}
