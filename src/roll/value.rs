use super::num::Number;
use crate::common::*;
use crate::error::{RResult, RollError};
use enum_dispatch::enum_dispatch;
use std::fmt;

/// A non-empty list of die faces, e.g. `[1, 1, 6]`. The fudge die `F` is
/// `[-1, 0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Faces(NonEmpty<Number>);

impl Faces {
    pub fn new(faces: NonEmpty<Number>) -> Self {
        Self(faces)
    }

    pub fn fudge() -> Self {
        Self(vec1::vec1![Number::Int(-1), Number::ZERO, Number::ONE])
    }

    pub fn is_fudge(&self) -> bool {
        *self == Self::fudge()
    }

    pub fn as_slice(&self) -> &[Number] {
        self.0.as_slice()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn max(&self) -> Number {
        self.0
            .iter()
            .copied()
            .fold(*self.0.first(), |a, b| if b > a { b } else { a })
    }

    pub fn mean(&self) -> Number {
        let sum: Number = self.0.iter().sum();
        Number::Float(sum.as_float() / self.len() as Float)
    }

    /// Parse the inside of a bracketed face list, e.g. `"1, 2.5, -3"`.
    pub(crate) fn parse_list(s: &str) -> Option<Self> {
        let faces = s
            .split(',')
            .map(|face| {
                let face = face.trim();
                if face.contains('.') {
                    face.parse::<Float>().ok().map(Number::Float)
                } else {
                    face.parse::<Int>().ok().map(Number::Int)
                }
            })
            .collect::<Option<Vec<_>>>()?;
        NonEmpty::try_from_vec(faces).ok().map(Self)
    }
}

impl fmt::Display for Faces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        f.write_str(&join(self.0.iter()))?;
        f.write_str("]")
    }
}

/// What a roll was made with, kept so that rerolls use the same die.
#[derive(Debug, Clone, PartialEq)]
pub enum Die {
    Sides(NonZeroUInt),
    Faces(Faces),
}

impl Die {
    pub fn max(&self) -> Number {
        match self {
            Self::Sides(n) => n.get().into(),
            Self::Faces(faces) => faces.max(),
        }
    }

    pub fn mean(&self) -> Number {
        match self {
            Self::Sides(n) => Number::Float((n.get() as Float + 1.0) / 2.0),
            Self::Faces(faces) => faces.mean(),
        }
    }

    pub fn is_d20(&self) -> bool {
        matches!(self, Self::Sides(n) if n.get() == 20)
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sides(n) => write!(f, "d{}", n),
            Self::Faces(faces) if faces.is_fudge() => f.write_str("dF"),
            Self::Faces(faces) => write!(f, "d{}", faces),
        }
    }
}

/// The outcome of one dice operator: kept values in ascending order, plus
/// everything that later operators removed or replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Roll {
    pub(crate) rolls: Vec<Number>,
    pub(crate) discards: Vec<Number>,
    pub(crate) die: Die,
}

impl Roll {
    pub fn new(rolls: Vec<Number>, die: Die) -> Self {
        let mut ret = Self {
            rolls,
            discards: Vec::new(),
            die,
        };
        ret.sort();
        ret
    }

    pub fn rolls(&self) -> &[Number] {
        &self.rolls
    }

    pub fn discards(&self) -> &[Number] {
        &self.discards
    }

    pub fn die(&self) -> &Die {
        &self.die
    }

    pub fn len(&self) -> usize {
        self.rolls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rolls.is_empty()
    }

    pub fn sum(&self) -> Number {
        self.rolls.iter().sum()
    }

    pub(crate) fn sort(&mut self) {
        self.rolls.sort_by(Number::total_cmp);
    }

    /// Move the value at `index` into the discards.
    pub fn discard(&mut self, index: usize) -> RResult<Number> {
        if index >= self.rolls.len() {
            return Err(RollError::value_error(format!(
                "cannot discard roll {} of {}",
                index,
                self.rolls.len()
            )));
        }
        let old = self.rolls.remove(index);
        self.discards.push(old);
        Ok(old)
    }

    /// Overwrite the value at `index`, recording the old value as a discard.
    pub fn replace(&mut self, index: usize, value: Number) -> RResult<Number> {
        let len = self.rolls.len();
        let slot = self.rolls.get_mut(index).ok_or_else(|| {
            RollError::value_error(format!("cannot replace roll {} of {}", index, len))
        })?;
        let old = std::mem::replace(slot, value);
        self.discards.push(old);
        Ok(old)
    }
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}: {}", self.die, join(self.rolls.iter()))?;
        if !self.discards.is_empty() {
            write!(f, "; ({})", join(self.discards.iter()))?;
        }
        f.write_str("]")
    }
}

/// Reduce a value to a single number by summing whatever it contains.
#[enum_dispatch]
pub trait Collapse {
    fn collapse(&self) -> Number;
}

impl Collapse for Number {
    fn collapse(&self) -> Number {
        *self
    }
}

impl Collapse for Roll {
    fn collapse(&self) -> Number {
        self.sum()
    }
}

impl Collapse for Faces {
    fn collapse(&self) -> Number {
        self.0.iter().sum()
    }
}

/// The value cached on an evaluated node.
#[enum_dispatch(Collapse)]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(Number),
    Roll(Roll),
    Faces(Faces),
}

impl Value {
    pub fn as_roll(&self) -> Option<&Roll> {
        match self {
            Self::Roll(roll) => Some(roll),
            _ => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Number(Number::Int(_)) => "an integer",
            Self::Number(Number::Float(_)) => "a fractional number",
            Self::Roll(_) => "a roll",
            Self::Faces(_) => "a face list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => fmt::Display::fmt(x, f),
            Self::Roll(x) => fmt::Display::fmt(x, f),
            Self::Faces(x) => fmt::Display::fmt(x, f),
        }
    }
}

fn join<'a>(values: impl Iterator<Item = &'a Number>) -> String {
    values
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
