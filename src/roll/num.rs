use crate::common::*;
use crate::error::{RResult, RollError};
use std::cmp::Ordering;
use std::fmt;

/// Largest argument whose factorial is finite as a float.
const MAX_FACTORIAL: Int = 170;

#[derive(Debug, Copy, Clone)]
pub enum Number {
    Int(Int),
    Float(Float),
}

impl Number {
    pub const ZERO: Self = Self::Int(0);
    pub const ONE: Self = Self::Int(1);

    /// The integer value, or `None` if this is a float (even a whole one).
    pub fn to_int(self) -> Option<Int> {
        match self {
            Self::Int(x) => Some(x),
            Self::Float(_) => None,
        }
    }

    pub fn as_float(self) -> Float {
        match self {
            Self::Int(x) => x as Float,
            Self::Float(x) => x,
        }
    }

    pub fn is_truthy(self) -> bool {
        self != Self::ZERO
    }

    pub(crate) fn from_bool(b: bool) -> Self {
        if b {
            Self::ONE
        } else {
            Self::ZERO
        }
    }

    pub(crate) fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x.cmp(y),
            (x, y) => x.as_float().total_cmp(&y.as_float()),
        }
    }

    /// True division; the result is always a float.
    pub fn checked_div(self, rhs: Self) -> RResult<Self> {
        if rhs == Self::ZERO {
            return Err(RollError::value_error("cannot divide by zero"));
        }
        Ok(Self::Float(self.as_float() / rhs.as_float()))
    }

    /// Floored modulo: the result takes the sign of the divisor.
    pub fn checked_rem(self, rhs: Self) -> RResult<Self> {
        if rhs == Self::ZERO {
            return Err(RollError::value_error("cannot take modulus by zero"));
        }
        Ok(match (self, rhs) {
            (Self::Int(x), Self::Int(y)) => match x.checked_rem_euclid(y) {
                // rem_euclid is never negative, shift it onto the divisor's side
                Some(r) if r != 0 && y < 0 => Self::Int(r + y),
                Some(r) => Self::Int(r),
                None => Self::Int(0),
            },
            (x, y) => {
                let (x, y) = (x.as_float(), y.as_float());
                let r = x % y;
                if r != 0.0 && (r < 0.0) != (y < 0.0) {
                    Self::Float(r + y)
                } else {
                    Self::Float(r)
                }
            }
        })
    }

    pub fn pow(self, rhs: Self) -> RResult<Self> {
        if self == Self::ZERO && rhs < Self::ZERO {
            return Err(RollError::value_error(
                "cannot raise zero to a negative power",
            ));
        }
        Ok(match (self, rhs) {
            (Self::Int(x), Self::Int(y)) if y >= 0 => u32::try_from(y)
                .ok()
                .and_then(|y| x.checked_pow(y))
                .map_or_else(|| Self::Float((x as Float).powf(y as Float)), Self::Int),
            (x, y) => Self::Float(x.as_float().powf(y.as_float())),
        })
    }

    pub fn factorial(self) -> RResult<Self> {
        let n = self
            .to_int()
            .ok_or_else(|| RollError::type_error(format!("cannot take the factorial of {}", self)))?;
        if n < 0 {
            return Err(RollError::value_error(format!(
                "cannot take the factorial of a negative number ({})",
                n
            )));
        }
        if n > MAX_FACTORIAL {
            return Err(RollError::value_error(format!(
                "factorial argument {} is too large",
                n
            )));
        }
        Ok((2..=n).fold(Self::ONE, |acc, k| acc * Self::Int(k)))
    }
}

impl std::ops::Neg for Number {
    type Output = Self;

    fn neg(self) -> Self::Output {
        match self {
            Self::Int(x) => x
                .checked_neg()
                .map_or_else(|| Self::Float(-(x as Float)), Self::Int),
            Self::Float(x) => Self::Float(-x),
        }
    }
}

// Integer overflow promotes to a float instead of wrapping.
macro_rules! num_impl_bin_op {
    ($Name:ident, $fn_name:ident, $checked:ident) => {
        impl std::ops::$Name for Number {
            type Output = Self;

            fn $fn_name(self, rhs: Self) -> Self::Output {
                match (self, rhs) {
                    (Self::Int(x), Self::Int(y)) => x.$checked(y).map_or_else(
                        || Self::Float(std::ops::$Name::$fn_name(x as Float, y as Float)),
                        Self::Int,
                    ),
                    (x, y) => Self::Float(std::ops::$Name::$fn_name(x.as_float(), y.as_float())),
                }
            }
        }
    };
}

num_impl_bin_op!(Add, add, checked_add);
num_impl_bin_op!(Sub, sub, checked_sub);
num_impl_bin_op!(Mul, mul, checked_mul);

impl std::iter::Sum for Number {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |a, b| a + b)
    }
}

impl<'a> std::iter::Sum<&'a Number> for Number {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x == y,
            (x, y) => x.as_float().eq(&y.as_float()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(x), Self::Int(y)) => x.partial_cmp(y),
            (x, y) => x.as_float().partial_cmp(&y.as_float()),
        }
    }
}

impl PartialEq<Int> for Number {
    fn eq(&self, other: &Int) -> bool {
        *self == Self::Int(*other)
    }
}

impl PartialEq<i32> for Number {
    fn eq(&self, other: &i32) -> bool {
        *self == Self::Int((*other).into())
    }
}

impl From<Int> for Number {
    fn from(x: Int) -> Self {
        Self::Int(x)
    }
}

impl From<i32> for Number {
    fn from(x: i32) -> Self {
        Self::Int(x.into())
    }
}

impl From<Float> for Number {
    fn from(x: Float) -> Self {
        Self::Float(x)
    }
}

impl From<UInt> for Number {
    fn from(x: UInt) -> Self {
        Self::Int(x.into())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Float(x) => fmt::Debug::fmt(x, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_arithmetic() {
        assert_eq!(Number::Int(2) + Number::Int(3), 5);
        assert_eq!(Number::Int(2) - Number::Int(3), -1);
        assert_eq!(Number::Int(4) * Number::Int(3), 12);
        assert!(matches!(Number::Int(2) + Number::Int(3), Number::Int(5)));
        assert!(matches!(Number::Int(2) + Number::Float(0.5), Number::Float(x) if x == 2.5));
    }

    #[test]
    fn test_overflow_promotes() {
        let big = Number::Int(Int::MAX);
        assert!(matches!(big + Number::ONE, Number::Float(_)));
        assert!(matches!(-Number::Int(Int::MIN), Number::Float(_)));
        assert!(matches!(Number::Int(10).pow(Number::Int(40)).unwrap(), Number::Float(_)));
        assert!(matches!(Number::Int(30).factorial().unwrap(), Number::Float(_)));
    }

    #[test]
    fn test_division() {
        assert!(matches!(
            Number::Int(7).checked_div(Number::Int(2)).unwrap(),
            Number::Float(x) if x == 3.5
        ));
        assert!(matches!(
            Number::Int(8).checked_div(Number::Int(2)).unwrap(),
            Number::Float(x) if x == 4.0
        ));
        assert!(matches!(
            Number::Int(7).checked_div(Number::ZERO),
            Err(RollError::Value(_))
        ));
        assert!(matches!(
            Number::Float(7.0).checked_div(Number::Float(0.0)),
            Err(RollError::Value(_))
        ));
    }

    #[test]
    fn test_floored_modulo() {
        assert_eq!(Number::Int(7).checked_rem(Number::Int(3)).unwrap(), 1);
        assert_eq!(Number::Int(-7).checked_rem(Number::Int(3)).unwrap(), 2);
        assert_eq!(Number::Int(7).checked_rem(Number::Int(-3)).unwrap(), -2);
        assert_eq!(Number::Int(-7).checked_rem(Number::Int(-3)).unwrap(), -1);
        assert_eq!(
            Number::Float(3.5).checked_rem(Number::Int(2)).unwrap(),
            Number::Float(1.5)
        );
        assert_eq!(
            Number::Float(-3.5).checked_rem(Number::Int(2)).unwrap(),
            Number::Float(0.5)
        );
        assert!(Number::Int(1).checked_rem(Number::ZERO).is_err());
    }

    #[test]
    fn test_pow() {
        assert_eq!(Number::Int(2).pow(Number::Int(10)).unwrap(), 1024);
        assert_eq!(
            Number::Int(2).pow(Number::Int(-1)).unwrap(),
            Number::Float(0.5)
        );
        assert!(Number::ZERO.pow(Number::Int(-2)).is_err());
        assert_eq!(Number::ZERO.pow(Number::ZERO).unwrap(), 1);
    }

    #[test]
    fn test_factorial() {
        assert_eq!(Number::Int(0).factorial().unwrap(), 1);
        assert_eq!(Number::Int(5).factorial().unwrap(), 120);
        assert!(matches!(Number::Int(-1).factorial(), Err(RollError::Value(_))));
        assert!(matches!(Number::Float(3.0).factorial(), Err(RollError::Type(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Number::Int(4).to_string(), "4");
        assert_eq!(Number::Float(4.0).to_string(), "4.0");
        assert_eq!(Number::Float(3.5).to_string(), "3.5");
    }
}
