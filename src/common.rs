use std::num::NonZeroU32;

pub type Int = i64;
pub type UInt = u32;
pub type NonZeroUInt = NonZeroU32;

pub type Float = f64;

pub type NonEmpty<T> = vec1::Vec1<T>;

#[cfg(test)]
pub(crate) mod test_utils {
    pub use super::*;
    pub use crate::roll::Number;

    pub fn int(x: Int) -> Number {
        Number::Int(x)
    }

    pub fn ints(xs: &[Int]) -> Vec<Number> {
        xs.iter().copied().map(Number::Int).collect()
    }
}
