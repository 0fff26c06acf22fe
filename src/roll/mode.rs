use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

/// Rewrites to apply to an expression before rolling it. Flags combine with `|`.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Mode(u8);

impl Mode {
    pub const NORMAL: Self = Self(0b000);
    pub const AVERAGE: Self = Self(0b001);
    pub const CRIT: Self = Self(0b010);
    pub const MAX: Self = Self(0b100);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_normal(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Mode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Mode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromStr for Mode {
    type Err = std::convert::Infallible;

    /// Unknown names roll normally.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "average" => Self::AVERAGE,
            "critical" => Self::CRIT,
            "maximum" => Self::MAX,
            _ => Self::NORMAL,
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_normal() {
            return f.write_str("normal");
        }
        let names: Vec<_> = [
            (Self::AVERAGE, "average"),
            (Self::CRIT, "critical"),
            (Self::MAX, "maximum"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
        f.write_str(&names.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let mode = Mode::AVERAGE | Mode::MAX;
        assert!(mode.contains(Mode::AVERAGE));
        assert!(mode.contains(Mode::MAX));
        assert!(!mode.contains(Mode::CRIT));
        assert!(mode.contains(Mode::NORMAL));
        assert!(Mode::default().is_normal());
        assert_eq!(mode.to_string(), "average|maximum");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Critical".parse::<Mode>(), Ok(Mode::CRIT));
        assert_eq!("average".parse::<Mode>(), Ok(Mode::AVERAGE));
        assert_eq!("MAXIMUM".parse::<Mode>(), Ok(Mode::MAX));
        assert_eq!("whatever".parse::<Mode>(), Ok(Mode::NORMAL));
    }
}
