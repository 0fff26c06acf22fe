use crate::common::*;
use crate::error::{RResult, RollError};
use crate::roll::{Collapse, Compare, Die, Number, Repeat, Roll, RollContext, Roller, Value};
use std::fmt;
use std::str::FromStr;

/// Where an operator sits relative to its operands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Arity {
    /// Takes only a right operand, e.g. unary `-`.
    Prefix,
    /// Takes only a left operand, e.g. `!`.
    Postfix,
    Binary,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Assoc {
    Left,
    Right,
}

/// Which operands are summed down to a number before the operator sees them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Coerce {
    Left,
    Right,
    Both,
}

impl Coerce {
    fn left(self) -> bool {
        matches!(self, Self::Left | Self::Both)
    }

    fn right(self) -> bool {
        matches!(self, Self::Right | Self::Both)
    }
}

/// Precedence of the operators that turn numbers into rolls (`d` and friends).
pub const ROLL_PRECEDENCE: u8 = 7;
/// Precedence of the operators that rework a roll (`h`, `r`, ...).
pub const MODIFIER_PRECEDENCE: u8 = 6;

macro_rules! operators {
    ($($name:ident => ($code:literal, $prec:literal, $arity:ident, $coerce:ident)),+ $(,)?) => {
        /// Every operator the notation knows about, keyed by its identifier.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub enum Operator {
            $($name),+
        }

        impl Operator {
            pub const ALL: &'static [Self] = &[$(Self::$name),+];

            /// The identifier this operator is registered under.
            pub const fn code(self) -> &'static str {
                match self {
                    $(Self::$name => $code),+
                }
            }

            /// Higher binds tighter.
            pub const fn precedence(self) -> u8 {
                match self {
                    $(Self::$name => $prec),+
                }
            }

            pub const fn arity(self) -> Arity {
                match self {
                    $(Self::$name => Arity::$arity),+
                }
            }

            pub const fn coerce(self) -> Coerce {
                match self {
                    $(Self::$name => Coerce::$coerce),+
                }
            }
        }
    };
}

operators! {
    Factorial => ("!", 8, Postfix, Left),

    Dice => ("d", 7, Binary, Left),
    DiceCritical => ("dc", 7, Binary, Left),
    DiceMax => ("dm", 7, Binary, Left),
    DiceAverage => ("da", 7, Binary, Left),

    KeepHigh => ("h", 6, Binary, Right),
    KeepLow => ("l", 6, Binary, Right),
    Floor => ("f", 6, Binary, Right),
    Ceil => ("c", 6, Binary, Right),
    RerollOnce => ("r", 6, Binary, Right),
    Reroll => ("R", 6, Binary, Right),
    RerollOnceLower => ("r<", 6, Binary, Right),
    RerollLower => ("R<", 6, Binary, Right),
    RerollOnceHigher => ("r>", 6, Binary, Right),
    RerollHigher => ("R>", 6, Binary, Right),
    ThresholdUpper => ("t", 6, Binary, Right),
    ThresholdLower => ("T", 6, Binary, Right),

    Pow => ("^", 5, Binary, Both),

    Neg => ("m", 4, Prefix, Right),
    Pos => ("p", 4, Prefix, Right),

    Mul => ("*", 3, Binary, Both),
    Div => ("/", 3, Binary, Both),
    Rem => ("%", 3, Binary, Both),

    Sub => ("-", 2, Binary, Both),
    Add => ("+", 2, Binary, Both),

    Gt => (">", 1, Binary, Both),
    Ge => (">=", 1, Binary, Both),
    Lt => ("<", 1, Binary, Both),
    Le => ("<=", 1, Binary, Both),
    Eq => ("=", 1, Binary, Both),
    Or => ("|", 1, Binary, Both),
    And => ("&", 1, Binary, Both),
}

impl Operator {
    /// Alternative spellings accepted on input.
    pub const ALIASES: &'static [(&'static str, Self)] = &[
        ("rl", Self::RerollOnceLower),
        ("Rl", Self::RerollLower),
        ("rh", Self::RerollOnceHigher),
        ("Rh", Self::RerollHigher),
        ("gt", Self::Gt),
        ("ge", Self::Ge),
        ("lt", Self::Lt),
        ("le", Self::Le),
    ];

    pub const fn assoc(self) -> Assoc {
        match self {
            Self::Pow => Assoc::Right,
            _ => Assoc::Left,
        }
    }

    /// How the operator is written in an expression. Unary minus and plus are
    /// registered as `m` and `p` but shown as `-` and `+`.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Pos => "+",
            _ => self.code(),
        }
    }

    /// `d` and its variants.
    pub fn is_dice(self) -> bool {
        self.precedence() == ROLL_PRECEDENCE
    }

    /// Whether an operator on the stack must be reduced before `next` is pushed.
    pub fn reduces_before(self, next: Self) -> bool {
        match next.assoc() {
            Assoc::Left => self.precedence() >= next.precedence(),
            Assoc::Right => self.precedence() > next.precedence(),
        }
    }

    /// Apply this operator to already evaluated operands.
    ///
    /// Prefix operators receive only `right`, postfix operators only `left`.
    pub fn apply<R: Roller>(
        self,
        ctx: &mut RollContext<R>,
        left: Option<Value>,
        right: Option<Value>,
    ) -> RResult<Value> {
        let coerce = self.coerce();
        let left = left.map(|v| if coerce.left() { summed(v) } else { v });
        let right = right.map(|v| if coerce.right() { summed(v) } else { v });
        let mut operands = Operands {
            op: self,
            left,
            right,
        };

        Ok(match self {
            Self::Factorial => operands.left_number()?.factorial()?.into(),

            Self::Dice => {
                let num = operands.dice_count()?;
                let die = operands.die()?;
                ctx.roll_dice(num, die)?.into()
            }
            Self::DiceCritical => {
                let num = operands.dice_count()?;
                let die = operands.die()?;
                let num = num.checked_mul(2).ok_or(RollError::TooManyRolls)?;
                ctx.roll_dice(num, die)?.into()
            }
            Self::DiceMax | Self::DiceAverage => {
                let num = operands.dice_count()?;
                let die = operands.die()?;
                ctx.count_rolls(num)?;
                let face = if self == Self::DiceMax {
                    die.max()
                } else {
                    die.mean()
                };
                Roll::new(vec![face; num], die).into()
            }

            Self::KeepHigh => {
                let n = operands.keep_count()?;
                let mut roll = operands.left_roll()?;
                roll.keep_high(n);
                roll.into()
            }
            Self::KeepLow => {
                let n = operands.keep_count()?;
                let mut roll = operands.left_roll()?;
                roll.keep_low(n);
                roll.into()
            }
            Self::Floor => {
                let bound = operands.right_number()?;
                let mut roll = operands.left_roll()?;
                roll.floor(bound);
                roll.into()
            }
            Self::Ceil => {
                let bound = operands.right_number()?;
                let mut roll = operands.left_roll()?;
                roll.ceil(bound);
                roll.into()
            }
            Self::RerollOnce
            | Self::Reroll
            | Self::RerollOnceLower
            | Self::RerollLower
            | Self::RerollOnceHigher
            | Self::RerollHigher => {
                let (cmp, repeat) = match self {
                    Self::RerollOnce => (Compare::Equal, Repeat::Once),
                    Self::Reroll => (Compare::Equal, Repeat::Always),
                    Self::RerollOnceLower => (Compare::Lower, Repeat::Once),
                    Self::RerollLower => (Compare::Lower, Repeat::Always),
                    Self::RerollOnceHigher => (Compare::Higher, Repeat::Once),
                    _ => (Compare::Higher, Repeat::Always),
                };
                let target = operands.right_number()?;
                let mut roll = operands.left_roll()?;
                roll.reroll(ctx, target, cmp, repeat)?;
                roll.into()
            }
            Self::ThresholdUpper | Self::ThresholdLower => {
                let direction = if self == Self::ThresholdLower {
                    Compare::Lower
                } else {
                    Compare::Higher
                };
                let target = operands.right_number()?;
                let mut roll = operands.left_roll()?;
                roll.threshold(target, direction);
                roll.into()
            }

            Self::Pow => operands.left_number()?.pow(operands.right_number()?)?.into(),
            Self::Neg => (-operands.right_number()?).into(),
            Self::Pos => operands.right_number()?.into(),
            Self::Mul => (operands.left_number()? * operands.right_number()?).into(),
            Self::Div => operands
                .left_number()?
                .checked_div(operands.right_number()?)?
                .into(),
            Self::Rem => operands
                .left_number()?
                .checked_rem(operands.right_number()?)?
                .into(),
            Self::Sub => (operands.left_number()? - operands.right_number()?).into(),
            Self::Add => (operands.left_number()? + operands.right_number()?).into(),

            Self::Gt | Self::Ge | Self::Lt | Self::Le | Self::Eq | Self::Or | Self::And => {
                let (l, r) = (operands.left_number()?, operands.right_number()?);
                let result = match self {
                    Self::Gt => l > r,
                    Self::Ge => l >= r,
                    Self::Lt => l < r,
                    Self::Le => l <= r,
                    Self::Eq => l == r,
                    Self::Or => l.is_truthy() || r.is_truthy(),
                    _ => l.is_truthy() && r.is_truthy(),
                };
                Number::from_bool(result).into()
            }
        })
    }
}

fn summed(value: Value) -> Value {
    match value {
        Value::Roll(roll) => Value::Number(roll.collapse()),
        other => other,
    }
}

/// The operands of one application, with the shape checks every operator
/// family needs.
struct Operands {
    op: Operator,
    left: Option<Value>,
    right: Option<Value>,
}

impl Operands {
    fn take(&mut self, left: bool) -> RResult<Value> {
        let (slot, side) = if left {
            (&mut self.left, "left")
        } else {
            (&mut self.right, "right")
        };
        slot.take().ok_or_else(|| {
            RollError::type_error(format!("'{}' is missing its {} operand", self.op, side))
        })
    }

    fn wrong_shape(&self, value: &Value, expected: &str) -> RollError {
        RollError::type_error(format!(
            "'{}' expected {}, found {} ({})",
            self.op,
            expected,
            value.kind(),
            value
        ))
    }

    fn number(&mut self, left: bool) -> RResult<Number> {
        match self.take(left)? {
            Value::Number(x) => Ok(x),
            other => Err(self.wrong_shape(&other, "a number")),
        }
    }

    fn left_number(&mut self) -> RResult<Number> {
        self.number(true)
    }

    fn right_number(&mut self) -> RResult<Number> {
        self.number(false)
    }

    fn left_roll(&mut self) -> RResult<Roll> {
        match self.take(true)? {
            Value::Roll(roll) => Ok(roll),
            other => Err(self.wrong_shape(&other, "a roll")),
        }
    }

    fn count(&mut self, left: bool, what: &str) -> RResult<usize> {
        let value = self.take(left)?;
        let n = match value {
            Value::Number(Number::Int(n)) => n,
            ref other => return Err(self.wrong_shape(other, "an integer")),
        };
        usize::try_from(n).map_err(|_| {
            RollError::value_error(format!("'{}' cannot {} {} dice", self.op, what, n))
        })
    }

    fn dice_count(&mut self) -> RResult<usize> {
        self.count(true, "roll")
    }

    fn keep_count(&mut self) -> RResult<usize> {
        self.count(false, "keep")
    }

    fn die(&mut self) -> RResult<Die> {
        match self.take(false)? {
            Value::Number(Number::Int(n)) => UInt::try_from(n)
                .ok()
                .and_then(NonZeroUInt::new)
                .map(Die::Sides)
                .ok_or_else(|| {
                    RollError::value_error(format!("cannot roll a die with {} sides", n))
                }),
            Value::Faces(faces) => Ok(Die::Faces(faces)),
            other => Err(self.wrong_shape(&other, "a number of sides or a face list")),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operator {0:?}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.code() == s)
            .or_else(|| {
                Self::ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == s)
                    .map(|&(_, op)| op)
            })
            .ok_or_else(|| UnknownOperator(s.to_owned()))
    }
}
