mod ctx;
mod dice;
mod mode;
mod num;
pub(crate) mod roller;
mod stringify;
mod tree;
mod value;

pub use ctx::{DefaultRoller, RollContext, DEFAULT_MAX_ROLLS};
pub use dice::{Compare, Repeat};
pub use mode::Mode;
pub use num::Number;
pub use roller::Roller;
pub use stringify::{RollReport, SimpleStringifier, Stringify, VerboseStringifier};
pub use tree::{ExprTree, InOrder, Node, Payload, PreOrder};
pub use value::{Collapse, Die, Faces, Roll, Value};
