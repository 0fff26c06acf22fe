//! Dice notation such as `4d6r1h3 + 2` parsed into expression trees that can
//! be rolled, re-rolled from cache, rewritten and rendered.

mod common;
mod error;
pub mod ops;
pub mod parse;
pub mod roll;

pub use common::{Float, Int, NonEmpty, NonZeroUInt, UInt};
pub use error::{RResult, RollError};
pub use ops::Operator;
pub use parse::{ParseError, Token};
pub use roll::{
    Collapse, DefaultRoller, Die, ExprTree, Faces, Mode, Node, Number, Payload, Roll,
    RollContext, RollReport, Roller, Value,
};

/// Anything the entry points accept as an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Rollable {
    Str(String),
    Tokens(Vec<Token>),
    Tree(ExprTree),
    Number(Number),
}

impl From<&str> for Rollable {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Rollable {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Token>> for Rollable {
    fn from(tokens: Vec<Token>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<ExprTree> for Rollable {
    fn from(tree: ExprTree) -> Self {
        Self::Tree(tree)
    }
}

impl From<Number> for Rollable {
    fn from(x: Number) -> Self {
        Self::Number(x)
    }
}

impl From<Int> for Rollable {
    fn from(x: Int) -> Self {
        Self::Number(Number::Int(x))
    }
}

impl TryFrom<Rollable> for ExprTree {
    type Error = RollError;

    fn try_from(input: Rollable) -> RResult<Self> {
        match input {
            Rollable::Str(s) => Ok(Self::parse(&s)?),
            Rollable::Tokens(tokens) => Ok(Self::from_tokens(tokens)?),
            Rollable::Tree(tree) => Ok(tree),
            Rollable::Number(x) => Err(RollError::input_type_error(format!(
                "expected an expression, found the number {}",
                x
            ))),
        }
    }
}

/// Build an expression tree, attaching `+ modifiers` above the root when
/// `modifiers` is not zero.
pub fn compile(expr: impl Into<Rollable>, modifiers: Int) -> RResult<ExprTree> {
    let mut tree = ExprTree::try_from(expr.into())?;
    tree.add_modifiers(modifiers);
    Ok(tree)
}

/// Tokenize `expr`; a non-zero `modifiers` wraps the result as
/// `( tokens ) + modifiers`.
pub fn tokenize(expr: &str, modifiers: Int) -> RResult<Vec<Token>> {
    let tokens = parse::tokenize(expr)?;
    if modifiers == 0 {
        return Ok(tokens);
    }
    let (op, amount) = match modifiers.checked_abs() {
        Some(amount) if modifiers < 0 => (Operator::Sub, amount),
        _ => (Operator::Add, modifiers),
    };
    let mut wrapped = Vec::with_capacity(tokens.len() + 4);
    wrapped.push(Token::Open);
    wrapped.extend(tokens);
    wrapped.extend([Token::Close, Token::Op(op), Token::Int(amount)]);
    Ok(wrapped)
}

/// Roll `expr` with a thread-local RNG and the default roll budget.
pub fn basic(expr: impl Into<Rollable>, mode: Mode, modifiers: Int) -> RResult<Number> {
    basic_with(expr, mode, modifiers, &mut RollContext::<DefaultRoller>::default())
}

/// Roll `expr` and return only the total. Numbers pass straight through,
/// plus `modifiers`.
pub fn basic_with<R: Roller>(
    expr: impl Into<Rollable>,
    mode: Mode,
    modifiers: Int,
    ctx: &mut RollContext<R>,
) -> RResult<Number> {
    let mut tree = match expr.into() {
        Rollable::Number(x) => return Ok(x + Number::Int(modifiers)),
        input => ExprTree::try_from(input)?,
    };
    let total = tree.apply_mode(mode).evaluate(ctx)?;
    Ok(total + Number::Int(modifiers))
}

/// Roll `expr` with a thread-local RNG and the default roll budget,
/// describing every roll on the way.
pub fn verbose(expr: impl Into<Rollable>, mode: Mode, modifiers: Int) -> RResult<RollReport> {
    verbose_with(expr, mode, modifiers, &mut RollContext::<DefaultRoller>::default())
}

pub fn verbose_with<R: Roller>(
    expr: impl Into<Rollable>,
    mode: Mode,
    modifiers: Int,
    ctx: &mut RollContext<R>,
) -> RResult<RollReport> {
    let mut tree = compile(expr, modifiers)?;
    tree.apply_mode(mode).report(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::roller::SequenceRoller;

    fn ctx() -> RollContext<SequenceRoller> {
        RollContext::new_bounded(1000, SequenceRoller::constant(4))
    }

    #[test]
    fn test_compile() {
        let tree = compile("1d20", 3).unwrap();
        assert_eq!(tree, ExprTree::parse("1d20+3").unwrap());
        let tree = compile("1d20", -3).unwrap();
        assert_eq!(tree, ExprTree::parse("1d20-3").unwrap());
        assert_eq!(compile("1d20", 0).unwrap(), ExprTree::parse("1d20").unwrap());

        let tree = ExprTree::parse("2*3").unwrap();
        assert_eq!(compile(tree.clone(), 0).unwrap(), tree);
        assert!(matches!(
            compile(Number::Int(3), 0),
            Err(RollError::InputType(_))
        ));
        assert!(matches!(compile("2+", 0), Err(RollError::Parse(_))));
    }

    #[test]
    fn test_tokenize_with_modifiers() {
        assert_eq!(
            tokenize("1d4", 2).unwrap(),
            vec![
                Token::Open,
                Token::Int(1),
                Token::Op(Operator::Dice),
                Token::Int(4),
                Token::Close,
                Token::Op(Operator::Add),
                Token::Int(2),
            ]
        );
        let tokens = tokenize("1+2", -2).unwrap();
        assert_eq!(tokens.last(), Some(&Token::Int(2)));
        assert_eq!(tokens[tokens.len() - 2], Token::Op(Operator::Sub));
        assert_eq!(tokenize("1+2", 0).unwrap().len(), 3);
        assert_eq!(basic_with(tokens, Mode::NORMAL, 0, &mut ctx()).unwrap(), Number::Int(1));
    }

    #[test]
    fn test_basic() {
        let mut ctx = ctx();
        assert_eq!(basic_with("2d6+1", Mode::NORMAL, 0, &mut ctx).unwrap(), Number::Int(9));
        assert_eq!(basic_with("2d6", Mode::NORMAL, 2, &mut ctx).unwrap(), Number::Int(10));
        assert_eq!(basic_with("2d6", Mode::MAX, 0, &mut ctx).unwrap(), Number::Int(12));
        assert_eq!(basic_with("1d20", Mode::CRIT, 0, &mut ctx).unwrap(), Number::Int(8));
        assert_eq!(
            basic_with("2d6", Mode::AVERAGE, 0, &mut ctx).unwrap(),
            Number::Float(7.0)
        );
        assert_eq!(
            basic_with("1d6", Mode::AVERAGE | Mode::MAX, 0, &mut ctx).unwrap(),
            Number::Int(6)
        );
        assert_eq!(basic_with(Number::Int(5), Mode::NORMAL, 2, &mut ctx).unwrap(), Number::Int(7));
        assert_eq!(basic_with(5 as Int, Mode::MAX, -1, &mut ctx).unwrap(), Number::Int(4));
        assert_eq!(basic_with("", Mode::NORMAL, 3, &mut ctx).unwrap(), Number::Int(3));
    }

    #[test]
    fn test_verbose() {
        let mut ctx = ctx();
        let report = verbose_with("2d6h1", Mode::NORMAL, 2, &mut ctx).unwrap();
        assert_eq!(report.to_string(), "[d6: 4; (4)]+2 = 6");
        assert_eq!(report.total(), Number::Int(6));

        let report = verbose_with("1d20", Mode::CRIT, 0, &mut ctx).unwrap();
        assert_eq!(report.to_string(), "[d20: 4, 4] = 8");

        assert!(matches!(
            verbose_with(Number::Int(2), Mode::NORMAL, 0, &mut ctx),
            Err(RollError::InputType(_))
        ));
        assert_eq!(verbose_with("", Mode::NORMAL, 0, &mut ctx).unwrap().to_string(), "");
    }

    #[test]
    fn test_default_context() {
        let total = basic("3d6", Mode::NORMAL, 0).unwrap();
        assert!(total >= Number::Int(3) && total <= Number::Int(18));
        let report = verbose("1d4*2", Mode::MAX, 0).unwrap();
        assert_eq!(report.to_string(), "[d4: 4]*2 = 8");
    }
}
