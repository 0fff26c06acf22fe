use super::{
    ctx::RollContext,
    num::Number,
    roller::Roller,
    tree::{needs_parens, ExprTree, Node, Payload},
};
use crate::common::Int;
use crate::error::RResult;
use crate::ops::{Arity, Operator, MODIFIER_PRECEDENCE};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

/// Renders an expression tree back into dice notation.
///
/// Implementors can show some nodes as something other than their
/// expression by overriding [`Stringify::str_evaluated`]; such nodes are
/// treated as atoms and never parenthesized.
pub trait Stringify {
    fn stringify(&mut self, tree: &ExprTree) -> String {
        tree.root()
            .map_or_else(String::new, |root| self.str_node(root))
    }

    fn str_node(&mut self, node: &Node) -> String {
        match self.str_evaluated(node) {
            Some(s) => s,
            None => self.str_expr(node),
        }
    }

    fn str_evaluated(&mut self, _node: &Node) -> Option<String> {
        None
    }

    fn str_expr(&mut self, node: &Node) -> String {
        match node.payload() {
            Payload::Int(x) => x.to_string(),
            Payload::Faces(faces) => faces.to_string(),
            &Payload::Op(op) => {
                let left = node.left().map(|l| self.str_operand(op, l, true));
                let right = node.right().map(|r| self.str_operand(op, r, false));
                let (left, right) = (left.unwrap_or_default(), right.unwrap_or_default());
                match op.arity() {
                    Arity::Prefix => format!("{}{}", op, right),
                    Arity::Postfix => format!("{}{}", left, op),
                    Arity::Binary => format!("{}{}{}", left, op, right),
                }
            }
        }
    }

    fn str_operand(&mut self, parent: Operator, child: &Node, is_left: bool) -> String {
        if let Some(s) = self.str_evaluated(child) {
            return s;
        }
        if let Payload::Faces(faces) = child.payload() {
            if parent.is_dice() && !is_left && faces.is_fudge() {
                return "F".to_owned();
            }
        }
        let s = self.str_expr(child);
        if needs_parens(parent, child, is_left) {
            format!("({})", s)
        } else {
            s
        }
    }
}

/// Writes the expression as it was parsed, with minimal parentheses.
#[derive(Default)]
pub struct SimpleStringifier;

impl SimpleStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for SimpleStringifier {}

/// Writes an evaluated expression with every roll and modified roll shown
/// as its outcome, e.g. `1+[d20: 4, 17]`.
#[derive(Default)]
pub struct VerboseStringifier;

impl VerboseStringifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stringify for VerboseStringifier {
    fn str_evaluated(&mut self, node: &Node) -> Option<String> {
        let op = node.op()?;
        if op.precedence() < MODIFIER_PRECEDENCE {
            return None;
        }
        node.value().map(ToString::to_string)
    }
}

impl fmt::Display for ExprTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&SimpleStringifier.stringify(self))
    }
}

impl ExprTree {
    /// Evaluate and describe the outcome.
    pub fn report<R: Roller>(&mut self, ctx: &mut RollContext<R>) -> RResult<RollReport> {
        let total = self.evaluate(ctx)?;
        let breakdown = VerboseStringifier.stringify(self);
        Ok(RollReport { breakdown, total })
    }

    /// Evaluate and render as `breakdown = total`, or `""` for an empty tree.
    pub fn verbose_result<R: Roller>(&mut self, ctx: &mut RollContext<R>) -> RResult<String> {
        Ok(self.report(ctx)?.to_string())
    }
}

/// The outcome of a verbose roll: how it came about and what it added up to.
///
/// Reports can be added together, or to plain numbers, as when several
/// attacks are rolled separately and then summed.
#[derive(Debug, Clone, PartialEq)]
pub struct RollReport {
    breakdown: String,
    total: Number,
}

impl RollReport {
    pub fn new(breakdown: impl Into<String>, total: Number) -> Self {
        Self {
            breakdown: breakdown.into(),
            total,
        }
    }

    pub fn breakdown(&self) -> &str {
        &self.breakdown
    }

    pub fn total(&self) -> Number {
        self.total
    }

    fn append(mut self, breakdown: &str, total: Number) -> Self {
        if self.breakdown.is_empty() {
            self.breakdown = breakdown.to_owned();
        } else {
            self.breakdown.push('+');
            self.breakdown.push_str(breakdown);
        }
        self.total = self.total + total;
        self
    }
}

impl fmt::Display for RollReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.breakdown.is_empty() {
            return Ok(());
        }
        write!(f, "{} = {}", self.breakdown, self.total)
    }
}

impl Add for RollReport {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.append(&rhs.breakdown, rhs.total)
    }
}

impl Add<Number> for RollReport {
    type Output = Self;

    fn add(self, rhs: Number) -> Self::Output {
        self.append(&rhs.to_string(), rhs)
    }
}

impl Add<Int> for RollReport {
    type Output = Self;

    fn add(self, rhs: Int) -> Self::Output {
        self + Number::Int(rhs)
    }
}

impl PartialEq<Number> for RollReport {
    fn eq(&self, other: &Number) -> bool {
        self.total == *other
    }
}

impl PartialEq<Int> for RollReport {
    fn eq(&self, other: &Int) -> bool {
        self.total == *other
    }
}

impl PartialOrd<Number> for RollReport {
    fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        self.total.partial_cmp(other)
    }
}

impl From<RollReport> for Number {
    fn from(report: RollReport) -> Self {
        report.total
    }
}
