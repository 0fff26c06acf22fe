use super::{
    ctx::RollContext,
    mode::Mode,
    num::Number,
    roller::Roller,
    value::{Collapse, Faces, Roll, Value},
};
use crate::common::*;
use crate::error::{RResult, RollError};
use crate::ops::{Arity, Assoc, Operator};
use crate::parse::{self, ParseError, Token};
use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Int(Int),
    Faces(Faces),
    Op(Operator),
}

impl Payload {
    pub fn to_token(&self) -> Token {
        match self {
            Self::Int(x) => Token::Int(*x),
            Self::Faces(faces) => Token::Faces(faces.clone()),
            Self::Op(op) => Token::Op(*op),
        }
    }
}

/// A node of an expression tree together with its cached value.
///
/// Prefix operators only have a right child, postfix operators only a left.
#[derive(Debug, Clone)]
pub struct Node {
    payload: Payload,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
    value: Option<Value>,
}

impl Node {
    fn new(payload: Payload, left: Option<Node>, right: Option<Node>) -> Self {
        Self {
            payload,
            left: left.map(Box::new),
            right: right.map(Box::new),
            value: None,
        }
    }

    pub fn int(x: Int) -> Self {
        Self::new(Payload::Int(x), None, None)
    }

    pub fn faces(faces: Faces) -> Self {
        Self::new(Payload::Faces(faces), None, None)
    }

    pub fn binary(op: Operator, left: Node, right: Node) -> Self {
        Self::new(Payload::Op(op), Some(left), Some(right))
    }

    pub fn prefix(op: Operator, right: Node) -> Self {
        Self::new(Payload::Op(op), None, Some(right))
    }

    pub fn postfix(op: Operator, left: Node) -> Self {
        Self::new(Payload::Op(op), Some(left), None)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn op(&self) -> Option<Operator> {
        match self.payload {
            Payload::Op(op) => Some(op),
            _ => None,
        }
    }

    pub fn left(&self) -> Option<&Node> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&Node> {
        self.right.as_deref()
    }

    /// The cached value, if this node has been evaluated.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Evaluate children first, then this node. An already evaluated node
    /// returns its cached value without rolling again.
    pub(crate) fn evaluate<R: Roller>(&mut self, ctx: &mut RollContext<R>) -> RResult<&Value> {
        let value = match self.value.take() {
            Some(value) => {
                log::trace!("reusing cached value {}", value);
                value
            }
            None => self.compute(ctx)?,
        };
        Ok(self.value.insert(value))
    }

    fn compute<R: Roller>(&mut self, ctx: &mut RollContext<R>) -> RResult<Value> {
        match &self.payload {
            Payload::Int(x) => Ok(Number::Int(*x).into()),
            Payload::Faces(faces) => Ok(faces.clone().into()),
            &Payload::Op(op) => {
                let left = match self.left.as_deref_mut() {
                    Some(node) => Some(node.evaluate(ctx)?.clone()),
                    None => None,
                };
                let right = match self.right.as_deref_mut() {
                    Some(node) => Some(node.evaluate(ctx)?.clone()),
                    None => None,
                };
                op.apply(ctx, left, right)
            }
        }
    }

    fn clear_values(&mut self) {
        self.value = None;
        for child in [&mut self.left, &mut self.right].into_iter().flatten() {
            child.clear_values();
        }
    }

    /// Replace operators according to `f`. Nodes whose operator changed, and
    /// all of their ancestors, lose their cached values.
    fn rewrite(&mut self, f: &impl Fn(Operator) -> Option<Operator>) -> bool {
        let mut changed = false;
        for child in [&mut self.left, &mut self.right].into_iter().flatten() {
            changed |= child.rewrite(f);
        }
        if let Payload::Op(op) = &mut self.payload {
            if let Some(new) = f(*op).filter(|&new| new != *op) {
                log::trace!("rewriting '{}' to '{}'", op, new);
                *op = new;
                changed = true;
            }
        }
        if changed {
            self.value = None;
        }
        changed
    }

    /// Rolls that are not consumed by a roll operator further up.
    fn collect_outer_rolls<'a>(&'a self, out: &mut Vec<&'a Roll>) {
        if let Some(Value::Roll(roll)) = &self.value {
            out.push(roll);
            return;
        }
        for child in [self.left(), self.right()].into_iter().flatten() {
            child.collect_outer_rolls(out);
        }
    }
}

/// Structural equality: payloads and shape, ignoring cached values.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload && self.left == other.left && self.right == other.right
    }
}

/// Whether `child`, as an operand of `parent`, has to be parenthesized to
/// keep its grouping when written out.
pub(crate) fn needs_parens(parent: Operator, child: &Node, is_left: bool) -> bool {
    let child = match child.op() {
        Some(op) => op,
        None => return false,
    };
    if parent.arity() != Arity::Binary {
        return child.precedence() < parent.precedence();
    }
    match child.precedence().cmp(&parent.precedence()) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => match parent.assoc() {
            Assoc::Left => !is_left,
            Assoc::Right => is_left,
        },
    }
}

/// A parsed dice expression. An empty tree is the expression `0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExprTree {
    root: Option<Node>,
}

impl ExprTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_root(root: Node) -> Self {
        Self { root: Some(root) }
    }

    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Self::from_tokens(parse::tokenize(s)?)
    }

    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Result<Self, ParseError> {
        Ok(Self {
            root: parse::parse_tokens(tokens)?,
        })
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Deep copy, including any cached values.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// The cached value of the whole expression, if it has been evaluated.
    pub fn value(&self) -> Option<&Value> {
        self.root.as_ref().and_then(Node::value)
    }

    /// Evaluate the expression, reusing the values of nodes that were
    /// already evaluated. The context's roll budget applies per call.
    pub fn evaluate<R: Roller>(&mut self, ctx: &mut RollContext<R>) -> RResult<Number> {
        ctx.reset();
        match &mut self.root {
            Some(root) => Ok(root.evaluate(ctx)?.collapse()),
            None => Ok(Number::ZERO),
        }
    }

    /// Forget every cached value so the next evaluation rolls again.
    pub fn clear_values(&mut self) {
        if let Some(root) = &mut self.root {
            root.clear_values();
        }
    }

    /// Combine copies of `self` and `other` under `op`, leaving both intact.
    pub fn concat(&self, other: &Self, op: Operator) -> RResult<Self> {
        check_concat_op(op)?;
        Ok(Self::joined(self.root.clone(), op, other.root.clone()))
    }

    /// Combine `self` and `other` under `op` in place, moving `other`'s nodes
    /// into `self` and leaving `other` empty.
    pub fn concat_from(&mut self, other: &mut Self, op: Operator) -> RResult<()> {
        check_concat_op(op)?;
        *self = Self::joined(self.root.take(), op, other.root.take());
        Ok(())
    }

    fn joined(left: Option<Node>, op: Operator, right: Option<Node>) -> Self {
        let left = left.unwrap_or_else(|| Node::int(0));
        let right = right.unwrap_or_else(|| Node::int(0));
        Self::from_root(Node::binary(op, left, right))
    }

    /// Attach `+ modifiers` (or `- |modifiers|`) above the root.
    pub fn add_modifiers(&mut self, modifiers: Int) {
        if modifiers == 0 {
            return;
        }
        let (op, amount) = match modifiers.checked_abs() {
            Some(amount) if modifiers < 0 => (Operator::Sub, amount),
            Some(amount) => (Operator::Add, amount),
            None => (Operator::Add, modifiers),
        };
        *self = Self::joined(self.root.take(), op, Some(Node::int(amount)));
    }

    fn rewrite(&mut self, f: impl Fn(Operator) -> Option<Operator>) -> &mut Self {
        if let Some(root) = &mut self.root {
            root.rewrite(&f);
        }
        self
    }

    /// Turn `d` and `da` into `dc`.
    pub fn critify(&mut self) -> &mut Self {
        self.rewrite(|op| match op {
            Operator::Dice | Operator::DiceAverage => Some(Operator::DiceCritical),
            _ => None,
        })
    }

    /// Turn every dice operator into `dm`.
    pub fn maxify(&mut self) -> &mut Self {
        self.rewrite(|op| op.is_dice().then(|| Operator::DiceMax))
    }

    /// Turn `d` into `da`.
    pub fn averageify(&mut self) -> &mut Self {
        self.rewrite(|op| match op {
            Operator::Dice => Some(Operator::DiceAverage),
            _ => None,
        })
    }

    /// Apply the rewrites `mode` asks for: average, then critical, then maximum.
    pub fn apply_mode(&mut self, mode: Mode) -> &mut Self {
        if mode.contains(Mode::AVERAGE) {
            self.averageify();
        }
        if mode.contains(Mode::CRIT) {
            self.critify();
        }
        if mode.contains(Mode::MAX) {
            self.maxify();
        }
        self
    }

    pub fn pre_order(&self) -> PreOrder<'_> {
        PreOrder {
            stack: self.root.iter().collect(),
        }
    }

    /// The expression as tokens, with parentheses wherever the tree's grouping
    /// differs from what precedence alone would give. Parsing the result
    /// yields an equal tree.
    pub fn in_order(&self) -> InOrder<'_> {
        InOrder {
            stack: self.root.iter().map(Step::Visit).collect(),
        }
    }

    fn outer_rolls(&self) -> Vec<&Roll> {
        let mut rolls = Vec::new();
        if let Some(root) = &self.root {
            root.collect_outer_rolls(&mut rolls);
        }
        rolls
    }

    /// Whether an evaluated d20 kept a natural 20.
    pub fn is_critical(&self) -> bool {
        self.outer_rolls()
            .iter()
            .any(|roll| roll.die().is_d20() && roll.rolls().contains(&Number::Int(20)))
    }

    /// Whether an evaluated d20 kept a natural 1.
    pub fn is_fail(&self) -> bool {
        self.outer_rolls()
            .iter()
            .any(|roll| roll.die().is_d20() && roll.rolls().contains(&Number::ONE))
    }
}

fn check_concat_op(op: Operator) -> RResult<()> {
    match op {
        Operator::Add | Operator::Sub => Ok(()),
        _ => Err(RollError::input_type_error(format!(
            "expression trees can only be joined with '+' or '-', not '{}'",
            op
        ))),
    }
}

impl FromStr for ExprTree {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for &ExprTree {
    type Output = ExprTree;

    fn add(self, rhs: Self) -> Self::Output {
        ExprTree::joined(self.root.clone(), Operator::Add, rhs.root.clone())
    }
}

impl Sub for &ExprTree {
    type Output = ExprTree;

    fn sub(self, rhs: Self) -> Self::Output {
        ExprTree::joined(self.root.clone(), Operator::Sub, rhs.root.clone())
    }
}

impl Add for ExprTree {
    type Output = ExprTree;

    fn add(self, rhs: Self) -> Self::Output {
        ExprTree::joined(self.root, Operator::Add, rhs.root)
    }
}

impl Sub for ExprTree {
    type Output = ExprTree;

    fn sub(self, rhs: Self) -> Self::Output {
        ExprTree::joined(self.root, Operator::Sub, rhs.root)
    }
}

impl AddAssign for ExprTree {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self::joined(self.root.take(), Operator::Add, rhs.root);
    }
}

impl SubAssign for ExprTree {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Self::joined(self.root.take(), Operator::Sub, rhs.root);
    }
}

/// Nodes in pre-order: each node before its left, then right, subtree.
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.right());
        self.stack.extend(node.left());
        Some(node)
    }
}

enum Step<'a> {
    Visit(&'a Node),
    Emit(Token),
}

/// Tokens of the expression in written order. See [`ExprTree::in_order`].
pub struct InOrder<'a> {
    stack: Vec<Step<'a>>,
}

impl<'a> InOrder<'a> {
    fn push_child(&mut self, parent: Operator, child: &'a Node, is_left: bool) {
        if needs_parens(parent, child, is_left) {
            self.stack.push(Step::Emit(Token::Close));
            self.stack.push(Step::Visit(child));
            self.stack.push(Step::Emit(Token::Open));
        } else {
            self.stack.push(Step::Visit(child));
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = match self.stack.pop()? {
                Step::Emit(token) => return Some(token),
                Step::Visit(node) => node,
            };
            let op = match node.payload {
                Payload::Op(op) => op,
                ref leaf => return Some(leaf.to_token()),
            };
            // pushed in reverse: left subtree, operator, right subtree
            if let Some(right) = node.right() {
                self.push_child(op, right, false);
            }
            self.stack.push(Step::Emit(Token::Op(op)));
            if let Some(left) = node.left() {
                self.push_child(op, left, true);
            }
        }
    }
}
