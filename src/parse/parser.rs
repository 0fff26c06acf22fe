use super::error::ParseError;
use super::lexer::Token;
use crate::ops::{Arity, Operator};
use crate::roll::Node;

/// How deeply a parsed expression may nest. Evaluation and rendering recurse
/// once per level.
pub const MAX_DEPTH: usize = 256;

/// An entry of the operator stack; `index` is the token it came from.
#[derive(Debug)]
enum Pending {
    Op { op: Operator, index: usize },
    Group { index: usize },
}

/// Operator-precedence parser over a token sequence.
///
/// Tracks whether the next token has to start an operand, so misplaced
/// operators and adjacent operands are rejected where they appear. Each
/// operand is stacked with its depth.
#[derive(Debug)]
pub(crate) struct Parser {
    operators: Vec<Pending>,
    operands: Vec<(Node, usize)>,
    expect_operand: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            operators: Vec::new(),
            operands: Vec::new(),
            expect_operand: true,
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, index: usize, token: Token) -> Result<(), ParseError> {
        match token {
            Token::Int(_) | Token::Faces(_) | Token::Open if !self.expect_operand => {
                return Err(ParseError::UnexpectedToken {
                    index,
                    found: token,
                })
            }
            Token::Int(x) => self.push_operand(Node::int(x)),
            Token::Faces(faces) => self.push_operand(Node::faces(faces)),
            Token::Open => self.operators.push(Pending::Group { index }),
            Token::Close => self.close_group(index)?,
            Token::Op(op) => self.push_operator(index, op)?,
        }
        Ok(())
    }

    fn push_operand(&mut self, node: Node) {
        self.operands.push((node, 1));
        self.expect_operand = false;
    }

    fn push_operator(&mut self, index: usize, op: Operator) -> Result<(), ParseError> {
        match (op.arity(), self.expect_operand) {
            (Arity::Prefix, true) => self.operators.push(Pending::Op { op, index }),
            (Arity::Prefix, false) => {
                return Err(ParseError::UnexpectedToken {
                    index,
                    found: Token::Op(op),
                })
            }
            (_, true) => return Err(ParseError::MissingOperand { index, op }),
            (Arity::Postfix, false) => {
                self.reduce_before(op)?;
                self.reduce(op, index)?;
            }
            (Arity::Binary, false) => {
                self.reduce_before(op)?;
                self.operators.push(Pending::Op { op, index });
                self.expect_operand = true;
            }
        }
        Ok(())
    }

    fn close_group(&mut self, index: usize) -> Result<(), ParseError> {
        if self.expect_operand {
            return Err(match self.operators.last() {
                Some(Pending::Group { .. }) => ParseError::EmptyGroup { index },
                Some(&Pending::Op { op, index }) => ParseError::MissingOperand { index, op },
                None => ParseError::UnmatchedClose { index },
            });
        }
        loop {
            match self.operators.pop() {
                Some(Pending::Op { op, index }) => self.reduce(op, index)?,
                Some(Pending::Group { .. }) => return Ok(()),
                None => return Err(ParseError::UnmatchedClose { index }),
            }
        }
    }

    /// Reduce every stacked operator that binds at least as tightly as `next`.
    fn reduce_before(&mut self, next: Operator) -> Result<(), ParseError> {
        while let Some(&Pending::Op { op, index }) = self.operators.last() {
            if !op.reduces_before(next) {
                break;
            }
            self.operators.pop();
            self.reduce(op, index)?;
        }
        Ok(())
    }

    fn reduce(&mut self, op: Operator, index: usize) -> Result<(), ParseError> {
        let missing = || ParseError::MissingOperand { index, op };
        let (node, depth) = match op.arity() {
            Arity::Binary => {
                let (right, r) = self.operands.pop().ok_or_else(missing)?;
                let (left, l) = self.operands.pop().ok_or_else(missing)?;
                (Node::binary(op, left, right), l.max(r))
            }
            Arity::Prefix => {
                let (child, depth) = self.operands.pop().ok_or_else(missing)?;
                (Node::prefix(op, child), depth)
            }
            Arity::Postfix => {
                let (child, depth) = self.operands.pop().ok_or_else(missing)?;
                (Node::postfix(op, child), depth)
            }
        };
        if depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep { index });
        }
        self.operands.push((node, depth + 1));
        Ok(())
    }

    /// Reduce what is left and return the root, or `None` for no tokens at all.
    pub fn finish(mut self) -> Result<Option<Node>, ParseError> {
        if self.expect_operand {
            match self.operators.last() {
                None => {}
                Some(Pending::Group { index }) => {
                    return Err(ParseError::UnclosedParen { index: *index })
                }
                Some(&Pending::Op { op, index }) => {
                    return Err(ParseError::MissingOperand { index, op })
                }
            }
        }
        while let Some(pending) = self.operators.pop() {
            match pending {
                Pending::Op { op, index } => self.reduce(op, index)?,
                Pending::Group { index } => return Err(ParseError::UnclosedParen { index }),
            }
        }
        match self.operands.len() {
            0 | 1 => Ok(self.operands.pop().map(|(node, _)| node)),
            n => Err(ParseError::DanglingOperands(n)),
        }
    }
}

pub(crate) fn parse_tokens(
    tokens: impl IntoIterator<Item = Token>,
) -> Result<Option<Node>, ParseError> {
    let mut parser = Parser::new();
    for (index, token) in tokens.into_iter().enumerate() {
        parser.push(index, token)?;
    }
    let root = parser.finish()?;
    log::debug!("parsed expression {:?}", root);
    Ok(root)
}
