use super::lexer::Token;
use super::parser::MAX_DEPTH;
use crate::ops::Operator;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    pub span: logos::Span,
    pub slice: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("(at position {}): unrecognized input {:?}", .0.span.start, .0.slice)]
    Unrecognized(SourcePosition),
    #[error("(at position {}): {:?} is not a list of numbers", .0.span.start, .0.slice)]
    InvalidFaces(SourcePosition),
    #[error("(at position {}): face list {:?} is never closed", .0.span.start, .0.slice)]
    UnclosedFaces(SourcePosition),
    #[error("(at position {}): 'F' can only be rolled, as in '4dF'", .0.span.start)]
    MisplacedFudge(SourcePosition),
    #[error("(at token {index}): unexpected {found}")]
    UnexpectedToken { index: usize, found: Token },
    #[error("(at token {index}): '{op}' is missing an operand")]
    MissingOperand { index: usize, op: Operator },
    #[error("(at token {index}): ')' has no matching '('")]
    UnmatchedClose { index: usize },
    #[error("(at token {index}): '(' is never closed")]
    UnclosedParen { index: usize },
    #[error("(at token {index}): empty parentheses")]
    EmptyGroup { index: usize },
    #[error("(at token {index}): expression nests deeper than {} levels", MAX_DEPTH)]
    TooDeep { index: usize },
    #[error("expected one expression, found {0}")]
    DanglingOperands(usize),
}
