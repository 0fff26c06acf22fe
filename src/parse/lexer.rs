use super::error::{ParseError, SourcePosition};
use crate::common::*;
use crate::ops::{Arity, Operator};
use crate::roll::Faces;
use logos::{Lexer, Logos};
use std::fmt;

#[derive(Logos, Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    #[regex(r"[0-9]+", |lex| lex.slice().parse())]
    Integer(Int),
    #[regex(r"\[[^\]]*\]", parse_faces)]
    Faces(Faces),
    #[regex(r"\[[^\]]*")]
    UnclosedFaces,
    #[token("F")]
    Fudge,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,

    #[token("!", |_| Operator::Factorial)]
    #[token("d", |_| Operator::Dice)]
    #[token("dc", |_| Operator::DiceCritical)]
    #[token("dm", |_| Operator::DiceMax)]
    #[token("da", |_| Operator::DiceAverage)]
    #[token("h", |_| Operator::KeepHigh)]
    #[token("l", |_| Operator::KeepLow)]
    #[token("f", |_| Operator::Floor)]
    #[token("c", |_| Operator::Ceil)]
    #[token("r", |_| Operator::RerollOnce)]
    #[token("R", |_| Operator::Reroll)]
    #[token("r<", |_| Operator::RerollOnceLower)]
    #[token("rl", |_| Operator::RerollOnceLower)]
    #[token("R<", |_| Operator::RerollLower)]
    #[token("Rl", |_| Operator::RerollLower)]
    #[token("r>", |_| Operator::RerollOnceHigher)]
    #[token("rh", |_| Operator::RerollOnceHigher)]
    #[token("R>", |_| Operator::RerollHigher)]
    #[token("Rh", |_| Operator::RerollHigher)]
    #[token("t", |_| Operator::ThresholdUpper)]
    #[token("T", |_| Operator::ThresholdLower)]
    #[token("^", |_| Operator::Pow)]
    #[token("*", |_| Operator::Mul)]
    #[token("/", |_| Operator::Div)]
    #[token("%", |_| Operator::Rem)]
    #[token(">", |_| Operator::Gt)]
    #[token("gt", |_| Operator::Gt)]
    #[token(">=", |_| Operator::Ge)]
    #[token("ge", |_| Operator::Ge)]
    #[token("<", |_| Operator::Lt)]
    #[token("lt", |_| Operator::Lt)]
    #[token("<=", |_| Operator::Le)]
    #[token("le", |_| Operator::Le)]
    #[token("=", |_| Operator::Eq)]
    #[token("|", |_| Operator::Or)]
    #[token("&", |_| Operator::And)]
    Op(Operator),

    #[regex(r"[ \t\r\n]+", logos::skip)]
    #[error]
    Error,
}

fn parse_faces(lex: &mut Lexer<TokenKind>) -> Option<Faces> {
    let s = lex.slice();
    Faces::parse_list(&s[1..s.len() - 1])
}

/// One unit of an expression, as produced by [`tokenize`] and consumed by
/// the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(Int),
    Faces(Faces),
    Op(Operator),
    Open,
    Close,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(x) => fmt::Display::fmt(x, f),
            Self::Faces(x) => fmt::Display::fmt(x, f),
            Self::Op(x) => fmt::Display::fmt(x, f),
            Self::Open => f.write_str("("),
            Self::Close => f.write_str(")"),
        }
    }
}

/// Whether a `+` or `-` following `prev` is a sign rather than a binary operator.
fn is_sign_position(prev: Option<&Token>) -> bool {
    match prev {
        None | Some(Token::Open) => true,
        Some(Token::Op(op)) => op.arity() != Arity::Postfix,
        Some(_) => false,
    }
}

pub fn tokenize(s: &str) -> Result<Vec<Token>, ParseError> {
    let mut lex = TokenKind::lexer(s);
    let mut tokens = Vec::new();

    while let Some(kind) = lex.next() {
        let pos = || SourcePosition {
            span: lex.span(),
            slice: lex.slice().to_owned(),
        };
        let token = match kind {
            TokenKind::Integer(x) => Token::Int(x),
            TokenKind::Faces(faces) => Token::Faces(faces),
            TokenKind::Fudge => match tokens.last() {
                Some(Token::Op(op)) if op.is_dice() => Token::Faces(Faces::fudge()),
                _ => return Err(ParseError::MisplacedFudge(pos())),
            },
            TokenKind::LeftParen => Token::Open,
            TokenKind::RightParen => Token::Close,
            TokenKind::Plus if is_sign_position(tokens.last()) => Token::Op(Operator::Pos),
            TokenKind::Plus => Token::Op(Operator::Add),
            TokenKind::Minus if is_sign_position(tokens.last()) => Token::Op(Operator::Neg),
            TokenKind::Minus => Token::Op(Operator::Sub),
            TokenKind::Op(op) => Token::Op(op),
            TokenKind::UnclosedFaces => return Err(ParseError::UnclosedFaces(pos())),
            TokenKind::Error if lex.slice().starts_with('[') => {
                return Err(ParseError::InvalidFaces(pos()))
            }
            TokenKind::Error => return Err(ParseError::Unrecognized(pos())),
        };
        tokens.push(token);
    }

    log::debug!("tokenized {:?} into {} tokens", s, tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::*;
    use Operator::*;

    fn check(s: &str, expected: Vec<Token>) {
        assert_eq!(tokenize(s).unwrap(), expected);
    }

    fn op(op: Operator) -> Token {
        Token::Op(op)
    }

    #[test]
    fn test_literals() {
        check("42", vec![Token::Int(42)]);
        check(" 1 2 ", vec![Token::Int(1), Token::Int(2)]);
        check(
            "[1, 2.5,-3]",
            vec![Token::Faces(Faces::new(vec1::vec1![
                int(1),
                Number::Float(2.5),
                int(-3)
            ]))],
        );
        check("", vec![]);
    }

    #[test]
    fn test_dice() {
        check(
            "2d20h1",
            vec![
                Token::Int(2),
                op(Dice),
                Token::Int(20),
                op(KeepHigh),
                Token::Int(1),
            ],
        );
        check(
            "4dF",
            vec![Token::Int(4), op(Dice), Token::Faces(Faces::fudge())],
        );
        check("1dc6", vec![Token::Int(1), op(DiceCritical), Token::Int(6)]);
    }

    #[test]
    fn test_longest_match() {
        check(
            "4d6r<3",
            vec![
                Token::Int(4),
                op(Dice),
                Token::Int(6),
                op(RerollOnceLower),
                Token::Int(3),
            ],
        );
        check(
            "4d6Rl3",
            vec![
                Token::Int(4),
                op(Dice),
                Token::Int(6),
                op(RerollLower),
                Token::Int(3),
            ],
        );
        check("1>=2", vec![Token::Int(1), op(Ge), Token::Int(2)]);
        check("1 ge 2", vec![Token::Int(1), op(Ge), Token::Int(2)]);
        check("1<2", vec![Token::Int(1), op(Lt), Token::Int(2)]);
    }

    #[test]
    fn test_signs() {
        check("-4", vec![op(Neg), Token::Int(4)]);
        check("+4", vec![op(Pos), Token::Int(4)]);
        check("1-4", vec![Token::Int(1), op(Sub), Token::Int(4)]);
        check(
            "1--4",
            vec![Token::Int(1), op(Sub), op(Neg), Token::Int(4)],
        );
        check(
            "(-4)",
            vec![Token::Open, op(Neg), Token::Int(4), Token::Close],
        );
        check(
            "3!-1",
            vec![Token::Int(3), op(Factorial), op(Sub), Token::Int(1)],
        );
        check(
            "(1)+2",
            vec![Token::Open, Token::Int(1), Token::Close, op(Add), Token::Int(2)],
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(tokenize("1 $ 2"), Err(ParseError::Unrecognized(p)) if p.span == (2..3)));
        assert!(matches!(tokenize("2F"), Err(ParseError::MisplacedFudge(_))));
        assert!(matches!(tokenize("F"), Err(ParseError::MisplacedFudge(_))));
        assert!(matches!(tokenize("1d[1,2"), Err(ParseError::UnclosedFaces(_))));
        assert!(matches!(tokenize("1d[]"), Err(ParseError::InvalidFaces(_))));
        assert!(matches!(tokenize("1d[a]"), Err(ParseError::InvalidFaces(_))));
        assert!(matches!(tokenize("1.5"), Err(ParseError::Unrecognized(_))));
    }

    #[test]
    fn test_display() {
        let tokens = tokenize("-(2d20h1 + 4dF)").unwrap();
        let shown: Vec<_> = tokens.iter().map(ToString::to_string).collect();
        assert_eq!(
            shown,
            ["-", "(", "2", "d", "20", "h", "1", "+", "4", "d", "[-1, 0, 1]", ")"]
        );
    }
}
