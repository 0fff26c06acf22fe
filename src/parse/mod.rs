mod error;
mod lexer;
mod parser;

pub use error::{ParseError, SourcePosition};
pub use lexer::{tokenize, Token};
pub(crate) use parser::parse_tokens;
