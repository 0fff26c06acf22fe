use crate::parse::ParseError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RollError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Value(String),
    #[error("{0}")]
    Type(String),
    #[error("{0}")]
    InputType(String),
    #[error("too many dice rolled")]
    TooManyRolls,
}

impl RollError {
    pub fn value_error(msg: impl ToString) -> Self {
        Self::Value(msg.to_string())
    }

    pub fn type_error(msg: impl ToString) -> Self {
        Self::Type(msg.to_string())
    }

    pub fn input_type_error(msg: impl ToString) -> Self {
        Self::InputType(msg.to_string())
    }
}

pub type RResult<T> = Result<T, RollError>;
