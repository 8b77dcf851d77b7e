use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifeGridError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("division by zero: total months is 0")]
    DivisionByZero,
}
