//! Block state parse errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatesParseError {
    #[error("block states must be enclosed in brackets")]
    MissingBrackets,

    #[error("missing '=' in state entry: {0}")]
    MissingSeparator(String),

    #[error("unterminated quoted string")]
    UnterminatedString,

    #[error("empty state key")]
    EmptyKey,

    #[error("empty state value")]
    EmptyValue,
}
