use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Default)]
pub enum TokenizerError {
    #[default]
    #[error("unrecognized input")]
    Unrecognized,

    #[error("integer literal `{0}` does not fit in 64 bits")]
    IntegerOverflow(String),

    #[error("invalid float literal `{0}`")]
    InvalidFloat(String),

    #[error("unrecognized input `{text}` at byte {at}")]
    UnexpectedInput { text: String, at: usize },
}
