use thiserror::Error;

use crate::{semantic::DecorationError, symtable::SymTableError};

pub type IResult<T> = Result<T, IRError>;

/// Broken preconditions of code generation. Only reachable when it runs on
/// a tree that did not pass type checking.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IRError {
    #[error(transparent)]
    Decoration(#[from] DecorationError),

    #[error(transparent)]
    SymTable(#[from] SymTableError),

    #[error("unknown identifier `{0}`")]
    UnknownIdent(String),

    #[error("call to non-function `{0}`")]
    NotAFunction(String),

    #[error("too many arguments in call to `{0}`")]
    TooManyArguments(String),

    #[error("procedure `{0}` used as a value")]
    NoValue(String),

    #[error("whole-array assignment needs a named array, found {0}")]
    BadArrayOperand(&'static str),

    #[error("`max` without arguments")]
    EmptyMax,
}
