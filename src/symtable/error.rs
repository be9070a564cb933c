use thiserror::Error;

use crate::symtable::ScopeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymTableError {
    #[error("scope stack underflow")]
    ScopeUnderflow,

    #[error("unknown scope {0:?}")]
    UnknownScope(ScopeId),

    #[error("no enclosing function")]
    NoCurrentFunction,
}
