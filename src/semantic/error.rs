use thiserror::Error;

use crate::{parse::NodeId, symtable::SymTableError};

/// A later pass asked for an attribute an earlier pass should have stored.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecorationError {
    #[error("node {0} has no scope attached")]
    MissingScope(NodeId),

    #[error("node {0} has no type attached")]
    MissingType(NodeId),

    #[error("node {0} has no lvalue flag attached")]
    MissingLValue(NodeId),
}

/// Internal faults of the analysis passes. User-facing problems are
/// collected as diagnostics instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error(transparent)]
    Decoration(#[from] DecorationError),

    #[error(transparent)]
    SymTable(#[from] SymTableError),
}

pub type AResult<T> = Result<T, AnalysisError>;
