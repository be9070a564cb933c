pub mod decorations;
pub mod diagnostics;
pub mod error;
pub mod symbols;
pub mod typecheck;

pub use crate::semantic::{
    decorations::Decorations,
    diagnostics::{Diagnostic, ErrorCategory, SemErrors, SemanticError},
    error::{AResult, AnalysisError, DecorationError},
    symbols::SymbolsBuilder,
    typecheck::TypeChecker,
};
