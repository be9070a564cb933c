use std::fmt;

use thiserror::Error;

use crate::parse::{Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCategory {
    Declaration,
    Reference,
    Type,
    LValue,
    Structural,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Declaration => "declaration error",
            ErrorCategory::Reference => "reference error",
            ErrorCategory::Type => "type error",
            ErrorCategory::LValue => "lvalue error",
            ErrorCategory::Structural => "structural error",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("identifier `{0}` already declared")]
    DeclaredIdent(String),

    #[error("identifier `{0}` is undeclared")]
    UndeclaredIdent(String),

    #[error("identifier `{0}` is not callable")]
    NotCallable(String),

    #[error("array access to non-array operand `{0}`")]
    NonArrayInArrayAccess(String),

    #[error("array access with non-integer index")]
    NonIntegerIndexInArrayAccess,

    #[error("assignment with incompatible types ({0} := {1})")]
    IncompatibleAssignment(String, String),

    #[error("left expression of assignment is not referenceable")]
    NonReferenceableLeftExpr,

    #[error("instruction `{0}` requires a boolean condition")]
    BooleanRequired(&'static str),

    #[error("control variable of `for` must be an integer")]
    ForRequireIntegerVar,

    #[error("range expressions of `for` must be integers")]
    ForRequireIntegerExpr,

    #[error("`range` takes 1 to 3 expressions, found {0}")]
    NumberOfRangeExpressions(usize),

    #[error("basic type required in `{0}`")]
    ReadWriteRequireBasic(&'static str),

    #[error("expression in `read` is not referenceable")]
    NonReferenceableExpression,

    #[error("return with incompatible type")]
    IncompatibleReturn,

    #[error("`{0}` expects {1} argument(s), found {2}")]
    NumberOfParameters(String, usize, usize),

    #[error("argument #{0} of `{1}` has an incompatible type")]
    IncompatibleParameter(usize, String),

    #[error("procedure `{0}` used where a value is required")]
    IsNotFunction(String),

    #[error("operator `{0}` with incompatible types")]
    IncompatibleOperator(&'static str),

    #[error("`max` takes at least 2 arguments, found {0}")]
    NumberOfMaxArguments(usize),

    #[error("`max` arguments must be all numeric or all char")]
    IncompatibleMaxArguments,

    #[error("there is no `main` function properly declared")]
    NoMainProperlyDeclared,
}

impl SemanticError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SemanticError::DeclaredIdent(_) => ErrorCategory::Declaration,
            SemanticError::UndeclaredIdent(_)
            | SemanticError::NotCallable(_)
            | SemanticError::NonArrayInArrayAccess(_) => ErrorCategory::Reference,
            SemanticError::NonReferenceableLeftExpr | SemanticError::NonReferenceableExpression => {
                ErrorCategory::LValue
            }
            SemanticError::NoMainProperlyDeclared => ErrorCategory::Structural,
            _ => ErrorCategory::Type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub node: NodeId,
    pub start: usize,
    pub end: usize,
    pub error: SemanticError,
}

impl Diagnostic {
    pub fn category(&self) -> ErrorCategory {
        self.error.category()
    }
}

/// Diagnostics in the order they were found.
#[derive(Debug, Default, Clone)]
pub struct SemErrors {
    diagnostics: Vec<Diagnostic>,
}

impl SemErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: NodeId, start: usize, end: usize, error: SemanticError) {
        self.diagnostics.push(Diagnostic {
            node,
            start,
            end,
            error,
        });
    }

    pub fn report<K>(&mut self, node: &Node<K>, error: SemanticError) {
        self.add(node.id, node.start, node.end, error);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn count(&self, category: ErrorCategory) -> usize {
        self.iter().filter(|d| d.category() == category).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
