use thiserror::Error;

use crate::tokenize::TokenKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParserError {
    #[error("unexpected end of input{0}")]
    UnexpectedEof(&'static str),

    #[error("expected token {0:?}, found {1:?}")]
    ExpectedToken(TokenKind, Option<TokenKind>),

    #[error("expected identifier, found {0:?}")]
    ExpectedIdentifier(Option<TokenKind>),

    #[error("expected a type, found {0:?}")]
    ExpectedType(Option<TokenKind>),

    #[error("array size must be positive, found {0}")]
    InvalidArraySize(i64),

    #[error("expected a statement, found {0:?}")]
    ExpectedStatement(TokenKind),

    #[error("expected an assignment or call after identifier `{0}`")]
    ExpectedAssignOrCall(String),

    #[error("expected primary expression, found {0:?}")]
    ExpectedPrimary(TokenKind),

    #[error("a program needs at least one function")]
    EmptyProgram,

    #[error("not at end of program (next token: {0:?})")]
    NotAtEnd(Option<TokenKind>),
}

pub type PResult<T> = Result<T, ParserError>;
