pub mod error;

use logos::Logos;

pub use crate::tokenize::error::TokenizerError;

#[derive(Debug, Clone, PartialEq, Logos)]
#[logos(error = TokenizerError)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    #[token("false", |_| false)]
    #[token("true", |_| true)]
    Bool(bool),

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(":=")]
    Assign,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("==")]
    DoubleEqual,

    #[token("!=")]
    NotEqual,

    #[token("<")]
    LessThan,

    #[token(">")]
    GreaterThan,

    #[token("<=")]
    LessThanEqual,

    #[token(">=")]
    GreaterThanEqual,

    #[token("and")]
    And,

    #[token("or")]
    Or,

    #[token("not")]
    Not,

    #[token("func")]
    Func,

    #[token("endfunc")]
    EndFunc,

    #[token("var")]
    Var,

    #[token("array")]
    Array,

    #[token("of")]
    Of,

    #[token("int")]
    Int,

    #[token("float")]
    Float,

    #[token("bool")]
    BoolType,

    #[token("char")]
    Char,

    #[token("if")]
    If,

    #[token("then")]
    Then,

    #[token("else")]
    Else,

    #[token("endif")]
    EndIf,

    #[token("while")]
    While,

    #[token("do")]
    Do,

    #[token("endwhile")]
    EndWhile,

    #[token("for")]
    For,

    #[token("in")]
    In,

    #[token("range")]
    Range,

    #[token("endfor")]
    EndFor,

    #[token("read")]
    Read,

    #[token("write")]
    Write,

    #[token("return")]
    Return,

    #[token("max")]
    Max,

    #[regex(r"[0-9]+", |lex| {
        lex.slice()
            .parse::<i64>()
            .map_err(|_| TokenizerError::IntegerOverflow(lex.slice().to_owned()))
    })]
    IntLiteral(i64),

    #[regex(r"[0-9]+\.[0-9]+", |lex| {
        lex.slice()
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| TokenizerError::InvalidFloat(lex.slice().to_owned()))
    })]
    FloatLiteral(f64),

    /// Raw text between the quotes, escapes left undecoded.
    #[regex(r"'([^'\\\n]|\\[^\n])'", |lex| strip_quotes(lex.slice()))]
    CharLiteral(String),

    /// Raw text between the quotes, escapes left undecoded.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#, |lex| strip_quotes(lex.slice()))]
    StringLiteral(String),

    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_owned())]
    Identifier(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub source: String,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizerError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = vec![];

    while let Some(t) = lexer.next() {
        let (start, end) = (lexer.span().start, lexer.span().end);
        let kind = t.map_err(|e| match e {
            TokenizerError::Unrecognized => TokenizerError::UnexpectedInput {
                text: lexer.slice().to_owned(),
                at: start,
            },
            other => other,
        })?;

        tokens.push(Token {
            kind,
            start,
            end,
            source: lexer.slice().to_owned(),
        });
    }

    Ok(tokens)
}

fn strip_quotes(literal: &str) -> String {
    literal[1..literal.len() - 1].to_owned()
}
