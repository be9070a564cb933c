//! One compilation session: owns the tables shared by the passes and runs
//! them in order.

use thiserror::Error;
use tracing::debug;

use crate::{
    parse::{Parser, ParserError, Program as AstProgram},
    semantic::{AnalysisError, Decorations, Diagnostic, SemErrors, SymbolsBuilder, TypeChecker},
    symtable::SymTable,
    tacky::{IRError, Program, TackyGen},
    tokenize::{TokenizerError, tokenize},
    types::TypesMgr,
};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Tokenize(#[from] TokenizerError),

    #[error(transparent)]
    Parse(#[from] ParserError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    IR(#[from] IRError),

    #[error("{} semantic error(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),
}

#[derive(Debug, Default)]
pub struct Compiler {
    pub types: TypesMgr,
    pub symbols: SymTable,
    pub decorations: Decorations,
    pub errors: SemErrors,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the symbol and type-checking passes. Rule violations end up in
    /// `self.errors`; only internal faults are returned.
    pub fn analyze(&mut self, program: &AstProgram) -> Result<(), AnalysisError> {
        SymbolsBuilder::new(
            &mut self.types,
            &mut self.symbols,
            &mut self.decorations,
            &mut self.errors,
        )
        .build_program(program)?;

        TypeChecker::new(
            &mut self.types,
            &mut self.symbols,
            &mut self.decorations,
            &mut self.errors,
        )
        .check_program(program)?;

        debug!(diagnostics = self.errors.len(), "analysis finished");
        Ok(())
    }

    pub fn generate(&mut self, program: &AstProgram) -> Result<Program, IRError> {
        TackyGen::new(&self.types, &mut self.symbols, &self.decorations).codegen(program)
    }
}

pub fn parse(source: &str) -> Result<AstProgram, CompileError> {
    let tokens = tokenize(source)?;
    debug!(tokens = tokens.len(), "tokenized");
    Ok(Parser::new(tokens).parse()?)
}

/// Parses and analyzes `source`, returning the session so callers can
/// inspect the tables and diagnostics.
pub fn check(source: &str) -> Result<(AstProgram, Compiler), CompileError> {
    let program = parse(source)?;
    let mut compiler = Compiler::new();
    compiler.analyze(&program)?;
    Ok((program, compiler))
}

pub fn compile(source: &str) -> Result<Program, CompileError> {
    let (program, mut compiler) = check(source)?;
    if compiler.errors.has_errors() {
        return Err(CompileError::Diagnostics(compiler.errors.into_vec()));
    }
    Ok(compiler.generate(&program)?)
}

/// 1-based line and column of a byte offset.
pub fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let prefix = source.get(..offset).unwrap_or(source);
    let line = prefix.matches('\n').count() + 1;
    let col = prefix
        .rfind('\n')
        .map_or(prefix.chars().count(), |nl| prefix[nl + 1..].chars().count())
        + 1;
    (line, col)
}
