use tracing::debug;

use crate::{
    parse::{Function, Ident, Program, TypeAnnotation},
    semantic::{
        decorations::Decorations,
        diagnostics::{SemErrors, SemanticError},
        error::AResult,
    },
    symtable::{SymTable, SymbolKind},
    types::{TypeId, TypesMgr},
};

pub const GLOBAL_SCOPE: &str = "$global$";

/// First pass: opens every scope, registers parameters, variables and
/// functions, and records the scope and function type of each node.
pub struct SymbolsBuilder<'a> {
    types: &'a mut TypesMgr,
    symbols: &'a mut SymTable,
    decorations: &'a mut Decorations,
    errors: &'a mut SemErrors,
}

impl<'a> SymbolsBuilder<'a> {
    pub fn new(
        types: &'a mut TypesMgr,
        symbols: &'a mut SymTable,
        decorations: &'a mut Decorations,
        errors: &'a mut SemErrors,
    ) -> Self {
        Self {
            types,
            symbols,
            decorations,
            errors,
        }
    }

    pub fn build_program(&mut self, program: &Program) -> AResult<()> {
        let scope = self.symbols.push_new_scope(GLOBAL_SCOPE);
        self.decorations.put_scope(program.id, scope);

        for function in &program.functions {
            self.build_function(function)?;
        }

        self.symbols.pop_scope()?;
        Ok(())
    }

    fn build_function(&mut self, function: &Function) -> AResult<()> {
        let name = function.name.kind.as_str();
        let scope = self.symbols.push_new_scope(name);
        self.decorations.put_scope(function.id, scope);

        // Every written parameter counts towards the signature, even one
        // whose name was rejected as a duplicate.
        let mut params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            let ty = self.declared_type(&param.r#type);
            self.declare(&param.name, ty, SymbolKind::Parameter)?;
            params.push(ty);
        }

        for decl in &function.declarations {
            let ty = self.declared_type(&decl.r#type);
            for var in &decl.names {
                self.declare(var, ty, SymbolKind::Variable)?;
            }
        }

        let ret = match &function.return_type {
            Some(annotation) => self.declared_type(annotation),
            None => self.types.create_void_ty(),
        };

        self.symbols.pop_scope()?;

        let ty = self.types.create_function_ty(params, ret);
        self.decorations.put_type(function.id, ty);
        debug!(function = name, ty = %self.types.to_string(ty), "declared");

        if self.symbols.find_in_current_scope(name) {
            self.errors
                .report(&function.name, SemanticError::DeclaredIdent(name.to_string()));
        } else {
            self.symbols.add_function(name, ty)?;
        }
        Ok(())
    }

    fn declared_type(&mut self, annotation: &TypeAnnotation) -> TypeId {
        let ty = self.types.create_declared_ty(&annotation.kind);
        self.decorations.put_type(annotation.id, ty);
        ty
    }

    fn declare(&mut self, ident: &Ident, ty: TypeId, kind: SymbolKind) -> AResult<()> {
        let name = ident.kind.as_str();
        if self.symbols.find_in_current_scope(name) {
            self.errors
                .report(ident, SemanticError::DeclaredIdent(name.to_string()));
            return Ok(());
        }
        match kind {
            SymbolKind::Parameter => self.symbols.add_parameter(name, ty)?,
            SymbolKind::Variable => self.symbols.add_local_var(name, ty)?,
            SymbolKind::Function => self.symbols.add_function(name, ty)?,
        }
        Ok(())
    }
}
