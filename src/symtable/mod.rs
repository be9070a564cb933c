pub mod error;

use std::collections::BTreeMap;

use tracing::trace;

pub use crate::symtable::error::SymTableError;
use crate::types::{TypeId, TypesMgr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub ty: TypeId,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub name: String,
    symbols: BTreeMap<String, Symbol>,
    /// Names in declaration order, so parameters can be listed as written.
    order: Vec<String>,
}

impl Scope {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            symbols: BTreeMap::new(),
            order: Vec::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.order
            .iter()
            .filter_map(|name| self.symbols.get(name).map(|s| (name.as_str(), s)))
    }
}

/// Scopes are created once, by the symbol-building pass, and re-entered by id
/// in every later pass.
#[derive(Debug, Default)]
pub struct SymTable {
    scopes: Vec<Scope>,
    stack: Vec<ScopeId>,
    current_function: Option<TypeId>,
}

impl SymTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_new_scope(&mut self, name: &str) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(name));
        self.stack.push(id);
        trace!(scope = name, id = id.0, "push new scope");
        id
    }

    pub fn push_this_scope(&mut self, id: ScopeId) -> Result<(), SymTableError> {
        if id.0 >= self.scopes.len() {
            return Err(SymTableError::UnknownScope(id));
        }
        trace!(scope = %self.scopes[id.0].name, id = id.0, "re-enter scope");
        self.stack.push(id);
        Ok(())
    }

    pub fn pop_scope(&mut self) -> Result<ScopeId, SymTableError> {
        self.stack.pop().ok_or(SymTableError::ScopeUnderflow)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.0)
    }

    fn current(&self) -> Option<&Scope> {
        self.stack.last().and_then(|id| self.scopes.get(id.0))
    }

    pub fn find_in_current_scope(&self, name: &str) -> bool {
        self.current().is_some_and(|scope| scope.get(name).is_some())
    }

    /// Innermost scope on the active chain that declares `name`.
    pub fn find_in_stack(&self, name: &str) -> Option<ScopeId> {
        self.stack
            .iter()
            .rev()
            .copied()
            .find(|id| self.scopes[id.0].get(name).is_some())
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.find_in_stack(name).and_then(|id| self.scopes[id.0].get(name))
    }

    fn add_symbol(
        &mut self,
        name: &str,
        kind: SymbolKind,
        ty: TypeId,
    ) -> Result<(), SymTableError> {
        let id = *self.stack.last().ok_or(SymTableError::ScopeUnderflow)?;
        let scope = &mut self.scopes[id.0];
        if scope.symbols.insert(name.to_string(), Symbol { kind, ty }).is_none() {
            scope.order.push(name.to_string());
        }
        Ok(())
    }

    pub fn add_local_var(&mut self, name: &str, ty: TypeId) -> Result<(), SymTableError> {
        self.add_symbol(name, SymbolKind::Variable, ty)
    }

    pub fn add_parameter(&mut self, name: &str, ty: TypeId) -> Result<(), SymTableError> {
        self.add_symbol(name, SymbolKind::Parameter, ty)
    }

    pub fn add_function(&mut self, name: &str, ty: TypeId) -> Result<(), SymTableError> {
        self.add_symbol(name, SymbolKind::Function, ty)
    }

    pub fn get_type(&self, name: &str) -> Option<TypeId> {
        self.lookup(name).map(|s| s.ty)
    }

    pub fn is_parameter_class(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|s| s.kind == SymbolKind::Parameter)
    }

    pub fn is_function_class(&self, name: &str) -> bool {
        self.lookup(name).is_some_and(|s| s.kind == SymbolKind::Function)
    }

    pub fn set_current_function_ty(&mut self, ty: TypeId) {
        self.current_function = Some(ty);
    }

    pub fn current_function_ty(&self) -> Result<TypeId, SymTableError> {
        self.current_function.ok_or(SymTableError::NoCurrentFunction)
    }

    /// True unless the global scope holds a `main` taking no parameters and
    /// returning nothing.
    pub fn no_main_properly_declared(&self, types: &TypesMgr) -> bool {
        let Some(global) = self.scopes.first() else {
            return true;
        };
        match global.get("main") {
            Some(Symbol {
                kind: SymbolKind::Function,
                ty,
            }) => !(types.num_of_parameters(*ty) == 0 && types.is_void_function(*ty)),
            _ => true,
        }
    }
}
