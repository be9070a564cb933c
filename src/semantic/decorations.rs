use std::collections::BTreeMap;

use crate::{
    parse::NodeId,
    semantic::error::DecorationError,
    symtable::ScopeId,
    types::TypeId,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Attributes {
    scope: Option<ScopeId>,
    ty: Option<TypeId>,
    lvalue: Option<bool>,
}

/// Attributes computed by one pass and read back by the next, keyed by node.
#[derive(Debug, Default)]
pub struct Decorations {
    nodes: BTreeMap<NodeId, Attributes>,
}

impl Decorations {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, node: NodeId) -> &mut Attributes {
        self.nodes.entry(node).or_default()
    }

    pub fn put_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.entry(node).scope = Some(scope);
    }

    pub fn put_type(&mut self, node: NodeId, ty: TypeId) {
        self.entry(node).ty = Some(ty);
    }

    pub fn put_is_lvalue(&mut self, node: NodeId, lvalue: bool) {
        self.entry(node).lvalue = Some(lvalue);
    }

    pub fn get_scope(&self, node: NodeId) -> Result<ScopeId, DecorationError> {
        self.nodes
            .get(&node)
            .and_then(|a| a.scope)
            .ok_or(DecorationError::MissingScope(node))
    }

    pub fn get_type(&self, node: NodeId) -> Result<TypeId, DecorationError> {
        self.nodes
            .get(&node)
            .and_then(|a| a.ty)
            .ok_or(DecorationError::MissingType(node))
    }

    pub fn get_is_lvalue(&self, node: NodeId) -> Result<bool, DecorationError> {
        self.nodes
            .get(&node)
            .and_then(|a| a.lvalue)
            .ok_or(DecorationError::MissingLValue(node))
    }
}
