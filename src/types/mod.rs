//! The type universe: every type used by a compilation is interned here and
//! referred to by a [`TypeId`], so two ids are equal exactly when the types are.

use std::collections::BTreeMap;

use crate::parse::{BasicType, BinaryOp, TypeSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(usize);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Type {
    Error,
    Void,
    Integer,
    Float,
    Boolean,
    Character,
    Array { size: usize, elem: TypeId },
    Function { params: Vec<TypeId>, ret: TypeId },
}

#[derive(Debug, Default)]
pub struct TypesMgr {
    types: Vec<Type>,
    interned: BTreeMap<Type, TypeId>,
}

impl TypesMgr {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.interned.get(&ty) {
            return *id;
        }
        let id = TypeId(self.types.len());
        self.types.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    pub fn get(&self, t: TypeId) -> &Type {
        &self.types[t.0]
    }

    pub fn create_error_ty(&mut self) -> TypeId {
        self.intern(Type::Error)
    }

    pub fn create_void_ty(&mut self) -> TypeId {
        self.intern(Type::Void)
    }

    pub fn create_integer_ty(&mut self) -> TypeId {
        self.intern(Type::Integer)
    }

    pub fn create_float_ty(&mut self) -> TypeId {
        self.intern(Type::Float)
    }

    pub fn create_boolean_ty(&mut self) -> TypeId {
        self.intern(Type::Boolean)
    }

    pub fn create_character_ty(&mut self) -> TypeId {
        self.intern(Type::Character)
    }

    pub fn create_array_ty(&mut self, size: usize, elem: TypeId) -> TypeId {
        self.intern(Type::Array { size, elem })
    }

    pub fn create_function_ty(&mut self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.intern(Type::Function { params, ret })
    }

    pub fn create_basic_ty(&mut self, basic: BasicType) -> TypeId {
        match basic {
            BasicType::Int => self.create_integer_ty(),
            BasicType::Float => self.create_float_ty(),
            BasicType::Bool => self.create_boolean_ty(),
            BasicType::Char => self.create_character_ty(),
        }
    }

    /// Interns the type written by a declaration annotation.
    pub fn create_declared_ty(&mut self, spec: &TypeSpec) -> TypeId {
        match *spec {
            TypeSpec::Basic(basic) => self.create_basic_ty(basic),
            TypeSpec::Array { size, elem } => {
                let elem = self.create_basic_ty(elem);
                self.create_array_ty(size, elem)
            }
        }
    }

    pub fn is_error_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Error)
    }

    pub fn is_void_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Void)
    }

    pub fn is_integer_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Integer)
    }

    pub fn is_float_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Float)
    }

    pub fn is_boolean_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Boolean)
    }

    pub fn is_character_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Character)
    }

    pub fn is_numeric_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Integer | Type::Float)
    }

    pub fn is_primitive_ty(&self, t: TypeId) -> bool {
        matches!(
            self.get(t),
            Type::Integer | Type::Float | Type::Boolean | Type::Character
        )
    }

    pub fn is_array_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Array { .. })
    }

    pub fn is_function_ty(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Function { .. })
    }

    pub fn is_void_function(&self, t: TypeId) -> bool {
        matches!(self.get(t), Type::Function { ret, .. } if self.is_void_ty(*ret))
    }

    /// Whether a value of type `src` may be stored where `dst` is expected.
    /// Integer widens to Float; everything else must match exactly.
    pub fn copyable_types(&self, dst: TypeId, src: TypeId) -> bool {
        dst == src || (self.is_float_ty(dst) && self.is_integer_ty(src))
    }

    pub fn comparable_types(&self, t1: TypeId, t2: TypeId, op: BinaryOp) -> bool {
        if self.is_numeric_ty(t1) && self.is_numeric_ty(t2) {
            return true;
        }
        if op.is_equality() {
            t1 == t2 && self.is_primitive_ty(t1)
        } else {
            self.is_character_ty(t1) && self.is_character_ty(t2)
        }
    }

    pub fn size_of(&self, t: TypeId) -> usize {
        match self.get(t) {
            Type::Array { size, elem } => size * self.size_of(*elem),
            Type::Function { .. } | Type::Void | Type::Error => 0,
            _ => 1,
        }
    }

    pub fn func_params_types(&self, t: TypeId) -> &[TypeId] {
        match self.get(t) {
            Type::Function { params, .. } => params,
            _ => &[],
        }
    }

    /// Return type of a function type; `t` itself for anything else.
    pub fn func_return_type(&self, t: TypeId) -> TypeId {
        match self.get(t) {
            Type::Function { ret, .. } => *ret,
            _ => t,
        }
    }

    pub fn num_of_parameters(&self, t: TypeId) -> usize {
        self.func_params_types(t).len()
    }

    pub fn parameter_type(&self, t: TypeId, i: usize) -> Option<TypeId> {
        self.func_params_types(t).get(i).copied()
    }

    pub fn array_size(&self, t: TypeId) -> usize {
        match self.get(t) {
            Type::Array { size, .. } => *size,
            _ => 0,
        }
    }

    /// Element type of an array type; `t` itself for anything else.
    pub fn array_elem_type(&self, t: TypeId) -> TypeId {
        match self.get(t) {
            Type::Array { elem, .. } => *elem,
            _ => t,
        }
    }

    pub fn to_string(&self, t: TypeId) -> String {
        match self.get(t) {
            Type::Error => "error".to_string(),
            Type::Void => "void".to_string(),
            Type::Integer => "int".to_string(),
            Type::Float => "float".to_string(),
            Type::Boolean => "bool".to_string(),
            Type::Character => "char".to_string(),
            Type::Array { size, elem } => format!("array<{size},{}>", self.to_string(*elem)),
            Type::Function { params, ret } => {
                let params = params
                    .iter()
                    .map(|p| self.to_string(*p))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("function<({params}):{}>", self.to_string(*ret))
            }
        }
    }
}
