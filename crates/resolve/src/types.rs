//! Provisional types attached to nodes and elements
//!
//! The resolver only assigns types it can read off the syntax: literals,
//! resolved type references and generic container instantiations.
//! Everything else is left for the type checker.

use tern_ast::ElementId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Dynamic,
    Void,
    Interface { class: ElementId, args: Vec<Type> },
    Variable(ElementId),
    FunctionAlias { alias: ElementId, args: Vec<Type> },
}

impl Type {
    pub fn interface(class: ElementId, args: Vec<Type>) -> Self {
        Type::Interface { class, args }
    }

    /// Declaration this type refers to, if any
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Type::Interface { class, .. } => Some(*class),
            Type::Variable(id) => Some(*id),
            Type::FunctionAlias { alias, .. } => Some(*alias),
            Type::Dynamic | Type::Void => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Type::Variable(_))
    }

    pub fn type_args(&self) -> &[Type] {
        match self {
            Type::Interface { args, .. } | Type::FunctionAlias { args, .. } => args,
            _ => &[],
        }
    }
}

/// Source of the core types the resolver assigns directly
pub trait TypeProvider: Sync {
    fn dynamic_type(&self) -> Type {
        Type::Dynamic
    }
    fn object_type(&self) -> Type;
    fn int_type(&self) -> Type;
    fn double_type(&self) -> Type;
    fn bool_type(&self) -> Type;
    fn string_type(&self) -> Type;
    fn array_type(&self, element: Type) -> Type;
    fn map_type(&self, key: Type, value: Type) -> Type;
}

/// `TypeProvider` backed by the class elements of the core library
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreTypes {
    pub object: ElementId,
    pub int: ElementId,
    pub double: ElementId,
    pub bool: ElementId,
    pub string: ElementId,
    pub array: ElementId,
    pub map: ElementId,
}

impl TypeProvider for CoreTypes {
    fn object_type(&self) -> Type {
        Type::interface(self.object, vec![])
    }

    fn int_type(&self) -> Type {
        Type::interface(self.int, vec![])
    }

    fn double_type(&self) -> Type {
        Type::interface(self.double, vec![])
    }

    fn bool_type(&self) -> Type {
        Type::interface(self.bool, vec![])
    }

    fn string_type(&self) -> Type {
        Type::interface(self.string, vec![])
    }

    fn array_type(&self, element: Type) -> Type {
        Type::interface(self.array, vec![element])
    }

    fn map_type(&self, key: Type, value: Type) -> Type {
        Type::interface(self.map, vec![key, value])
    }
}
