//! Element model
//!
//! Elements are the declarations names resolve to. Declared elements are
//! produced by the element-building pass and frozen inside a `Program`;
//! the resolver only adds synthetic ones (implicit default constructors and
//! `super` pseudo-elements) to its own overlay. Back-references such as the
//! enclosing element are ids, never ownership.

use bitflags::bitflags;
use codespan::Span;
use tern_ast::{ElementId, ScopeId};

use crate::types::Type;

bitflags! {
    /// Declaration modifiers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u16 {
        const STATIC = 1 << 0;
        const FINAL = 1 << 1;
        const CONST = 1 << 2;
        const FACTORY = 1 << 3;
        const ABSTRACT = 1 << 4;
        const EXTERNAL = 1 << 5;
        const NATIVE = 1 << 6;
        const GETTER = 1 << 7;
        const SETTER = 1 << 8;
        /// Named parameter
        const NAMED = 1 << 9;
        /// Optional positional parameter
        const OPTIONAL = 1 << 10;
        /// Field with an initializer at its declaration
        const INITIALIZED = 1 << 11;
        /// Property declared only through a getter and/or setter
        const ABSTRACT_FIELD = 1 << 12;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub kind: ElementKind,
    pub modifiers: Modifiers,
    pub enclosing: Option<ElementId>,
    pub span: Option<Span>,
    /// Declared type, when the declaration spells one
    pub ty: Option<Type>,
    /// Created by the resolver rather than declared in source
    pub synthetic: bool,
}

impl Element {
    pub fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            id: ElementId(u32::MAX),
            name: name.into(),
            kind,
            modifiers: Modifiers::empty(),
            enclosing: None,
            span: None,
            ty: None,
            synthetic: false,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_enclosing(mut self, enclosing: ElementId) -> Self {
        self.enclosing = Some(enclosing);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_type(mut self, ty: Type) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    /// `final` or `const`
    pub fn is_final(&self) -> bool {
        self.modifiers.intersects(Modifiers::FINAL | Modifiers::CONST)
    }

    pub fn is_const(&self) -> bool {
        self.modifiers.contains(Modifiers::CONST)
    }

    pub fn is_factory(&self) -> bool {
        self.modifiers.contains(Modifiers::FACTORY)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifiers::ABSTRACT)
    }

    pub fn is_external(&self) -> bool {
        self.modifiers.contains(Modifiers::EXTERNAL)
    }

    pub fn is_native(&self) -> bool {
        self.modifiers.contains(Modifiers::NATIVE)
    }

    pub fn is_named_parameter(&self) -> bool {
        self.modifiers.contains(Modifiers::NAMED)
    }

    pub fn is_required_parameter(&self) -> bool {
        !self.modifiers.intersects(Modifiers::NAMED | Modifiers::OPTIONAL)
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, ElementKind::Class(_))
    }

    pub fn is_interface(&self) -> bool {
        matches!(&self.kind, ElementKind::Class(data) if data.is_interface)
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, ElementKind::Constructor(_))
    }

    /// Generative constructor: a constructor that is not a factory
    pub fn is_generative_constructor(&self) -> bool {
        self.is_constructor() && !self.is_factory()
    }

    pub fn class_data(&self) -> Option<&ClassData> {
        match &self.kind {
            ElementKind::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn method_data(&self) -> Option<&MethodData> {
        match &self.kind {
            ElementKind::Constructor(data) | ElementKind::Method(data) => Some(data),
            _ => None,
        }
    }

    pub fn field_data(&self) -> Option<&FieldData> {
        match &self.kind {
            ElementKind::Field(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Library(LibraryData),
    /// Classes and interfaces; see `ClassData::is_interface`
    Class(ClassData),
    Constructor(MethodData),
    /// Methods, accessors, top-level and local functions
    Method(MethodData),
    Field(FieldData),
    Parameter(ParameterData),
    Variable,
    Label(LabelData),
    TypeVariable(TypeVariableData),
    FunctionTypeAlias(AliasData),
    LibraryPrefix(PrefixData),
    Super(SuperData),
}

impl ElementKind {
    pub fn description(&self) -> &'static str {
        match self {
            ElementKind::Library(_) => "library",
            ElementKind::Class(data) if data.is_interface => "interface",
            ElementKind::Class(_) => "class",
            ElementKind::Constructor(_) => "constructor",
            ElementKind::Method(_) => "method",
            ElementKind::Field(_) => "field",
            ElementKind::Parameter(_) => "parameter",
            ElementKind::Variable => "variable",
            ElementKind::Label(_) => "label",
            ElementKind::TypeVariable(_) => "type variable",
            ElementKind::FunctionTypeAlias(_) => "function type alias",
            ElementKind::LibraryPrefix(_) => "library prefix",
            ElementKind::Super(_) => "super",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LibraryData {
    /// Top-level scope of the library, for prefixed access
    pub scope: Option<ScopeId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassData {
    pub is_interface: bool,
    pub supertype: Option<ElementId>,
    pub interfaces: Vec<ElementId>,
    pub type_params: Vec<ElementId>,
    /// Fields and methods, in declaration order
    pub members: Vec<ElementId>,
    pub constructors: Vec<ElementId>,
    /// Class that object creation through this interface is redirected to
    pub default_class: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodData {
    pub params: Vec<ElementId>,
    /// Class named by a constructor declaration. Differs from the enclosing
    /// class for factories written as `factory I.name()` in a default class.
    pub constructor_type: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FieldData {
    pub getter: Option<ElementId>,
    pub setter: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterData {
    /// Field initialized by a `this.x` parameter
    pub field: Option<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Marks an ordinary statement; target of `break`
    Statement,
    /// Marks a `switch` statement; target of `break` and `continue`
    Switch,
    /// Marks a `case`/`default` member; target of `continue`
    SwitchMember,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelData {
    pub kind: LabelKind,
    /// Innermost function containing the label
    pub function: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeVariableData {
    pub bound: Option<Type>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AliasData {
    pub type_params: Vec<ElementId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefixData {
    pub library: ElementId,
    /// Export scope of the imported library
    pub scope: ScopeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperData {
    /// Super class whose members `super.x` reaches
    pub class: ElementId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_builder() {
        let field = Element::new("x", ElementKind::Field(FieldData::default()))
            .with_modifiers(Modifiers::FINAL | Modifiers::STATIC)
            .with_enclosing(ElementId(1));
        assert!(field.is_final());
        assert!(field.is_static());
        assert!(!field.synthetic);
        assert_eq!(field.enclosing, Some(ElementId(1)));
    }

    #[test]
    fn test_const_counts_as_final() {
        let field = Element::new("k", ElementKind::Field(FieldData::default()))
            .with_modifiers(Modifiers::CONST);
        assert!(field.is_final());
        assert!(field.is_const());
    }

    #[test]
    fn test_parameter_requiredness() {
        let required = Element::new("a", ElementKind::Parameter(ParameterData::default()));
        let named = required.clone().with_modifiers(Modifiers::NAMED);
        let optional = required.clone().with_modifiers(Modifiers::OPTIONAL);
        assert!(required.is_required_parameter());
        assert!(!named.is_required_parameter());
        assert!(named.is_named_parameter());
        assert!(!optional.is_required_parameter());
    }

    #[test]
    fn test_kind_descriptions() {
        let interface = ElementKind::Class(ClassData {
            is_interface: true,
            ..ClassData::default()
        });
        assert_eq!(interface.description(), "interface");
        assert_eq!(ElementKind::Variable.description(), "variable");
    }
}
