//! Frozen program model
//!
//! The element-building pass populates a `ProgramBuilder` and freezes it.
//! A `Program` is never mutated afterwards, so any number of resolution
//! passes may share it across threads.

use tern_ast::{ElementId, ScopeId};

use crate::element::{
    AliasData, ClassData, Element, ElementKind, FieldData, LibraryData, MethodData, Modifiers,
    ParameterData, PrefixData, TypeVariableData,
};
use crate::scope::{Scope, ScopeKind};
use crate::types::Type;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    elements: Vec<Element>,
    scopes: Vec<Scope>,
}

impl Program {
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn find_library(&self, name: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .find(|element| matches!(element.kind, ElementKind::Library(_)) && element.name == name)
            .map(|element| element.id)
    }

    pub fn library_scope(&self, library: ElementId) -> Option<ScopeId> {
        match &self.element(library)?.kind {
            ElementKind::Library(data) => data.scope,
            _ => None,
        }
    }
}

/// Mutable staging area for the element-building pass
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    elements: Vec<Element>,
    scopes: Vec<Scope>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn freeze(self) -> Program {
        Program {
            elements: self.elements,
            scopes: self.scopes,
        }
    }

    pub fn add(&mut self, mut element: Element) -> ElementId {
        let id = ElementId(self.elements.len() as u32);
        element.id = id;
        self.elements.push(element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.index())
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id.index())
    }

    fn add_scope(&mut self, kind: ScopeKind, library: ElementId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, kind).with_library(library));
        id
    }

    /// Bind an element's name in a program scope
    pub fn declare(&mut self, scope: ScopeId, element: ElementId) -> Result<(), ElementId> {
        let name = match self.elements.get(element.index()) {
            Some(element) => element.name.clone(),
            None => return Ok(()),
        };
        match self.scopes.get_mut(scope.index()) {
            Some(scope) => scope.declare(&name, element),
            None => Ok(()),
        }
    }

    /// Create a library element with its top-level scope
    pub fn library(&mut self, name: &str) -> (ElementId, ScopeId) {
        let library = self.add(Element::new(name, ElementKind::Library(LibraryData::default())));
        let scope = self.add_scope(ScopeKind::Library, library);
        if let Some(ElementKind::Library(data)) = self.get_mut(library).map(|e| &mut e.kind) {
            data.scope = Some(scope);
        }
        (library, scope)
    }

    /// Scope of names imported into `library_scope`; becomes its parent
    pub fn import_scope(&mut self, library_scope: ScopeId) -> Option<ScopeId> {
        let library = self.scopes.get(library_scope.index())?.library?;
        let import = self.add_scope(ScopeKind::Import, library);
        if let Some(scope) = self.scopes.get_mut(library_scope.index()) {
            scope.parent = Some(import);
        }
        Some(import)
    }

    fn declare_top_level(&mut self, library: ElementId, element: ElementId) {
        let scope = match self.get(library).map(|e| &e.kind) {
            Some(ElementKind::Library(data)) => data.scope,
            _ => None,
        };
        if let Some(scope) = scope {
            let _ = self.declare(scope, element);
        }
    }

    fn class_data_mut(&mut self, class: ElementId) -> Option<&mut ClassData> {
        match self.get_mut(class).map(|e| &mut e.kind) {
            Some(ElementKind::Class(data)) => Some(data),
            _ => None,
        }
    }

    pub fn class(&mut self, library: ElementId, name: &str) -> ElementId {
        let class = self.add(
            Element::new(name, ElementKind::Class(ClassData::default())).with_enclosing(library),
        );
        self.declare_top_level(library, class);
        class
    }

    pub fn interface(&mut self, library: ElementId, name: &str) -> ElementId {
        let interface = self.class(library, name);
        if let Some(data) = self.class_data_mut(interface) {
            data.is_interface = true;
        }
        interface
    }

    pub fn set_supertype(&mut self, class: ElementId, supertype: ElementId) {
        if let Some(data) = self.class_data_mut(class) {
            data.supertype = Some(supertype);
        }
    }

    pub fn add_interface(&mut self, class: ElementId, interface: ElementId) {
        if let Some(data) = self.class_data_mut(class) {
            data.interfaces.push(interface);
        }
    }

    pub fn set_default_class(&mut self, interface: ElementId, default_class: ElementId) {
        if let Some(data) = self.class_data_mut(interface) {
            data.default_class = Some(default_class);
        }
    }

    /// Type variable of a class or function type alias
    pub fn type_variable(&mut self, owner: ElementId, name: &str, bound: Option<Type>) -> ElementId {
        let variable = self.add(
            Element::new(name, ElementKind::TypeVariable(TypeVariableData { bound }))
                .with_enclosing(owner),
        );
        match self.get_mut(owner).map(|e| &mut e.kind) {
            Some(ElementKind::Class(data)) => data.type_params.push(variable),
            Some(ElementKind::FunctionTypeAlias(data)) => data.type_params.push(variable),
            _ => {}
        }
        variable
    }

    /// Field of a class, or a top-level variable of a library
    pub fn field(&mut self, owner: ElementId, name: &str, modifiers: Modifiers) -> ElementId {
        let field = self.add(
            Element::new(name, ElementKind::Field(FieldData::default()))
                .with_modifiers(modifiers)
                .with_enclosing(owner),
        );
        self.attach_member(owner, field);
        field
    }

    /// Method of a class, or a top-level function of a library
    pub fn method(&mut self, owner: ElementId, name: &str, modifiers: Modifiers) -> ElementId {
        let method = self.add(
            Element::new(name, ElementKind::Method(MethodData::default()))
                .with_modifiers(modifiers)
                .with_enclosing(owner),
        );
        self.attach_member(owner, method);
        method
    }

    fn attach_member(&mut self, owner: ElementId, member: ElementId) {
        if let Some(data) = self.class_data_mut(owner) {
            data.members.push(member);
        } else {
            self.declare_top_level(owner, member);
        }
    }

    /// Getter or setter backing a property-style field
    pub fn accessor(&mut self, field: ElementId, setter: bool) -> Option<ElementId> {
        let (name, owner) = {
            let element = self.get(field)?;
            (element.name.clone(), element.enclosing?)
        };
        let flag = if setter { Modifiers::SETTER } else { Modifiers::GETTER };
        let accessor = self.add(
            Element::new(name, ElementKind::Method(MethodData::default()))
                .with_modifiers(flag)
                .with_enclosing(owner),
        );
        if let Some(ElementKind::Field(data)) = self.get_mut(field).map(|e| &mut e.kind) {
            if setter {
                data.setter = Some(accessor);
            } else {
                data.getter = Some(accessor);
            }
        }
        if let Some(element) = self.get_mut(field) {
            element.modifiers |= Modifiers::ABSTRACT_FIELD;
        }
        Some(accessor)
    }

    /// Constructor named `name` (empty for the default one)
    pub fn constructor(&mut self, class: ElementId, name: &str, modifiers: Modifiers) -> ElementId {
        let constructor = self.add(
            Element::new(name, ElementKind::Constructor(MethodData::default()))
                .with_modifiers(modifiers)
                .with_enclosing(class),
        );
        if let Some(data) = self.class_data_mut(class) {
            data.constructors.push(constructor);
        }
        constructor
    }

    /// Record the class named in a `factory I.name()` declaration
    pub fn set_constructor_type(&mut self, constructor: ElementId, class: ElementId) {
        if let Some(ElementKind::Constructor(data)) = self.get_mut(constructor).map(|e| &mut e.kind) {
            data.constructor_type = Some(class);
        }
    }

    pub fn parameter(&mut self, method: ElementId, name: &str, modifiers: Modifiers) -> ElementId {
        let parameter = self.add(
            Element::new(name, ElementKind::Parameter(ParameterData::default()))
                .with_modifiers(modifiers)
                .with_enclosing(method),
        );
        match self.get_mut(method).map(|e| &mut e.kind) {
            Some(ElementKind::Constructor(data)) | Some(ElementKind::Method(data)) => {
                data.params.push(parameter)
            }
            _ => {}
        }
        parameter
    }

    /// `this.x` parameter bound to `field`
    pub fn field_parameter(&mut self, constructor: ElementId, field: ElementId, modifiers: Modifiers) -> ElementId {
        let name = self.get(field).map(|e| e.name.clone()).unwrap_or_default();
        let parameter = self.parameter(constructor, &name, modifiers);
        if let Some(ElementKind::Parameter(data)) = self.get_mut(parameter).map(|e| &mut e.kind) {
            data.field = Some(field);
        }
        parameter
    }

    pub fn function_type_alias(&mut self, library: ElementId, name: &str) -> ElementId {
        let alias = self.add(
            Element::new(name, ElementKind::FunctionTypeAlias(AliasData::default()))
                .with_enclosing(library),
        );
        self.declare_top_level(library, alias);
        alias
    }

    /// `import '...' as name;` from `library` to `target`
    pub fn library_prefix(&mut self, library: ElementId, name: &str, target: ElementId) -> Option<ElementId> {
        let scope = match &self.get(target)?.kind {
            ElementKind::Library(data) => data.scope?,
            _ => return None,
        };
        let prefix = self.add(
            Element::new(name, ElementKind::LibraryPrefix(PrefixData { library: target, scope }))
                .with_enclosing(library),
        );
        self.declare_top_level(library, prefix);
        Some(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_and_class_registration() {
        let mut builder = ProgramBuilder::new();
        let (lib, scope) = builder.library("core");
        let object = builder.class(lib, "Object");
        let program = builder.freeze();

        assert_eq!(program.find_library("core"), Some(lib));
        assert_eq!(program.library_scope(lib), Some(scope));
        assert_eq!(program.scope(scope).unwrap().lookup_local("Object"), Some(object));
        assert_eq!(program.element(object).unwrap().enclosing, Some(lib));
    }

    #[test]
    fn test_members_and_constructors_attach_to_class() {
        let mut builder = ProgramBuilder::new();
        let (lib, _) = builder.library("app");
        let class = builder.class(lib, "A");
        let field = builder.field(class, "x", Modifiers::FINAL);
        let ctor = builder.constructor(class, "", Modifiers::empty());
        let param = builder.field_parameter(ctor, field, Modifiers::empty());
        let program = builder.freeze();

        let data = program.element(class).unwrap().class_data().unwrap().clone();
        assert_eq!(data.members, vec![field]);
        assert_eq!(data.constructors, vec![ctor]);
        let ctor_data = program.element(ctor).unwrap().method_data().unwrap().clone();
        assert_eq!(ctor_data.params, vec![param]);
        assert!(matches!(
            &program.element(param).unwrap().kind,
            ElementKind::Parameter(ParameterData { field: Some(f) }) if *f == field
        ));
    }

    #[test]
    fn test_import_scope_becomes_parent() {
        let mut builder = ProgramBuilder::new();
        let (_, scope) = builder.library("app");
        let import = builder.import_scope(scope).unwrap();
        let program = builder.freeze();
        assert_eq!(program.scope(scope).unwrap().parent, Some(import));
        assert_eq!(program.scope(import).unwrap().kind, ScopeKind::Import);
    }
}
