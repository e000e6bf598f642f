//! Resolution context
//!
//! Couples the scope chain of one pass with the services every resolution
//! step needs: element lookup through the overlay store, type-reference
//! resolution, node binding and diagnostic reporting.

use codespan::{FileId, Span};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use tern_ast::{ElementId, NodeId, ScopeId, TypeNode};

use crate::bindings::{Bindings, Resolution};
use crate::config::ResolverConfig;
use crate::element::{Element, ElementKind};
use crate::errors::{ErrorCode, InternalError, ResolveError, ResolveResult};
use crate::program::Program;
use crate::scope::{ScopeChain, ScopeKind};
use crate::store::ElementStore;
use crate::types::{Type, TypeProvider};

#[derive(Debug, Clone, Copy)]
enum TypeTarget {
    Generic { arity: usize, alias: bool },
    Variable,
    Missing,
}

pub struct ResolutionContext<'a> {
    pub(crate) elements: ElementStore<'a>,
    pub(crate) scopes: ScopeChain<'a>,
    pub(crate) bindings: Bindings,
    pub(crate) types: &'a dyn TypeProvider,
    pub(crate) config: &'a ResolverConfig,
    file_id: Option<FileId>,
    diagnostics: Vec<ResolveError>,
    /// Implicit default constructor synthesized per class
    pub(crate) implicit_constructors: FxHashMap<ElementId, ElementId>,
    /// `super` pseudo-element per super class
    pub(crate) super_elements: FxHashMap<ElementId, ElementId>,
    pub(crate) default_constructors: IndexMap<ElementId, ElementId>,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        program: &'a Program,
        root: ScopeId,
        types: &'a dyn TypeProvider,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            elements: ElementStore::new(program),
            scopes: ScopeChain::new(program, root),
            bindings: Bindings::new(),
            types,
            config,
            file_id: None,
            diagnostics: Vec::new(),
            implicit_constructors: FxHashMap::default(),
            super_elements: FxHashMap::default(),
            default_constructors: IndexMap::new(),
        }
    }

    pub fn with_file(mut self, file_id: Option<FileId>) -> Self {
        self.file_id = file_id;
        self
    }

    /// Report a rule violation and keep going
    pub fn on_error(&mut self, span: Span, code: ErrorCode, args: &[&str]) {
        let mut error = ResolveError::new(code).with_args(args.iter().copied()).with_span(span);
        if let Some(file_id) = self.file_id {
            error = error.with_file(file_id);
        }
        tracing::debug!(code = code.code(), %span, message = %error.message(), "diagnostic");
        self.diagnostics.push(error);
    }

    pub fn diagnostics(&self) -> &[ResolveError] {
        &self.diagnostics
    }

    pub fn internal_error(&self, span: Span, message: impl Into<String>) -> InternalError {
        InternalError::new(message).with_span(span)
    }

    pub fn element(&self, id: ElementId) -> ResolveResult<&Element> {
        self.elements
            .get(id)
            .ok_or_else(|| InternalError::new(format!("unknown element {}", id)))
    }

    pub fn kind_of(&self, id: Option<ElementId>) -> Option<&ElementKind> {
        id.and_then(|id| self.elements.kind(id))
    }

    pub fn library(&self) -> Option<ElementId> {
        self.scopes.library()
    }

    pub fn is_private(&self, name: &str) -> bool {
        self.config.is_private(name)
    }

    /// Visible element bound to `name` from the current frame outward
    pub fn find_element(&self, name: &str) -> Option<ElementId> {
        self.scopes
            .find_element(&self.elements, self.config, self.library(), name)
    }

    /// Like `find_element`, ignoring privacy
    pub fn find_element_anywhere(&self, name: &str) -> Option<ElementId> {
        self.scopes.find_element(&self.elements, self.config, None, name)
    }

    /// Element exported under `name` by the library behind `prefix`
    pub fn find_in_prefix(&self, prefix: ElementId, name: &str) -> Option<ElementId> {
        match self.elements.kind(prefix)? {
            ElementKind::LibraryPrefix(data) => self.scopes.find_in_program_scope(
                &self.elements,
                self.config,
                data.scope,
                self.library(),
                name,
            ),
            _ => None,
        }
    }

    /// Element lives in a library other than the one being resolved
    pub fn is_foreign(&self, element: ElementId) -> bool {
        match (self.library(), self.elements.library_of(element)) {
            (Some(current), Some(owner)) => current != owner,
            _ => false,
        }
    }

    pub fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
        self.scopes.push(kind)
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bind an element's name in the innermost frame; a clash reports `code`
    /// and keeps the first binding
    pub fn declare(&mut self, element: ElementId, span: Span, code: ErrorCode) -> ResolveResult<()> {
        let name = self.element(element)?.name.clone();
        let scope = self
            .scopes
            .current_mut()
            .ok_or_else(|| InternalError::new(format!("no frame to declare '{}' in", name)).with_span(span))?;
        if scope.declare(&name, element).is_err() {
            self.on_error(span, code, &[name.as_str()]);
        }
        Ok(())
    }

    /// Add an element created by this pass
    pub fn synthesize(&mut self, element: Element) -> ElementId {
        self.elements.alloc(element)
    }

    pub fn record_element(&mut self, node: NodeId, element: Option<ElementId>) -> Option<ElementId> {
        self.bindings.bind(node, element);
        element
    }

    pub fn record_type(&mut self, node: NodeId, ty: Type) {
        self.bindings.set_type(node, ty);
    }

    pub fn mark_reported(&mut self, node: NodeId) {
        self.bindings.mark_reported(node);
    }

    /// Resolve a type reference. Failures are reported and fall back to the
    /// dynamic type; a wrong number of type arguments keeps the type raw.
    pub fn resolve_type(&mut self, node: &TypeNode, forbid_type_variables: bool, not_found: ErrorCode) -> Type {
        let ty = self.resolve_type_reference(node, forbid_type_variables, not_found);
        self.record_type(node.id, ty.clone());
        ty
    }

    fn resolve_type_reference(&mut self, node: &TypeNode, forbid_type_variables: bool, not_found: ErrorCode) -> Type {
        let name = node.name.name.as_str();
        if node.prefix.is_none() {
            if name == self.config.dynamic_type_name {
                self.record_element(node.name.id, None);
                return self.types.dynamic_type();
            }
            if name == self.config.void_type_name {
                self.record_element(node.name.id, None);
                return Type::Void;
            }
        }

        let element = self.lookup_type_name(node);
        self.record_element(node.name.id, element);
        self.record_element(node.id, element);
        let display = match &node.prefix {
            Some(prefix) => format!("{}.{}", prefix.name, name),
            None => name.to_string(),
        };

        let target = match self.kind_of(element) {
            Some(ElementKind::Class(data)) => TypeTarget::Generic {
                arity: data.type_params.len(),
                alias: false,
            },
            Some(ElementKind::FunctionTypeAlias(data)) => TypeTarget::Generic {
                arity: data.type_params.len(),
                alias: true,
            },
            Some(ElementKind::TypeVariable(_)) => TypeTarget::Variable,
            _ => TypeTarget::Missing,
        };

        let (element, arity, alias) = match (element, target) {
            (Some(element), TypeTarget::Generic { arity, alias }) => (element, arity, alias),
            (Some(variable), TypeTarget::Variable) => {
                if forbid_type_variables {
                    self.on_error(node.span, ErrorCode::TypeVariableInStaticContext, &[name]);
                    return self.types.dynamic_type();
                }
                return Type::Variable(variable);
            }
            (None, _) if self.is_private(name) && self.find_element_anywhere(name).is_some() => {
                self.on_error(node.span, ErrorCode::IllegalAccessToPrivate, &[name]);
                return self.types.dynamic_type();
            }
            _ => {
                self.on_error(node.span, not_found, &[display.as_str()]);
                return self.types.dynamic_type();
            }
        };

        let mut args = Vec::with_capacity(node.type_args.len());
        for arg in &node.type_args {
            args.push(self.resolve_type(arg, forbid_type_variables, not_found));
        }
        if args.len() != arity {
            if !args.is_empty() {
                self.on_error(
                    node.span,
                    ErrorCode::WrongNumberOfTypeArguments,
                    &[display.as_str(), arity.to_string().as_str(), args.len().to_string().as_str()],
                );
            }
            args = vec![self.types.dynamic_type(); arity];
        }
        if alias {
            Type::FunctionAlias { alias: element, args }
        } else {
            Type::interface(element, args)
        }
    }

    fn lookup_type_name(&mut self, node: &TypeNode) -> Option<ElementId> {
        let Some(prefix) = &node.prefix else {
            return self.find_element(&node.name.name);
        };
        let prefix_element = self
            .find_element(&prefix.name)
            .filter(|&id| matches!(self.elements.kind(id), Some(ElementKind::LibraryPrefix(_))));
        self.record_element(prefix.id, prefix_element);
        self.find_in_prefix(prefix_element?, &node.name.name)
    }

    /// Hand the pass results over
    pub fn finish(
        self,
        inferred_field_types: IndexMap<ElementId, Type>,
        referenced_labels: IndexSet<ElementId>,
    ) -> (Resolution, Vec<ResolveError>) {
        let resolution = Resolution {
            bindings: self.bindings,
            synthesized: self.elements.into_synthesized(),
            default_constructors: self.default_constructors,
            inferred_field_types,
            referenced_labels,
        };
        (resolution, self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramBuilder;
    use crate::types::CoreTypes;
    use tern_ast::AstBuilder;

    struct Fixture {
        program: Program,
        root: ScopeId,
        core: CoreTypes,
    }

    fn fixture() -> Fixture {
        let mut builder = ProgramBuilder::new();
        let (lib, root) = builder.library("core");
        let object = builder.class(lib, "Object");
        let mut class = |name: &str| {
            let id = builder.class(lib, name);
            builder.set_supertype(id, object);
            id
        };
        let int = class("int");
        let double = class("double");
        let bool_ = class("bool");
        let string = class("String");
        let array = class("Array");
        let map = class("Map");
        builder.type_variable(array, "E", None);
        builder.type_variable(map, "K", None);
        builder.type_variable(map, "V", None);
        let core = CoreTypes {
            object,
            int,
            double,
            bool: bool_,
            string,
            array,
            map,
        };
        Fixture {
            program: builder.freeze(),
            root,
            core,
        }
    }

    #[test]
    fn test_resolve_generic_type() {
        let fx = fixture();
        let config = ResolverConfig::default();
        let mut cx = ResolutionContext::new(&fx.program, fx.root, &fx.core, &config);
        let mut b = AstBuilder::new();
        let string = b.type_node("String", vec![]);
        let node = b.type_node("Array", vec![string]);

        let ty = cx.resolve_type(&node, false, ErrorCode::NoSuchType);
        assert_eq!(ty, Type::interface(fx.core.array, vec![Type::interface(fx.core.string, vec![])]));
        assert_eq!(cx.bindings.element(node.name.id), Some(fx.core.array));
        assert!(cx.diagnostics().is_empty());
    }

    #[test]
    fn test_wrong_arity_falls_back_to_raw_type() {
        let fx = fixture();
        let config = ResolverConfig::default();
        let mut cx = ResolutionContext::new(&fx.program, fx.root, &fx.core, &config);
        let mut b = AstBuilder::new();
        let args = vec![b.type_node("int", vec![]), b.type_node("int", vec![])];
        let node = b.type_node("Array", args);

        let ty = cx.resolve_type(&node, false, ErrorCode::NoSuchType);
        assert_eq!(ty, Type::interface(fx.core.array, vec![Type::Dynamic]));
        assert_eq!(cx.diagnostics().len(), 1);
        assert_eq!(cx.diagnostics()[0].code, ErrorCode::WrongNumberOfTypeArguments);
        assert_eq!(cx.diagnostics()[0].message(), "'Array' expects 1 type argument(s) but 2 were given");
    }

    #[test]
    fn test_unknown_type_uses_given_code() {
        let fx = fixture();
        let config = ResolverConfig::default();
        let mut cx = ResolutionContext::new(&fx.program, fx.root, &fx.core, &config);
        let mut b = AstBuilder::new();
        let node = b.type_node("Missing", vec![]);

        assert_eq!(cx.resolve_type(&node, false, ErrorCode::UnknownType), Type::Dynamic);
        assert_eq!(cx.diagnostics()[0].code, ErrorCode::UnknownType);
        assert!(!cx.diagnostics()[0].is_error());
        assert_eq!(cx.bindings.type_of(node.id), Some(&Type::Dynamic));
    }

    #[test]
    fn test_builtin_type_names() {
        let fx = fixture();
        let config = ResolverConfig::default();
        let mut cx = ResolutionContext::new(&fx.program, fx.root, &fx.core, &config);
        let mut b = AstBuilder::new();
        let dynamic = b.type_node("dynamic", vec![]);
        let void = b.type_node("void", vec![]);
        assert_eq!(cx.resolve_type(&dynamic, true, ErrorCode::NoSuchType), Type::Dynamic);
        assert_eq!(cx.resolve_type(&void, true, ErrorCode::NoSuchType), Type::Void);
        assert!(cx.diagnostics().is_empty());
    }

    #[test]
    fn test_declare_reports_duplicates() {
        let fx = fixture();
        let config = ResolverConfig::default();
        let mut cx = ResolutionContext::new(&fx.program, fx.root, &fx.core, &config);
        cx.push_scope(ScopeKind::Block);
        let first = cx.synthesize(Element::new("x", ElementKind::Variable));
        let second = cx.synthesize(Element::new("x", ElementKind::Variable));
        let span = Span::new(codespan::ByteIndex(0), codespan::ByteIndex(1));
        cx.declare(first, span, ErrorCode::DuplicateLocalVariable).unwrap();
        cx.declare(second, span, ErrorCode::DuplicateLocalVariable).unwrap();
        assert_eq!(cx.find_element("x"), Some(first));
        assert_eq!(cx.diagnostics().len(), 1);
        cx.pop_scope();
        assert_eq!(cx.find_element("x"), None);
    }
}
