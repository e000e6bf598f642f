//! Constructor resolution
//!
//! Synthesizes implicit default constructors and `super` pseudo-elements,
//! maps interface constructors onto their default class, and checks the
//! per-class constructor contracts: implicit super calls, const
//! constructors, redirect cycles and default clauses.

use codespan::Span;
use rustc_hash::FxHashMap;
use tern_ast::{AstVisitor, ClassDecl, DefaultClause, ElementId, FieldDecl, InitializerKind, MethodDecl};

use crate::class_graph::ElementGraph;
use crate::context::ResolutionContext;
use crate::element::{Element, ElementKind, MethodData, Modifiers, SuperData};
use crate::errors::{ErrorCode, ResolveResult};
use crate::types::Type;

/// How a generative constructor reaches its superclass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperInvocation {
    /// No `super(...)` or `this(...)` initializer
    Implicit,
    /// Explicit call, with the constructor it resolved to
    Explicit(Option<ElementId>),
}

impl<'a> ResolutionContext<'a> {
    /// Implicit default constructor of `class`, created on first use
    pub fn implicit_default_constructor(&mut self, class: ElementId) -> ElementId {
        if let Some(&ctor) = self.implicit_constructors.get(&class) {
            return ctor;
        }
        let element = Element::new(
            "",
            ElementKind::Constructor(MethodData {
                params: Vec::new(),
                constructor_type: Some(class),
            }),
        )
        .with_enclosing(class);
        let ctor = self.synthesize(element);
        self.implicit_constructors.insert(class, ctor);
        tracing::debug!(class = %self.elements.name(class), constructor = %ctor, "synthesized implicit default constructor");
        ctor
    }

    /// Element bound to `super` inside subclasses of `class`
    pub fn super_element(&mut self, class: ElementId) -> ElementId {
        if let Some(&element) = self.super_elements.get(&class) {
            return element;
        }
        let element = self.synthesize(
            Element::new("super", ElementKind::Super(SuperData { class })).with_enclosing(class),
        );
        self.super_elements.insert(class, element);
        tracing::debug!(class = %self.elements.name(class), element = %element, "synthesized super element");
        element
    }

    /// Follow an interface constructor to the default-class constructor it
    /// creates objects with. Constructors of classes pass through unchanged.
    pub fn resolve_in_default_class(&mut self, span: Span, ctor: Option<ElementId>) -> ResolveResult<Option<ElementId>> {
        let Some(ctor) = ctor else {
            return Ok(None);
        };
        let Some(interface) = self.elements.constructor_type(ctor) else {
            return Ok(Some(ctor));
        };
        let default_class = match self.element(interface)?.class_data() {
            Some(data) if data.is_interface => data.default_class,
            _ => None,
        };
        let Some(default_class) = default_class else {
            return Ok(Some(ctor));
        };
        if let Some(&mapped) = self.default_constructors.get(&ctor) {
            return Ok(Some(mapped));
        }

        let implements = self.elements.implements(default_class, interface);
        let mut target = self.find_default_class_constructor(ctor, default_class, implements);
        if target.is_none() {
            let element = self.element(ctor)?;
            let implicit_candidate = element.name.is_empty() && (element.synthetic || implements);
            if implicit_candidate && self.elements.needs_implicit_default_constructor(default_class) {
                target = Some(self.implicit_default_constructor(default_class));
            }
        }

        match target {
            Some(target) => {
                self.check_interface_constructor(span, ctor, target);
                self.default_constructors.insert(ctor, target);
                Ok(Some(target))
            }
            None => {
                let expected = if implements {
                    let name = self.elements.name(ctor);
                    let class_name = self.elements.name(default_class);
                    if name.is_empty() {
                        class_name.to_string()
                    } else {
                        format!("{}.{}", class_name, name)
                    }
                } else {
                    self.elements.raw_constructor_name(ctor)
                };
                let default_name = self.elements.name(default_class).to_string();
                self.on_error(
                    span,
                    ErrorCode::DefaultConstructorUnresolved,
                    &[expected.as_str(), default_name.as_str()],
                );
                Ok(None)
            }
        }
    }

    /// A default class that implements the interface answers by
    /// corresponding name; any other must spell the raw name exactly
    fn find_default_class_constructor(&self, ctor: ElementId, default_class: ElementId, implements: bool) -> Option<ElementId> {
        let constructors = self
            .elements
            .get(default_class)
            .and_then(Element::class_data)
            .map(|data| data.constructors.clone())
            .unwrap_or_default();
        if implements {
            let name = self.elements.name(ctor);
            constructors.into_iter().find(|&candidate| self.elements.name(candidate) == name)
        } else {
            let raw = self.elements.raw_constructor_name(ctor);
            constructors
                .into_iter()
                .find(|&candidate| self.elements.raw_constructor_name(candidate) == raw)
        }
    }

    fn check_interface_constructor(&mut self, span: Span, ctor: ElementId, target: ElementId) {
        let interface = self.elements.constructor_type(ctor).map(|id| self.elements.name(id).to_string()).unwrap_or_default();
        let default_class = self.elements.enclosing_class(target).map(|id| self.elements.name(id).to_string()).unwrap_or_default();
        let ctor_name = self.elements.raw_constructor_name(ctor);
        let target_name = self.elements.raw_constructor_name(target);

        let expected = self.elements.required_parameter_count(ctor);
        let found = self.elements.required_parameter_count(target);
        if expected != found {
            self.on_error(
                span,
                ErrorCode::DefaultConstructorNumberOfRequiredParameters,
                &[
                    ctor_name.as_str(),
                    interface.as_str(),
                    expected.to_string().as_str(),
                    target_name.as_str(),
                    default_class.as_str(),
                    found.to_string().as_str(),
                ],
            );
        }

        let expected_named = self.elements.named_parameter_names(ctor);
        let found_named = self.elements.named_parameter_names(target);
        if expected_named != found_named {
            self.on_error(
                span,
                ErrorCode::DefaultConstructorNamedParameters,
                &[
                    ctor_name.as_str(),
                    interface.as_str(),
                    expected_named.join(", ").as_str(),
                    target_name.as_str(),
                    default_class.as_str(),
                    found_named.join(", ").as_str(),
                ],
            );
        }
    }

    /// A class without constructors implicitly calls `super()`, which must
    /// exist and take no required arguments
    pub fn check_implicit_default_super_invocation(&mut self, class: ElementId, span: Span) {
        let Some(superclass) = self.elements.supertype(class) else {
            return;
        };
        if self.elements.get(superclass).is_some_and(Element::is_interface) {
            return;
        }
        let callable = match self.elements.lookup_constructor(superclass, "") {
            Some(ctor) => self.elements.required_parameter_count(ctor) == 0,
            None => self.elements.needs_implicit_default_constructor(superclass),
        };
        if !callable {
            let name = self.elements.name(superclass).to_string();
            self.on_error(span, ErrorCode::CannotResolveImplicitCallToSuperConstructor, &[name.as_str()]);
        }
    }

    /// Super-call contracts of one generative constructor
    pub fn check_constructor(&mut self, span: Span, ctor: ElementId, invocation: SuperInvocation) -> ResolveResult<()> {
        let Some(class) = self.element(ctor)?.enclosing else {
            return Err(self.internal_error(span, "constructor without enclosing class"));
        };
        if self.element(class)?.is_interface() {
            return Ok(());
        }

        let target = match invocation {
            SuperInvocation::Explicit(target) => target,
            SuperInvocation::Implicit => {
                let Some(superclass) = self.elements.supertype(class) else {
                    return Ok(());
                };
                let superclass_name = self.elements.name(superclass).to_string();
                match self.elements.lookup_constructor(superclass, "") {
                    Some(default) => {
                        if self.elements.required_parameter_count(default) > 0 {
                            self.on_error(span, ErrorCode::TooFewArgumentsInImplicitSuper, &[superclass_name.as_str()]);
                        }
                        Some(default)
                    }
                    // No declared super constructor, so nothing for the const check
                    None if self.elements.needs_implicit_default_constructor(superclass) => None,
                    None => {
                        let root = self.elements.is_object(class) || self.elements.is_object_child(class);
                        if !root && !self.elements.has_default_constructor(superclass) {
                            self.on_error(
                                span,
                                ErrorCode::CannotResolveImplicitCallToSuperConstructor,
                                &[superclass_name.as_str()],
                            );
                        }
                        None
                    }
                }
            }
        };

        if self.element(ctor)?.is_const() {
            if let Some(target) = target {
                if !self.element(target)?.is_const() {
                    let name = self.elements.raw_constructor_name(ctor);
                    self.on_error(span, ErrorCode::ConstConstructorMustCallConstSuper, &[name.as_str()]);
                }
            }
        }
        Ok(())
    }

    /// Report every constructor whose chain of redirects never reaches a
    /// constructor that initializes the object
    pub fn check_redirect_cycles(&mut self, constructors: &[&MethodDecl]) {
        let mut graph = ElementGraph::new();
        let mut spans = FxHashMap::default();
        let mut order = Vec::with_capacity(constructors.len());
        for decl in constructors {
            graph.node(decl.element);
            spans.insert(decl.element, decl.name.span);
            order.push(decl.element);
            if !decl.is_redirecting() {
                continue;
            }
            for init in &decl.initializers {
                if let InitializerKind::Redirect(call) = &init.kind {
                    if let Some(target) = self.bindings.element(call.id) {
                        graph.add_edge(decl.element, target);
                    }
                }
            }
        }

        for ctor in graph.chains_into_cycle(&order) {
            let name = self.elements.raw_constructor_name(ctor);
            let span = spans.get(&ctor).copied().unwrap_or_else(Span::initial);
            self.on_error(span, ErrorCode::RedirectedConstructorCycle, &[name.as_str()]);
        }
    }

    /// A class with a const constructor may only have final instance
    /// fields, inherited ones included
    pub fn check_const_class_fields(&mut self, decl: &ClassDecl) {
        let class = decl.element;
        let class_name = decl.name.name.clone();
        let declared_spans: FxHashMap<ElementId, Span> = decl
            .fields()
            .map(|field| {
                let span = field
                    .accessors
                    .iter()
                    .find(|accessor| {
                        self.elements
                            .get(accessor.element)
                            .is_some_and(|element| element.modifiers.contains(Modifiers::SETTER))
                    })
                    .map_or(field.span, |setter| setter.span);
                (field.element, span)
            })
            .collect();

        let mut hierarchy = vec![class];
        hierarchy.extend(self.elements.superclass_chain(class));
        for owner in hierarchy {
            let members = self
                .elements
                .get(owner)
                .and_then(Element::class_data)
                .map(|data| data.members.clone())
                .unwrap_or_default();
            for member in members {
                let Some(field) = self.elements.get(member) else {
                    continue;
                };
                let mutable = matches!(field.kind, ElementKind::Field(_))
                    && !field.is_final()
                    && !field.is_static()
                    && !field.modifiers.contains(Modifiers::ABSTRACT_FIELD);
                if !mutable {
                    continue;
                }
                let field_name = field.name.clone();
                if owner == class {
                    let span = declared_spans.get(&member).copied().unwrap_or(decl.span);
                    self.on_error(
                        span,
                        ErrorCode::ConstClassWithNonFinalFields,
                        &[class_name.as_str(), field_name.as_str()],
                    );
                } else {
                    let owner_name = self.elements.name(owner).to_string();
                    self.on_error(
                        decl.name.span,
                        ErrorCode::ConstClassWithInheritedNonFinalFields,
                        &[class_name.as_str(), field_name.as_str(), owner_name.as_str()],
                    );
                }
            }
        }
    }

    /// Without a generative constructor, every final instance field must be
    /// initialized where it is declared
    pub fn check_final_fields_initialized_at_declaration(&mut self, decl: &ClassDecl) {
        let mut collector = UninitializedFinalFields {
            elements: &self.elements,
            found: Vec::new(),
        };
        collector.visit_class(decl);
        let found = collector.found;
        for (name, span) in found {
            self.on_error(span, ErrorCode::FinalFieldMustBeInitialized, &[name.as_str()]);
        }
    }

    /// Resolve `default D<...>` on an interface declaration and check the
    /// clause against both the interface and the default class
    pub fn resolve_default_clause(&mut self, decl: &ClassDecl, clause: &DefaultClause) -> ResolveResult<()> {
        let name = clause.name.name.as_str();
        let default_class = self
            .find_element(name)
            .filter(|&id| self.elements.get(id).is_some_and(Element::is_class));
        self.record_element(clause.name.id, default_class);
        self.record_element(clause.id, default_class);

        let Some(default_class) = default_class else {
            self.on_error(clause.name.span, ErrorCode::NoSuchType, &[name]);
            for param in &clause.type_params {
                self.record_element(param.name.id, None);
                self.record_type(param.id, Type::Dynamic);
            }
            return Ok(());
        };

        if self.element(default_class)?.is_interface() {
            self.on_error(clause.name.span, ErrorCode::DefaultMustSpecifyClass, &[name]);
        }

        let clause_bounds = self.bind_default_type_parameters(clause, default_class);
        if !clause.type_params.is_empty() && !self.default_parameters_match(clause, &clause_bounds, default_class) {
            self.on_error(clause.span, ErrorCode::TypeParametersMustMatchExactly, &[name]);
        }
        self.check_interface_type_params_to_default(decl, clause, default_class)
    }

    /// Bind clause type parameters to the default class's type variables by
    /// name, falling back to dynamic
    fn bind_default_type_parameters(&mut self, clause: &DefaultClause, default_class: ElementId) -> Vec<Option<Type>> {
        let mut bounds = Vec::with_capacity(clause.type_params.len());
        for param in &clause.type_params {
            let variable = self.elements.lookup_type_parameter(default_class, &param.name.name);
            self.record_element(param.name.id, variable);
            self.record_element(param.id, variable);
            self.record_type(param.id, variable.map_or(Type::Dynamic, Type::Variable));
            bounds.push(
                param
                    .bound
                    .as_ref()
                    .map(|bound| self.resolve_type(bound, false, ErrorCode::NoSuchType)),
            );
        }
        bounds
    }

    fn default_parameters_match(&self, clause: &DefaultClause, clause_bounds: &[Option<Type>], default_class: ElementId) -> bool {
        let declared = self
            .elements
            .get(default_class)
            .and_then(Element::class_data)
            .map(|data| data.type_params.clone())
            .unwrap_or_default();
        if declared.len() != clause.type_params.len() {
            return false;
        }
        declared
            .iter()
            .zip(clause.type_params.iter().zip(clause_bounds))
            .all(|(&variable, (param, bound))| {
                let declared_bound = match self.elements.kind(variable) {
                    Some(ElementKind::TypeVariable(data)) => data.bound.clone(),
                    _ => None,
                };
                self.elements.name(variable) == param.name.name && declared_bound == *bound
            })
    }

    fn check_interface_type_params_to_default(&mut self, decl: &ClassDecl, clause: &DefaultClause, default_class: ElementId) -> ResolveResult<()> {
        let interface_params = self
            .element(decl.element)?
            .class_data()
            .map(|data| data.type_params.clone())
            .unwrap_or_default();
        let default_params = self
            .element(default_class)?
            .class_data()
            .map(|data| data.type_params.clone())
            .unwrap_or_default();
        let interface_name = decl.name.name.as_str();
        let default_name = self.elements.name(default_class).to_string();

        if interface_params.len() != default_params.len() {
            self.on_error(
                clause.span,
                ErrorCode::DefaultClassMustHaveSameTypeParameters,
                &[interface_name, default_name.as_str()],
            );
            return Ok(());
        }
        for (index, (&own, &other)) in interface_params.iter().zip(&default_params).enumerate() {
            let own_name = self.elements.name(own).to_string();
            let other_name = self.elements.name(other).to_string();
            if own_name != other_name {
                let span = decl.type_params.get(index).map_or(clause.span, |param| param.span);
                self.on_error(
                    span,
                    ErrorCode::TypeVariableDoesNotMatch,
                    &[own_name.as_str(), other_name.as_str(), default_name.as_str()],
                );
            }
        }
        Ok(())
    }
}

/// Final instance fields that neither have a value nor are backed by an
/// accessor. Does not descend into method bodies.
struct UninitializedFinalFields<'s, 'p> {
    elements: &'s crate::store::ElementStore<'p>,
    found: Vec<(String, Span)>,
}

impl AstVisitor for UninitializedFinalFields<'_, '_> {
    type Output = ();

    fn visit_method(&mut self, _method: &MethodDecl) {}

    fn visit_field(&mut self, field: &FieldDecl) {
        let Some(element) = self.elements.get(field.element) else {
            return;
        };
        let uninitialized = element.is_final()
            && !element.is_static()
            && field.accessors.is_empty()
            && field.value.is_none()
            && !element
                .modifiers
                .intersects(Modifiers::INITIALIZED | Modifiers::ABSTRACT_FIELD);
        if uninitialized {
            self.found.push((element.name.clone(), field.span));
        }
    }

    fn default_output(&self) {}
}
