//! Declarations: units, classes, methods, constructors, fields and function
//! type aliases

use rustc_hash::FxHashSet;
use tern_ast::{
    ClassDecl, ClassMember, ConstructorCall, DirectiveKind, ElementId, ExprKind, FieldDecl,
    FunctionBody, FunctionTypeAlias, Identifier, InitializerKind, Item, MethodDecl, ParamKind,
    Parameter, Unit,
};

use super::ResolveVisitor;
use crate::class_graph::ElementGraph;
use crate::constructors::SuperInvocation;
use crate::element::{Element, ElementKind, Modifiers, ParameterData};
use crate::errors::{ErrorCode, ResolveResult};
use crate::frame::{Access, Frame};
use crate::scope::ScopeKind;

impl<'a> ResolveVisitor<'a> {
    pub(super) fn resolve_unit(&mut self, unit: &Unit, library: ElementId) -> ResolveResult<()> {
        for directive in &unit.directives {
            if let DirectiveKind::PartOf(name) = &directive.kind {
                let owner = self.cx.elements.program().find_library(&name.name);
                self.cx.record_element(name.id, owner);
                self.cx.record_element(directive.id, owner);
                if owner.is_none() {
                    self.cx.on_error(name.span, ErrorCode::CannotBeResolved, &[name.name.as_str()]);
                }
            }
        }

        let frame = Frame::library(library);
        self.with_scope(ScopeKind::Unit, |this| {
            for item in &unit.items {
                match item {
                    Item::Class(class) => this.resolve_class(class)?,
                    Item::Function(function) => this.resolve_method(function, frame)?,
                    Item::Field(field) => this.resolve_field(field, frame)?,
                    Item::TypeAlias(alias) => this.resolve_type_alias(alias, frame)?,
                }
            }
            Ok(())
        })
    }

    #[tracing::instrument(level = "debug", skip_all, fields(class = %decl.name.name))]
    pub(super) fn resolve_class(&mut self, decl: &ClassDecl) -> ResolveResult<()> {
        let class = decl.element;
        let is_interface = self.cx.element(class)?.is_interface();
        self.cx.record_element(decl.id, Some(class));
        self.cx.record_element(decl.name.id, Some(class));

        // Members of a cyclic class are still resolved
        if ElementGraph::supertypes(&self.cx.elements, class).is_on_cycle(class) {
            self.cx.on_error(decl.name.span, ErrorCode::CyclicClass, &[decl.name.name.as_str()]);
        }

        self.with_scope(ScopeKind::Class(class), |this| {
            let frame = Frame::class(class);
            this.resolve_class_header(decl);

            let constructors: Vec<&MethodDecl> = decl
                .methods()
                .filter(|method| this.cx.elements.get(method.element).is_some_and(Element::is_constructor))
                .collect();
            for member in &decl.members {
                match member {
                    ClassMember::Field(field) => this.resolve_field(field, frame)?,
                    ClassMember::Method(method) if constructors.iter().all(|ctor| ctor.id != method.id) => {
                        this.resolve_method(method, frame)?
                    }
                    ClassMember::Method(_) => {}
                }
            }
            for ctor in &constructors {
                this.resolve_method(ctor, frame)?;
            }
            this.check_class(decl, is_interface, &constructors)
        })
    }

    fn resolve_class_header(&mut self, decl: &ClassDecl) {
        let mut seen = FxHashSet::default();
        for param in &decl.type_params {
            self.cx.record_element(param.id, param.element);
            self.cx.record_element(param.name.id, param.element);
            if !seen.insert(param.name.name.as_str()) {
                self.cx.on_error(param.span, ErrorCode::DuplicateTypeVariable, &[param.name.name.as_str()]);
            }
            if let Some(bound) = &param.bound {
                self.cx.resolve_type(bound, false, ErrorCode::NoSuchType);
            }
        }
        for supertype in decl.superclass.iter().chain(&decl.interfaces) {
            self.cx.resolve_type(supertype, false, ErrorCode::NoSuchType);
        }
    }

    fn check_class(&mut self, decl: &ClassDecl, is_interface: bool, constructors: &[&MethodDecl]) -> ResolveResult<()> {
        let class = decl.element;
        let has_const = constructors
            .iter()
            .any(|ctor| self.cx.elements.get(ctor.element).is_some_and(Element::is_const));
        if has_const {
            self.cx.check_const_class_fields(decl);
        }
        self.cx.check_redirect_cycles(constructors);

        if is_interface {
            match &decl.default_clause {
                Some(clause) => {
                    self.cx.resolve_default_clause(decl, clause)?;
                    for ctor in constructors {
                        self.cx.resolve_in_default_class(ctor.name.span, Some(ctor.element))?;
                    }
                }
                None => {
                    for ctor in constructors {
                        let name = self.cx.elements.raw_constructor_name(ctor.element);
                        self.cx.on_error(
                            ctor.name.span,
                            ErrorCode::IllegalConstructorNoDefaultInInterface,
                            &[decl.name.name.as_str(), name.as_str()],
                        );
                    }
                }
            }
            return Ok(());
        }

        if self.cx.elements.needs_implicit_default_constructor(class) {
            self.cx.check_implicit_default_super_invocation(class, decl.name.span);
        }
        let has_generative = constructors
            .iter()
            .any(|ctor| self.cx.elements.get(ctor.element).is_some_and(Element::is_generative_constructor));
        if !has_generative {
            self.cx.check_final_fields_initialized_at_declaration(decl);
        }
        Ok(())
    }

    /// Methods, constructors, accessors and top-level functions
    pub(super) fn resolve_method(&mut self, decl: &MethodDecl, frame: Frame) -> ResolveResult<()> {
        let method = decl.element;
        let element = self.cx.element(method)?;
        let is_constructor = element.is_constructor();
        let is_generative = element.is_generative_constructor();
        let needs_body = !is_generative && !element.is_abstract() && !element.is_external();
        let frame = frame.method(method, element.is_static(), element.is_factory());
        let in_interface = frame
            .holder
            .class()
            .and_then(|class| self.cx.elements.get(class))
            .is_some_and(Element::is_interface);
        self.cx.record_element(decl.id, Some(method));
        self.cx.record_element(decl.name.id, Some(method));
        tracing::trace!(method = %decl.name.name, "resolve method");

        self.with_scope(ScopeKind::Method(method), |this| {
            // Every parameter is visible before any default value is resolved
            for param in decl.params.iter().filter(|param| !param.this_qualified) {
                let element = this.parameter_element(param, method);
                this.cx.declare(element, param.name.span, ErrorCode::DuplicateParameter)?;
            }
            for param in &decl.params {
                this.resolve_parameter_parts(param, frame)?;
            }

            let mut initialized = FxHashSet::default();
            for param in decl.params.iter().filter(|param| param.this_qualified) {
                if !is_constructor {
                    this.cx.record_element(param.name.id, None);
                    this.cx.on_error(param.span, ErrorCode::ParameterInitOutsideConstructor, &[param.name.name.as_str()]);
                    continue;
                }
                let field = this.field_of_this_parameter(param, frame);
                if let Some(element) = param.element {
                    this.cx.record_element(param.id, Some(element));
                }
                this.cx.record_element(param.name.id, field);
                match field {
                    Some(field) if !initialized.insert(field) => {
                        this.cx.on_error(param.span, ErrorCode::DuplicateInitialization, &[param.name.name.as_str()]);
                    }
                    Some(_) => {}
                    None => {
                        this.cx.on_error(param.span, ErrorCode::CannotResolveField, &[param.name.name.as_str()]);
                    }
                }
            }

            if let Some(return_type) = &decl.return_type {
                this.cx.resolve_type(return_type, frame.forbids_type_variables(), ErrorCode::NoSuchType);
            }

            match &decl.body {
                FunctionBody::Block(block) => this.resolve_block(block, frame)?,
                FunctionBody::Absent if needs_body && !in_interface => {
                    this.cx.on_error(decl.name.span, ErrorCode::MethodMustHaveBody, &[decl.name.name.as_str()]);
                }
                FunctionBody::Absent | FunctionBody::Native => {}
            }

            if is_generative && !matches!(decl.body, FunctionBody::Native) {
                this.resolve_initializers(decl, frame, initialized)?;
            }
            Ok(())
        })
    }

    /// Declared element of a parameter, or a fresh one for parameters the
    /// element-building pass does not see
    pub(super) fn parameter_element(&mut self, param: &Parameter, owner: ElementId) -> ElementId {
        let element = match param.element {
            Some(element) => element,
            None => {
                let modifiers = match param.kind {
                    ParamKind::Required => Modifiers::empty(),
                    ParamKind::Optional => Modifiers::OPTIONAL,
                    ParamKind::Named => Modifiers::NAMED,
                };
                self.cx.synthesize(
                    Element::new(param.name.name.as_str(), ElementKind::Parameter(ParameterData::default()))
                        .with_modifiers(modifiers)
                        .with_enclosing(owner)
                        .with_span(param.name.span),
                )
            }
        };
        self.cx.record_element(param.id, Some(element));
        self.cx.record_element(param.name.id, Some(element));
        element
    }

    pub(super) fn resolve_parameter_parts(&mut self, param: &Parameter, frame: Frame) -> ResolveResult<()> {
        if let Some(ty) = &param.type_node {
            self.cx.resolve_type(ty, frame.forbids_type_variables(), ErrorCode::NoSuchType);
        }
        if let Some(default) = &param.default_value {
            self.resolve_expr(default, frame.reading())?;
        }
        Ok(())
    }

    fn field_of_this_parameter(&self, param: &Parameter, frame: Frame) -> Option<ElementId> {
        let declared = param.element.and_then(|element| match self.cx.elements.kind(element) {
            Some(ElementKind::Parameter(data)) => data.field,
            _ => None,
        });
        declared.or_else(|| {
            let class = frame.holder.class()?;
            self.cx
                .elements
                .lookup_local_member(class, &param.name.name)
                .filter(|&member| matches!(self.cx.elements.kind(member), Some(ElementKind::Field(_))))
        })
    }

    fn resolve_initializers(&mut self, decl: &MethodDecl, frame: Frame, mut initialized: FxHashSet<ElementId>) -> ResolveResult<()> {
        let ctor = decl.element;
        let Some(class) = frame.holder.class() else {
            return Err(self.cx.internal_error(decl.span, "generative constructor outside of a class"));
        };
        let init_frame = Frame {
            in_initializer: true,
            ..frame
        };

        let mut invocation = SuperInvocation::Implicit;
        for init in &decl.initializers {
            match &init.kind {
                InitializerKind::Field { name, value } => {
                    let field = self.resolve_initialized_field(class, name)?;
                    if let ExprKind::MethodInvocation { target, name: method, .. } = &value.kind {
                        if matches!(target.kind, ExprKind::Super) {
                            self.cx.on_error(
                                value.span,
                                ErrorCode::SuperMethodInvocationInInitializer,
                                &[method.name.as_str()],
                            );
                        }
                    }
                    self.resolve_expr(value, init_frame)?;
                    if let Some(field) = field {
                        if !initialized.insert(field) {
                            self.cx.on_error(name.span, ErrorCode::DuplicateInitialization, &[name.name.as_str()]);
                        }
                    }
                }
                InitializerKind::Super(call) => {
                    self.resolve_arguments(&call.args, init_frame)?;
                    invocation = SuperInvocation::Explicit(self.resolve_super_constructor_call(class, call));
                }
                InitializerKind::Redirect(call) => {
                    let redirect_frame = Frame {
                        in_redirect: true,
                        ..init_frame
                    };
                    self.resolve_arguments(&call.args, redirect_frame)?;
                    invocation = SuperInvocation::Explicit(self.resolve_redirect_call(class, call));
                }
            }
        }

        let class_element = self.cx.element(class)?;
        let skip_coverage = class_element.is_interface()
            || class_element.is_native()
            || self.cx.element(ctor)?.is_external()
            || decl.is_redirecting();
        if !skip_coverage {
            let members = self
                .cx
                .element(class)?
                .class_data()
                .map(|data| data.members.clone())
                .unwrap_or_default();
            for member in members {
                let element = self.cx.element(member)?;
                let uncovered = matches!(element.kind, ElementKind::Field(_))
                    && element.is_final()
                    && !element.is_static()
                    && !element
                        .modifiers
                        .intersects(Modifiers::INITIALIZED | Modifiers::ABSTRACT_FIELD)
                    && !initialized.contains(&member);
                if uncovered {
                    let name = element.name.clone();
                    self.cx.on_error(decl.name.span, ErrorCode::FinalFieldMustBeInitialized, &[name.as_str()]);
                }
            }
        }

        self.cx.check_constructor(decl.name.span, ctor, invocation)
    }

    /// Target of `name = value` in an initializer list. Only instance fields
    /// declared by the class itself qualify; anything else the name reaches
    /// picks the diagnostic.
    fn resolve_initialized_field(&mut self, class: ElementId, name: &Identifier) -> ResolveResult<Option<ElementId>> {
        let local = self.cx.elements.lookup_local_member(class, &name.name);
        if let Some(field) = local {
            let element = self.cx.element(field)?;
            let assignable = matches!(element.kind, ElementKind::Field(_))
                && !element.is_static()
                && !element.modifiers.contains(Modifiers::ABSTRACT_FIELD);
            if assignable {
                return Ok(self.cx.record_element(name.id, Some(field)));
            }
        }

        let found = local.or_else(|| self.cx.find_element(&name.name));
        let code = match found.map(|id| self.cx.element(id)).transpose()? {
            None => ErrorCode::CannotResolveField,
            Some(element) => match &element.kind {
                ElementKind::Field(_)
                    if element.is_static() || element.modifiers.contains(Modifiers::ABSTRACT_FIELD) =>
                {
                    ErrorCode::CannotInitStaticFieldInInitializer
                }
                ElementKind::Field(_) => ErrorCode::InitFieldOnlyImmediatelySurroundingClass,
                ElementKind::Method(_) | ElementKind::Constructor(_) => ErrorCode::ExpectedFieldNotMethod,
                ElementKind::Class(_) => ErrorCode::ExpectedFieldNotClass,
                ElementKind::Parameter(_) => ErrorCode::ExpectedFieldNotParameter,
                ElementKind::TypeVariable(_) => ErrorCode::ExpectedFieldNotTypeVariable,
                ElementKind::Variable | ElementKind::Label(_) => {
                    return Err(self.cx.internal_error(
                        name.span,
                        format!("initializer target '{}' resolved to a {}", name.name, element.kind.description()),
                    ));
                }
                _ => ErrorCode::CannotResolveField,
            },
        };
        self.cx.record_element(name.id, None);
        self.cx.on_error(name.span, code, &[name.name.as_str()]);
        Ok(None)
    }

    fn resolve_super_constructor_call(&mut self, class: ElementId, call: &ConstructorCall) -> Option<ElementId> {
        let name = call.constructor_name();
        let Some(superclass) = self.cx.elements.supertype(class) else {
            let class_name = self.cx.elements.name(class).to_string();
            self.cx.on_error(call.span, ErrorCode::SuperWithoutSuperclass, &[class_name.as_str()]);
            return self.record_call(call, None);
        };

        let mut target = self.cx.elements.lookup_constructor(superclass, name);
        if target.is_none()
            && name.is_empty()
            && call.args.is_empty()
            && self.cx.elements.needs_implicit_default_constructor(superclass)
        {
            target = Some(self.cx.implicit_default_constructor(superclass));
        }
        if target.is_none() {
            let display = constructor_display(self.cx.elements.name(superclass), name);
            self.cx.on_error(call.span, ErrorCode::CannotResolveSuperConstructor, &[display.as_str()]);
        }
        self.record_call(call, target)
    }

    fn resolve_redirect_call(&mut self, class: ElementId, call: &ConstructorCall) -> Option<ElementId> {
        let name = call.constructor_name();
        let target = self.cx.elements.lookup_constructor(class, name);
        if target.is_none() {
            let display = constructor_display(self.cx.elements.name(class), name);
            self.cx.on_error(call.span, ErrorCode::CannotResolveConstructor, &[display.as_str()]);
        }
        self.record_call(call, target)
    }

    fn record_call(&mut self, call: &ConstructorCall, target: Option<ElementId>) -> Option<ElementId> {
        if let Some(name) = &call.name {
            self.cx.record_element(name.id, target);
        }
        self.cx.record_element(call.id, target)
    }

    /// Fields and top-level variables, with their accessors
    pub(super) fn resolve_field(&mut self, decl: &FieldDecl, frame: Frame) -> ResolveResult<()> {
        let field = decl.element;
        let element = self.cx.element(field)?;
        let is_static = element.is_static();
        let is_final = element.is_final();
        let is_const = element.is_const();
        let has_declared_type = element.ty.is_some();
        let is_property = element.modifiers.contains(Modifiers::ABSTRACT_FIELD) || !decl.accessors.is_empty();
        let top_level = frame.holder.is_library();
        let field_frame = Frame {
            enclosing: field,
            static_member: is_static || top_level,
            in_instance_field_initializer: !is_static && !top_level,
            access: Access::Get,
            ..frame
        };
        self.cx.record_element(decl.id, Some(field));
        self.cx.record_element(decl.name.id, Some(field));

        if let Some(ty) = &decl.type_node {
            self.cx.resolve_type(ty, field_frame.forbids_type_variables(), ErrorCode::NoSuchType);
        }

        let name = decl.name.name.as_str();
        match &decl.value {
            Some(value) => {
                self.resolve_expr(value, field_frame)?;
                if is_final && !has_declared_type && decl.type_node.is_none() {
                    let inferred = self.cx.bindings.type_of(value.id).filter(|ty| !ty.is_dynamic()).cloned();
                    if let Some(ty) = inferred {
                        self.inferred_field_types.insert(field, ty);
                    }
                }
            }
            None if is_property => {}
            None if is_const => self.cx.on_error(decl.name.span, ErrorCode::ConstRequiresValue, &[name]),
            None if is_final && is_static => {
                self.cx.on_error(decl.name.span, ErrorCode::StaticFinalRequiresValue, &[name])
            }
            None if is_final && top_level => {
                self.cx.on_error(decl.name.span, ErrorCode::TopLevelFinalRequiresValue, &[name])
            }
            None => {}
        }

        for accessor in &decl.accessors {
            self.resolve_method(accessor, frame)?;
        }
        Ok(())
    }

    pub(super) fn resolve_type_alias(&mut self, decl: &FunctionTypeAlias, frame: Frame) -> ResolveResult<()> {
        let alias = decl.element;
        self.cx.record_element(decl.id, Some(alias));
        self.cx.record_element(decl.name.id, Some(alias));

        self.with_scope(ScopeKind::FunctionAlias(alias), |this| {
            for param in &decl.type_params {
                this.cx.record_element(param.id, param.element);
                this.cx.record_element(param.name.id, param.element);
                if let Some(variable) = param.element {
                    this.cx.declare(variable, param.span, ErrorCode::DuplicateTypeVariable)?;
                }
            }
            for bound in decl.type_params.iter().filter_map(|param| param.bound.as_ref()) {
                this.cx.resolve_type(bound, false, ErrorCode::NoSuchType);
            }
            if let Some(return_type) = &decl.return_type {
                this.cx.resolve_type(return_type, false, ErrorCode::NoSuchType);
            }

            for param in &decl.params {
                let name = param.name.name.as_str();
                if param.this_qualified {
                    this.cx.on_error(param.span, ErrorCode::ParameterInitOutsideConstructor, &[name]);
                    continue;
                }
                if param.kind == ParamKind::Named && this.cx.is_private(name) {
                    this.cx.on_error(param.span, ErrorCode::NamedParameterCannotBePrivate, &[name]);
                }
                let element = this.parameter_element(param, alias);
                this.cx.declare(element, param.name.span, ErrorCode::DuplicateParameter)?;
                if let Some(ty) = &param.type_node {
                    this.cx.resolve_type(ty, false, ErrorCode::NoSuchType);
                }
            }
            Ok(())
        })
        .map(|()| {
            tracing::trace!(alias = %decl.name.name, top_level = frame.holder.is_library(), "resolved type alias");
        })
    }
}

fn constructor_display(class: &str, name: &str) -> String {
    if name.is_empty() {
        class.to_string()
    } else {
        format!("{}.{}", class, name)
    }
}
