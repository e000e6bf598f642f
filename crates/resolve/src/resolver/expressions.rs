//! Expressions: identifiers, member access, invocations, object creation
//! and literals
//!
//! `resolve_expr` returns the element an expression denotes, when it denotes
//! one, so that a caller such as an assignment can check what it writes to.

use codespan::Span;
use tern_ast::{
    BinaryOp, ConstructorRef, ElementId, Expr, ExprKind, Identifier, MapEntry, TypeNode,
};

use super::ResolveVisitor;
use crate::element::{Element, ElementKind, Modifiers};
use crate::errors::{ErrorCode, ResolveResult};
use crate::frame::{Access, Frame};
use crate::types::Type;

/// What the target of `x.name` or `x.name()` turned out to be
enum Qualifier {
    Class(ElementId),
    Prefix(ElementId),
    /// An ordinary value; its members are looked up at run time
    Value,
}

impl<'a> ResolveVisitor<'a> {
    pub(super) fn resolve_expr(&mut self, expr: &Expr, frame: Frame) -> ResolveResult<Option<ElementId>> {
        let reading = frame.reading();
        match &expr.kind {
            ExprKind::Ident(name) => self.resolve_identifier(expr, name, frame, false),
            ExprKind::This => Ok(self.resolve_this(expr, frame, false)),
            ExprKind::Super => self.resolve_super(expr, frame),
            ExprKind::Null => Ok(None),
            ExprKind::Int(_) => self.literal(expr, self.cx.types.int_type()),
            ExprKind::Double(_) => self.literal(expr, self.cx.types.double_type()),
            ExprKind::Bool(_) => self.literal(expr, self.cx.types.bool_type()),
            ExprKind::Str(_) => self.literal(expr, self.cx.types.string_type()),
            ExprKind::Interpolation(parts) => {
                self.resolve_arguments(parts, reading)?;
                self.literal(expr, self.cx.types.string_type())
            }
            ExprKind::Array {
                is_const,
                type_args,
                elements,
            } => {
                self.resolve_array_literal(expr, *is_const, type_args, frame);
                self.resolve_arguments(elements, reading)?;
                Ok(None)
            }
            ExprKind::Map {
                is_const,
                type_args,
                entries,
            } => {
                self.resolve_map_literal(expr, *is_const, type_args, frame);
                for MapEntry { key, value } in entries {
                    self.resolve_expr(key, reading)?;
                    self.resolve_expr(value, reading)?;
                }
                Ok(None)
            }
            ExprKind::PropertyAccess { target, name } => self.resolve_property_access(expr, target, name, frame),
            ExprKind::Index { target, index } => {
                self.resolve_expr(target, reading)?;
                self.resolve_expr(index, reading)?;
                Ok(None)
            }
            ExprKind::MethodInvocation { target, name, args } => {
                self.resolve_method_invocation(expr, target, name, args, frame)
            }
            ExprKind::UnqualifiedInvocation { name, args } => self.resolve_unqualified_invocation(expr, name, args, frame),
            ExprKind::FunctionObjectInvocation { target, args } => {
                self.resolve_expr(target, reading)?;
                self.resolve_arguments(args, reading)?;
                Ok(None)
            }
            ExprKind::New {
                is_const,
                constructor,
                args,
            } => self.resolve_new(expr, *is_const, constructor, args, frame),
            ExprKind::Binary { op, lhs, rhs } if op.is_assignment() => {
                let access = if *op == BinaryOp::Assign {
                    Access::Set
                } else {
                    Access::GetSet
                };
                let target = self.resolve_expr(lhs, frame.with_access(access))?;
                self.resolve_expr(rhs, reading)?;
                self.check_assignment_target(lhs, target)?;
                Ok(None)
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs, reading)?;
                self.resolve_expr(rhs, reading)?;
                Ok(None)
            }
            ExprKind::Unary { op, operand } if op.is_count() => {
                let target = self.resolve_expr(operand, frame.with_access(Access::GetSet))?;
                self.check_assignment_target(operand, target)?;
                Ok(None)
            }
            ExprKind::Unary { operand, .. } => {
                self.resolve_expr(operand, reading)?;
                Ok(None)
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.resolve_expr(condition, reading)?;
                self.resolve_expr(then_expr, reading)?;
                self.resolve_expr(else_expr, reading)?;
                Ok(None)
            }
            ExprKind::TypeTest { expr: inner, type_node, .. } => {
                self.resolve_expr(inner, reading)?;
                self.cx.resolve_type(type_node, frame.forbids_type_variables(), ErrorCode::UnknownType);
                Ok(None)
            }
            ExprKind::NamedArgument { value, .. } => {
                self.resolve_expr(value, reading)?;
                Ok(None)
            }
            ExprKind::Function(function) => self.resolve_function(function, frame, false).map(Some),
        }
    }

    pub(super) fn resolve_arguments(&mut self, args: &[Expr], frame: Frame) -> ResolveResult<()> {
        for arg in args {
            self.resolve_expr(arg, frame.reading())?;
        }
        Ok(())
    }

    fn literal(&mut self, expr: &Expr, ty: Type) -> ResolveResult<Option<ElementId>> {
        self.cx.record_type(expr.id, ty);
        Ok(None)
    }

    /// Bare identifier. A qualifier (`x` in `x.y`) may name a class or a
    /// library prefix, which a value may not.
    fn resolve_identifier(&mut self, expr: &Expr, name: &str, frame: Frame, is_qualifier: bool) -> ResolveResult<Option<ElementId>> {
        if self.cx.scopes.is_declared_but_not_reached(name) {
            self.cx.on_error(expr.span, ErrorCode::UsingLocalVariableBeforeDeclaration, &[name]);
            return Ok(self.cx.record_element(expr.id, None));
        }

        let Some(element) = self.cx.find_element(name) else {
            self.cx.record_element(expr.id, None);
            let hidden = self.cx.find_element_anywhere(name).filter(|_| self.cx.is_private(name));
            if let Some(hidden) = hidden {
                let qualified = self.cx.elements.qualified_name(hidden);
                self.cx.mark_reported(expr.id);
                self.cx.on_error(expr.span, ErrorCode::IllegalAccessToPrivateMember, &[name, qualified.as_str()]);
            } else if frame.is_static_context_or_initializer() && !is_qualifier {
                self.cx.mark_reported(expr.id);
                self.cx.on_error(expr.span, ErrorCode::CannotBeResolved, &[name]);
            }
            return Ok(None);
        };

        let is_instance = self.cx.elements.is_instance_member(element);
        let code = match &self.cx.element(element)?.kind {
            ElementKind::Field(_) if is_instance => {
                if frame.in_instance_field_initializer {
                    Some(ErrorCode::CannotUseInstanceFieldInInstanceFieldInitializer)
                } else if frame.is_static_context() {
                    Some(ErrorCode::IllegalFieldAccessFromStatic)
                } else if frame.in_initializer {
                    Some(ErrorCode::CannotAccessFieldInInit)
                } else {
                    None
                }
            }
            ElementKind::Method(_) if is_instance => {
                if frame.is_static_context() {
                    Some(ErrorCode::IllegalMethodAccessFromStatic)
                } else if frame.in_initializer {
                    Some(ErrorCode::InstanceMethodFromInitializer)
                } else {
                    None
                }
            }
            ElementKind::TypeVariable(_) if is_qualifier => {
                // `T.x` can only mean a class named like the variable
                let root = self.cx.scopes.root();
                let class = self.cx.scopes.find_in_program_scope(
                    &self.cx.elements,
                    self.cx.config,
                    root,
                    self.cx.library(),
                    name,
                );
                if class.is_none() {
                    self.cx.on_error(expr.span, ErrorCode::TypeVariableNotAllowedInIdentifier, &[name]);
                }
                return Ok(self.cx.record_element(expr.id, class));
            }
            ElementKind::TypeVariable(_) => Some(ErrorCode::CannotUseTypeVariable),
            ElementKind::Class(_) if !is_qualifier => Some(ErrorCode::IsAClass),
            ElementKind::FunctionTypeAlias(_) if !is_qualifier => Some(ErrorCode::CannotUseType),
            _ => None,
        };
        if let Some(code) = code {
            self.cx.on_error(expr.span, code, &[name]);
        }
        Ok(self.cx.record_element(expr.id, Some(element)))
    }

    /// `this`; returns the class it refers to
    fn resolve_this(&mut self, expr: &Expr, frame: Frame, is_qualifier: bool) -> Option<ElementId> {
        let code = if frame.holder.is_library() {
            Some(ErrorCode::ThisOnTopLevel)
        } else if frame.current_method.is_none() {
            Some(ErrorCode::ThisOutsideOfMethod)
        } else if frame.static_member {
            Some(ErrorCode::ThisInStaticMethod)
        } else if frame.factory {
            Some(ErrorCode::ThisInFactoryConstructor)
        } else if frame.in_initializer && !is_qualifier {
            Some(ErrorCode::ThisInInitializerAsExpression)
        } else {
            None
        };
        let class = match code {
            Some(code) => {
                self.cx.on_error(expr.span, code, &[]);
                None
            }
            None => frame.holder.class(),
        };
        self.cx.record_element(expr.id, class)
    }

    /// `super`; returns the pseudo-element standing for the superclass
    fn resolve_super(&mut self, expr: &Expr, frame: Frame) -> ResolveResult<Option<ElementId>> {
        let code = if frame.holder.is_library() {
            Some(ErrorCode::SuperOnTopLevel)
        } else if frame.current_method.is_none() {
            Some(ErrorCode::SuperOutsideOfMethod)
        } else if frame.static_member {
            Some(ErrorCode::SuperInStaticMethod)
        } else if frame.factory {
            Some(ErrorCode::SuperInFactoryConstructor)
        } else {
            None
        };
        if let Some(code) = code {
            self.cx.on_error(expr.span, code, &[]);
            return Ok(self.cx.record_element(expr.id, None));
        }

        let Some(class) = frame.holder.class() else {
            return Err(self.cx.internal_error(expr.span, "'super' inside a method without a class"));
        };
        if self.cx.elements.supertype(class).is_none() {
            let class_name = self.cx.elements.name(class).to_string();
            self.cx.on_error(expr.span, ErrorCode::SuperWithoutSuperclass, &[class_name.as_str()]);
            return Ok(self.cx.record_element(expr.id, None));
        }
        let element = self.cx.super_element(class);
        Ok(self.cx.record_element(expr.id, Some(element)))
    }

    /// Resolve the `x` of `x.y`
    fn resolve_qualifier(&mut self, target: &Expr, frame: Frame) -> ResolveResult<Qualifier> {
        let element = match &target.kind {
            ExprKind::Ident(name) => self.resolve_identifier(target, name, frame, true)?,
            _ => self.resolve_expr(target, frame)?,
        };
        Ok(match element.and_then(|id| self.cx.elements.kind(id).map(|kind| (id, kind))) {
            Some((class, ElementKind::Class(_))) => Qualifier::Class(class),
            Some((prefix, ElementKind::LibraryPrefix(_))) => Qualifier::Prefix(prefix),
            _ => Qualifier::Value,
        })
    }

    fn resolve_property_access(
        &mut self,
        expr: &Expr,
        target: &Expr,
        name: &Identifier,
        frame: Frame,
    ) -> ResolveResult<Option<ElementId>> {
        let reading = frame.reading();
        let element = match &target.kind {
            ExprKind::This => match self.resolve_this(target, reading, true) {
                Some(class) => self.resolve_this_member(class, name, frame),
                None => None,
            },
            ExprKind::Super => match self.resolve_super(target, reading)? {
                Some(_) => self.resolve_super_member(name, frame)?,
                None => None,
            },
            _ => match self.resolve_qualifier(target, reading)? {
                Qualifier::Class(class) => self.resolve_static_member(class, name, frame.access)?,
                Qualifier::Prefix(prefix) => self.resolve_prefixed_name(expr, prefix, name),
                Qualifier::Value => return Ok(None),
            },
        };
        self.cx.record_element(name.id, element);
        Ok(self.cx.record_element(expr.id, element))
    }

    fn resolve_this_member(&mut self, class: ElementId, name: &Identifier, frame: Frame) -> Option<ElementId> {
        let member = self.instance_member(class, &name.name)?;
        let is_field = matches!(self.cx.elements.kind(member), Some(ElementKind::Field(_)));
        if is_field && frame.in_initializer && frame.access.reads() {
            self.cx.on_error(name.span, ErrorCode::CannotAccessFieldInInit, &[name.name.as_str()]);
        }
        Some(member)
    }

    fn instance_member(&self, class: ElementId, name: &str) -> Option<ElementId> {
        self.cx
            .elements
            .lookup_member(class, name)
            .filter(|&member| !self.cx.elements.get(member).is_some_and(Element::is_static))
    }

    /// `super.name` read or written as a property
    fn resolve_super_member(&mut self, name: &Identifier, frame: Frame) -> ResolveResult<Option<ElementId>> {
        let superclass = frame.holder.class().and_then(|class| self.cx.elements.supertype(class));
        let member = superclass.and_then(|superclass| self.cx.elements.lookup_member(superclass, &name.name));
        let Some(member) = member else {
            self.cx.mark_reported(name.id);
            self.cx.on_error(name.span, ErrorCode::CannotBeResolved, &[name.name.as_str()]);
            return Ok(None);
        };

        if self.cx.is_private(&name.name) && self.cx.is_foreign(member) {
            self.cx.mark_reported(name.id);
            self.cx.on_error(name.span, ErrorCode::IllegalAccessToPrivate, &[name.name.as_str()]);
            return Ok(None);
        }

        let element = self.cx.element(member)?;
        match &element.kind {
            ElementKind::Field(_) | ElementKind::Method(_) if element.is_static() => {
                self.cx.on_error(name.span, ErrorCode::NotAnInstanceField, &[name.name.as_str()]);
                Ok(None)
            }
            ElementKind::Field(_) | ElementKind::Method(_) => Ok(Some(member)),
            other => {
                let found = other.description();
                self.cx.on_error(name.span, ErrorCode::ExpectedAnInstanceFieldInSuperClass, &[found]);
                Ok(None)
            }
        }
    }

    /// `C.name` read or written as a property
    fn resolve_static_member(&mut self, class: ElementId, name: &Identifier, access: Access) -> ResolveResult<Option<ElementId>> {
        let text = name.name.as_str();
        let Some(member) = self.cx.elements.find_in_class(class, text) else {
            self.cx.mark_reported(name.id);
            self.cx.on_error(name.span, ErrorCode::CannotBeResolved, &[text]);
            return Ok(None);
        };
        if self.cx.is_private(text) && self.cx.is_foreign(member) {
            let qualified = self.cx.elements.qualified_name(member);
            self.cx.on_error(name.span, ErrorCode::IllegalAccessToPrivateMember, &[text, qualified.as_str()]);
            return Ok(None);
        }

        let element = self.cx.element(member)?;
        let mut codes = Vec::new();
        match &element.kind {
            ElementKind::Field(data) => {
                if !element.is_static() {
                    codes.push(ErrorCode::NotAStaticField);
                }
                if access.reads() && data.getter.is_none() && data.setter.is_some() {
                    codes.push(ErrorCode::FieldDoesNotHaveAGetter);
                }
                if access.writes() && data.setter.is_none() && data.getter.is_some() {
                    codes.push(ErrorCode::FieldDoesNotHaveASetter);
                }
            }
            ElementKind::Method(_) if !element.is_static() => codes.push(ErrorCode::NotAStaticMethod),
            ElementKind::Method(_) => {}
            other => {
                let found = other.description();
                self.cx.on_error(name.span, ErrorCode::ExpectedStaticField, &[found]);
                return Ok(None);
            }
        }
        for code in codes {
            self.cx.on_error(name.span, code, &[text]);
        }
        Ok(Some(member))
    }

    /// `p.name` where `p` is a library prefix
    fn resolve_prefixed_name(&mut self, expr: &Expr, prefix: ElementId, name: &Identifier) -> Option<ElementId> {
        let found = self.cx.find_in_prefix(prefix, &name.name);
        if found.is_none() {
            self.cx.mark_reported(expr.id);
            if self.cx.is_private(&name.name) {
                self.cx.on_error(name.span, ErrorCode::IllegalAccessToPrivate, &[name.name.as_str()]);
            } else {
                let prefix_name = self.cx.elements.name(prefix).to_string();
                self.cx.on_error(
                    name.span,
                    ErrorCode::CannotBeResolvedLibrary,
                    &[name.name.as_str(), prefix_name.as_str()],
                );
            }
        }
        found
    }

    fn resolve_method_invocation(
        &mut self,
        expr: &Expr,
        target: &Expr,
        name: &Identifier,
        args: &[Expr],
        frame: Frame,
    ) -> ResolveResult<Option<ElementId>> {
        let reading = frame.reading();
        let text = name.name.as_str();
        let method = match &target.kind {
            ExprKind::This => match self.resolve_this(target, reading, true) {
                Some(class) => {
                    let method = self.instance_member(class, text);
                    if let Some(method) = method {
                        self.check_invocation_target(method, name, frame);
                    }
                    method
                }
                None => None,
            },
            ExprKind::Super => match self.resolve_super(target, reading)? {
                Some(_) => {
                    let superclass = frame.holder.class().and_then(|class| self.cx.elements.supertype(class));
                    let method = superclass.and_then(|superclass| self.instance_member(superclass, text));
                    match method {
                        Some(method) if self.cx.is_private(text) && self.cx.is_foreign(method) => {
                            self.cx.mark_reported(expr.id);
                            self.cx.on_error(name.span, ErrorCode::CannotAccessMethod, &[text]);
                            None
                        }
                        method => method,
                    }
                }
                None => None,
            },
            _ => match self.resolve_qualifier(target, reading)? {
                Qualifier::Class(class) => self.resolve_static_invocation(expr, class, name)?,
                Qualifier::Prefix(prefix) => {
                    let found = self.cx.find_in_prefix(prefix, text);
                    if found.is_none() {
                        let prefix_name = self.cx.elements.name(prefix).to_string();
                        self.cx.mark_reported(expr.id);
                        self.cx.on_error(
                            name.span,
                            ErrorCode::CannotResolveMethodInLibrary,
                            &[text, prefix_name.as_str()],
                        );
                    }
                    found
                }
                Qualifier::Value => {
                    self.resolve_arguments(args, frame)?;
                    return Ok(None);
                }
            },
        };

        self.cx.record_element(name.id, method);
        self.cx.record_element(expr.id, method);
        self.resolve_arguments(args, frame)?;
        Ok(method)
    }

    /// `C.name(...)`
    fn resolve_static_invocation(&mut self, expr: &Expr, class: ElementId, name: &Identifier) -> ResolveResult<Option<ElementId>> {
        let text = name.name.as_str();
        let class_name = self.cx.elements.name(class).to_string();
        let Some(member) = self.cx.elements.find_in_class(class, text) else {
            self.cx.mark_reported(expr.id);
            self.cx.on_error(name.span, ErrorCode::CannotResolveMethodInClass, &[text, class_name.as_str()]);
            return Ok(None);
        };
        if self.cx.is_private(text) && self.cx.is_foreign(member) {
            let qualified = self.cx.elements.qualified_name(member);
            self.cx.on_error(name.span, ErrorCode::IllegalAccessToPrivateMember, &[text, qualified.as_str()]);
            return Ok(None);
        }

        let element = self.cx.element(member)?;
        let code = match element.kind {
            ElementKind::Constructor(_) => Some(ErrorCode::IsAConstructor),
            ElementKind::Method(_) if !element.is_static() => Some(ErrorCode::IsAnInstanceMethod),
            ElementKind::Field(_) if !element.is_static() => Some(ErrorCode::IsAnInstanceField),
            _ => None,
        };
        if let Some(code) = code {
            self.cx.on_error(name.span, code, &[class_name.as_str(), text]);
        }
        Ok(Some(member))
    }

    /// Instance methods called where no receiver exists yet, or none at all
    fn check_invocation_target(&mut self, method: ElementId, name: &Identifier, frame: Frame) {
        let is_instance_method = self.cx.elements.is_instance_member(method)
            && matches!(self.cx.elements.kind(method), Some(ElementKind::Method(_)));
        if !is_instance_method {
            return;
        }
        let code = if frame.in_static_method() {
            ErrorCode::InstanceMethodFromStatic
        } else if frame.in_redirect {
            ErrorCode::InstanceMethodFromRedirect
        } else if frame.in_initializer {
            ErrorCode::InstanceMethodFromInitializer
        } else if frame.is_static_context() {
            ErrorCode::IllegalMethodAccessFromStatic
        } else {
            return;
        };
        self.cx.on_error(name.span, code, &[name.name.as_str()]);
    }

    /// `f(...)`
    fn resolve_unqualified_invocation(
        &mut self,
        expr: &Expr,
        name: &Identifier,
        args: &[Expr],
        frame: Frame,
    ) -> ResolveResult<Option<ElementId>> {
        let text = name.name.as_str();
        let target = self.cx.find_element(text);
        match target {
            Some(target) => self.check_call_target(target, name, frame)?,
            None if self.cx.is_private(text) && self.cx.find_element_anywhere(text).is_some() => {
                self.cx.mark_reported(expr.id);
                self.cx.on_error(name.span, ErrorCode::CannotAccessMethod, &[text]);
            }
            None if frame.is_static_context_or_initializer() => {
                self.cx.mark_reported(expr.id);
                self.cx.on_error(name.span, ErrorCode::CannotResolveMethod, &[text]);
            }
            None => {}
        }

        self.cx.record_element(name.id, target);
        self.cx.record_element(expr.id, target);
        self.resolve_arguments(args, frame)?;
        Ok(target)
    }

    fn check_call_target(&mut self, target: ElementId, name: &Identifier, frame: Frame) -> ResolveResult<()> {
        let text = name.name.as_str();
        let is_instance = self.cx.elements.is_instance_member(target);
        let element = self.cx.element(target)?;
        let is_property = element.modifiers.contains(Modifiers::ABSTRACT_FIELD);
        let rejected = match &element.kind {
            ElementKind::Field(data) if is_property && data.getter.is_none() => {
                Some((ErrorCode::UseAssignmentOnSetter, None))
            }
            ElementKind::Field(_) if is_instance && frame.is_static_context() => {
                Some((ErrorCode::IllegalFieldAccessFromStatic, None))
            }
            ElementKind::Field(_) | ElementKind::Parameter(_) | ElementKind::Variable | ElementKind::Method(_) => None,
            ElementKind::Class(_) => Some((ErrorCode::DidYouMeanNew, Some("class"))),
            ElementKind::Constructor(_) => Some((ErrorCode::DidYouMeanNew, Some("constructor"))),
            ElementKind::TypeVariable(_) => Some((ErrorCode::DidYouMeanNew, Some("type variable"))),
            ElementKind::FunctionTypeAlias(_) => Some((ErrorCode::CannotCallFunctionTypeAlias, None)),
            ElementKind::LibraryPrefix(_) => Some((ErrorCode::CannotCallLibraryPrefix, None)),
            ElementKind::Library(_) | ElementKind::Label(_) | ElementKind::Super(_) => {
                return Err(self.cx.internal_error(
                    name.span,
                    format!("'{}' resolved to a {} as a call target", text, element.kind.description()),
                ));
            }
        };
        let is_method = matches!(element.kind, ElementKind::Method(_));

        match rejected {
            Some((code, Some(kind))) => self.cx.on_error(name.span, code, &[text, kind]),
            Some((code, None)) => self.cx.on_error(name.span, code, &[text]),
            None if is_method => self.check_invocation_target(target, name, frame),
            None => {}
        }
        Ok(())
    }

    /// `new C.name(...)` and `const C.name(...)`
    fn resolve_new(
        &mut self,
        expr: &Expr,
        is_const: bool,
        constructor: &ConstructorRef,
        args: &[Expr],
        frame: Frame,
    ) -> ResolveResult<Option<ElementId>> {
        self.resolve_arguments(args, frame)?;
        let ty = self
            .cx
            .resolve_type(&constructor.type_node, frame.forbids_type_variables(), ErrorCode::NoSuchType);

        let declared = match &ty {
            Type::Variable(_) => {
                let name = constructor.type_node.name.name.as_str();
                self.cx.on_error(constructor.type_node.span, ErrorCode::NewExpressionCantUseTypeVariable, &[name]);
                None
            }
            Type::Interface { class, .. } => self.lookup_new_target(*class, constructor, args.is_empty()),
            _ => None,
        };
        let resolved = self.cx.resolve_in_default_class(constructor.span, declared)?;

        if let Some(name) = &constructor.name {
            self.cx.record_element(name.id, resolved);
        }
        self.cx.record_element(constructor.id, resolved);
        self.cx.record_type(expr.id, ty.clone());

        if is_const {
            self.check_const_creation(constructor, declared, &ty)?;
        }
        Ok(self.cx.record_element(expr.id, resolved))
    }

    fn lookup_new_target(&mut self, class: ElementId, constructor: &ConstructorRef, no_args: bool) -> Option<ElementId> {
        let name = constructor.name.as_ref().map_or("", |name| name.name.as_str());
        let mut target = self.cx.elements.lookup_constructor(class, name);
        if target.is_none() && name.is_empty() && no_args && self.cx.elements.needs_implicit_default_constructor(class) {
            target = Some(self.cx.implicit_default_constructor(class));
        }

        let class_name = self.cx.elements.name(class);
        let display = if name.is_empty() {
            class_name.to_string()
        } else {
            format!("{}.{}", class_name, name)
        };
        match target {
            Some(ctor) if self.cx.is_private(name) && self.cx.is_foreign(ctor) => {
                self.cx.on_error(constructor.span, ErrorCode::IllegalAccessToPrivate, &[display.as_str()]);
                None
            }
            Some(ctor) => Some(ctor),
            None => {
                self.cx.on_error(constructor.span, ErrorCode::NewExpressionNotConstructor, &[display.as_str()]);
                None
            }
        }
    }

    fn check_const_creation(&mut self, constructor: &ConstructorRef, ctor: Option<ElementId>, ty: &Type) -> ResolveResult<()> {
        if let Some(ctor) = ctor {
            if !self.cx.element(ctor)?.is_const() {
                let name = self.cx.elements.raw_constructor_name(ctor);
                self.cx.on_error(constructor.span, ErrorCode::ConstAndNonConstConstructor, &[name.as_str()]);
                return Ok(());
            }
        }
        for arg in ty.type_args() {
            if let Type::Variable(variable) = arg {
                let name = self.cx.elements.name(*variable).to_string();
                self.cx.on_error(constructor.type_node.span, ErrorCode::ConstWithTypeVariable, &[name.as_str()]);
            }
        }
        Ok(())
    }

    fn resolve_array_literal(&mut self, expr: &Expr, is_const: bool, type_args: &[TypeNode], frame: Frame) {
        let args = self.literal_type_args(type_args, frame);
        if args.len() > 1 {
            let name = self.core_class_name(self.cx.types.array_type(Type::Dynamic));
            let given = args.len().to_string();
            self.cx.on_error(expr.span, ErrorCode::WrongNumberOfTypeArguments, &[name.as_str(), "1", given.as_str()]);
        }
        let element_type = args.into_iter().next().unwrap_or_else(|| self.cx.types.dynamic_type());
        if is_const {
            self.reject_type_variable(expr.span, &element_type, ErrorCode::ConstArrayWithTypeVariable);
        }
        let ty = self.cx.types.array_type(element_type);
        self.cx.record_type(expr.id, ty);
    }

    /// `{}` is `Map<String, dynamic>` and `<V>{}` is `Map<String, V>`
    fn resolve_map_literal(&mut self, expr: &Expr, is_const: bool, type_args: &[TypeNode], frame: Frame) {
        let args = self.literal_type_args(type_args, frame);
        let count = args.len();
        let mut args = args.into_iter();
        let (key, value) = match count {
            0 => (self.cx.types.string_type(), self.cx.types.dynamic_type()),
            1 => {
                if self.cx.config.warn_legacy_map_literal {
                    let value_name = type_args[0].name.name.as_str();
                    self.cx.on_error(expr.span, ErrorCode::LegacyMapLiteral, &[value_name]);
                }
                let value = args.next().unwrap_or(Type::Dynamic);
                (self.cx.types.string_type(), value)
            }
            _ => {
                if count > 2 {
                    let name = self.core_class_name(self.cx.types.map_type(Type::Dynamic, Type::Dynamic));
                    let given = count.to_string();
                    self.cx.on_error(expr.span, ErrorCode::WrongNumberOfTypeArguments, &[name.as_str(), "2", given.as_str()]);
                }
                let key = args.next().unwrap_or(Type::Dynamic);
                let value = args.next().unwrap_or(Type::Dynamic);
                (key, value)
            }
        };
        if is_const {
            self.reject_type_variable(expr.span, &key, ErrorCode::ConstMapWithTypeVariable);
            self.reject_type_variable(expr.span, &value, ErrorCode::ConstMapWithTypeVariable);
        }
        let ty = self.cx.types.map_type(key, value);
        self.cx.record_type(expr.id, ty);
    }

    fn literal_type_args(&mut self, type_args: &[TypeNode], frame: Frame) -> Vec<Type> {
        let forbid = frame.forbids_type_variables();
        let mut args = Vec::with_capacity(type_args.len());
        for node in type_args {
            args.push(self.cx.resolve_type(node, forbid, ErrorCode::NoSuchType));
        }
        args
    }

    fn reject_type_variable(&mut self, span: Span, ty: &Type, code: ErrorCode) {
        if let Type::Variable(variable) = ty {
            let name = self.cx.elements.name(*variable).to_string();
            self.cx.on_error(span, code, &[name.as_str()]);
        }
    }

    fn core_class_name(&self, ty: Type) -> String {
        ty.element()
            .map(|class| self.cx.elements.name(class).to_string())
            .unwrap_or_default()
    }

    fn check_assignment_target(&mut self, target: &Expr, element: Option<ElementId>) -> ResolveResult<()> {
        match (&target.kind, element) {
            (ExprKind::Ident(name), Some(element)) => self.check_assignable(element, target.span, name),
            (ExprKind::PropertyAccess { name, .. }, Some(element)) => self.check_assignable(element, name.span, &name.name),
            _ => Ok(()),
        }
    }

    pub(super) fn check_assignable(&mut self, element: ElementId, span: Span, name: &str) -> ResolveResult<()> {
        let target = self.cx.element(element)?;
        let code = match target.kind {
            ElementKind::Field(_) | ElementKind::Parameter(_) | ElementKind::Variable if target.is_final() => {
                Some(ErrorCode::CannotAssignToFinal)
            }
            ElementKind::Method(_) => Some(ErrorCode::CannotAssignToMethod),
            _ => None,
        };
        if let Some(code) = code {
            self.cx.on_error(span, code, &[name]);
        }
        Ok(())
    }
}
