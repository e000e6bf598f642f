//! Statements, local declarations and labels

use tern_ast::{
    Block, CatchClause, ElementId, ForInTarget, FunctionExpr, Identifier, Label, Stmt, StmtKind,
    VarDecl,
};

use super::ResolveVisitor;
use crate::element::{Element, ElementKind, LabelData, LabelKind, MethodData, Modifiers};
use crate::errors::{ErrorCode, ResolveResult};
use crate::frame::Frame;
use crate::scope::ScopeKind;

/// Labels waiting for the statement they mark
type PendingLabels = Vec<(String, ElementId)>;

/// The statement a chain of `L1: L2: ...` labels ends at
fn unlabeled(mut stmt: &Stmt) -> &Stmt {
    while let StmtKind::Labeled { body, .. } = &stmt.kind {
        stmt = &**body;
    }
    stmt
}

impl<'a> ResolveVisitor<'a> {
    pub(super) fn resolve_block(&mut self, block: &Block, frame: Frame) -> ResolveResult<()> {
        self.with_scope(ScopeKind::Block, |this| this.resolve_statements(&block.stmts, frame))
    }

    /// Resolve `stmts` in the current frame. Every local they declare is
    /// registered up front so earlier statements cannot reach it.
    fn resolve_statements(&mut self, stmts: &[Stmt], frame: Frame) -> ResolveResult<()> {
        if let Some(scope) = self.cx.scopes.current_mut() {
            for stmt in stmts {
                if let StmtKind::Var(decl) = &unlabeled(stmt).kind {
                    for var in &decl.vars {
                        scope.mark_declared_not_reached(&var.name.name);
                    }
                }
            }
        }
        for stmt in stmts {
            self.resolve_stmt(stmt, frame)?;
        }
        Ok(())
    }

    pub(super) fn resolve_stmt(&mut self, stmt: &Stmt, frame: Frame) -> ResolveResult<()> {
        self.resolve_labeled_stmt(stmt, frame, Vec::new())
    }

    fn resolve_labeled_stmt(&mut self, stmt: &Stmt, frame: Frame, mut labels: PendingLabels) -> ResolveResult<()> {
        let reading = frame.reading();
        match &stmt.kind {
            StmtKind::Labeled { label, body } => {
                let kind = match unlabeled(body).kind {
                    StmtKind::Switch { .. } => LabelKind::Switch,
                    _ => LabelKind::Statement,
                };
                let element = self.label_element(label, kind, frame);
                labels.push((label.name.name.clone(), element));
                self.resolve_labeled_stmt(body, frame, labels)
            }
            StmtKind::Block(block) => {
                self.with_labeled_scope(ScopeKind::Block, &labels, |this| this.resolve_statements(&block.stmts, frame))
            }
            StmtKind::Var(decl) => self.resolve_var_decl(decl, frame, false),
            StmtKind::Function(function) => self.resolve_function(function, frame, true).map(|_| ()),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.with_labeled_scope(ScopeKind::If, &labels, |this| {
                this.resolve_expr(condition, reading)?;
                this.resolve_stmt(then_branch, frame)?;
                if let Some(else_branch) = else_branch {
                    this.resolve_stmt(else_branch, frame)?;
                }
                Ok(())
            }),
            StmtKind::While { condition, body } => self.with_labeled_scope(ScopeKind::While, &labels, |this| {
                this.resolve_expr(condition, reading)?;
                this.resolve_stmt(body, frame)
            }),
            StmtKind::DoWhile { body, condition } => self.with_labeled_scope(ScopeKind::DoWhile, &labels, |this| {
                this.resolve_stmt(body, frame)?;
                this.resolve_expr(condition, reading).map(|_| ())
            }),
            StmtKind::For {
                init,
                condition,
                updates,
                body,
            } => self.with_labeled_scope(ScopeKind::For, &labels, |this| {
                if let Some(init) = init {
                    this.resolve_stmt(init, frame)?;
                }
                if let Some(condition) = condition {
                    this.resolve_expr(condition, reading)?;
                }
                for update in updates {
                    this.resolve_expr(update, reading)?;
                }
                this.resolve_stmt(body, frame)
            }),
            StmtKind::ForIn { target, iterable, body } => self.with_labeled_scope(ScopeKind::ForIn, &labels, |this| {
                this.resolve_expr(iterable, reading)?;
                match target {
                    ForInTarget::Var(decl) => this.resolve_var_decl(decl, frame, true)?,
                    ForInTarget::Ident(name) => this.resolve_loop_variable(name)?,
                }
                this.resolve_stmt(body, frame)
            }),
            StmtKind::Try { body, catches, finally } => self.with_labeled_scope(ScopeKind::Try, &labels, |this| {
                this.resolve_block(body, frame)?;
                for catch in catches {
                    this.resolve_catch(catch, frame)?;
                }
                match finally {
                    Some(finally) => this.resolve_block(finally, frame),
                    None => Ok(()),
                }
            }),
            StmtKind::Switch { subject, members } => self.with_labeled_scope(ScopeKind::Switch, &labels, |this| {
                this.resolve_expr(subject, reading)?;
                // Case labels are visible from every member of the switch
                for member in members {
                    for label in &member.labels {
                        let element = this.label_element(label, LabelKind::SwitchMember, frame);
                        let added = this.cx.scopes.current_mut().map(|scope| scope.add_label(&label.name.name, element));
                        if let Some(Err(_)) = added {
                            this.cx.on_error(label.span, ErrorCode::DuplicateLabelInSwitch, &[label.name.name.as_str()]);
                        }
                    }
                }
                for member in members {
                    this.with_scope(ScopeKind::SwitchMember, |this| {
                        if let Some(case) = &member.case {
                            this.resolve_expr(case, reading)?;
                        }
                        this.resolve_statements(&member.stmts, frame)
                    })?;
                }
                Ok(())
            }),
            StmtKind::Break(target) => {
                self.with_labeled_scope(ScopeKind::Break, &labels, |this| this.resolve_goto(target.as_ref(), true, frame))
            }
            StmtKind::Continue(target) => {
                self.with_labeled_scope(ScopeKind::Break, &labels, |this| this.resolve_goto(target.as_ref(), false, frame))
            }
            StmtKind::Return(value) => self.with_labeled_scope(ScopeKind::Break, &labels, |this| {
                let Some(value) = value else {
                    return Ok(());
                };
                if let Some(method) = frame.current_method.filter(|&method| frame.innermost_function == Some(method)) {
                    if this.cx.element(method)?.is_generative_constructor() {
                        this.cx.on_error(stmt.span, ErrorCode::InvalidReturnInConstructor, &[]);
                    }
                }
                this.resolve_expr(value, reading).map(|_| ())
            }),
            StmtKind::Expr(expr) | StmtKind::Throw(Some(expr)) => {
                self.with_labeled_scope(ScopeKind::Break, &labels, |this| this.resolve_expr(expr, reading).map(|_| ()))
            }
            StmtKind::Throw(None) | StmtKind::Empty => Ok(()),
        }
    }

    /// Push a frame that makes `labels` visible to the statement inside it
    fn with_labeled_scope<T>(
        &mut self,
        kind: ScopeKind,
        labels: &[(String, ElementId)],
        f: impl FnOnce(&mut Self) -> ResolveResult<T>,
    ) -> ResolveResult<T> {
        self.with_scope(kind, |this| {
            if let Some(scope) = this.cx.scopes.current_mut() {
                for (name, label) in labels {
                    // `L: L: s` keeps the outer binding
                    let _ = scope.add_label(name, *label);
                }
            }
            f(this)
        })
    }

    fn label_element(&mut self, label: &Label, kind: LabelKind, frame: Frame) -> ElementId {
        let element = self.cx.synthesize(
            Element::new(
                label.name.name.as_str(),
                ElementKind::Label(LabelData {
                    kind,
                    function: frame.innermost_function,
                }),
            )
            .with_enclosing(frame.enclosing)
            .with_span(label.span),
        );
        self.cx.record_element(label.id, Some(element));
        self.cx.record_element(label.name.id, Some(element));
        element
    }

    /// Target of `break L` or `continue L`
    fn resolve_goto(&mut self, target: Option<&Identifier>, is_break: bool, frame: Frame) -> ResolveResult<()> {
        let Some(name) = target else {
            return Ok(());
        };
        let Some(label) = self.cx.scopes.find_label(&name.name) else {
            let code = match self.cx.find_element(&name.name) {
                Some(_) => ErrorCode::NotALabel,
                None => ErrorCode::CannotResolveLabel,
            };
            self.cx.record_element(name.id, None);
            self.cx.on_error(name.span, code, &[name.name.as_str()]);
            return Ok(());
        };

        let data = match self.cx.kind_of(Some(label)) {
            Some(ElementKind::Label(data)) => data.clone(),
            _ => return Err(self.cx.internal_error(name.span, format!("label '{}' is not a label element", name.name))),
        };
        let misdirected = match data.kind {
            LabelKind::SwitchMember if is_break => Some(ErrorCode::BreakLabelResolvesToCaseOrDefault),
            LabelKind::Switch if !is_break => Some(ErrorCode::ContinueLabelResolvesToSwitch),
            _ => None,
        };
        if let Some(code) = misdirected {
            self.cx.record_element(name.id, Some(label));
            self.cx.on_error(name.span, code, &[name.name.as_str()]);
            return Ok(());
        }

        if data.function == frame.innermost_function {
            self.referenced_labels.insert(label);
            self.cx.record_element(name.id, Some(label));
        } else {
            self.cx.record_element(name.id, None);
            self.cx.on_error(name.span, ErrorCode::CannotAccessOuterLabel, &[name.name.as_str()]);
        }
        Ok(())
    }

    /// Local variable declaration. Each initializer is resolved before its
    /// name is bound, so a variable cannot reach itself.
    fn resolve_var_decl(&mut self, decl: &VarDecl, frame: Frame, implicitly_initialized: bool) -> ResolveResult<()> {
        let ty = decl
            .type_node
            .as_ref()
            .map(|node| self.cx.resolve_type(node, frame.forbids_type_variables(), ErrorCode::NoSuchType));

        for var in &decl.vars {
            let name = var.name.name.as_str();
            if let Some(value) = &var.value {
                self.resolve_expr(value, frame.reading())?;
            }
            if let Some(scope) = self.cx.scopes.current_mut() {
                scope.remove_declared_not_reached(name);
            }

            let initialized = var.value.is_some() || implicitly_initialized;
            let mut modifiers = Modifiers::empty();
            modifiers.set(Modifiers::FINAL, decl.is_final);
            modifiers.set(Modifiers::INITIALIZED, initialized);
            let mut element = Element::new(name, ElementKind::Variable)
                .with_modifiers(modifiers)
                .with_enclosing(frame.enclosing)
                .with_span(var.name.span);
            if let Some(ty) = &ty {
                element = element.with_type(ty.clone());
            }
            let variable = self.cx.synthesize(element);
            self.cx.record_element(var.id, Some(variable));
            self.cx.record_element(var.name.id, Some(variable));
            self.cx.declare(variable, var.name.span, ErrorCode::DuplicateLocalVariable)?;

            if decl.is_final && !initialized {
                self.cx.on_error(var.name.span, ErrorCode::ConstantsMustBeInitialized, &[name]);
            }
        }
        Ok(())
    }

    /// `for (x in xs)` with `x` declared elsewhere
    fn resolve_loop_variable(&mut self, name: &Identifier) -> ResolveResult<()> {
        let found = self.cx.find_element(&name.name);
        self.cx.record_element(name.id, found);
        match found {
            Some(element) => self.check_assignable(element, name.span, &name.name),
            None => {
                self.cx.mark_reported(name.id);
                self.cx.on_error(name.span, ErrorCode::CannotBeResolved, &[name.name.as_str()]);
                Ok(())
            }
        }
    }

    fn resolve_catch(&mut self, catch: &CatchClause, frame: Frame) -> ResolveResult<()> {
        self.with_scope(ScopeKind::Block, |this| {
            for param in std::iter::once(&catch.exception).chain(catch.stack_trace.as_ref()) {
                let element = this.parameter_element(param, frame.enclosing);
                this.cx.declare(element, param.name.span, ErrorCode::DuplicateParameter)?;
                this.resolve_parameter_parts(param, frame)?;
            }
            this.resolve_block(&catch.body, frame)
        })
    }

    /// Function literal, or a local function when `is_statement`
    pub(super) fn resolve_function(&mut self, function: &FunctionExpr, frame: Frame, is_statement: bool) -> ResolveResult<ElementId> {
        let name = function.name.as_ref().map_or("", |name| name.name.as_str());
        let element = self.cx.synthesize(
            Element::new(name, ElementKind::Method(MethodData::default()))
                .with_enclosing(frame.enclosing)
                .with_span(function.span),
        );
        self.cx.record_element(function.id, Some(element));
        if let Some(name) = &function.name {
            self.cx.record_element(name.id, Some(element));
            if is_statement {
                self.cx.declare(element, name.span, ErrorCode::DuplicateFunctionExpression)?;
            }
        }
        tracing::trace!(function = %element, name, "resolve function");

        let inner = frame.function(element);
        self.with_scope(ScopeKind::Function(element), |this| {
            if let (false, Some(name)) = (is_statement, &function.name) {
                this.cx.declare(element, name.span, ErrorCode::DuplicateFunctionExpression)?;
            }
            this.with_scope(ScopeKind::Block, |this| {
                let mut params = Vec::with_capacity(function.params.len());
                for param in &function.params {
                    if param.this_qualified {
                        this.cx.on_error(param.span, ErrorCode::ParameterInitOutsideConstructor, &[param.name.name.as_str()]);
                        continue;
                    }
                    let param_element = this.parameter_element(param, element);
                    this.cx.declare(param_element, param.name.span, ErrorCode::DuplicateParameter)?;
                    params.push(param_element);
                }
                if let Some(ElementKind::Method(data)) = this.cx.elements.synthesized_mut(element).map(|el| &mut el.kind) {
                    data.params = params;
                }

                for param in &function.params {
                    this.resolve_parameter_parts(param, inner)?;
                }
                if let Some(return_type) = &function.return_type {
                    this.cx.resolve_type(return_type, inner.forbids_type_variables(), ErrorCode::NoSuchType);
                }
                this.resolve_block(&function.body, inner)
            })
        })?;
        Ok(element)
    }
}
