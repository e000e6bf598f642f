//! Convenience constructors for assembling trees by hand
//!
//! Parsers hand the resolver finished trees; tools and tests that need to
//! build fragments directly use `AstBuilder`, which allocates fresh node ids
//! and distinct, monotonically increasing spans.

use crate::ids::{ElementId, NodeId, NodeIdGen};
use crate::nodes::*;
use codespan::Span;

#[derive(Debug, Default)]
pub struct AstBuilder {
    ids: NodeIdGen,
    offset: u32,
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> (NodeId, Span) {
        let id = self.ids.next_id();
        let span = Span::new(self.offset, self.offset + 1);
        self.offset += 2;
        (id, span)
    }

    pub fn ident(&mut self, name: &str) -> Identifier {
        let (id, span) = self.next();
        Identifier {
            id,
            name: name.to_string(),
            span,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------------------------------

    pub fn expr(&mut self, kind: ExprKind) -> Expr {
        let (id, span) = self.next();
        Expr { id, kind, span }
    }

    pub fn ident_expr(&mut self, name: &str) -> Expr {
        self.expr(ExprKind::Ident(name.to_string()))
    }

    pub fn this_expr(&mut self) -> Expr {
        self.expr(ExprKind::This)
    }

    pub fn super_expr(&mut self) -> Expr {
        self.expr(ExprKind::Super)
    }

    pub fn null_lit(&mut self) -> Expr {
        self.expr(ExprKind::Null)
    }

    pub fn int_lit(&mut self, value: i64) -> Expr {
        self.expr(ExprKind::Int(value))
    }

    pub fn double_lit(&mut self, value: f64) -> Expr {
        self.expr(ExprKind::Double(value))
    }

    pub fn bool_lit(&mut self, value: bool) -> Expr {
        self.expr(ExprKind::Bool(value))
    }

    pub fn str_lit(&mut self, value: &str) -> Expr {
        self.expr(ExprKind::Str(value.to_string()))
    }

    pub fn interpolation(&mut self, parts: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Interpolation(parts))
    }

    pub fn property(&mut self, target: Expr, name: &str) -> Expr {
        let name = self.ident(name);
        self.expr(ExprKind::PropertyAccess {
            target: Box::new(target),
            name,
        })
    }

    pub fn invoke(&mut self, target: Expr, name: &str, args: Vec<Expr>) -> Expr {
        let name = self.ident(name);
        self.expr(ExprKind::MethodInvocation {
            target: Box::new(target),
            name,
            args,
        })
    }

    pub fn call(&mut self, name: &str, args: Vec<Expr>) -> Expr {
        let name = self.ident(name);
        self.expr(ExprKind::UnqualifiedInvocation { name, args })
    }

    pub fn call_value(&mut self, target: Expr, args: Vec<Expr>) -> Expr {
        self.expr(ExprKind::FunctionObjectInvocation {
            target: Box::new(target),
            args,
        })
    }

    pub fn new_expr(
        &mut self,
        is_const: bool,
        type_node: TypeNode,
        name: Option<&str>,
        args: Vec<Expr>,
    ) -> Expr {
        let name = name.map(|name| self.ident(name));
        let (id, span) = self.next();
        let constructor = ConstructorRef {
            id,
            type_node,
            name,
            span,
        };
        self.expr(ExprKind::New {
            is_const,
            constructor,
            args,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn assign(&mut self, lhs: Expr, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Assign, lhs, rhs)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn array_lit(&mut self, is_const: bool, type_args: Vec<TypeNode>, elements: Vec<Expr>) -> Expr {
        self.expr(ExprKind::Array {
            is_const,
            type_args,
            elements,
        })
    }

    pub fn map_lit(
        &mut self,
        is_const: bool,
        type_args: Vec<TypeNode>,
        entries: Vec<(Expr, Expr)>,
    ) -> Expr {
        let entries = entries
            .into_iter()
            .map(|(key, value)| MapEntry { key, value })
            .collect();
        self.expr(ExprKind::Map {
            is_const,
            type_args,
            entries,
        })
    }

    pub fn type_test(&mut self, expr: Expr, op: TypeTestOp, type_node: TypeNode) -> Expr {
        self.expr(ExprKind::TypeTest {
            expr: Box::new(expr),
            op,
            type_node,
        })
    }

    pub fn named_arg(&mut self, name: &str, value: Expr) -> Expr {
        let name = self.ident(name);
        self.expr(ExprKind::NamedArgument {
            name,
            value: Box::new(value),
        })
    }

    pub fn function_expr(
        &mut self,
        name: Option<&str>,
        params: Vec<Parameter>,
        body: Block,
    ) -> FunctionExpr {
        let name = name.map(|name| self.ident(name));
        let (id, span) = self.next();
        FunctionExpr {
            id,
            name,
            params,
            return_type: None,
            body,
            span,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------------------------------------

    pub fn type_node(&mut self, name: &str, type_args: Vec<TypeNode>) -> TypeNode {
        let name = self.ident(name);
        let (id, span) = self.next();
        TypeNode {
            id,
            prefix: None,
            name,
            type_args,
            span,
        }
    }

    pub fn prefixed_type(&mut self, prefix: &str, name: &str, type_args: Vec<TypeNode>) -> TypeNode {
        let prefix = self.ident(prefix);
        let mut node = self.type_node(name, type_args);
        node.prefix = Some(prefix);
        node
    }

    pub fn type_param(&mut self, name: &str, element: Option<ElementId>) -> TypeParameter {
        let name = self.ident(name);
        let (id, span) = self.next();
        TypeParameter {
            id,
            name,
            element,
            bound: None,
            span,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------------------------------

    pub fn stmt(&mut self, kind: StmtKind) -> Stmt {
        let (id, span) = self.next();
        Stmt { id, kind, span }
    }

    pub fn block(&mut self, stmts: Vec<Stmt>) -> Block {
        let (id, span) = self.next();
        Block { id, stmts, span }
    }

    pub fn block_stmt(&mut self, block: Block) -> Stmt {
        self.stmt(StmtKind::Block(block))
    }

    pub fn expr_stmt(&mut self, expr: Expr) -> Stmt {
        self.stmt(StmtKind::Expr(expr))
    }

    pub fn var_decl(&mut self, is_final: bool, vars: Vec<(&str, Option<Expr>)>) -> VarDecl {
        let vars = vars
            .into_iter()
            .map(|(name, value)| {
                let name = self.ident(name);
                let (id, span) = self.next();
                VarDeclarator {
                    id,
                    name,
                    value,
                    span,
                }
            })
            .collect();
        VarDecl {
            is_final,
            type_node: None,
            vars,
        }
    }

    pub fn var_stmt(&mut self, name: &str, value: Option<Expr>) -> Stmt {
        let decl = self.var_decl(false, vec![(name, value)]);
        self.stmt(StmtKind::Var(decl))
    }

    pub fn final_var_stmt(&mut self, name: &str, value: Option<Expr>) -> Stmt {
        let decl = self.var_decl(true, vec![(name, value)]);
        self.stmt(StmtKind::Var(decl))
    }

    pub fn return_stmt(&mut self, value: Option<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(value))
    }

    pub fn break_stmt(&mut self, label: Option<&str>) -> Stmt {
        let label = label.map(|label| self.ident(label));
        self.stmt(StmtKind::Break(label))
    }

    pub fn continue_stmt(&mut self, label: Option<&str>) -> Stmt {
        let label = label.map(|label| self.ident(label));
        self.stmt(StmtKind::Continue(label))
    }

    pub fn label(&mut self, name: &str) -> Label {
        let name = self.ident(name);
        let (id, span) = self.next();
        Label { id, name, span }
    }

    pub fn labeled(&mut self, label: &str, body: Stmt) -> Stmt {
        let label = self.label(label);
        self.stmt(StmtKind::Labeled {
            label,
            body: Box::new(body),
        })
    }

    pub fn if_stmt(&mut self, condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        self.stmt(StmtKind::If {
            condition,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn while_stmt(&mut self, condition: Expr, body: Stmt) -> Stmt {
        self.stmt(StmtKind::While {
            condition,
            body: Box::new(body),
        })
    }

    pub fn do_while_stmt(&mut self, body: Stmt, condition: Expr) -> Stmt {
        self.stmt(StmtKind::DoWhile {
            body: Box::new(body),
            condition,
        })
    }

    pub fn for_stmt(
        &mut self,
        init: Option<Stmt>,
        condition: Option<Expr>,
        updates: Vec<Expr>,
        body: Stmt,
    ) -> Stmt {
        self.stmt(StmtKind::For {
            init: init.map(Box::new),
            condition,
            updates,
            body: Box::new(body),
        })
    }

    pub fn for_in_var(&mut self, is_final: bool, name: &str, iterable: Expr, body: Stmt) -> Stmt {
        let decl = self.var_decl(is_final, vec![(name, None)]);
        self.stmt(StmtKind::ForIn {
            target: ForInTarget::Var(decl),
            iterable,
            body: Box::new(body),
        })
    }

    pub fn switch_member(&mut self, labels: &[&str], case: Option<Expr>, stmts: Vec<Stmt>) -> SwitchMember {
        let labels = labels.iter().map(|label| self.label(label)).collect();
        let (id, span) = self.next();
        SwitchMember {
            id,
            labels,
            case,
            stmts,
            span,
        }
    }

    pub fn switch_stmt(&mut self, subject: Expr, members: Vec<SwitchMember>) -> Stmt {
        self.stmt(StmtKind::Switch { subject, members })
    }

    pub fn catch_clause(&mut self, exception: &str, stack_trace: Option<&str>, body: Block) -> CatchClause {
        let exception = self.param(exception, None);
        let stack_trace = stack_trace.map(|name| self.param(name, None));
        let (id, span) = self.next();
        CatchClause {
            id,
            exception,
            stack_trace,
            body,
            span,
        }
    }

    pub fn try_stmt(&mut self, body: Block, catches: Vec<CatchClause>, finally: Option<Block>) -> Stmt {
        self.stmt(StmtKind::Try {
            body,
            catches,
            finally,
        })
    }

    pub fn function_stmt(&mut self, function: FunctionExpr) -> Stmt {
        self.stmt(StmtKind::Function(function))
    }

    // ---------------------------------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------------------------------

    pub fn param(&mut self, name: &str, element: Option<ElementId>) -> Parameter {
        let name = self.ident(name);
        let (id, span) = self.next();
        Parameter {
            id,
            name,
            element,
            type_node: None,
            this_qualified: false,
            kind: ParamKind::Required,
            default_value: None,
            span,
        }
    }

    pub fn this_param(&mut self, name: &str, element: Option<ElementId>) -> Parameter {
        let mut param = self.param(name, element);
        param.this_qualified = true;
        param
    }

    pub fn field_init(&mut self, name: &str, value: Expr) -> Initializer {
        let name = self.ident(name);
        let (id, span) = self.next();
        Initializer {
            id,
            kind: InitializerKind::Field { name, value },
            span,
        }
    }

    fn constructor_call(&mut self, name: Option<&str>, args: Vec<Expr>) -> ConstructorCall {
        let name = name.map(|name| self.ident(name));
        let (id, span) = self.next();
        ConstructorCall {
            id,
            name,
            args,
            span,
        }
    }

    pub fn super_init(&mut self, name: Option<&str>, args: Vec<Expr>) -> Initializer {
        let call = self.constructor_call(name, args);
        let (id, span) = self.next();
        Initializer {
            id,
            kind: InitializerKind::Super(call),
            span,
        }
    }

    pub fn redirect_init(&mut self, name: Option<&str>, args: Vec<Expr>) -> Initializer {
        let call = self.constructor_call(name, args);
        let (id, span) = self.next();
        Initializer {
            id,
            kind: InitializerKind::Redirect(call),
            span,
        }
    }

    pub fn method(
        &mut self,
        element: ElementId,
        name: &str,
        params: Vec<Parameter>,
        body: FunctionBody,
    ) -> MethodDecl {
        self.constructor(element, name, params, vec![], body)
    }

    pub fn constructor(
        &mut self,
        element: ElementId,
        name: &str,
        params: Vec<Parameter>,
        initializers: Vec<Initializer>,
        body: FunctionBody,
    ) -> MethodDecl {
        let name = self.ident(name);
        let (id, span) = self.next();
        MethodDecl {
            id,
            element,
            name,
            params,
            return_type: None,
            initializers,
            body,
            span,
        }
    }

    pub fn body(&mut self, stmts: Vec<Stmt>) -> FunctionBody {
        FunctionBody::Block(self.block(stmts))
    }

    pub fn field(&mut self, element: ElementId, name: &str, value: Option<Expr>) -> FieldDecl {
        let name = self.ident(name);
        let (id, span) = self.next();
        FieldDecl {
            id,
            element,
            name,
            type_node: None,
            value,
            accessors: vec![],
            span,
        }
    }

    pub fn class(&mut self, element: ElementId, name: &str, members: Vec<ClassMember>) -> ClassDecl {
        let name = self.ident(name);
        let (id, span) = self.next();
        ClassDecl {
            id,
            element,
            name,
            is_interface: false,
            type_params: vec![],
            superclass: None,
            interfaces: vec![],
            default_clause: None,
            members,
            span,
        }
    }

    pub fn default_clause(&mut self, name: &str, type_params: Vec<TypeParameter>) -> DefaultClause {
        let name = self.ident(name);
        let (id, span) = self.next();
        DefaultClause {
            id,
            name,
            type_params,
            span,
        }
    }

    pub fn type_alias(
        &mut self,
        element: ElementId,
        name: &str,
        type_params: Vec<TypeParameter>,
        params: Vec<Parameter>,
    ) -> FunctionTypeAlias {
        let name = self.ident(name);
        let (id, span) = self.next();
        FunctionTypeAlias {
            id,
            element,
            name,
            type_params,
            return_type: None,
            params,
            span,
        }
    }

    pub fn part_of(&mut self, library: &str) -> Directive {
        let name = self.ident(library);
        let (id, span) = self.next();
        Directive {
            id,
            kind: DirectiveKind::PartOf(name),
            span,
        }
    }

    pub fn unit(&mut self, library: ElementId, items: Vec<Item>) -> Unit {
        let (id, span) = self.next();
        Unit {
            id,
            file_id: None,
            library,
            directives: vec![],
            items,
            span,
        }
    }
}
