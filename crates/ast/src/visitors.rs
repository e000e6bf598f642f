//! Read-only traversal over the syntax tree
//!
//! Every `visit_*` method defaults to the matching `walk_*`, which recurses
//! into children in source order. Implementors override the nodes they care
//! about and call the walker to keep descending.

use crate::nodes::*;

pub trait AstVisitor {
    type Output;

    fn visit_unit(&mut self, unit: &Unit) -> Self::Output {
        self.walk_unit(unit)
    }

    fn visit_item(&mut self, item: &Item) -> Self::Output {
        self.walk_item(item)
    }

    fn visit_class(&mut self, class: &ClassDecl) -> Self::Output {
        self.walk_class(class)
    }

    fn visit_method(&mut self, method: &MethodDecl) -> Self::Output {
        self.walk_method(method)
    }

    fn visit_field(&mut self, field: &FieldDecl) -> Self::Output {
        self.walk_field(field)
    }

    fn visit_type_alias(&mut self, alias: &FunctionTypeAlias) -> Self::Output {
        self.walk_type_alias(alias)
    }

    fn visit_parameter(&mut self, param: &Parameter) -> Self::Output {
        self.walk_parameter(param)
    }

    fn visit_initializer(&mut self, init: &Initializer) -> Self::Output {
        self.walk_initializer(init)
    }

    fn visit_type(&mut self, ty: &TypeNode) -> Self::Output {
        self.walk_type(ty)
    }

    fn visit_block(&mut self, block: &Block) -> Self::Output {
        self.walk_block(block)
    }

    fn visit_stmt(&mut self, stmt: &Stmt) -> Self::Output {
        self.walk_stmt(stmt)
    }

    fn visit_expr(&mut self, expr: &Expr) -> Self::Output {
        self.walk_expr(expr)
    }

    fn visit_function_expr(&mut self, function: &FunctionExpr) -> Self::Output {
        self.walk_function_expr(function)
    }

    // Default walking implementations
    fn walk_unit(&mut self, unit: &Unit) -> Self::Output {
        for item in &unit.items {
            self.visit_item(item);
        }
        self.default_output()
    }

    fn walk_item(&mut self, item: &Item) -> Self::Output {
        match item {
            Item::Class(class) => self.visit_class(class),
            Item::Function(function) => self.visit_method(function),
            Item::Field(field) => self.visit_field(field),
            Item::TypeAlias(alias) => self.visit_type_alias(alias),
        }
    }

    fn walk_class(&mut self, class: &ClassDecl) -> Self::Output {
        for param in &class.type_params {
            if let Some(bound) = &param.bound {
                self.visit_type(bound);
            }
        }
        if let Some(superclass) = &class.superclass {
            self.visit_type(superclass);
        }
        for interface in &class.interfaces {
            self.visit_type(interface);
        }
        for member in &class.members {
            match member {
                ClassMember::Method(method) => {
                    self.visit_method(method);
                }
                ClassMember::Field(field) => {
                    self.visit_field(field);
                }
            }
        }
        self.default_output()
    }

    fn walk_method(&mut self, method: &MethodDecl) -> Self::Output {
        for param in &method.params {
            self.visit_parameter(param);
        }
        if let Some(return_type) = &method.return_type {
            self.visit_type(return_type);
        }
        for init in &method.initializers {
            self.visit_initializer(init);
        }
        match &method.body {
            FunctionBody::Block(block) => self.visit_block(block),
            FunctionBody::Native | FunctionBody::Absent => self.default_output(),
        }
    }

    fn walk_field(&mut self, field: &FieldDecl) -> Self::Output {
        if let Some(ty) = &field.type_node {
            self.visit_type(ty);
        }
        if let Some(value) = &field.value {
            self.visit_expr(value);
        }
        for accessor in &field.accessors {
            self.visit_method(accessor);
        }
        self.default_output()
    }

    fn walk_type_alias(&mut self, alias: &FunctionTypeAlias) -> Self::Output {
        if let Some(return_type) = &alias.return_type {
            self.visit_type(return_type);
        }
        for param in &alias.params {
            self.visit_parameter(param);
        }
        self.default_output()
    }

    fn walk_parameter(&mut self, param: &Parameter) -> Self::Output {
        if let Some(ty) = &param.type_node {
            self.visit_type(ty);
        }
        match &param.default_value {
            Some(value) => self.visit_expr(value),
            None => self.default_output(),
        }
    }

    fn walk_initializer(&mut self, init: &Initializer) -> Self::Output {
        match &init.kind {
            InitializerKind::Field { value, .. } => self.visit_expr(value),
            InitializerKind::Super(call) | InitializerKind::Redirect(call) => {
                for arg in &call.args {
                    self.visit_expr(arg);
                }
                self.default_output()
            }
        }
    }

    fn walk_type(&mut self, ty: &TypeNode) -> Self::Output {
        for arg in &ty.type_args {
            self.visit_type(arg);
        }
        self.default_output()
    }

    fn walk_block(&mut self, block: &Block) -> Self::Output {
        for stmt in &block.stmts {
            self.visit_stmt(stmt);
        }
        self.default_output()
    }

    fn walk_var_decl(&mut self, decl: &VarDecl) -> Self::Output {
        if let Some(ty) = &decl.type_node {
            self.visit_type(ty);
        }
        for var in &decl.vars {
            if let Some(value) = &var.value {
                self.visit_expr(value);
            }
        }
        self.default_output()
    }

    fn walk_stmt(&mut self, stmt: &Stmt) -> Self::Output {
        match &stmt.kind {
            StmtKind::Block(block) => self.visit_block(block),
            StmtKind::Var(decl) => self.walk_var_decl(decl),
            StmtKind::Expr(expr) => self.visit_expr(expr),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(condition);
                self.visit_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.visit_stmt(else_branch);
                }
                self.default_output()
            }
            StmtKind::While { condition, body } | StmtKind::DoWhile { body, condition } => {
                self.visit_expr(condition);
                self.visit_stmt(body)
            }
            StmtKind::For {
                init,
                condition,
                updates,
                body,
            } => {
                if let Some(init) = init {
                    self.visit_stmt(init);
                }
                if let Some(condition) = condition {
                    self.visit_expr(condition);
                }
                for update in updates {
                    self.visit_expr(update);
                }
                self.visit_stmt(body)
            }
            StmtKind::ForIn {
                target,
                iterable,
                body,
            } => {
                if let ForInTarget::Var(decl) = target {
                    self.walk_var_decl(decl);
                }
                self.visit_expr(iterable);
                self.visit_stmt(body)
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.visit_block(body);
                for catch in catches {
                    self.visit_parameter(&catch.exception);
                    if let Some(trace) = &catch.stack_trace {
                        self.visit_parameter(trace);
                    }
                    self.visit_block(&catch.body);
                }
                match finally {
                    Some(finally) => self.visit_block(finally),
                    None => self.default_output(),
                }
            }
            StmtKind::Switch { subject, members } => {
                self.visit_expr(subject);
                for member in members {
                    if let Some(case) = &member.case {
                        self.visit_expr(case);
                    }
                    for stmt in &member.stmts {
                        self.visit_stmt(stmt);
                    }
                }
                self.default_output()
            }
            StmtKind::Return(value) | StmtKind::Throw(value) => match value {
                Some(value) => self.visit_expr(value),
                None => self.default_output(),
            },
            StmtKind::Labeled { body, .. } => self.visit_stmt(body),
            StmtKind::Function(function) => self.visit_function_expr(function),
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => self.default_output(),
        }
    }

    fn walk_expr(&mut self, expr: &Expr) -> Self::Output {
        match &expr.kind {
            ExprKind::Ident(_)
            | ExprKind::This
            | ExprKind::Super
            | ExprKind::Null
            | ExprKind::Int(_)
            | ExprKind::Double(_)
            | ExprKind::Bool(_)
            | ExprKind::Str(_) => self.default_output(),
            ExprKind::Interpolation(parts) => {
                for part in parts {
                    self.visit_expr(part);
                }
                self.default_output()
            }
            ExprKind::Array {
                type_args,
                elements,
                ..
            } => {
                for ty in type_args {
                    self.visit_type(ty);
                }
                for element in elements {
                    self.visit_expr(element);
                }
                self.default_output()
            }
            ExprKind::Map {
                type_args, entries, ..
            } => {
                for ty in type_args {
                    self.visit_type(ty);
                }
                for entry in entries {
                    self.visit_expr(&entry.key);
                    self.visit_expr(&entry.value);
                }
                self.default_output()
            }
            ExprKind::PropertyAccess { target, .. } => self.visit_expr(target),
            ExprKind::Index { target, index } => {
                self.visit_expr(target);
                self.visit_expr(index)
            }
            ExprKind::MethodInvocation { target, args, .. }
            | ExprKind::FunctionObjectInvocation { target, args } => {
                self.visit_expr(target);
                for arg in args {
                    self.visit_expr(arg);
                }
                self.default_output()
            }
            ExprKind::UnqualifiedInvocation { args, .. } => {
                for arg in args {
                    self.visit_expr(arg);
                }
                self.default_output()
            }
            ExprKind::New {
                constructor, args, ..
            } => {
                self.visit_type(&constructor.type_node);
                for arg in args {
                    self.visit_expr(arg);
                }
                self.default_output()
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs)
            }
            ExprKind::Unary { operand, .. } => self.visit_expr(operand),
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.visit_expr(condition);
                self.visit_expr(then_expr);
                self.visit_expr(else_expr)
            }
            ExprKind::TypeTest {
                expr, type_node, ..
            } => {
                self.visit_expr(expr);
                self.visit_type(type_node)
            }
            ExprKind::NamedArgument { value, .. } => self.visit_expr(value),
            ExprKind::Function(function) => self.visit_function_expr(function),
        }
    }

    fn walk_function_expr(&mut self, function: &FunctionExpr) -> Self::Output {
        for param in &function.params {
            self.visit_parameter(param);
        }
        if let Some(return_type) = &function.return_type {
            self.visit_type(return_type);
        }
        self.visit_block(&function.body)
    }

    fn default_output(&self) -> Self::Output;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AstBuilder;

    struct IdentCounter {
        names: Vec<String>,
    }

    impl AstVisitor for IdentCounter {
        type Output = ();

        fn visit_expr(&mut self, expr: &Expr) {
            if let ExprKind::Ident(name) = &expr.kind {
                self.names.push(name.clone());
            }
            self.walk_expr(expr)
        }

        fn default_output(&self) {}
    }

    #[test]
    fn test_walk_reaches_nested_expressions() {
        let mut b = AstBuilder::new();
        let lhs = b.ident_expr("a");
        let rhs = b.ident_expr("b");
        let sum = b.binary(BinaryOp::Add, lhs, rhs);
        let stmt = b.expr_stmt(sum);
        let inner = b.block(vec![stmt]);
        let block_stmt = b.block_stmt(inner);
        let cond = b.bool_lit(true);
        let loop_stmt = b.while_stmt(cond, block_stmt);
        let block = b.block(vec![loop_stmt]);

        let mut counter = IdentCounter { names: vec![] };
        counter.visit_block(&block);
        assert_eq!(counter.names, vec!["a".to_string(), "b".to_string()]);
    }
}
