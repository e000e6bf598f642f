//! Syntax tree node definitions
//!
//! The tree is a closed set of tagged variants. Declarations carry the
//! `ElementId` assigned by the element-building pass; everything else is
//! bound by the resolver through side tables keyed by `NodeId`.

use crate::ids::{ElementId, NodeId};
use codespan::{FileId, Span};

/// A simple name occurrence with its own node id
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

/// One parsed compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub id: NodeId,
    pub file_id: Option<FileId>,
    /// Library element this unit contributes to
    pub library: ElementId,
    pub directives: Vec<Directive>,
    pub items: Vec<Item>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub id: NodeId,
    pub kind: DirectiveKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveKind {
    Library(Identifier),
    PartOf(Identifier),
    Import {
        uri: String,
        prefix: Option<Identifier>,
    },
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Class(ClassDecl),
    Function(MethodDecl),
    Field(FieldDecl),
    TypeAlias(FunctionTypeAlias),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub id: NodeId,
    pub element: ElementId,
    pub name: Identifier,
    pub is_interface: bool,
    pub type_params: Vec<TypeParameter>,
    pub superclass: Option<TypeNode>,
    pub interfaces: Vec<TypeNode>,
    pub default_clause: Option<DefaultClause>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassDecl {
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match member {
            ClassMember::Method(method) => Some(method),
            ClassMember::Field(_) => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|member| match member {
            ClassMember::Field(field) => Some(field),
            ClassMember::Method(_) => None,
        })
    }
}

/// `interface I<T> default D<T>` clause
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultClause {
    pub id: NodeId,
    pub name: Identifier,
    pub type_params: Vec<TypeParameter>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Method(MethodDecl),
    Field(FieldDecl),
}

impl ClassMember {
    pub fn element(&self) -> ElementId {
        match self {
            ClassMember::Method(method) => method.element,
            ClassMember::Field(field) => field.element,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub id: NodeId,
    pub name: Identifier,
    /// Declared type variable; absent on default-class clauses
    pub element: Option<ElementId>,
    pub bound: Option<TypeNode>,
    pub span: Span,
}

/// Methods, constructors, accessors and top-level functions
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub id: NodeId,
    pub element: ElementId,
    pub name: Identifier,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeNode>,
    pub initializers: Vec<Initializer>,
    pub body: FunctionBody,
    pub span: Span,
}

impl MethodDecl {
    /// True when the only initializer delegates to another constructor.
    pub fn is_redirecting(&self) -> bool {
        matches!(
            self.initializers.as_slice(),
            [Initializer {
                kind: InitializerKind::Redirect(_),
                ..
            }]
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Block),
    Native,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Required,
    Optional,
    Named,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: NodeId,
    pub name: Identifier,
    /// Declared parameter element; locals of function expressions have none
    pub element: Option<ElementId>,
    pub type_node: Option<TypeNode>,
    /// `this.x` field shorthand
    pub this_qualified: bool,
    pub kind: ParamKind,
    pub default_value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub id: NodeId,
    pub element: ElementId,
    pub name: Identifier,
    pub type_node: Option<TypeNode>,
    pub value: Option<Expr>,
    /// Getter/setter bodies of a property-style field
    pub accessors: Vec<MethodDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeAlias {
    pub id: NodeId,
    pub element: ElementId,
    pub name: Identifier,
    pub type_params: Vec<TypeParameter>,
    pub return_type: Option<TypeNode>,
    pub params: Vec<Parameter>,
    pub span: Span,
}

/// `prefix.Name<Args>`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub id: NodeId,
    pub prefix: Option<Identifier>,
    pub name: Identifier,
    pub type_args: Vec<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Initializer {
    pub id: NodeId,
    pub kind: InitializerKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InitializerKind {
    /// `x = value`
    Field { name: Identifier, value: Expr },
    /// `super(...)` or `super.name(...)`
    Super(ConstructorCall),
    /// `this(...)` or `this.name(...)`
    Redirect(ConstructorCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorCall {
    pub id: NodeId,
    pub name: Option<Identifier>,
    pub args: Vec<Expr>,
    pub span: Span,
}

impl ConstructorCall {
    pub fn constructor_name(&self) -> &str {
        self.name.as_ref().map_or("", |name| name.name.as_str())
    }
}

// -------------------------------------------------------------------------------------------------
// Statements
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Block),
    Var(VarDecl),
    Expr(Expr),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        updates: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForIn {
        target: ForInTarget,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Try {
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },
    Switch {
        subject: Expr,
        members: Vec<SwitchMember>,
    },
    Break(Option<Identifier>),
    Continue(Option<Identifier>),
    Return(Option<Expr>),
    Throw(Option<Expr>),
    Labeled {
        label: Label,
        body: Box<Stmt>,
    },
    Function(FunctionExpr),
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub is_final: bool,
    pub type_node: Option<TypeNode>,
    pub vars: Vec<VarDeclarator>,
}

impl VarDecl {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.iter().map(|var| var.name.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclarator {
    pub id: NodeId,
    pub name: Identifier,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInTarget {
    Var(VarDecl),
    Ident(Identifier),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub id: NodeId,
    pub exception: Parameter,
    pub stack_trace: Option<Parameter>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchMember {
    pub id: NodeId,
    pub labels: Vec<Label>,
    /// `None` for `default:`
    pub case: Option<Expr>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub id: NodeId,
    pub name: Identifier,
    pub span: Span,
}

// -------------------------------------------------------------------------------------------------
// Expressions
// -------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Ident(String),
    This,
    Super,
    Null,
    Int(i64),
    Double(f64),
    Bool(bool),
    Str(String),
    Interpolation(Vec<Expr>),
    Array {
        is_const: bool,
        type_args: Vec<TypeNode>,
        elements: Vec<Expr>,
    },
    Map {
        is_const: bool,
        type_args: Vec<TypeNode>,
        entries: Vec<MapEntry>,
    },
    PropertyAccess {
        target: Box<Expr>,
        name: Identifier,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    MethodInvocation {
        target: Box<Expr>,
        name: Identifier,
        args: Vec<Expr>,
    },
    UnqualifiedInvocation {
        name: Identifier,
        args: Vec<Expr>,
    },
    FunctionObjectInvocation {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        is_const: bool,
        constructor: ConstructorRef,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    TypeTest {
        expr: Box<Expr>,
        op: TypeTestOp,
        type_node: TypeNode,
    },
    NamedArgument {
        name: Identifier,
        value: Box<Expr>,
    },
    Function(FunctionExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

/// `new Type.name(...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorRef {
    pub id: NodeId,
    pub type_node: TypeNode,
    pub name: Option<Identifier>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub id: NodeId,
    pub name: Option<Identifier>,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeNode>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl BinaryOp {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::AddAssign
                | BinaryOp::SubAssign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    /// `++` and `--` both read and write their operand.
    pub fn is_count(self) -> bool {
        matches!(
            self,
            UnaryOp::PreIncrement
                | UnaryOp::PreDecrement
                | UnaryOp::PostIncrement
                | UnaryOp::PostDecrement
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTestOp {
    Is,
    IsNot,
    As,
}
