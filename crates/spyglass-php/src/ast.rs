//! Position-annotated parse tree for one PHP file.
//!
//! The parser itself is an upstream collaborator: anything implementing
//! [`Parser`] turns raw text into an [`Ast`] and never fails, degrading to
//! [`Stmt::Error`] / [`Expr::Error`] nodes on malformed input. The analysis
//! core only consumes these trees; it never looks at raw PHP syntax.
//!
//! Every node carries the byte [`Span`] of its source text so queries can be
//! addressed by cursor position.

use serde::{Deserialize, Serialize};
use spyglass_core::Span;

/// Parser collaborator boundary: text in, best-effort tree out, never fails.
pub trait Parser {
    fn parse(&self, text: &str) -> Ast;
}

/// A parsed file: namespace, import table, and top-level items in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    pub namespace: Option<NamespaceDecl>,
    pub uses: Vec<UseStatement>,
    pub items: Vec<Item>,
}

/// A `namespace Foo\Bar;` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub name: String,
    pub span: Span,
}

/// A `use Fqn;` or `use Fqn as Alias;` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseStatement {
    pub fqn: String,
    pub alias: Option<String>,
    pub span: Span,
}

/// Top-level items keep declarations and script statements interleaved in
/// source order, so the top-level frame sees statements as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Decl(DeclNode),
    Stmt(Stmt),
}

/// Kind of a class-like or function declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    Class,
    Interface,
    Trait,
    Enum,
    Function,
}

/// A class-like or function declaration as parsed, supertypes unresolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclNode {
    pub kind: DeclKind,
    /// Short name as written; qualification happens in the symbol builder.
    pub name: String,
    pub span: Span,
    pub doc: Option<String>,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Raw `extends` references (classes: at most one; interfaces: many).
    pub extends: Vec<String>,
    /// Raw `implements` references.
    pub implements: Vec<String>,
    pub trait_uses: Vec<TraitUse>,
    pub members: Vec<MemberNode>,
    /// Function declarations carry their signature and body here.
    pub function: Option<FunctionBody>,
    /// Parse-level recovery inserted error nodes somewhere under this
    /// declaration; the builder degrades instead of failing.
    pub has_errors: bool,
}

/// Signature and body of a free function declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionBody {
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    pub body: Vec<Stmt>,
    pub body_span: Span,
}

/// A `use TraitA, TraitB { ... }` clause inside a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitUse {
    pub traits: Vec<String>,
    pub adaptations: Vec<TraitAdaptation>,
    pub span: Span,
}

/// Explicit trait conflict adaptations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraitAdaptation {
    /// `A::foo insteadof B;` — `trait_name::method` wins over `excluded`.
    InsteadOf {
        trait_name: String,
        method: String,
        excluded: Vec<String>,
    },
    /// `B::foo as protected bar;` — re-expose a trait method under a new
    /// name and/or visibility.
    Alias {
        trait_name: Option<String>,
        method: String,
        alias: Option<String>,
        visibility: Option<Visibility>,
    },
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// A member of a class-like declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberNode {
    Method {
        name: String,
        visibility: Visibility,
        is_static: bool,
        is_abstract: bool,
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
        body: Vec<Stmt>,
        /// Byte range of the signature only; bodies are not part of the
        /// symbol table.
        signature_span: Span,
        body_span: Span,
    },
    Property {
        name: String,
        visibility: Visibility,
        is_static: bool,
        type_hint: Option<TypeExpr>,
        span: Span,
    },
    Constant {
        name: String,
        visibility: Visibility,
        value: Option<Expr>,
        span: Span,
    },
    /// Parse recovery produced an unusable member; skipped by the builder.
    Error { span: Span },
}

/// A parameter in a function, method, or closure signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    /// Name without the `$` sigil.
    pub name: String,
    pub type_hint: Option<TypeExpr>,
    pub by_ref: bool,
    pub span: Span,
}

/// A type hint as written, unresolved against imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// A bare name: scalar keyword (`int`, `string`, ...) or a class name.
    Name(String),
    Nullable(Box<TypeExpr>),
    /// `Foo[]` in docblocks, `array` with a known element type.
    ArrayOf(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    Mixed,
    Void,
}

/// Executable statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr {
        expr: Expr,
        span: Span,
    },
    /// `$target = value;` — target name without the `$` sigil.
    Assign {
        target: String,
        value: Expr,
        span: Span,
    },
    If {
        cond: Expr,
        then_branch: Vec<Stmt>,
        then_span: Span,
        else_branch: Vec<Stmt>,
        else_span: Option<Span>,
        span: Span,
    },
    /// `while` / `for`: the frame walker approximates all loop forms the
    /// same way, with a single body pass.
    Loop {
        body: Vec<Stmt>,
        body_span: Span,
        span: Span,
    },
    /// `foreach ($array as $value_var)`.
    Foreach {
        array: Expr,
        value_var: String,
        body: Vec<Stmt>,
        body_span: Span,
        span: Span,
    },
    Return {
        value: Option<Expr>,
        span: Span,
    },
    /// Parse recovery; ignored by analysis.
    Error { span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Loop { span, .. }
            | Stmt::Foreach { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Error { span } => *span,
        }
    }
}

/// Literal values. The value itself is kept for tooling; inference only
/// looks at the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Lit {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// Binary operators with fixed result-type promotion rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat,
    Eq,
    NotEq,
    Identical,
    NotIdentical,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    Coalesce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// `$name` — name without the sigil.
    Var { name: String, span: Span },
    This { span: Span },
    Literal { value: Lit, span: Span },
    /// `new Foo(...)` — class reference as written.
    New {
        class: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `foo(...)` — free function call by name as written.
    Call {
        function: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `$recv->method(...)`.
    MethodCall {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `$recv->property`.
    PropertyFetch {
        receiver: Box<Expr>,
        property: String,
        span: Span,
    },
    /// `Foo::BAR`.
    ClassConstFetch {
        class: String,
        constant: String,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    /// `$x instanceof Foo`.
    Instanceof {
        expr: Box<Expr>,
        class: String,
        span: Span,
    },
    /// `function (...) use (...) { ... }`.
    Closure {
        params: Vec<Param>,
        captures: Vec<Capture>,
        return_type: Option<TypeExpr>,
        body: Vec<Stmt>,
        body_span: Span,
        span: Span,
    },
    ArrayLit {
        elements: Vec<Expr>,
        span: Span,
    },
    /// Parse recovery; infers to Unknown.
    Error { span: Span },
}

/// A closure capture from the `use (...)` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub name: String,
    pub by_ref: bool,
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Var { span, .. }
            | Expr::This { span }
            | Expr::Literal { span, .. }
            | Expr::New { span, .. }
            | Expr::Call { span, .. }
            | Expr::MethodCall { span, .. }
            | Expr::PropertyFetch { span, .. }
            | Expr::ClassConstFetch { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Instanceof { span, .. }
            | Expr::Closure { span, .. }
            | Expr::ArrayLit { span, .. }
            | Expr::Error { span } => *span,
        }
    }

    /// Child expressions, for generic tree walks.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::New { args, .. } | Expr::Call { args, .. } => args.iter().collect(),
            Expr::MethodCall { receiver, args, .. } => {
                let mut out: Vec<&Expr> = vec![receiver];
                out.extend(args.iter());
                out
            }
            Expr::PropertyFetch { receiver, .. } => vec![receiver],
            Expr::Binary { left, right, .. } => vec![left, right],
            Expr::Unary { operand, .. } => vec![operand],
            Expr::Instanceof { expr, .. } => vec![expr],
            Expr::ArrayLit { elements, .. } => elements.iter().collect(),
            _ => Vec::new(),
        }
    }
}
