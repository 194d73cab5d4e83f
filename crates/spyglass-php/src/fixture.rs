//! AST fixtures: compact builders for constructing parse trees in tests.
//!
//! The parser is an external collaborator, so tests (here and in dependent
//! crates) construct [`Ast`] values directly. These helpers keep that
//! construction readable; spans are passed as `(start, end)` tuples.
//!
//! [`StaticParser`] implements the [`Parser`] collaborator over a fixed
//! text-to-tree map, standing in for the real parser at the engine boundary.

use std::collections::HashMap;

use spyglass_core::{SourceCode, Span};

use crate::ast::{
    Ast, Capture, DeclKind, DeclNode, Expr, FunctionBody, Item, Lit, MemberNode, NamespaceDecl,
    Param, Parser, Stmt, TraitUse, TypeExpr, UseStatement, Visibility,
};

fn span((start, end): (usize, usize)) -> Span {
    Span::new(start, end)
}

/// Build a fixture file: a source snapshot plus its parse tree.
///
/// The snapshot text is synthetic (derived from the tree so distinct trees
/// hash differently) and long enough to cover all fixture spans; tests that
/// need meaningful text construct their own [`SourceCode`].
pub fn file(
    path: &str,
    namespace: Option<&str>,
    uses: Vec<(&str, Option<&str>)>,
    items: Vec<Item>,
) -> (SourceCode, Ast) {
    let ast = Ast {
        namespace: namespace.map(|name| NamespaceDecl {
            name: name.to_string(),
            span: Span::new(6, 16 + name.len()),
        }),
        uses: uses
            .into_iter()
            .enumerate()
            .map(|(i, (fqn, alias))| UseStatement {
                fqn: fqn.to_string(),
                alias: alias.map(String::from),
                span: Span::new(100 + i * 40, 100 + i * 40 + 30),
            })
            .collect(),
        items,
    };
    let mut text = format!("<?php /* {:?} */", ast);
    if text.len() < 8192 {
        text.push_str(&" ".repeat(8192 - text.len()));
    }
    (SourceCode::from_string_and_path(text, path), ast)
}

/// A [`Parser`] over a fixed map from exact source text to parse tree.
#[derive(Debug, Default)]
pub struct StaticParser {
    trees: HashMap<String, Ast>,
}

impl StaticParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: impl Into<String>, ast: Ast) -> Self {
        self.trees.insert(text.into(), ast);
        self
    }
}

impl Parser for StaticParser {
    /// Unknown text parses to an empty tree: the parser collaborator never
    /// fails, and the analysis degrades from there.
    fn parse(&self, text: &str) -> Ast {
        self.trees.get(text).cloned().unwrap_or_default()
    }
}

/// Declaration builders.
pub mod decl {
    use super::*;

    pub struct DeclBuilder {
        node: DeclNode,
    }

    fn base(kind: DeclKind, name: &str, s: (usize, usize)) -> DeclBuilder {
        DeclBuilder {
            node: DeclNode {
                kind,
                name: name.to_string(),
                span: span(s),
                doc: None,
                is_abstract: false,
                is_final: false,
                extends: Vec::new(),
                implements: Vec::new(),
                trait_uses: Vec::new(),
                members: Vec::new(),
                function: None,
                has_errors: false,
            },
        }
    }

    pub fn class(name: &str, s: (usize, usize)) -> DeclBuilder {
        base(DeclKind::Class, name, s)
    }

    pub fn interface(name: &str, s: (usize, usize)) -> DeclBuilder {
        base(DeclKind::Interface, name, s)
    }

    pub fn trait_(name: &str, s: (usize, usize)) -> DeclBuilder {
        base(DeclKind::Trait, name, s)
    }

    pub fn enum_(name: &str, s: (usize, usize)) -> DeclBuilder {
        base(DeclKind::Enum, name, s)
    }

    /// A free function with its body.
    pub fn function(
        name: &str,
        s: (usize, usize),
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
        body: Vec<Stmt>,
        body_span: (usize, usize),
    ) -> DeclNode {
        let mut builder = base(DeclKind::Function, name, s);
        builder.node.function = Some(FunctionBody {
            params,
            return_type,
            body,
            body_span: span(body_span),
        });
        builder.node
    }

    impl DeclBuilder {
        pub fn extends(mut self, name: &str) -> Self {
            self.node.extends.push(name.to_string());
            self
        }

        pub fn implements(mut self, name: &str) -> Self {
            self.node.implements.push(name.to_string());
            self
        }

        pub fn uses_trait(mut self, trait_use: TraitUse) -> Self {
            self.node.trait_uses.push(trait_use);
            self
        }

        pub fn member(mut self, member: MemberNode) -> Self {
            self.node.members.push(member);
            self
        }

        pub fn doc(mut self, doc: &str) -> Self {
            self.node.doc = Some(doc.to_string());
            self
        }

        pub fn abstract_(mut self) -> Self {
            self.node.is_abstract = true;
            self
        }

        pub fn final_(mut self) -> Self {
            self.node.is_final = true;
            self
        }

        pub fn with_errors(mut self) -> Self {
            self.node.has_errors = true;
            self
        }

        pub fn build(self) -> DeclNode {
            self.node
        }
    }

    /// A plain `use TraitA, TraitB;` clause without adaptations.
    pub fn use_traits(traits: Vec<&str>, s: (usize, usize)) -> TraitUse {
        TraitUse {
            traits: traits.into_iter().map(String::from).collect(),
            adaptations: Vec::new(),
            span: span(s),
        }
    }
}

/// Member builders.
pub mod member {
    use super::*;

    /// A concrete public-ish method with an empty body.
    pub fn method(name: &str, visibility: Visibility, s: (usize, usize)) -> MemberNode {
        method_full(name, visibility, Vec::new(), None, Vec::new(), s, s)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn method_full(
        name: &str,
        visibility: Visibility,
        params: Vec<Param>,
        return_type: Option<TypeExpr>,
        body: Vec<Stmt>,
        signature_span: (usize, usize),
        body_span: (usize, usize),
    ) -> MemberNode {
        MemberNode::Method {
            name: name.to_string(),
            visibility,
            is_static: false,
            is_abstract: false,
            params,
            return_type,
            body,
            signature_span: span(signature_span),
            body_span: span(body_span),
        }
    }

    pub fn abstract_method(
        name: &str,
        visibility: Visibility,
        return_type: Option<TypeExpr>,
        s: (usize, usize),
    ) -> MemberNode {
        MemberNode::Method {
            name: name.to_string(),
            visibility,
            is_static: false,
            is_abstract: true,
            params: Vec::new(),
            return_type,
            body: Vec::new(),
            signature_span: span(s),
            body_span: span((s.1, s.1)),
        }
    }

    pub fn property(
        name: &str,
        visibility: Visibility,
        type_hint: Option<TypeExpr>,
        s: (usize, usize),
    ) -> MemberNode {
        MemberNode::Property {
            name: name.to_string(),
            visibility,
            is_static: false,
            type_hint,
            span: span(s),
        }
    }

    pub fn constant(name: &str, value: Option<Expr>, s: (usize, usize)) -> MemberNode {
        MemberNode::Constant {
            name: name.to_string(),
            visibility: Visibility::Public,
            value,
            span: span(s),
        }
    }

    pub fn param(name: &str, type_hint: Option<TypeExpr>, s: (usize, usize)) -> Param {
        Param {
            name: name.to_string(),
            type_hint,
            by_ref: false,
            span: span(s),
        }
    }
}

/// Expression builders.
pub mod expr {
    use super::*;

    pub fn var(name: &str, s: (usize, usize)) -> Expr {
        Expr::Var {
            name: name.to_string(),
            span: span(s),
        }
    }

    pub fn this(s: (usize, usize)) -> Expr {
        Expr::This { span: span(s) }
    }

    pub fn int(value: i64, s: (usize, usize)) -> Expr {
        Expr::Literal {
            value: Lit::Int(value),
            span: span(s),
        }
    }

    pub fn float(value: f64, s: (usize, usize)) -> Expr {
        Expr::Literal {
            value: Lit::Float(value),
            span: span(s),
        }
    }

    pub fn str_(value: &str, s: (usize, usize)) -> Expr {
        Expr::Literal {
            value: Lit::Str(value.to_string()),
            span: span(s),
        }
    }

    pub fn bool_(value: bool, s: (usize, usize)) -> Expr {
        Expr::Literal {
            value: Lit::Bool(value),
            span: span(s),
        }
    }

    pub fn null(s: (usize, usize)) -> Expr {
        Expr::Literal {
            value: Lit::Null,
            span: span(s),
        }
    }

    pub fn new_(class: &str, s: (usize, usize)) -> Expr {
        Expr::New {
            class: class.to_string(),
            args: Vec::new(),
            span: span(s),
        }
    }

    pub fn call(function: &str, s: (usize, usize)) -> Expr {
        Expr::Call {
            function: function.to_string(),
            args: Vec::new(),
            span: span(s),
        }
    }

    pub fn method_call(receiver: Expr, method: &str, s: (usize, usize)) -> Expr {
        Expr::MethodCall {
            receiver: Box::new(receiver),
            method: method.to_string(),
            args: Vec::new(),
            span: span(s),
        }
    }

    pub fn prop(receiver: Expr, property: &str, s: (usize, usize)) -> Expr {
        Expr::PropertyFetch {
            receiver: Box::new(receiver),
            property: property.to_string(),
            span: span(s),
        }
    }

    pub fn class_const(class: &str, constant: &str, s: (usize, usize)) -> Expr {
        Expr::ClassConstFetch {
            class: class.to_string(),
            constant: constant.to_string(),
            span: span(s),
        }
    }

    pub fn binary(op: crate::ast::BinaryOp, left: Expr, right: Expr, s: (usize, usize)) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span: span(s),
        }
    }

    pub fn unary(op: crate::ast::UnaryOp, operand: Expr, s: (usize, usize)) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
            span: span(s),
        }
    }

    pub fn instanceof_(expr: Expr, class: &str, s: (usize, usize)) -> Expr {
        Expr::Instanceof {
            expr: Box::new(expr),
            class: class.to_string(),
            span: span(s),
        }
    }

    pub fn array(elements: Vec<Expr>, s: (usize, usize)) -> Expr {
        Expr::ArrayLit {
            elements,
            span: span(s),
        }
    }

    pub fn closure(
        params: Vec<Param>,
        captures: Vec<(&str, bool)>,
        body: Vec<Stmt>,
        body_span: (usize, usize),
        s: (usize, usize),
    ) -> Expr {
        Expr::Closure {
            params,
            captures: captures
                .into_iter()
                .map(|(name, by_ref)| Capture {
                    name: name.to_string(),
                    by_ref,
                })
                .collect(),
            return_type: None,
            body,
            body_span: span(body_span),
            span: span(s),
        }
    }
}

/// Statement builders.
pub mod stmt {
    use super::*;

    pub fn assign(target: &str, value: Expr, s: (usize, usize)) -> Stmt {
        Stmt::Assign {
            target: target.to_string(),
            value,
            span: span(s),
        }
    }

    pub fn expr(e: Expr, s: (usize, usize)) -> Stmt {
        Stmt::Expr {
            expr: e,
            span: span(s),
        }
    }

    pub fn if_(cond: Expr, then_branch: Vec<Stmt>, then_span: (usize, usize), s: (usize, usize)) -> Stmt {
        Stmt::If {
            cond,
            then_branch,
            then_span: span(then_span),
            else_branch: Vec::new(),
            else_span: None,
            span: span(s),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn if_else(
        cond: Expr,
        then_branch: Vec<Stmt>,
        then_span: (usize, usize),
        else_branch: Vec<Stmt>,
        else_span: (usize, usize),
        s: (usize, usize),
    ) -> Stmt {
        Stmt::If {
            cond,
            then_branch,
            then_span: span(then_span),
            else_branch,
            else_span: Some(span(else_span)),
            span: span(s),
        }
    }

    pub fn loop_(body: Vec<Stmt>, body_span: (usize, usize), s: (usize, usize)) -> Stmt {
        Stmt::Loop {
            body,
            body_span: span(body_span),
            span: span(s),
        }
    }

    pub fn foreach(
        array: Expr,
        value_var: &str,
        body: Vec<Stmt>,
        body_span: (usize, usize),
        s: (usize, usize),
    ) -> Stmt {
        Stmt::Foreach {
            array,
            value_var: value_var.to_string(),
            body,
            body_span: span(body_span),
            span: span(s),
        }
    }

    pub fn ret(value: Option<Expr>, s: (usize, usize)) -> Stmt {
        Stmt::Return {
            value,
            span: span(s),
        }
    }
}
