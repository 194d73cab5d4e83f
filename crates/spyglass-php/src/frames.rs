//! Flow-sensitive type resolution: the type of the expression at an offset.
//!
//! The resolver walks the statement list of the body enclosing the query
//! offset, threading a [`Frame`] of variable bindings. Entering a nested
//! body (a method, a function, a closure) re-seeds the frame: methods bind
//! `$this` and their parameters, closures bind parameters plus the captures
//! evaluated in the enclosing frame at the closure's position.
//!
//! Analysis is a single forward pass. Conditionals narrow branch-locally
//! and merge assigned variables back as a union at the join point; loops
//! get one widening pass over the body. Inference never fails: anything it
//! cannot determine is [`Type::Unknown`], and unknown propagates through
//! operators and member access rather than turning into a guess.

use std::collections::BTreeMap;

use spyglass_core::ByteOffset;
use tracing::debug;

use crate::ast::{Ast, BinaryOp, Capture, Expr, Item, Lit, Param, Stmt, UnaryOp};
use crate::index::SymbolIndex;
use crate::names::ImportTable;
use crate::reflect::Reflector;
use crate::symbols;
use crate::types::Type;

// ============================================================================
// Frames
// ============================================================================

/// Variable bindings visible at one point in one body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    vars: BTreeMap<String, Type>,
    this: Option<Type>,
}

impl Frame {
    /// The binding for a variable; unbound variables are unknown.
    pub fn get(&self, name: &str) -> Type {
        self.vars.get(name).cloned().unwrap_or(Type::Unknown)
    }

    pub fn set(&mut self, name: impl Into<String>, ty: Type) {
        self.vars.insert(name.into(), ty);
    }

    fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolves the type at a byte offset in a parsed file.
///
/// Cross-file questions (member types, function return types) go through
/// the symbol index and the reflection resolver; everything local comes
/// from the forward walk.
#[derive(Debug)]
pub struct TypeResolver<'a> {
    index: &'a SymbolIndex,
}

impl<'a> TypeResolver<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        TypeResolver { index }
    }

    /// The type of the innermost expression whose span contains `offset`.
    ///
    /// Offsets outside any expression resolve to [`Type::Unknown`].
    pub fn type_at(&self, ast: &Ast, offset: ByteOffset) -> Type {
        let query = Query {
            index: self.index,
            imports: ImportTable::from_ast(ast),
            offset,
        };
        let ty = query.run(ast);
        debug!(%offset, %ty, "resolved type at offset");
        ty
    }
}

struct Query<'a> {
    index: &'a SymbolIndex,
    imports: ImportTable,
    offset: ByteOffset,
}

impl Query<'_> {
    fn run(&self, ast: &Ast) -> Type {
        let mut frame = Frame::default();
        for item in &ast.items {
            match item {
                Item::Decl(node) if node.span.contains_offset(self.offset) => {
                    return self.decl_at(node).unwrap_or(Type::Unknown);
                }
                Item::Decl(_) => {}
                Item::Stmt(stmt) if stmt.span().contains_offset(self.offset) => {
                    return self.stmt_at(&frame, stmt).unwrap_or(Type::Unknown);
                }
                // Statements before the offset contribute their bindings.
                Item::Stmt(stmt) => self.apply_stmt(&mut frame, stmt),
            }
        }
        Type::Unknown
    }

    /// Enter a declaration whose span contains the offset. Declaration
    /// bodies do not see top-level bindings.
    fn decl_at(&self, node: &crate::ast::DeclNode) -> Option<Type> {
        if let Some(function) = &node.function {
            if function.body_span.contains_offset(self.offset) {
                let mut frame = Frame::default();
                self.bind_params(&mut frame, &function.params);
                return self.walk_body(frame, &function.body);
            }
            return None;
        }
        let owner = self.imports.qualify(&node.name);
        for member in &node.members {
            if let crate::ast::MemberNode::Method {
                params,
                body,
                body_span,
                ..
            } = member
            {
                if body_span.contains_offset(self.offset) {
                    let mut frame = Frame {
                        vars: BTreeMap::new(),
                        this: Some(Type::named(owner.clone())),
                    };
                    self.bind_params(&mut frame, params);
                    return self.walk_body(frame, body);
                }
            }
        }
        None
    }

    fn bind_params(&self, frame: &mut Frame, params: &[Param]) {
        for param in params {
            let sig = symbols::build_param(param, &self.imports);
            frame.set(sig.name, sig.ty);
        }
    }

    fn walk_body(&self, mut frame: Frame, body: &[Stmt]) -> Option<Type> {
        for stmt in body {
            if stmt.span().contains_offset(self.offset) {
                return self.stmt_at(&frame, stmt);
            }
            self.apply_stmt(&mut frame, stmt);
        }
        None
    }

    // ------------------------------------------------------------------------
    // Descending into the statement containing the offset
    // ------------------------------------------------------------------------

    fn stmt_at(&self, frame: &Frame, stmt: &Stmt) -> Option<Type> {
        match stmt {
            Stmt::Expr { expr, .. } => self.expr_at(frame, expr),
            // The target binding updates only after the statement; inside
            // the right-hand side the previous binding is still visible.
            Stmt::Assign { value, .. } => self.expr_at(frame, value),
            Stmt::Return { value, .. } => value.as_ref().and_then(|v| self.expr_at(frame, v)),
            Stmt::If {
                cond,
                then_branch,
                then_span,
                else_branch,
                else_span,
                ..
            } => {
                if cond.span().contains_offset(self.offset) {
                    return self.expr_at(frame, cond);
                }
                if then_span.contains_offset(self.offset) {
                    let mut branch = frame.clone();
                    self.narrow(&mut branch, cond);
                    return self.walk_body(branch, then_branch);
                }
                if else_span.is_some_and(|s| s.contains_offset(self.offset)) {
                    return self.walk_body(frame.clone(), else_branch);
                }
                None
            }
            // Inside a loop body the frame is the first-iteration view.
            Stmt::Loop {
                body, body_span, ..
            } => {
                if body_span.contains_offset(self.offset) {
                    self.walk_body(frame.clone(), body)
                } else {
                    None
                }
            }
            Stmt::Foreach {
                array,
                value_var,
                body,
                body_span,
                ..
            } => {
                if array.span().contains_offset(self.offset) {
                    return self.expr_at(frame, array);
                }
                if body_span.contains_offset(self.offset) {
                    let mut branch = frame.clone();
                    branch.set(value_var.clone(), self.element_type(frame, array));
                    return self.walk_body(branch, body);
                }
                None
            }
            Stmt::Error { .. } => None,
        }
    }

    /// The innermost expression containing the offset, inferred in `frame`.
    fn expr_at(&self, frame: &Frame, expr: &Expr) -> Option<Type> {
        if !expr.span().contains_offset(self.offset) {
            return None;
        }
        if let Expr::Closure {
            params,
            captures,
            body,
            body_span,
            ..
        } = expr
        {
            if body_span.contains_offset(self.offset) {
                let inner = self.closure_frame(frame, params, captures);
                return Some(self.walk_body(inner, body).unwrap_or(Type::Unknown));
            }
        }
        for child in expr.children() {
            if child.span().contains_offset(self.offset) {
                return self.expr_at(frame, child);
            }
        }
        Some(self.infer(frame, expr))
    }

    /// Captures are evaluated in the enclosing frame at the closure's
    /// position, not at the call site. `$this` carries over.
    fn closure_frame(&self, enclosing: &Frame, params: &[Param], captures: &[Capture]) -> Frame {
        let mut frame = Frame {
            vars: BTreeMap::new(),
            this: enclosing.this.clone(),
        };
        for capture in captures {
            frame.set(capture.name.clone(), enclosing.get(&capture.name));
        }
        self.bind_params(&mut frame, params);
        frame
    }

    // ------------------------------------------------------------------------
    // Applying completed statements
    // ------------------------------------------------------------------------

    fn apply_stmt(&self, frame: &mut Frame, stmt: &Stmt) {
        match stmt {
            Stmt::Assign { target, value, .. } => {
                let ty = self.infer(frame, value);
                frame.set(target.clone(), ty);
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                let mut then_frame = frame.clone();
                self.narrow(&mut then_frame, cond);
                for s in then_branch {
                    self.apply_stmt(&mut then_frame, s);
                }
                let mut else_frame = frame.clone();
                for s in else_branch {
                    self.apply_stmt(&mut else_frame, s);
                }

                let then_assigned = assigned_vars(then_branch);
                let else_assigned = assigned_vars(else_branch);
                let mut all = then_assigned.clone();
                all.extend(else_assigned.iter().cloned());
                all.sort();
                all.dedup();

                // Per path: the branch's final binding where it assigned,
                // otherwise the pre-branch binding. Narrowing that was not
                // followed by an assignment reverts at the join.
                for name in all {
                    let then_final = if then_assigned.contains(&name) {
                        then_frame.get(&name)
                    } else {
                        frame.get(&name)
                    };
                    let else_final = if else_assigned.contains(&name) {
                        else_frame.get(&name)
                    } else {
                        frame.get(&name)
                    };
                    frame.set(name, Type::union([then_final, else_final]));
                }
            }
            // Single widening pass: after the loop, a variable assigned in
            // the body holds the union of its pre-loop and post-body types.
            Stmt::Loop { body, .. } => {
                let mut body_frame = frame.clone();
                for s in body {
                    self.apply_stmt(&mut body_frame, s);
                }
                for name in assigned_vars(body) {
                    let widened = Type::union([frame.get(&name), body_frame.get(&name)]);
                    frame.set(name, widened);
                }
            }
            Stmt::Foreach {
                array,
                value_var,
                body,
                ..
            } => {
                let mut body_frame = frame.clone();
                body_frame.set(value_var.clone(), self.element_type(frame, array));
                for s in body {
                    self.apply_stmt(&mut body_frame, s);
                }
                let mut assigned = assigned_vars(body);
                assigned.push(value_var.clone());
                assigned.sort();
                assigned.dedup();
                for name in assigned {
                    let pre = if frame.has(&name) && name != *value_var {
                        frame.get(&name)
                    } else if name == *value_var {
                        // The iteration variable survives the loop with the
                        // element type (or its last body assignment).
                        body_frame.get(&name)
                    } else {
                        Type::Unknown
                    };
                    let widened = Type::union([pre, body_frame.get(&name)]);
                    frame.set(name, widened);
                }
            }
            Stmt::Expr { .. } | Stmt::Return { .. } | Stmt::Error { .. } => {}
        }
    }

    // ------------------------------------------------------------------------
    // Narrowing
    // ------------------------------------------------------------------------

    /// Narrow bindings for the then-branch of a conditional. Only positive
    /// guards narrow; the effect is branch-local.
    fn narrow(&self, frame: &mut Frame, cond: &Expr) {
        match cond {
            Expr::Instanceof { expr, class, .. } => {
                if let Expr::Var { name, .. } = expr.as_ref() {
                    frame.set(name.clone(), Type::named(self.imports.resolve(class)));
                }
            }
            Expr::Binary {
                op: BinaryOp::NotIdentical,
                left,
                right,
                ..
            } => {
                if let Some(name) = null_guarded_var(left, right) {
                    let narrowed = frame.get(name).strip_null();
                    frame.set(name.to_string(), narrowed);
                }
            }
            Expr::Binary {
                op: BinaryOp::And,
                left,
                right,
                ..
            } => {
                self.narrow(frame, left);
                self.narrow(frame, right);
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Inference
    // ------------------------------------------------------------------------

    fn infer(&self, frame: &Frame, expr: &Expr) -> Type {
        match expr {
            Expr::Var { name, .. } => frame.get(name),
            Expr::This { .. } => frame.this.clone().unwrap_or(Type::Unknown),
            Expr::Literal { value, .. } => literal_type(value),
            Expr::New { class, .. } => Type::named(self.imports.resolve(class)),
            Expr::Call { function, .. } => {
                let fqn = self.imports.resolve(function);
                self.index
                    .function(&fqn)
                    .and_then(|(_, decl)| decl.return_type.clone())
                    .unwrap_or(Type::Unknown)
            }
            Expr::MethodCall {
                receiver, method, ..
            } => {
                let recv = self.infer(frame, receiver);
                self.member_type(&recv, method, MemberSlot::Method)
            }
            Expr::PropertyFetch {
                receiver, property, ..
            } => {
                let recv = self.infer(frame, receiver);
                self.member_type(&recv, property, MemberSlot::Property)
            }
            Expr::ClassConstFetch {
                class, constant, ..
            } => {
                let recv = self.class_ref_type(frame, class);
                self.member_type(&recv, constant, MemberSlot::Constant)
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                let l = self.infer(frame, left);
                let r = self.infer(frame, right);
                binary_type(*op, l, r)
            }
            Expr::Unary { op, operand, .. } => {
                let t = self.infer(frame, operand);
                match op {
                    _ if t.is_unknown() => Type::Unknown,
                    UnaryOp::Not => Type::bool(),
                    UnaryOp::Neg if t.is_numeric() => t,
                    UnaryOp::Neg => Type::Unknown,
                }
            }
            Expr::Instanceof { .. } => Type::bool(),
            Expr::Closure { .. } => Type::named("Closure"),
            Expr::ArrayLit { elements, .. } => {
                Type::array_of(Type::union(elements.iter().map(|e| self.infer(frame, e))))
            }
            Expr::Error { .. } => Type::Unknown,
        }
    }

    /// A class reference in `Foo::BAR` position: `self`/`static` mean the
    /// enclosing class, everything else resolves through imports.
    fn class_ref_type(&self, frame: &Frame, class: &str) -> Type {
        match class {
            "self" | "static" => frame.this.clone().unwrap_or(Type::Unknown),
            _ => Type::named(self.imports.resolve(class)),
        }
    }

    /// Look up a member's declared type on the receiver. Non-class
    /// receivers (including un-narrowed nullables) fail soft to unknown.
    fn member_type(&self, receiver: &Type, name: &str, slot: MemberSlot) -> Type {
        let Type::Named(fqn) = receiver else {
            return Type::Unknown;
        };
        let Ok(resolved) = Reflector::new(self.index).reflect(fqn) else {
            return Type::Unknown;
        };
        let member = match slot {
            MemberSlot::Method => resolved.method(name),
            MemberSlot::Property => resolved.property(name),
            MemberSlot::Constant => resolved.constant(name),
        };
        member
            .and_then(|m| m.member.declared_type().cloned())
            .map(|t| self_to_receiver(t, fqn))
            .unwrap_or(Type::Unknown)
    }

    fn element_type(&self, frame: &Frame, array: &Expr) -> Type {
        match self.infer(frame, array) {
            Type::ArrayOf(inner) => *inner,
            _ => Type::Unknown,
        }
    }
}

#[derive(Clone, Copy)]
enum MemberSlot {
    Method,
    Property,
    Constant,
}

/// Replace `self`/`static` in a declared type with the receiver's class.
/// The symbol builder qualifies these into the declaring namespace, so the
/// marker is the `self` tail segment.
fn self_to_receiver(ty: Type, receiver: &str) -> Type {
    match ty {
        Type::Named(name) if name == "self" || name.ends_with("\\self") => Type::named(receiver),
        Type::Nullable(inner) => Type::nullable(self_to_receiver(*inner, receiver)),
        Type::ArrayOf(inner) => Type::array_of(self_to_receiver(*inner, receiver)),
        Type::Union(members) => Type::union(
            members
                .into_iter()
                .map(|member| self_to_receiver(member, receiver)),
        ),
        t => t,
    }
}

fn literal_type(value: &Lit) -> Type {
    match value {
        Lit::Int(_) => Type::int(),
        Lit::Float(_) => Type::float(),
        Lit::Str(_) => Type::string(),
        Lit::Bool(_) => Type::bool(),
        Lit::Null => Type::null(),
    }
}

/// Result-type promotion for binary operators. An unknown operand makes
/// the whole expression unknown.
fn binary_type(op: BinaryOp, left: Type, right: Type) -> Type {
    if left.is_unknown() || right.is_unknown() {
        return Type::Unknown;
    }
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
            if left == Type::float() || right == Type::float() {
                Type::float()
            } else if left == Type::int() && right == Type::int() {
                Type::int()
            } else {
                Type::Unknown
            }
        }
        BinaryOp::Concat => Type::string(),
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Identical
        | BinaryOp::NotIdentical
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::LtEq
        | BinaryOp::GtEq
        | BinaryOp::And
        | BinaryOp::Or => Type::bool(),
        BinaryOp::Coalesce => Type::union([left.strip_null(), right]),
    }
}

/// `$x !== null` in either operand order: the guarded variable name.
fn null_guarded_var<'e>(left: &'e Expr, right: &'e Expr) -> Option<&'e str> {
    match (left, right) {
        (Expr::Var { name, .. }, Expr::Literal { value: Lit::Null, .. })
        | (Expr::Literal { value: Lit::Null, .. }, Expr::Var { name, .. }) => Some(name),
        _ => None,
    }
}

/// Variables assigned anywhere in the statement list, closures excluded
/// (they have their own scope).
fn assigned_vars(stmts: &[Stmt]) -> Vec<String> {
    let mut out = Vec::new();
    collect_assigned(stmts, &mut out);
    out.sort();
    out.dedup();
    out
}

fn collect_assigned(stmts: &[Stmt], out: &mut Vec<String>) {
    for stmt in stmts {
        match stmt {
            Stmt::Assign { target, .. } => out.push(target.clone()),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => {
                collect_assigned(then_branch, out);
                collect_assigned(else_branch, out);
            }
            Stmt::Loop { body, .. } => collect_assigned(body, out),
            Stmt::Foreach {
                value_var, body, ..
            } => {
                out.push(value_var.clone());
                collect_assigned(body, out);
            }
            Stmt::Expr { .. } | Stmt::Return { .. } | Stmt::Error { .. } => {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
