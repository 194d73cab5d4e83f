//! Symbol table builder: walks a parsed file into declaration records.
//!
//! `build` is a pure function of the AST. It captures raw supertype names
//! exactly as written and the byte range of each member signature, never the
//! bodies, so the table stays cheap. Malformed members (parse recovery
//! produced error nodes) are skipped; the builder never fails, it degrades
//! to partial declarations.

use serde::{Deserialize, Serialize};
use spyglass_core::{ContentHash, SourceCode, Span};
use tracing::debug;

use crate::ast::{
    Ast, DeclKind, DeclNode, Expr, Item, Lit, MemberNode, Param, TraitUse, TypeExpr, Visibility,
};
use crate::names::ImportTable;
use crate::types::{ScalarKind, Type};

/// A declared class-like or function symbol with raw supertype references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclKind,
    /// Short name as written.
    pub name: String,
    /// Namespace-qualified name; the identity used across files.
    pub fqn: String,
    pub span: Span,
    pub doc: Option<String>,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Raw `extends` references, unresolved.
    pub extends: Vec<String>,
    /// Raw `implements` references, unresolved.
    pub implements: Vec<String>,
    pub trait_uses: Vec<TraitUse>,
    pub members: Vec<Member>,
    /// Free functions: declared return type, for call-site inference.
    pub return_type: Option<Type>,
}

/// Member kinds with their kind-specific signature data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberKind {
    Method {
        params: Vec<ParamSig>,
        return_type: Option<Type>,
    },
    Property { type_hint: Option<Type> },
    Constant { value_type: Option<Type> },
}

/// A resolved parameter signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSig {
    pub name: String,
    pub ty: Type,
}

/// A declared member of a class-like symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    /// FQN of the declaration that declared this member.
    pub owner: String,
    /// Byte range of the signature, not the body.
    pub signature_span: Span,
}

impl Member {
    /// The declared type: return type for methods, hint for properties,
    /// literal type for constants.
    pub fn declared_type(&self) -> Option<&Type> {
        match &self.kind {
            MemberKind::Method { return_type, .. } => return_type.as_ref(),
            MemberKind::Property { type_hint } => type_hint.as_ref(),
            MemberKind::Constant { value_type } => value_type.as_ref(),
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }
}

/// The symbol table for one file: declarations plus the import table,
/// keyed by the snapshot's content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSymbols {
    pub path: String,
    pub hash: ContentHash,
    pub imports: ImportTable,
    pub declarations: Vec<Declaration>,
}

impl FileSymbols {
    /// Find the declaration whose byte range contains the offset.
    pub fn declaration_at(&self, offset: usize) -> Option<&Declaration> {
        self.declarations
            .iter()
            .filter(|d| d.span.start <= offset && offset < d.span.end)
            .min_by_key(|d| d.span.len())
    }

    /// Find a class-like declaration by FQN.
    pub fn class_like(&self, fqn: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.fqn == fqn && d.kind != DeclKind::Function)
    }

    /// Find a function declaration by FQN.
    pub fn function(&self, fqn: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.fqn == fqn && d.kind == DeclKind::Function)
    }
}

/// Build the symbol table for one file.
pub fn build(source: &SourceCode, ast: &Ast) -> FileSymbols {
    let imports = ImportTable::from_ast(ast);
    let mut declarations = Vec::new();
    for item in &ast.items {
        if let Item::Decl(node) = item {
            declarations.push(build_declaration(node, &imports));
        }
    }
    debug!(
        path = source.path(),
        declarations = declarations.len(),
        "built symbol table"
    );
    FileSymbols {
        path: source.path().to_string(),
        hash: source.hash().clone(),
        imports,
        declarations,
    }
}

fn build_declaration(node: &DeclNode, imports: &ImportTable) -> Declaration {
    let fqn = imports.qualify(&node.name);
    // Error-recovered declarations keep their name and span but expose an
    // empty member list rather than half-parsed members.
    let members = if node.has_errors {
        Vec::new()
    } else {
        node.members
            .iter()
            .filter_map(|m| build_member(m, &fqn, imports))
            .collect()
    };
    let return_type = node
        .function
        .as_ref()
        .and_then(|f| f.return_type.as_ref())
        .map(|t| resolve_type_expr(t, imports));
    Declaration {
        kind: node.kind,
        name: node.name.clone(),
        fqn,
        span: node.span,
        doc: node.doc.clone(),
        is_abstract: node.is_abstract,
        is_final: node.is_final,
        extends: node.extends.clone(),
        implements: node.implements.clone(),
        trait_uses: node.trait_uses.clone(),
        members,
        return_type,
    }
}

fn build_member(node: &MemberNode, owner: &str, imports: &ImportTable) -> Option<Member> {
    match node {
        MemberNode::Method {
            name,
            visibility,
            is_static,
            is_abstract,
            params,
            return_type,
            signature_span,
            ..
        } => Some(Member {
            name: name.clone(),
            kind: MemberKind::Method {
                params: params.iter().map(|p| build_param(p, imports)).collect(),
                return_type: return_type.as_ref().map(|t| resolve_type_expr(t, imports)),
            },
            visibility: *visibility,
            is_static: *is_static,
            is_abstract: *is_abstract,
            owner: owner.to_string(),
            signature_span: *signature_span,
        }),
        MemberNode::Property {
            name,
            visibility,
            is_static,
            type_hint,
            span,
        } => Some(Member {
            name: name.clone(),
            kind: MemberKind::Property {
                type_hint: type_hint.as_ref().map(|t| resolve_type_expr(t, imports)),
            },
            visibility: *visibility,
            is_static: *is_static,
            is_abstract: false,
            owner: owner.to_string(),
            signature_span: *span,
        }),
        MemberNode::Constant {
            name,
            visibility,
            value,
            span,
        } => Some(Member {
            name: name.clone(),
            kind: MemberKind::Constant {
                value_type: value.as_ref().and_then(literal_type),
            },
            visibility: *visibility,
            is_static: true,
            is_abstract: false,
            owner: owner.to_string(),
            signature_span: *span,
        }),
        MemberNode::Error { .. } => None,
    }
}

/// Build a parameter signature, untyped parameters infer to Unknown.
pub fn build_param(param: &Param, imports: &ImportTable) -> ParamSig {
    ParamSig {
        name: param.name.clone(),
        ty: param
            .type_hint
            .as_ref()
            .map(|t| resolve_type_expr(t, imports))
            .unwrap_or(Type::Unknown),
    }
}

/// Resolve a raw type hint into a [`Type`], mapping scalar keywords and
/// resolving class names against the import table.
pub fn resolve_type_expr(expr: &TypeExpr, imports: &ImportTable) -> Type {
    match expr {
        TypeExpr::Name(name) => match name.as_str() {
            "int" => Type::int(),
            "float" => Type::float(),
            "string" => Type::string(),
            "bool" => Type::bool(),
            "null" => Type::null(),
            "array" => Type::array_of(Type::Unknown),
            "void" => Type::Void,
            "mixed" => Type::Mixed,
            "self" | "static" => Type::Named(imports.qualify("self")),
            _ => Type::Named(imports.resolve(name)),
        },
        TypeExpr::Nullable(inner) => Type::nullable(resolve_type_expr(inner, imports)),
        TypeExpr::ArrayOf(inner) => Type::array_of(resolve_type_expr(inner, imports)),
        TypeExpr::Union(members) => {
            Type::union(members.iter().map(|m| resolve_type_expr(m, imports)))
        }
        TypeExpr::Mixed => Type::Mixed,
        TypeExpr::Void => Type::Void,
    }
}

/// The type of a literal constant initializer, if it is a literal.
fn literal_type(expr: &Expr) -> Option<Type> {
    match expr {
        Expr::Literal { value, .. } => Some(match value {
            Lit::Int(_) => Type::int(),
            Lit::Float(_) => Type::float(),
            Lit::Str(_) => Type::string(),
            Lit::Bool(_) => Type::bool(),
            Lit::Null => Type::Scalar(ScalarKind::Null),
        }),
        _ => None,
    }
}
