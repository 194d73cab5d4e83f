//! The inferred type model: a closed tagged variant per type family.
//!
//! [`Type`] equality is structural. Unions are order-independent and
//! de-duplicated through [`Type::union`], which flattens nested unions,
//! sorts members, collapses singletons, and lets [`Type::Unknown`] absorb
//! the whole union: a union with an unknown arm tells the caller nothing,
//! and the engine's contract is to fail soft rather than guess.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar kinds of the source language.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ScalarKind {
    Bool,
    Float,
    Int,
    Null,
    String,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Float => "float",
            ScalarKind::Int => "int",
            ScalarKind::Null => "null",
            ScalarKind::String => "string",
        }
    }
}

/// An inferred or declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
    /// A class-like type by fully-qualified name.
    Named(String),
    Scalar(ScalarKind),
    ArrayOf(Box<Type>),
    Nullable(Box<Type>),
    /// Normalized: flattened, sorted, de-duplicated, never nested, never
    /// a singleton. Construct through [`Type::union`].
    Union(Vec<Type>),
    /// Inference ran out of information. Ordinary value, not an error.
    Unknown,
    Void,
    Mixed,
}

impl Type {
    pub fn named(fqn: impl Into<String>) -> Type {
        Type::Named(fqn.into())
    }

    pub fn int() -> Type {
        Type::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Type {
        Type::Scalar(ScalarKind::Float)
    }

    pub fn string() -> Type {
        Type::Scalar(ScalarKind::String)
    }

    pub fn bool() -> Type {
        Type::Scalar(ScalarKind::Bool)
    }

    pub fn null() -> Type {
        Type::Scalar(ScalarKind::Null)
    }

    pub fn array_of(inner: Type) -> Type {
        Type::ArrayOf(Box::new(inner))
    }

    /// Wrap in a nullable, collapsing `Nullable(Nullable(t))` to `Nullable(t)`.
    pub fn nullable(inner: Type) -> Type {
        match inner {
            t @ Type::Nullable(_) => t,
            Type::Unknown => Type::Unknown,
            t => Type::Nullable(Box::new(t)),
        }
    }

    /// Build a normalized union from the given members.
    ///
    /// - nested unions are flattened
    /// - duplicates removed, members sorted (order-independent equality)
    /// - `Unknown` absorbs: any unknown arm makes the result `Unknown`
    /// - empty input is `Unknown`; a singleton collapses to its member
    pub fn union(members: impl IntoIterator<Item = Type>) -> Type {
        let mut flat = Vec::new();
        for member in members {
            match member {
                Type::Union(inner) => flat.extend(inner),
                Type::Unknown => return Type::Unknown,
                t => flat.push(t),
            }
        }
        flat.sort();
        flat.dedup();
        match flat.pop() {
            None => Type::Unknown,
            Some(only) if flat.is_empty() => only,
            Some(last) => {
                flat.push(last);
                Type::Union(flat)
            }
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Whether the type is int or float.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Type::Scalar(ScalarKind::Int) | Type::Scalar(ScalarKind::Float)
        )
    }

    /// Remove the null arm: `?Foo` becomes `Foo`, `Foo|null` becomes `Foo`.
    ///
    /// Used by null-guard narrowing (`$x !== null`) and the coalesce
    /// operator. Types without a null arm pass through unchanged.
    pub fn strip_null(self) -> Type {
        match self {
            Type::Nullable(inner) => *inner,
            Type::Union(members) => Type::union(
                members
                    .into_iter()
                    .filter(|t| !matches!(t, Type::Scalar(ScalarKind::Null)))
                    .map(Type::strip_null),
            ),
            t => t,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(fqn) => write!(f, "{}", fqn),
            Type::Scalar(kind) => write!(f, "{}", kind.as_str()),
            Type::ArrayOf(inner) => write!(f, "{}[]", inner),
            Type::Nullable(inner) => write!(f, "?{}", inner),
            Type::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            Type::Unknown => write!(f, "<unknown>"),
            Type::Void => write!(f, "void"),
            Type::Mixed => write!(f, "mixed"),
        }
    }
}
