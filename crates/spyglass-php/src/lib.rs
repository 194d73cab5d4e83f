//! PHP static analysis: symbol tables, inheritance-aware reflection,
//! flow-sensitive type resolution, and import planning.
//!
//! The crate consumes position-annotated parse trees (the parser is a
//! collaborator behind the [`Parser`] trait) and answers offset-addressed
//! queries against them:
//!
//! - [`symbols::build`] turns one file's tree into a [`FileSymbols`] table
//! - [`Reflector`] linearizes a class-like's members across `extends`,
//!   `implements`, and trait uses
//! - [`TypeResolver`] reports the type of the expression at a byte offset
//! - [`ImportPlanner`] plans `use` statement insertions for unresolved names
//!
//! Analysis fails soft: malformed input degrades to partial tables and
//! [`Type::Unknown`], never to an error the caller has to unwrap.

pub mod ast;
pub mod cache;
pub mod fixture;
pub mod frames;
pub mod imports;
pub mod index;
pub mod names;
pub mod reflect;
pub mod symbols;
pub mod types;

pub use ast::{Ast, Parser};
pub use cache::SymbolCache;
pub use frames::{Frame, TypeResolver};
pub use imports::{ClassCandidate, ClassLocator, ImportError, ImportPlanner, Plan};
pub use index::SymbolIndex;
pub use names::{ImportTable, NameImport};
pub use reflect::{
    ReflectError, Reflector, ReflectorOptions, ResolvedClass, ResolvedMember, TraitConflict,
};
pub use symbols::{Declaration, FileSymbols, Member, MemberKind};
pub use types::{ScalarKind, Type};
