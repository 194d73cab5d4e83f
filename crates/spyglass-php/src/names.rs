//! Name imports and resolution of in-source names against a file's import
//! table and namespace.
//!
//! A raw name as written in source (`Foo`, `Sub\Foo`, `\Fully\Qualified`)
//! resolves to a fully-qualified name (FQN, stored without a leading
//! backslash) in this order: explicit global qualifier, import alias or
//! imported short name, then the current namespace prefix.

use serde::{Deserialize, Serialize};
use spyglass_core::Span;

use crate::ast::{Ast, UseStatement};

/// A planned or existing import: FQN plus optional alias.
///
/// Identity is structural — two imports with the same FQN and alias are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameImport {
    pub fqn: String,
    pub alias: Option<String>,
}

impl NameImport {
    pub fn for_class(fqn: impl Into<String>) -> Self {
        NameImport {
            fqn: fqn.into(),
            alias: None,
        }
    }

    pub fn aliased(fqn: impl Into<String>, alias: impl Into<String>) -> Self {
        NameImport {
            fqn: fqn.into(),
            alias: Some(alias.into()),
        }
    }

    /// The name this import binds in the file: the alias if present,
    /// otherwise the last segment of the FQN.
    pub fn short_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => last_segment(&self.fqn),
        }
    }

    /// Render as a `use` statement.
    pub fn to_use_statement(&self) -> String {
        match &self.alias {
            Some(alias) => format!("use {} as {};", self.fqn, alias),
            None => format!("use {};", self.fqn),
        }
    }
}

/// An import together with the span of its `use` statement in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportEntry {
    pub import: NameImport,
    pub span: Span,
}

/// A file's import table and namespace, extracted from the AST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportTable {
    pub namespace: Option<String>,
    pub namespace_span: Option<Span>,
    entries: Vec<ImportEntry>,
}

impl ImportTable {
    pub fn from_ast(ast: &Ast) -> Self {
        ImportTable {
            namespace: ast.namespace.as_ref().map(|n| n.name.clone()),
            namespace_span: ast.namespace.as_ref().map(|n| n.span),
            entries: ast.uses.iter().map(ImportEntry::from_use).collect(),
        }
    }

    pub fn entries(&self) -> &[ImportEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the import binding the given short name (alias-aware).
    pub fn find_short(&self, short: &str) -> Option<&ImportEntry> {
        self.entries.iter().find(|e| e.import.short_name() == short)
    }

    /// Find the import of the given FQN, with or without alias.
    pub fn find_fqn(&self, fqn: &str) -> Option<&ImportEntry> {
        self.entries.iter().find(|e| e.import.fqn == fqn)
    }

    /// Resolve a raw in-source name to an FQN.
    pub fn resolve(&self, raw: &str) -> String {
        if let Some(stripped) = raw.strip_prefix('\\') {
            return stripped.to_string();
        }
        let (first, rest) = match raw.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (raw, None),
        };
        if let Some(entry) = self.find_short(first) {
            return match rest {
                Some(rest) => format!("{}\\{}", entry.import.fqn, rest),
                None => entry.import.fqn.clone(),
            };
        }
        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, raw),
            None => raw.to_string(),
        }
    }

    /// Qualify a declared short name into this file's namespace.
    pub fn qualify(&self, short: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, short),
            None => short.to_string(),
        }
    }
}

impl ImportEntry {
    fn from_use(stmt: &UseStatement) -> Self {
        ImportEntry {
            import: NameImport {
                fqn: stmt.fqn.clone(),
                alias: stmt.alias.clone(),
            },
            span: stmt.span,
        }
    }
}

/// Last backslash-separated segment of an FQN.
pub fn last_segment(fqn: &str) -> &str {
    fqn.rsplit('\\').next().unwrap_or(fqn)
}
