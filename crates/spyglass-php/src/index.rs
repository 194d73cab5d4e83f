//! Symbol index: the set of per-file symbol tables a query runs against.
//!
//! The index is an immutable snapshot of built [`FileSymbols`]; queries may
//! run concurrently against it. Rebuilding after an edit produces a new
//! index from the (mostly cached) per-file tables.

use std::sync::Arc;

use crate::ast::DeclKind;
use crate::symbols::{Declaration, FileSymbols};

#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    files: Vec<Arc<FileSymbols>>,
}

impl SymbolIndex {
    pub fn new(files: Vec<Arc<FileSymbols>>) -> Self {
        SymbolIndex { files }
    }

    pub fn files(&self) -> &[Arc<FileSymbols>] {
        &self.files
    }

    pub fn file(&self, path: &str) -> Option<&FileSymbols> {
        self.files.iter().map(|f| f.as_ref()).find(|f| f.path == path)
    }

    /// Find a class-like declaration by FQN, with its defining file.
    pub fn class_like(&self, fqn: &str) -> Option<(&FileSymbols, &Declaration)> {
        self.files
            .iter()
            .find_map(|f| f.class_like(fqn).map(|d| (f.as_ref(), d)))
    }

    /// Find a function declaration by FQN.
    pub fn function(&self, fqn: &str) -> Option<(&FileSymbols, &Declaration)> {
        self.files
            .iter()
            .find_map(|f| f.function(fqn).map(|d| (f.as_ref(), d)))
    }

    /// Find class-like declarations by short name, across all namespaces.
    pub fn class_like_by_short_name(&self, short: &str) -> Vec<(&FileSymbols, &Declaration)> {
        self.files
            .iter()
            .flat_map(|f| {
                f.declarations
                    .iter()
                    .filter(|d| d.kind != DeclKind::Function && d.name == short)
                    .map(move |d| (f.as_ref(), d))
            })
            .collect()
    }
}
