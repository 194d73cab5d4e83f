//! Content-addressed cache of built symbol tables.
//!
//! Keyed by [`ContentHash`], so a file keeps its cached table across
//! renames and re-reads, and editing a file back to previous content is a
//! cache hit. Two threads building the same uncached content may both
//! compute; the second insert wins and the results are identical, so the
//! race is harmless. Building happens outside the lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use spyglass_core::{ContentHash, SourceCode};
use tracing::debug;

use crate::ast::{Ast, Parser};
use crate::symbols::{self, FileSymbols};

#[derive(Debug, Default)]
pub struct SymbolCache {
    entries: Mutex<HashMap<ContentHash, Arc<FileSymbols>>>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The symbol table for a snapshot, building it on a miss.
    pub fn get_or_build(&self, source: &SourceCode, ast: &Ast) -> Arc<FileSymbols> {
        if let Some(hit) = self.lookup(source.hash()) {
            debug!(path = source.path(), "symbol cache hit");
            return hit;
        }
        debug!(path = source.path(), "symbol cache miss");
        let built = Arc::new(symbols::build(source, ast));
        self.insert(source.hash().clone(), Arc::clone(&built));
        built
    }

    /// Parse and build in one step, for callers without a tree in hand.
    pub fn get_or_parse(&self, source: &SourceCode, parser: &dyn Parser) -> Arc<FileSymbols> {
        if let Some(hit) = self.lookup(source.hash()) {
            debug!(path = source.path(), "symbol cache hit");
            return hit;
        }
        let ast = parser.parse(source.text());
        self.get_or_build(source, &ast)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn lookup(&self, hash: &ContentHash) -> Option<Arc<FileSymbols>> {
        self.entries.lock().ok()?.get(hash).cloned()
    }

    fn insert(&self, hash: ContentHash, table: Arc<FileSymbols>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(hash, table);
        }
    }
}
