//! The engine: open files, a symbol cache, and the offset-addressed queries.
//!
//! An [`Engine`] owns the parser and class-locator collaborators plus the
//! set of open source snapshots. Queries build a fresh [`SymbolIndex`] from
//! the (content-cached) per-file symbol tables, so edits only pay for the
//! files that actually changed.

use std::collections::BTreeMap;
use std::sync::Arc;

use spyglass_core::{ByteOffset, SourceCode};
use spyglass_php::ast::{Ast, Parser};
use spyglass_php::imports::{ClassLocator, ImportPlanner, Plan};
use spyglass_php::reflect::{Reflector, ReflectorOptions, ResolvedClass};
use spyglass_php::{SymbolCache, SymbolIndex, Type, TypeResolver};
use tracing::debug;

use crate::dump::DumperRegistry;
use crate::error::EngineError;

pub struct Engine {
    parser: Box<dyn Parser>,
    locator: Box<dyn ClassLocator>,
    files: BTreeMap<String, (SourceCode, Arc<Ast>)>,
    cache: SymbolCache,
    dumpers: DumperRegistry,
    reflector_options: ReflectorOptions,
}

impl Engine {
    pub fn new(parser: Box<dyn Parser>, locator: Box<dyn ClassLocator>) -> Self {
        Engine {
            parser,
            locator,
            files: BTreeMap::new(),
            cache: SymbolCache::new(),
            dumpers: DumperRegistry::default(),
            reflector_options: ReflectorOptions::default(),
        }
    }

    pub fn with_reflector_options(mut self, options: ReflectorOptions) -> Self {
        self.reflector_options = options;
        self
    }

    // ========================================================================
    // File Management
    // ========================================================================

    /// Open (or replace) a source snapshot. Parsing happens here, once per
    /// snapshot; symbol tables build lazily per query.
    pub fn open(&mut self, source: SourceCode) {
        let ast = Arc::new(self.parser.parse(source.text()));
        debug!(path = source.path(), hash = %source.hash(), "opened file");
        self.files.insert(source.path().to_string(), (source, ast));
    }

    pub fn close(&mut self, path: &str) {
        self.files.remove(path);
    }

    pub fn open_paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Reflect a class-like by FQN or unique short name.
    pub fn reflect(&self, name: &str) -> Result<ResolvedClass, EngineError> {
        let index = self.index();
        let resolved = Reflector::with_options(&index, self.reflector_options).reflect(name)?;
        Ok(resolved)
    }

    /// Reflect the class-like enclosing a byte offset.
    pub fn reflect_at(&self, path: &str, offset: ByteOffset) -> Result<ResolvedClass, EngineError> {
        self.file(path)?;
        let index = self.index();
        let resolved =
            Reflector::with_options(&index, self.reflector_options).reflect_at(path, offset)?;
        Ok(resolved)
    }

    /// The type of the expression at a byte offset.
    ///
    /// Fails soft: unknown paths and offsets outside any expression resolve
    /// to [`Type::Unknown`].
    pub fn type_at(&self, path: &str, offset: ByteOffset) -> Type {
        let Some((source, ast)) = self.files.get(path) else {
            return Type::Unknown;
        };
        if !source.contains_offset(offset) {
            return Type::Unknown;
        }
        let index = self.index();
        TypeResolver::new(&index).type_at(ast, offset)
    }

    /// Plan a `use` statement for the unresolved short name at the caret.
    pub fn plan_import(
        &self,
        path: &str,
        offset: ByteOffset,
        name: &str,
        alias: Option<&str>,
    ) -> Result<Plan, EngineError> {
        let (source, ast) = self.file(path)?;
        let symbols = self.cache.get_or_build(source, ast);
        let plan =
            ImportPlanner::new(self.locator.as_ref()).plan(source, &symbols, offset, name, alias)?;
        Ok(plan)
    }

    /// Plan an import of a known FQN, skipping candidate search.
    pub fn plan_import_qualified(
        &self,
        path: &str,
        offset: ByteOffset,
        fqn: &str,
        alias: Option<&str>,
    ) -> Result<Plan, EngineError> {
        let (source, ast) = self.file(path)?;
        let symbols = self.cache.get_or_build(source, ast);
        let plan = ImportPlanner::new(self.locator.as_ref())
            .plan_qualified(source, &symbols, offset, fqn, alias)?;
        Ok(plan)
    }

    /// Reflect a class-like and render it with the named dumper.
    pub fn dump(&self, class_name: &str, dumper: &str) -> Result<String, EngineError> {
        let resolved = self.reflect(class_name)?;
        let source = self.defining_source(&resolved);
        let output = self.dumpers.get(dumper)?.dump(source, &resolved)?;
        Ok(output)
    }

    pub fn dumpers(&mut self) -> &mut DumperRegistry {
        &mut self.dumpers
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// The index over all open files, built from cached symbol tables.
    pub fn index(&self) -> SymbolIndex {
        SymbolIndex::new(
            self.files
                .values()
                .map(|(source, ast)| self.cache.get_or_build(source, ast))
                .collect(),
        )
    }

    fn file(&self, path: &str) -> Result<&(SourceCode, Arc<Ast>), EngineError> {
        self.files.get(path).ok_or_else(|| EngineError::UnknownFile {
            path: path.to_string(),
        })
    }

    /// The snapshot declaring the resolved class, for position rendering.
    /// Falls back to the first open file's snapshot only when the defining
    /// file was closed between reflect and dump.
    fn defining_source(&self, resolved: &ResolvedClass) -> Option<&SourceCode> {
        let index = self.index();
        let path = index
            .class_like(resolved.fqn())
            .map(|(file, _)| file.path.clone())?;
        self.files.get(&path).map(|(source, _)| source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spyglass_php::fixture::{self, decl, member, StaticParser};
    use spyglass_php::imports::ClassCandidate;
    use spyglass_php::ast::{Item, Visibility};

    struct NoCandidates;

    impl ClassLocator for NoCandidates {
        fn candidates(&self, _short_name: &str) -> Vec<ClassCandidate> {
            Vec::new()
        }
    }

    #[test]
    fn reflect_sees_opened_files() {
        let (source, ast) = fixture::file(
            "/lib/Badger.php",
            Some("Animals"),
            vec![],
            vec![Item::Decl(
                decl::class("Badger", (20, 120))
                    .member(member::method("dig", Visibility::Public, (40, 60)))
                    .build(),
            )],
        );
        let parser = StaticParser::new().with(source.text(), ast);
        let mut engine = Engine::new(Box::new(parser), Box::new(NoCandidates));
        engine.open(source);
        let resolved = engine.reflect("Animals\\Badger").unwrap();
        assert_eq!(resolved.fqn(), "Animals\\Badger");
        assert!(resolved.method("dig").is_some());
    }

    #[test]
    fn closed_files_leave_the_index() {
        let (source, ast) = fixture::file(
            "/lib/Badger.php",
            Some("Animals"),
            vec![],
            vec![Item::Decl(decl::class("Badger", (20, 120)).build())],
        );
        let parser = StaticParser::new().with(source.text(), ast);
        let mut engine = Engine::new(Box::new(parser), Box::new(NoCandidates));
        engine.open(source);
        engine.close("/lib/Badger.php");
        assert!(engine.reflect("Animals\\Badger").is_err());
    }

    #[test]
    fn type_at_unknown_path_is_unknown() {
        let engine = Engine::new(Box::new(StaticParser::new()), Box::new(NoCandidates));
        assert_eq!(engine.type_at("/nowhere.php", ByteOffset(10)), Type::Unknown);
    }

    #[test]
    fn plan_import_unknown_path_is_an_error() {
        let engine = Engine::new(Box::new(StaticParser::new()), Box::new(NoCandidates));
        let err = engine
            .plan_import("/nowhere.php", ByteOffset(7), "Foo", None)
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownFile { .. }));
    }
}
