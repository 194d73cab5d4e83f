//! Reflection resolver: linearize a class-like declaration's full member set.
//!
//! Given a symbol index and a target name or byte offset, the resolver
//! locates the declaration and merges inherited, trait-provided, and
//! interface-declared members into one flattened table. Merge layers run
//! in fixed order so precedence per member name and kind is deterministic:
//! own declaration > trait > parent class > interface default.
//!
//! Two un-adapted traits providing the same method is a reported conflict.
//! In lenient mode (the default) the first trait in `use` order wins and the
//! conflict is surfaced on the resolved class; strict mode turns it into an
//! error. Inheritance cycles are detected by tracking the set of FQNs
//! currently being resolved and fail fast with the chain.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use spyglass_core::ByteOffset;
use thiserror::Error;
use tracing::debug;

use crate::ast::{DeclKind, TraitAdaptation, Visibility};
use crate::index::SymbolIndex;
use crate::names::ImportTable;
use crate::symbols::{Declaration, Member};

// ============================================================================
// Error Types
// ============================================================================

/// Errors from reflection queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReflectError {
    /// The name (or offset) resolves to no class-like declaration.
    /// Soft failure: expected and frequent.
    #[error("class-like '{name}' not found")]
    NotFound { name: String },

    /// A class transitively extends itself. Structural failure, detected
    /// instead of recursing forever.
    #[error("cyclic inheritance for '{class}' via chain {chain:?}")]
    InheritanceCycle { class: String, chain: Vec<String> },

    /// Strict mode only: two traits provide the same method with no
    /// `insteadof` rule. Carries the providers so the caller can prompt.
    #[error("trait conflict in '{class}': method '{method}' provided by {providers:?}")]
    TraitConflict {
        class: String,
        method: String,
        providers: Vec<String>,
    },
}

pub type ReflectResult<T> = Result<T, ReflectError>;

// ============================================================================
// Resolved Model
// ============================================================================

/// A member that won its slot, with the chain of members it shadows
/// (nearest first), for "go to super" style needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMember {
    pub member: Member,
    pub shadowed: Vec<Member>,
}

impl ResolvedMember {
    fn own(member: Member) -> Self {
        ResolvedMember {
            member,
            shadowed: Vec::new(),
        }
    }
}

/// A trait-member tie that had no adaptation rule; surfaced, never silently
/// resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitConflict {
    pub method: String,
    /// Trait FQNs providing the method, in `use` order.
    pub providers: Vec<String>,
}

/// A declaration plus its linearized member table after inheritance and
/// trait merge. Exactly one winning member per name per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedClass {
    pub declaration: Declaration,
    methods: BTreeMap<String, ResolvedMember>,
    properties: BTreeMap<String, ResolvedMember>,
    constants: BTreeMap<String, ResolvedMember>,
    pub conflicts: Vec<TraitConflict>,
}

impl ResolvedClass {
    fn new(declaration: Declaration) -> Self {
        ResolvedClass {
            declaration,
            methods: BTreeMap::new(),
            properties: BTreeMap::new(),
            constants: BTreeMap::new(),
            conflicts: Vec::new(),
        }
    }

    pub fn fqn(&self) -> &str {
        &self.declaration.fqn
    }

    pub fn method(&self, name: &str) -> Option<&ResolvedMember> {
        self.methods.get(name)
    }

    pub fn property(&self, name: &str) -> Option<&ResolvedMember> {
        self.properties.get(name)
    }

    pub fn constant(&self, name: &str) -> Option<&ResolvedMember> {
        self.constants.get(name)
    }

    /// Winning methods in deterministic (name) order.
    pub fn methods(&self) -> impl Iterator<Item = &ResolvedMember> {
        self.methods.values()
    }

    pub fn properties(&self) -> impl Iterator<Item = &ResolvedMember> {
        self.properties.values()
    }

    pub fn constants(&self) -> impl Iterator<Item = &ResolvedMember> {
        self.constants.values()
    }

    /// All winning members: constants, then properties, then methods.
    pub fn members(&self) -> impl Iterator<Item = &ResolvedMember> {
        self.constants
            .values()
            .chain(self.properties.values())
            .chain(self.methods.values())
    }

    fn slot(&mut self, member: &Member) -> &mut BTreeMap<String, ResolvedMember> {
        use crate::symbols::MemberKind;
        match member.kind {
            MemberKind::Method { .. } => &mut self.methods,
            MemberKind::Property { .. } => &mut self.properties,
            MemberKind::Constant { .. } => &mut self.constants,
        }
    }

    /// Insert a member, shadowing any earlier winner of the same name and
    /// kind. The shadowed chain stays ordered nearest-first.
    fn insert(&mut self, incoming: ResolvedMember) {
        let table = self.slot(&incoming.member);
        let name = incoming.member.name.clone();
        match table.remove(&name) {
            Some(previous) => {
                let mut merged = incoming;
                merged.shadowed.push(previous.member);
                merged.shadowed.extend(previous.shadowed);
                table.insert(name, merged);
            }
            None => {
                table.insert(name, incoming);
            }
        }
    }

    fn merge_from(&mut self, other: &ResolvedClass) {
        for member in other.members() {
            self.insert(member.clone());
        }
    }
}

// ============================================================================
// Reflector
// ============================================================================

/// Tie-break policy for un-adapted trait method conflicts. The source
/// behavior is not fully pinned down, so strictness is configurable rather
/// than a guessed silent-override policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectorOptions {
    /// When true, an un-adapted trait conflict is an error instead of a
    /// recorded conflict with first-trait-wins.
    pub strict_trait_conflicts: bool,
}

/// Resolves class-like declarations against a symbol index.
#[derive(Debug)]
pub struct Reflector<'a> {
    index: &'a SymbolIndex,
    options: ReflectorOptions,
}

impl<'a> Reflector<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Reflector {
            index,
            options: ReflectorOptions::default(),
        }
    }

    pub fn with_options(index: &'a SymbolIndex, options: ReflectorOptions) -> Self {
        Reflector { index, options }
    }

    /// Reflect a class-like by name.
    ///
    /// Accepts an FQN (leading backslash tolerated) or a bare short name;
    /// a short name resolves only if it matches exactly one declaration.
    pub fn reflect(&self, name: &str) -> ReflectResult<ResolvedClass> {
        let fqn = name.trim_start_matches('\\');
        if self.index.class_like(fqn).is_some() {
            return self.reflect_fqn(fqn, &mut Vec::new());
        }
        if !fqn.contains('\\') {
            let matches = self.index.class_like_by_short_name(fqn);
            if let [(_, decl)] = matches.as_slice() {
                let fqn = decl.fqn.clone();
                return self.reflect_fqn(&fqn, &mut Vec::new());
            }
        }
        Err(ReflectError::NotFound {
            name: name.to_string(),
        })
    }

    /// Reflect the class-like whose byte range contains the offset.
    pub fn reflect_at(&self, path: &str, offset: ByteOffset) -> ReflectResult<ResolvedClass> {
        let file = self.index.file(path).ok_or_else(|| ReflectError::NotFound {
            name: path.to_string(),
        })?;
        let decl = file
            .declaration_at(offset.to_usize())
            .filter(|d| d.kind != DeclKind::Function)
            .ok_or_else(|| ReflectError::NotFound {
                name: format!("{}:{}", path, offset),
            })?;
        let fqn = decl.fqn.clone();
        self.reflect_fqn(&fqn, &mut Vec::new())
    }

    fn reflect_fqn(&self, fqn: &str, in_progress: &mut Vec<String>) -> ReflectResult<ResolvedClass> {
        if in_progress.iter().any(|c| c == fqn) {
            let mut chain = in_progress.clone();
            chain.push(fqn.to_string());
            return Err(ReflectError::InheritanceCycle {
                class: fqn.to_string(),
                chain,
            });
        }
        let (file, decl) = self
            .index
            .class_like(fqn)
            .ok_or_else(|| ReflectError::NotFound {
                name: fqn.to_string(),
            })?;
        debug!(fqn, kind = ?decl.kind, "reflecting class-like");
        in_progress.push(fqn.to_string());
        let result = self.resolve_declaration(decl, &file.imports, in_progress);
        in_progress.pop();
        result
    }

    fn resolve_declaration(
        &self,
        decl: &Declaration,
        imports: &ImportTable,
        in_progress: &mut Vec<String>,
    ) -> ReflectResult<ResolvedClass> {
        let mut resolved = ResolvedClass::new(decl.clone());

        // Interfaces contribute constants and abstract signatures. For an
        // interface declaration its own supertypes live in `extends`.
        let interface_refs: &[String] = match decl.kind {
            DeclKind::Interface => &decl.extends,
            _ => &decl.implements,
        };
        for raw in interface_refs {
            let fqn = imports.resolve(raw);
            match self.reflect_fqn(&fqn, in_progress) {
                Ok(iface) => resolved.merge_from(&iface),
                // Unresolvable supertype: degrade, do not fail the query.
                Err(ReflectError::NotFound { .. }) => continue,
                Err(err) => return Err(err),
            }
        }

        // Single parent class (concrete members).
        if decl.kind == DeclKind::Class {
            if let Some(raw) = decl.extends.first() {
                let fqn = imports.resolve(raw);
                match self.reflect_fqn(&fqn, in_progress) {
                    Ok(parent) => resolved.merge_from(&parent),
                    Err(ReflectError::NotFound { .. }) => {}
                    Err(err) => return Err(err),
                }
            }
        }

        self.merge_traits(decl, imports, &mut resolved, in_progress)?;

        // Own members always win.
        for member in &decl.members {
            resolved.insert(ResolvedMember::own(member.clone()));
        }

        Ok(resolved)
    }

    fn merge_traits(
        &self,
        decl: &Declaration,
        imports: &ImportTable,
        resolved: &mut ResolvedClass,
        in_progress: &mut Vec<String>,
    ) -> ReflectResult<()> {
        // Providers per method name, in use-clause order.
        let mut trait_order: Vec<(String, ResolvedClass)> = Vec::new();
        let mut insteadof: Vec<(String, String)> = Vec::new(); // (winner fqn, method)
        let mut excluded: Vec<(String, String)> = Vec::new(); // (loser fqn, method)
        let mut aliases: Vec<(Option<String>, String, Option<String>, Option<Visibility>)> =
            Vec::new();

        for trait_use in &decl.trait_uses {
            for raw in &trait_use.traits {
                let fqn = imports.resolve(raw);
                match self.reflect_fqn(&fqn, in_progress) {
                    Ok(t) => trait_order.push((fqn, t)),
                    Err(ReflectError::NotFound { .. }) => continue,
                    Err(err) => return Err(err),
                }
            }
            for adaptation in &trait_use.adaptations {
                match adaptation {
                    TraitAdaptation::InsteadOf {
                        trait_name,
                        method,
                        excluded: losers,
                    } => {
                        insteadof.push((imports.resolve(trait_name), method.clone()));
                        for loser in losers {
                            excluded.push((imports.resolve(loser), method.clone()));
                        }
                    }
                    TraitAdaptation::Alias {
                        trait_name,
                        method,
                        alias,
                        visibility,
                    } => aliases.push((
                        trait_name.as_ref().map(|t| imports.resolve(t)),
                        method.clone(),
                        alias.clone(),
                        *visibility,
                    )),
                }
            }
        }

        // Non-method members merge in trait order; the last trait shadows.
        for (_, t) in &trait_order {
            for member in t.constants().chain(t.properties()) {
                resolved.insert(member.clone());
            }
        }

        // Methods need conflict handling.
        let mut method_names: Vec<String> = Vec::new();
        for (_, t) in &trait_order {
            for rm in t.methods() {
                if !method_names.contains(&rm.member.name) {
                    method_names.push(rm.member.name.clone());
                }
            }
        }

        for name in method_names {
            let mut providers: Vec<(&String, &ResolvedMember)> = trait_order
                .iter()
                .filter_map(|(fqn, t)| t.method(&name).map(|rm| (fqn, rm)))
                .collect();

            providers.retain(|(fqn, _)| {
                !excluded.iter().any(|(loser, m)| loser == *fqn && *m == name)
            });
            if let Some((winner_fqn, _)) = insteadof.iter().find(|(_, m)| *m == name) {
                providers.retain(|(fqn, _)| *fqn == winner_fqn);
            }

            if providers.len() > 1 {
                let names: Vec<String> = providers.iter().map(|(fqn, _)| (*fqn).clone()).collect();
                if self.options.strict_trait_conflicts {
                    return Err(ReflectError::TraitConflict {
                        class: resolved.declaration.fqn.clone(),
                        method: name,
                        providers: names,
                    });
                }
                resolved.conflicts.push(TraitConflict {
                    method: name.clone(),
                    providers: names,
                });
            }

            if let Some((_, rm)) = providers.first() {
                resolved.insert((*rm).clone());
            }
        }

        // Aliases re-expose a provider under a new name and/or visibility;
        // the original stays.
        for (trait_name, method, alias, visibility) in aliases {
            let provider = trait_order
                .iter()
                .filter(|(fqn, _)| trait_name.as_ref().is_none_or(|t| t == fqn))
                .find_map(|(_, t)| t.method(&method));
            if let Some(rm) = provider {
                let mut member = rm.member.clone();
                if let Some(alias) = alias {
                    member.name = alias;
                }
                if let Some(visibility) = visibility {
                    member.visibility = visibility;
                }
                resolved.insert(ResolvedMember::own(member));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Item, TraitUse, TypeExpr};
    use crate::fixture::{self, decl, expr, member};
    use crate::symbols;
    use std::sync::Arc;

    fn index_of(files: Vec<(spyglass_core::SourceCode, crate::ast::Ast)>) -> SymbolIndex {
        SymbolIndex::new(
            files
                .iter()
                .map(|(source, ast)| Arc::new(symbols::build(source, ast)))
                .collect(),
        )
    }

    #[test]
    fn plain_class_members_equal_builder_output() {
        let index = index_of(vec![fixture::file(
            "/lib/Badger.php",
            Some("Animals"),
            vec![],
            vec![Item::Decl(
                decl::class("Badger", (20, 120))
                    .member(member::method("dig", Visibility::Public, (40, 60)))
                    .member(member::method("snarl", Visibility::Public, (65, 90)))
                    .build(),
            )],
        )]);
        let resolved = Reflector::new(&index).reflect("Animals\\Badger").unwrap();
        assert_eq!(resolved.fqn(), "Animals\\Badger");
        let names: Vec<&str> = resolved.methods().map(|m| m.member.name.as_str()).collect();
        assert_eq!(names, vec!["dig", "snarl"]);
        assert!(resolved.methods().all(|m| m.shadowed.is_empty()));
        assert!(resolved.conflicts.is_empty());
    }

    #[test]
    fn parent_members_inherited_and_shadowed() {
        let index = index_of(vec![
            fixture::file(
                "/lib/Mammal.php",
                Some("Animals"),
                vec![],
                vec![Item::Decl(
                    decl::class("Mammal", (20, 120))
                        .member(member::method("breathe", Visibility::Public, (40, 60)))
                        .member(member::method("speak", Visibility::Public, (65, 90)))
                        .build(),
                )],
            ),
            fixture::file(
                "/lib/Badger.php",
                Some("Animals"),
                vec![],
                vec![Item::Decl(
                    decl::class("Badger", (20, 120))
                        .extends("Mammal")
                        .member(member::method("speak", Visibility::Public, (40, 60)))
                        .build(),
                )],
            ),
        ]);
        let resolved = Reflector::new(&index).reflect("Animals\\Badger").unwrap();
        // Inherited concrete member.
        assert_eq!(
            resolved.method("breathe").unwrap().member.owner,
            "Animals\\Mammal"
        );
        // Own member wins; parent's version is in the shadow chain.
        let speak = resolved.method("speak").unwrap();
        assert_eq!(speak.member.owner, "Animals\\Badger");
        assert_eq!(speak.shadowed.len(), 1);
        assert_eq!(speak.shadowed[0].owner, "Animals\\Mammal");
    }

    #[test]
    fn interface_constants_inherited_unless_redeclared() {
        let iface = fixture::file(
            "/lib/Animal.php",
            Some("Animals"),
            vec![],
            vec![Item::Decl(
                decl::interface("Animal", (20, 120))
                    .member(member::constant("LEGS", Some(expr::int(4, (50, 51))), (40, 60)))
                    .member(member::abstract_method(
                        "speak",
                        Visibility::Public,
                        Some(TypeExpr::Name("string".into())),
                        (65, 95),
                    ))
                    .build(),
            )],
        );
        let index = index_of(vec![
            iface.clone(),
            fixture::file(
                "/lib/Badger.php",
                Some("Animals"),
                vec![],
                vec![Item::Decl(
                    decl::class("Badger", (20, 120)).implements("Animal").build(),
                )],
            ),
            fixture::file(
                "/lib/Snake.php",
                Some("Animals"),
                vec![],
                vec![Item::Decl(
                    decl::class("Snake", (20, 140))
                        .implements("Animal")
                        .member(member::constant("LEGS", Some(expr::int(0, (50, 51))), (40, 60)))
                        .build(),
                )],
            ),
        ]);
        let reflector = Reflector::new(&index);

        let badger = reflector.reflect("Animals\\Badger").unwrap();
        assert_eq!(
            badger.constant("LEGS").unwrap().member.owner,
            "Animals\\Animal"
        );
        // Abstract signature carried through.
        assert!(badger.method("speak").unwrap().member.is_abstract);

        let snake = reflector.reflect("Animals\\Snake").unwrap();
        assert_eq!(snake.constant("LEGS").unwrap().member.owner, "Animals\\Snake");
        assert_eq!(snake.constant("LEGS").unwrap().shadowed.len(), 1);
    }

    #[test]
    fn precedence_own_over_trait_over_parent() {
        let index = index_of(vec![
            fixture::file(
                "/lib/Base.php",
                None,
                vec![],
                vec![Item::Decl(
                    decl::class("Base", (20, 120))
                        .member(member::method("a", Visibility::Public, (30, 40)))
                        .member(member::method("b", Visibility::Public, (45, 55)))
                        .member(member::method("c", Visibility::Public, (60, 70)))
                        .build(),
                )],
            ),
            fixture::file(
                "/lib/Helper.php",
                None,
                vec![],
                vec![Item::Decl(
                    decl::trait_("Helper", (20, 120))
                        .member(member::method("b", Visibility::Public, (30, 40)))
                        .member(member::method("c", Visibility::Public, (45, 55)))
                        .build(),
                )],
            ),
            fixture::file(
                "/lib/Child.php",
                None,
                vec![],
                vec![Item::Decl(
                    decl::class("Child", (20, 120))
                        .extends("Base")
                        .uses_trait(decl::use_traits(vec!["Helper"], (25, 40)))
                        .member(member::method("c", Visibility::Public, (50, 60)))
                        .build(),
                )],
            ),
        ]);
        let resolved = Reflector::new(&index).reflect("Child").unwrap();
        assert_eq!(resolved.method("a").unwrap().member.owner, "Base");
        assert_eq!(resolved.method("b").unwrap().member.owner, "Helper");
        assert_eq!(resolved.method("c").unwrap().member.owner, "Child");
        // Shadow chain for c: trait first, then parent.
        let c = resolved.method("c").unwrap();
        assert_eq!(c.shadowed[0].owner, "Helper");
        assert_eq!(c.shadowed[1].owner, "Base");
    }

    fn conflicting_trait_files() -> Vec<(spyglass_core::SourceCode, crate::ast::Ast)> {
        vec![
            fixture::file(
                "/lib/Walks.php",
                None,
                vec![],
                vec![Item::Decl(
                    decl::trait_("Walks", (20, 120))
                        .member(member::method("go", Visibility::Public, (30, 40)))
                        .build(),
                )],
            ),
            fixture::file(
                "/lib/Swims.php",
                None,
                vec![],
                vec![Item::Decl(
                    decl::trait_("Swims", (20, 120))
                        .member(member::method("go", Visibility::Public, (30, 40)))
                        .build(),
                )],
            ),
        ]
    }

    #[test]
    fn unadapted_trait_conflict_is_reported_lenient() {
        let mut files = conflicting_trait_files();
        files.push(fixture::file(
            "/lib/Duck.php",
            None,
            vec![],
            vec![Item::Decl(
                decl::class("Duck", (20, 120))
                    .uses_trait(decl::use_traits(vec!["Walks", "Swims"], (25, 60)))
                    .build(),
            )],
        ));
        let index = index_of(files);
        let resolved = Reflector::new(&index).reflect("Duck").unwrap();
        // First trait in use order wins, conflict surfaced.
        assert_eq!(resolved.method("go").unwrap().member.owner, "Walks");
        assert_eq!(resolved.conflicts.len(), 1);
        assert_eq!(resolved.conflicts[0].method, "go");
        assert_eq!(resolved.conflicts[0].providers, vec!["Walks", "Swims"]);
    }

    #[test]
    fn unadapted_trait_conflict_errors_in_strict_mode() {
        let mut files = conflicting_trait_files();
        files.push(fixture::file(
            "/lib/Duck.php",
            None,
            vec![],
            vec![Item::Decl(
                decl::class("Duck", (20, 120))
                    .uses_trait(decl::use_traits(vec!["Walks", "Swims"], (25, 60)))
                    .build(),
            )],
        ));
        let index = index_of(files);
        let reflector = Reflector::with_options(
            &index,
            ReflectorOptions {
                strict_trait_conflicts: true,
            },
        );
        let err = reflector.reflect("Duck").unwrap_err();
        assert!(matches!(err, ReflectError::TraitConflict { ref method, .. } if method == "go"));
    }

    #[test]
    fn insteadof_resolves_conflict() {
        let mut files = conflicting_trait_files();
        files.push(fixture::file(
            "/lib/Duck.php",
            None,
            vec![],
            vec![Item::Decl(
                decl::class("Duck", (20, 120))
                    .uses_trait(TraitUse {
                        traits: vec!["Walks".into(), "Swims".into()],
                        adaptations: vec![TraitAdaptation::InsteadOf {
                            trait_name: "Swims".into(),
                            method: "go".into(),
                            excluded: vec!["Walks".into()],
                        }],
                        span: spyglass_core::Span::new(25, 90),
                    })
                    .build(),
            )],
        ));
        let index = index_of(files);
        let resolved = Reflector::new(&index).reflect("Duck").unwrap();
        assert_eq!(resolved.method("go").unwrap().member.owner, "Swims");
        assert!(resolved.conflicts.is_empty());
    }

    #[test]
    fn trait_alias_adds_renamed_member() {
        let mut files = conflicting_trait_files();
        files.push(fixture::file(
            "/lib/Duck.php",
            None,
            vec![],
            vec![Item::Decl(
                decl::class("Duck", (20, 120))
                    .uses_trait(TraitUse {
                        traits: vec!["Walks".into()],
                        adaptations: vec![TraitAdaptation::Alias {
                            trait_name: Some("Walks".into()),
                            method: "go".into(),
                            alias: Some("waddle".into()),
                            visibility: Some(Visibility::Protected),
                        }],
                        span: spyglass_core::Span::new(25, 90),
                    })
                    .build(),
            )],
        ));
        let index = index_of(files);
        let resolved = Reflector::new(&index).reflect("Duck").unwrap();
        // Original stays, alias added with adapted visibility.
        assert!(resolved.method("go").is_some());
        let waddle = resolved.method("waddle").unwrap();
        assert_eq!(waddle.member.visibility, Visibility::Protected);
    }

    #[test]
    fn cyclic_inheritance_fails_fast() {
        let index = index_of(vec![
            fixture::file(
                "/lib/A.php",
                None,
                vec![],
                vec![Item::Decl(decl::class("A", (20, 60)).extends("B").build())],
            ),
            fixture::file(
                "/lib/B.php",
                None,
                vec![],
                vec![Item::Decl(decl::class("B", (20, 60)).extends("A").build())],
            ),
        ]);
        let err = Reflector::new(&index).reflect("A").unwrap_err();
        match err {
            ReflectError::InheritanceCycle { class, chain } => {
                assert_eq!(class, "A");
                assert_eq!(chain, vec!["A", "B", "A"]);
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_name_is_not_found() {
        let index = index_of(vec![]);
        assert_eq!(
            Reflector::new(&index).reflect("Missing").unwrap_err(),
            ReflectError::NotFound {
                name: "Missing".into()
            }
        );
    }

    #[test]
    fn unresolvable_parent_degrades() {
        let index = index_of(vec![fixture::file(
            "/lib/Orphan.php",
            None,
            vec![],
            vec![Item::Decl(
                decl::class("Orphan", (20, 120))
                    .extends("VendorBase")
                    .member(member::method("run", Visibility::Public, (40, 60)))
                    .build(),
            )],
        )]);
        let resolved = Reflector::new(&index).reflect("Orphan").unwrap();
        assert!(resolved.method("run").is_some());
    }

    #[test]
    fn reflect_by_offset() {
        let index = index_of(vec![fixture::file(
            "/lib/Badger.php",
            Some("Animals"),
            vec![],
            vec![Item::Decl(
                decl::class("Badger", (20, 120))
                    .member(member::method("dig", Visibility::Public, (40, 60)))
                    .build(),
            )],
        )]);
        let reflector = Reflector::new(&index);
        let resolved = reflector.reflect_at("/lib/Badger.php", ByteOffset(45)).unwrap();
        assert_eq!(resolved.fqn(), "Animals\\Badger");
        assert!(matches!(
            reflector.reflect_at("/lib/Badger.php", ByteOffset(500)),
            Err(ReflectError::NotFound { .. })
        ));
    }

    #[test]
    fn short_name_resolves_when_unique() {
        let index = index_of(vec![fixture::file(
            "/lib/Badger.php",
            Some("Animals"),
            vec![],
            vec![Item::Decl(decl::class("Badger", (20, 120)).build())],
        )]);
        let resolved = Reflector::new(&index).reflect("Badger").unwrap();
        assert_eq!(resolved.fqn(), "Animals\\Badger");
    }
}
