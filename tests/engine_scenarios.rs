//! End-to-end engine scenarios: open files through the parser boundary,
//! then exercise reflection, type queries, import planning, and dumps the
//! way a host editor would.

use std::sync::Once;

use spyglass::{Engine, EngineError, ImportError, NameImport, Plan, Type};
use spyglass_core::{ByteOffset, SourceCode};
use spyglass_php::ast::{Ast, BinaryOp, Item, TypeExpr, UseStatement, Visibility};
use spyglass_php::fixture::{self, decl, expr, member, stmt, StaticParser};
use spyglass_php::imports::{ClassCandidate, ClassLocator};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

struct MapLocator(Vec<(&'static str, Vec<&'static str>)>);

impl ClassLocator for MapLocator {
    fn candidates(&self, short_name: &str) -> Vec<ClassCandidate> {
        self.0
            .iter()
            .filter(|(name, _)| *name == short_name)
            .flat_map(|(_, fqns)| fqns.iter().map(|f| ClassCandidate::new(*f)))
            .collect()
    }
}

fn badger_file() -> (SourceCode, Ast) {
    fixture::file(
        "/lib/Badger.php",
        Some("Animals"),
        vec![],
        vec![Item::Decl(
            decl::class("Badger", (20, 200))
                .member(member::method_full(
                    "name",
                    Visibility::Public,
                    vec![],
                    Some(TypeExpr::Name("string".into())),
                    vec![],
                    (40, 60),
                    (65, 90),
                ))
                .member(member::method("dig", Visibility::Public, (100, 130)))
                .build(),
        )],
    )
}

fn engine_with(
    files: Vec<(SourceCode, Ast)>,
    locator: MapLocator,
) -> Engine {
    init_tracing();
    let mut parser = StaticParser::new();
    let mut sources = Vec::new();
    for (source, ast) in files {
        parser = parser.with(source.text(), ast);
        sources.push(source);
    }
    let mut engine = Engine::new(Box::new(parser), Box::new(locator));
    for source in sources {
        engine.open(source);
    }
    engine
}

// ============================================================================
// Reflection and Dumping
// ============================================================================

#[test]
fn reflect_and_dump_a_class() {
    let engine = engine_with(vec![badger_file()], MapLocator(vec![]));

    let out = engine.dump("Animals\\Badger", "text").unwrap();
    assert!(out.contains("Animals\\Badger"));
    assert!(out.contains("methods"));
    assert!(out.contains("public function name(): string"));
}

#[test]
fn dump_with_unknown_format_reports_known_dumpers() {
    let engine = engine_with(vec![badger_file()], MapLocator(vec![]));
    let err = engine.dump("Animals\\Badger", "foobar").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown dumper \"foobar\", known dumpers: \"json\", \"text\""
    );
}

#[test]
fn reflect_unknown_class_is_a_soft_error() {
    let engine = engine_with(vec![], MapLocator(vec![]));
    let err = engine.reflect("Animals\\Ghost").unwrap_err();
    assert!(matches!(err, EngineError::Reflect(_)));
    assert_eq!(err.to_string(), "class-like 'Animals\\Ghost' not found");
}

#[test]
fn reflect_merges_across_open_files() {
    let mammal = fixture::file(
        "/lib/Mammal.php",
        Some("Animals"),
        vec![],
        vec![Item::Decl(
            decl::class("Mammal", (20, 120))
                .member(member::method("breathe", Visibility::Public, (40, 60)))
                .build(),
        )],
    );
    let badger = fixture::file(
        "/lib/Badger2.php",
        Some("Animals"),
        vec![],
        vec![Item::Decl(
            decl::class("Badger", (20, 120)).extends("Mammal").build(),
        )],
    );
    let engine = engine_with(vec![mammal, badger], MapLocator(vec![]));
    let resolved = engine.reflect("Animals\\Badger").unwrap();
    assert_eq!(
        resolved.method("breathe").unwrap().member.owner,
        "Animals\\Mammal"
    );
}

// ============================================================================
// Type Queries
// ============================================================================

#[test]
fn type_at_follows_assignments_and_calls() {
    let badger = badger_file();
    let script = fixture::file(
        "/src/run.php",
        Some("Animals"),
        vec![],
        vec![
            Item::Stmt(stmt::assign("b", expr::new_("Badger", (30, 42)), (25, 43))),
            Item::Stmt(stmt::assign(
                "n",
                expr::method_call(expr::var("b", (50, 52)), "name", (50, 60)),
                (45, 61),
            )),
            Item::Stmt(stmt::expr(expr::var("n", (65, 67)), (65, 68))),
        ],
    );
    let path = script.0.path().to_string();
    let engine = engine_with(vec![badger, script], MapLocator(vec![]));

    assert_eq!(engine.type_at(&path, ByteOffset(51)), Type::named("Animals\\Badger"));
    assert_eq!(engine.type_at(&path, ByteOffset(66)), Type::string());
}

#[test]
fn type_at_narrows_and_widens() {
    let script = fixture::file(
        "/src/flow.php",
        None,
        vec![],
        vec![
            Item::Stmt(stmt::assign("x", expr::int(1, (15, 16)), (10, 17))),
            Item::Stmt(stmt::loop_(
                vec![stmt::assign(
                    "x",
                    expr::binary(
                        BinaryOp::Concat,
                        expr::str_("a", (35, 38)),
                        expr::str_("b", (41, 44)),
                        (35, 44),
                    ),
                    (30, 45),
                )],
                (25, 50),
                (20, 51),
            )),
            Item::Stmt(stmt::expr(expr::var("x", (55, 57)), (55, 58))),
        ],
    );
    let path = script.0.path().to_string();
    let engine = engine_with(vec![script], MapLocator(vec![]));
    assert_eq!(
        engine.type_at(&path, ByteOffset(56)),
        Type::union([Type::int(), Type::string()])
    );
}

#[test]
fn type_at_out_of_range_offset_is_unknown() {
    let script = fixture::file("/src/empty.php", None, vec![], vec![]);
    let path = script.0.path().to_string();
    let engine = engine_with(vec![script], MapLocator(vec![]));
    assert_eq!(engine.type_at(&path, ByteOffset(4096)), Type::Unknown);
}

// ============================================================================
// Import Planning
// ============================================================================

#[test]
fn import_plan_for_single_candidate() {
    let source = SourceCode::from_string_and_path("<?php Foo", "/src/new.php");
    init_tracing();
    let mut engine = Engine::new(
        Box::new(StaticParser::new()),
        Box::new(MapLocator(vec![("Foo", vec!["Acme\\Foo"])])),
    );
    engine.open(source.clone());

    let plan = engine
        .plan_import("/src/new.php", ByteOffset(7), "Foo", None)
        .unwrap();
    match plan {
        Plan::SingleCandidate { import, edits } => {
            assert_eq!(import, NameImport::for_class("Acme\\Foo"));
            assert_eq!(edits.apply(source.text()), "<?php\n\nuse Acme\\Foo; Foo");
        }
        other => panic!("expected single candidate, got {other:?}"),
    }
}

#[test]
fn import_plan_for_single_global_candidate() {
    let source = SourceCode::from_string_and_path("<?php Foo", "/src/new.php");
    init_tracing();
    let mut engine = Engine::new(
        Box::new(StaticParser::new()),
        Box::new(MapLocator(vec![("Foo", vec!["Foo"])])),
    );
    engine.open(source.clone());

    // A global-namespace candidate in a global-namespace file still gets
    // the edit, not an already-resolvable answer.
    let plan = engine
        .plan_import("/src/new.php", ByteOffset(7), "Foo", None)
        .unwrap();
    match plan {
        Plan::SingleCandidate { import, edits } => {
            assert_eq!(import, NameImport::for_class("Foo"));
            assert_eq!(edits.apply(source.text()), "<?php\n\nuse Foo; Foo");
        }
        other => panic!("expected single candidate, got {other:?}"),
    }
}

#[test]
fn import_plan_surfaces_ambiguity_and_dead_ends() {
    let source = SourceCode::from_string_and_path("<?php Foo", "/src/new.php");
    init_tracing();
    let mut engine = Engine::new(
        Box::new(StaticParser::new()),
        Box::new(MapLocator(vec![("Foo", vec!["Foobar", "Barfoo"])])),
    );
    engine.open(source);

    // Choices surface in the locator's order.
    match engine
        .plan_import("/src/new.php", ByteOffset(7), "Foo", None)
        .unwrap()
    {
        Plan::MultipleCandidates { candidates } => {
            let fqns: Vec<&str> = candidates.iter().map(|c| c.class.as_str()).collect();
            assert_eq!(fqns, vec!["Foobar", "Barfoo"]);
        }
        other => panic!("expected multiple candidates, got {other:?}"),
    }
    match engine
        .plan_import("/src/new.php", ByteOffset(7), "Bar", None)
        .unwrap()
    {
        Plan::NoCandidates { name } => assert_eq!(name, "Bar"),
        other => panic!("expected no candidates, got {other:?}"),
    }

    // Ambiguity resolved by retrying with the chosen FQN.
    match engine
        .plan_import_qualified("/src/new.php", ByteOffset(7), "Barfoo", None)
        .unwrap()
    {
        Plan::SingleCandidate { import, .. } => {
            assert_eq!(import, NameImport::for_class("Barfoo"));
        }
        other => panic!("expected single candidate, got {other:?}"),
    }
}

#[test]
fn reimport_conflicts_are_errors() {
    let text = "<?php\nuse Acme\\Foo;\nFoo";
    let source = SourceCode::from_string_and_path(text, "/src/has_use.php");
    let ast = Ast {
        namespace: None,
        uses: vec![UseStatement {
            fqn: "Acme\\Foo".into(),
            alias: None,
            span: spyglass_core::Span::new(6, 19),
        }],
        items: vec![],
    };
    init_tracing();
    let mut engine = Engine::new(
        Box::new(StaticParser::new().with(text, ast)),
        Box::new(MapLocator(vec![("Foo", vec!["Acme\\Foo", "Other\\Foo"])])),
    );
    engine.open(source);

    // Importing the same class again is an error, not a silent no-op.
    let err = engine
        .plan_import_qualified("/src/has_use.php", ByteOffset(21), "Acme\\Foo", None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Import(ImportError::NameAlreadyImported { .. })
    ));

    // A second class with the same short name needs an alias.
    let err = engine
        .plan_import_qualified("/src/has_use.php", ByteOffset(21), "Other\\Foo", None)
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Import(ImportError::AliasAlreadyUsed { .. })
    ));
    let plan = engine
        .plan_import_qualified("/src/has_use.php", ByteOffset(21), "Other\\Foo", Some("OtherFoo"))
        .unwrap();
    assert!(matches!(plan, Plan::SingleCandidate { .. }));
}

// ============================================================================
// Incremental Behavior
// ============================================================================

#[test]
fn reopening_changed_content_updates_answers() {
    let v1 = fixture::file(
        "/lib/Shape.php",
        Some("Geo"),
        vec![],
        vec![Item::Decl(
            decl::class("Shape", (20, 120))
                .member(member::method("area", Visibility::Public, (40, 60)))
                .build(),
        )],
    );
    let v2 = fixture::file(
        "/lib/Shape.php",
        Some("Geo"),
        vec![],
        vec![Item::Decl(
            decl::class("Shape", (20, 120))
                .member(member::method("area", Visibility::Public, (40, 60)))
                .member(member::method("perimeter", Visibility::Public, (70, 100)))
                .build(),
        )],
    );
    init_tracing();
    let parser = StaticParser::new()
        .with(v1.0.text(), v1.1.clone())
        .with(v2.0.text(), v2.1.clone());
    let mut engine = Engine::new(Box::new(parser), Box::new(MapLocator(vec![])));

    engine.open(v1.0);
    assert!(engine.reflect("Geo\\Shape").unwrap().method("perimeter").is_none());

    engine.open(v2.0);
    assert!(engine.reflect("Geo\\Shape").unwrap().method("perimeter").is_some());
}
