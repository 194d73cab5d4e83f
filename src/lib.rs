//! Static code intelligence for PHP: reflection, flow-sensitive type
//! inference, and import planning over position-annotated parse trees.
//!
//! The [`Engine`] is the front door: open source snapshots, then ask
//! offset-addressed questions.
//!
//! ```
//! use spyglass::Engine;
//! use spyglass_core::{ByteOffset, SourceCode};
//! use spyglass_php::ast::{Item, Visibility};
//! use spyglass_php::fixture::{self, decl, member, StaticParser};
//! use spyglass_php::imports::{ClassCandidate, ClassLocator};
//!
//! struct NoCandidates;
//! impl ClassLocator for NoCandidates {
//!     fn candidates(&self, _short_name: &str) -> Vec<ClassCandidate> {
//!         Vec::new()
//!     }
//! }
//!
//! let (source, ast) = fixture::file(
//!     "/lib/Badger.php",
//!     Some("Animals"),
//!     vec![],
//!     vec![Item::Decl(
//!         decl::class("Badger", (20, 120))
//!             .member(member::method("dig", Visibility::Public, (40, 60)))
//!             .build(),
//!     )],
//! );
//! let parser = StaticParser::new().with(source.text(), ast);
//! let mut engine = Engine::new(Box::new(parser), Box::new(NoCandidates));
//! engine.open(source);
//!
//! let badger = engine.reflect("Animals\\Badger").unwrap();
//! assert!(badger.method("dig").is_some());
//! ```
//!
//! The parser and the project-wide class search are collaborators behind
//! the [`spyglass_php::Parser`] and [`spyglass_php::ClassLocator`] traits;
//! this crate never reads PHP syntax itself.

pub mod dump;
pub mod engine;
pub mod error;

pub use dump::{DumpError, Dumper, DumperRegistry, JsonDumper, TextDumper};
pub use engine::Engine;
pub use error::EngineError;

pub use spyglass_core::{ByteOffset, SourceCode, Span, TextEdit, TextEdits};
pub use spyglass_php::{
    ImportError, NameImport, Plan, ReflectError, ReflectorOptions, ResolvedClass, Type,
};
