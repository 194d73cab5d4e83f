//! Dumpers: render a reflected class for humans or machines.
//!
//! A [`Dumper`] turns a [`ResolvedClass`] into text. The registry maps
//! format names to dumpers and reports the known names when asked for one
//! it does not have, so a typo in a format name is a useful error.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use spyglass_core::{text, SourceCode};
use spyglass_php::reflect::{ResolvedClass, ResolvedMember};
use spyglass_php::symbols::MemberKind;
use spyglass_php::Type;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("unknown dumper \"{name}\", known dumpers: {known}")]
    UnknownDumper { name: String, known: String },

    #[error("dump serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Renders one reflected class. The source snapshot of the defining file
/// is passed when available, for position rendering.
pub trait Dumper {
    fn dump(&self, source: Option<&SourceCode>, class: &ResolvedClass)
        -> Result<String, DumpError>;
}

// ============================================================================
// Registry
// ============================================================================

/// Named dumpers; `text` and `json` are registered by default.
pub struct DumperRegistry {
    dumpers: BTreeMap<String, Box<dyn Dumper>>,
}

impl Default for DumperRegistry {
    fn default() -> Self {
        let mut registry = DumperRegistry {
            dumpers: BTreeMap::new(),
        };
        registry.register("text", Box::new(TextDumper));
        registry.register("json", Box::new(JsonDumper));
        registry
    }
}

impl DumperRegistry {
    pub fn register(&mut self, name: impl Into<String>, dumper: Box<dyn Dumper>) {
        self.dumpers.insert(name.into(), dumper);
    }

    pub fn get(&self, name: &str) -> Result<&dyn Dumper, DumpError> {
        self.dumpers
            .get(name)
            .map(|d| d.as_ref())
            .ok_or_else(|| DumpError::UnknownDumper {
                name: name.to_string(),
                known: self
                    .dumpers
                    .keys()
                    .map(|k| format!("\"{}\"", k))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.dumpers.keys().map(String::as_str)
    }
}

// ============================================================================
// Text
// ============================================================================

/// Human-readable dump: one header line, then constants, properties, and
/// methods with their declared types and definition positions.
pub struct TextDumper;

impl Dumper for TextDumper {
    fn dump(
        &self,
        source: Option<&SourceCode>,
        class: &ResolvedClass,
    ) -> Result<String, DumpError> {
        let mut out = String::new();
        let _ = writeln!(out, "{} {}", kind_keyword(&class.declaration.kind), class.fqn());

        let constants: Vec<_> = class.constants().collect();
        if !constants.is_empty() {
            out.push_str("constants:\n");
            for member in constants {
                let _ = writeln!(out, "  {}", render_member(source, class, member));
            }
        }
        let properties: Vec<_> = class.properties().collect();
        if !properties.is_empty() {
            out.push_str("properties:\n");
            for member in properties {
                let _ = writeln!(out, "  {}", render_member(source, class, member));
            }
        }
        out.push_str("methods:\n");
        for member in class.methods() {
            let _ = writeln!(out, "  {}", render_member(source, class, member));
        }
        for conflict in &class.conflicts {
            let _ = writeln!(
                out,
                "conflict: method {} provided by {}",
                conflict.method,
                conflict.providers.join(", ")
            );
        }
        Ok(out)
    }
}

fn render_member(source: Option<&SourceCode>, class: &ResolvedClass, member: &ResolvedMember) -> String {
    let m = &member.member;
    let mut line = match &m.kind {
        MemberKind::Method {
            params,
            return_type,
        } => {
            let params = params
                .iter()
                .map(|p| format!("${}: {}", p.name, p.ty))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{} function {}({}): {}",
                m.visibility.as_str(),
                m.name,
                params,
                render_type(return_type.as_ref())
            )
        }
        MemberKind::Property { type_hint } => format!(
            "{} ${}: {}",
            m.visibility.as_str(),
            m.name,
            render_type(type_hint.as_ref())
        ),
        MemberKind::Constant { value_type } => format!(
            "{} const {}: {}",
            m.visibility.as_str(),
            m.name,
            render_type(value_type.as_ref())
        ),
    };
    if m.owner != class.fqn() {
        let _ = write!(line, "  (from {})", m.owner);
    } else if let Some(source) = source {
        let (row, col) = text::byte_offset_to_position(source.text(), m.signature_span.start);
        let _ = write!(line, "  ({}:{})", row, col);
    }
    line
}

fn kind_keyword(kind: &spyglass_php::ast::DeclKind) -> &'static str {
    use spyglass_php::ast::DeclKind;
    match kind {
        DeclKind::Class => "class",
        DeclKind::Interface => "interface",
        DeclKind::Trait => "trait",
        DeclKind::Enum => "enum",
        DeclKind::Function => "function",
    }
}

fn render_type(ty: Option<&Type>) -> String {
    match ty {
        Some(t) => t.to_string(),
        None => Type::Unknown.to_string(),
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Machine-readable dump: the resolved class serialized as pretty JSON.
pub struct JsonDumper;

impl Dumper for JsonDumper {
    fn dump(
        &self,
        _source: Option<&SourceCode>,
        class: &ResolvedClass,
    ) -> Result<String, DumpError> {
        Ok(serde_json::to_string_pretty(class)?)
    }
}
