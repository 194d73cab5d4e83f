//! Import planning: turn an unresolved class name into a `use` statement
//! edit, or report why no edit is needed or possible.
//!
//! The planner is pure: candidates come from a [`ClassLocator`]
//! collaborator, and the outcome is a [`Plan`] describing what should
//! happen, including the exact text edits for the single-candidate case.
//! Ambiguity (several candidates) and dead ends (none) are plan variants,
//! not errors; errors are reserved for imports that conflict with the
//! file's existing bindings.

use serde::{Deserialize, Serialize};
use spyglass_core::{ByteOffset, SourceCode, TextEdit, TextEdits};
use thiserror::Error;
use tracing::debug;

use crate::names::{last_segment, ImportTable, NameImport};
use crate::symbols::FileSymbols;

// ============================================================================
// Collaborators
// ============================================================================

/// Looks up candidate classes for a short name, project-wide.
///
/// Backed by whatever index the host has (a composer classmap, a file
/// scan); the planner only needs the candidate FQNs.
pub trait ClassLocator {
    fn candidates(&self, short_name: &str) -> Vec<ClassCandidate>;
}

/// One candidate class for an unresolved short name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCandidate {
    pub class: String,
}

impl ClassCandidate {
    pub fn new(class: impl Into<String>) -> Self {
        ClassCandidate {
            class: class.into(),
        }
    }
}

// ============================================================================
// Plans and Errors
// ============================================================================

/// The planner's verdict for one unresolved name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Plan {
    /// The name already resolves here (declared in this namespace); no
    /// import needed.
    AlreadyResolvable { fqn: String },
    /// Exactly one candidate: the import to add and the edits that add it.
    SingleCandidate {
        import: NameImport,
        edits: TextEdits,
    },
    /// Several candidates; the caller must choose and retry qualified.
    MultipleCandidates { candidates: Vec<ClassCandidate> },
    /// Nothing in the project declares this name.
    NoCandidates { name: String },
}

/// Conflicts between a requested import and the file's existing bindings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    /// The short name the import would bind is already taken by an import
    /// of a different class. Retry with an alias.
    #[error("alias '{requested}' is already used by import of '{existing}'")]
    AliasAlreadyUsed { existing: String, requested: String },

    /// The class is already imported in this file; re-importing it is a
    /// caller mistake, not a no-op.
    #[error("name '{name}' is already imported from '{existing}'")]
    NameAlreadyImported { existing: String, name: String },
}

// ============================================================================
// Planner
// ============================================================================

/// Plans `use` statement insertions for one file at a time.
pub struct ImportPlanner<'a> {
    locator: &'a dyn ClassLocator,
}

impl<'a> ImportPlanner<'a> {
    pub fn new(locator: &'a dyn ClassLocator) -> Self {
        ImportPlanner { locator }
    }

    /// Plan an import for the unresolved short name under the caret.
    pub fn plan(
        &self,
        source: &SourceCode,
        symbols: &FileSymbols,
        offset: ByteOffset,
        name: &str,
        alias: Option<&str>,
    ) -> Result<Plan, ImportError> {
        // A declaration in this file already binds the name.
        if let Some(decl) = symbols.declarations.iter().find(|d| d.name == name) {
            return Ok(Plan::AlreadyResolvable {
                fqn: decl.fqn.clone(),
            });
        }
        // Locator order is the presentation order; only exact duplicates drop.
        let mut candidates = self.locator.candidates(name);
        let mut seen: Vec<String> = Vec::new();
        candidates.retain(|c| {
            if seen.contains(&c.class) {
                false
            } else {
                seen.push(c.class.clone());
                true
            }
        });
        debug!(
            name,
            %offset,
            candidates = candidates.len(),
            "located import candidates"
        );
        match candidates.len() {
            0 => Ok(Plan::NoCandidates {
                name: name.to_string(),
            }),
            1 => {
                let fqn = candidates.remove(0).class;
                self.plan_qualified(source, symbols, offset, &fqn, alias)
            }
            _ => Ok(Plan::MultipleCandidates { candidates }),
        }
    }

    /// Plan an import of a known FQN, skipping the locator.
    pub fn plan_qualified(
        &self,
        source: &SourceCode,
        symbols: &FileSymbols,
        offset: ByteOffset,
        fqn: &str,
        alias: Option<&str>,
    ) -> Result<Plan, ImportError> {
        let fqn = fqn.trim_start_matches('\\');
        debug!(fqn, %offset, "planning qualified import");
        let imports = &symbols.imports;

        if let Some(entry) = imports.find_fqn(fqn) {
            return Err(ImportError::NameAlreadyImported {
                existing: entry.import.fqn.clone(),
                name: entry.import.short_name().to_string(),
            });
        }

        let import = match alias {
            Some(alias) => NameImport::aliased(fqn, alias),
            None => NameImport::for_class(fqn),
        };
        if let Some(entry) = imports.find_short(import.short_name()) {
            return Err(ImportError::AliasAlreadyUsed {
                existing: entry.import.fqn.clone(),
                requested: import.short_name().to_string(),
            });
        }

        // Same declared namespace: resolvable without any import. A global
        // name in a global-namespace file still gets an explicit edit.
        if alias.is_none()
            && imports.namespace.is_some()
            && namespace_of(fqn) == imports.namespace.as_deref()
        {
            return Ok(Plan::AlreadyResolvable {
                fqn: fqn.to_string(),
            });
        }

        let edits = build_use_edit(source, imports, &import);
        Ok(Plan::SingleCandidate { import, edits })
    }
}

/// The edit inserting a `use` statement at its canonical position:
/// alphabetically within an existing use block, after the namespace
/// declaration, or after the opening tag.
fn build_use_edit(source: &SourceCode, imports: &ImportTable, import: &NameImport) -> TextEdits {
    let statement = import.to_use_statement();
    let edit = if let Some(entries) = non_empty(imports) {
        match entries.iter().find(|e| e.import.fqn > import.fqn) {
            Some(after) => TextEdit::insert(after.span.start, format!("{}\n", statement)),
            None => {
                let last = &entries[entries.len() - 1];
                TextEdit::insert(last.span.end, format!("\n{}", statement))
            }
        }
    } else if let Some(ns) = imports.namespace_span {
        TextEdit::insert(ns.end, format!("\n\n{}", statement))
    } else {
        TextEdit::insert(open_tag_end(source), format!("\n\n{}", statement))
    };
    TextEdits::one(edit)
}

fn non_empty(imports: &ImportTable) -> Option<&[crate::names::ImportEntry]> {
    if imports.is_empty() {
        None
    } else {
        Some(imports.entries())
    }
}

/// End of the `<?php` opening tag, where a use block starts in a file
/// with no namespace. Files without the tag insert at the very start.
fn open_tag_end(source: &SourceCode) -> usize {
    if source.text().starts_with("<?php") {
        5
    } else {
        0
    }
}

/// Namespace part of an FQN, `None` for a global name.
fn namespace_of(fqn: &str) -> Option<&str> {
    let short = last_segment(fqn);
    if short.len() == fqn.len() {
        None
    } else {
        Some(&fqn[..fqn.len() - short.len() - 1])
    }
}

// ============================================================================
// Tests
// ============================================================================
