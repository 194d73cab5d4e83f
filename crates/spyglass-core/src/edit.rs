//! Text edits: span-addressed replacements with atomic, non-overlapping apply.
//!
//! A [`TextEdits`] collection is ordered by start offset and rejects
//! overlapping members at construction. Applying the edits to the original
//! text in descending offset order yields the edited result without any
//! offset fixups.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::span::Span;

/// A single replacement of a byte range with new text.
///
/// An empty span is an insertion at that position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub span: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(span: Span, new_text: impl Into<String>) -> Self {
        TextEdit {
            span,
            new_text: new_text.into(),
        }
    }

    /// An insertion at a single byte position.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        TextEdit::new(Span::at(offset), text)
    }
}

/// Errors constructing a [`TextEdits`] collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextEditError {
    /// Two edits share byte positions. Overlap is a construction error, not
    /// something resolved at apply time.
    #[error("overlapping edits: {first} and {second}")]
    Overlapping { first: Span, second: Span },
}

/// An ordered, non-overlapping collection of text edits.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextEdits {
    edits: Vec<TextEdit>,
}

impl TextEdits {
    /// Build a collection from edits, sorting by start offset.
    ///
    /// Returns an error if any two edits overlap. Two insertions at the same
    /// position also conflict: their relative order would be ambiguous.
    pub fn new(mut edits: Vec<TextEdit>) -> Result<Self, TextEditError> {
        edits.sort_by_key(|e| (e.span.start, e.span.end));
        for pair in edits.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.span.overlaps(&b.span) || a.span == b.span {
                return Err(TextEditError::Overlapping {
                    first: a.span,
                    second: b.span,
                });
            }
        }
        Ok(TextEdits { edits })
    }

    /// A collection holding a single edit.
    pub fn one(edit: TextEdit) -> Self {
        TextEdits { edits: vec![edit] }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextEdit> {
        self.edits.iter()
    }

    /// Apply all edits to the original text.
    ///
    /// Edits are applied in descending start-offset order so earlier spans
    /// remain valid while later ones are rewritten. Spans beyond the text
    /// are clamped to its length.
    pub fn apply(&self, text: &str) -> String {
        let mut result = text.to_string();
        for edit in self.edits.iter().rev() {
            let start = edit.span.start.min(result.len());
            let end = edit.span.end.min(result.len());
            result.replace_range(start..end, &edit.new_text);
        }
        result
    }
}

impl IntoIterator for TextEdits {
    type Item = TextEdit;
    type IntoIter = std::vec::IntoIter<TextEdit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.into_iter()
    }
}
