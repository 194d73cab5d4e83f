//! Core infrastructure for spyglass.
//!
//! This crate holds the value types every spyglass component shares:
//!
//! - [`SourceCode`]: immutable source snapshot identified by content hash
//! - [`ByteOffset`] / [`Span`]: the byte-addressed query coordinate system
//! - [`TextEdit`] / [`TextEdits`]: planned, non-overlapping document edits
//! - [`text`]: byte offset to line:column conversions for display
//!
//! Nothing here is language-specific; the PHP analysis lives in
//! `spyglass-php` and consumes these types.

pub mod edit;
pub mod source;
pub mod span;
pub mod text;

pub use edit::{TextEdit, TextEditError, TextEdits};
pub use source::{ByteOffset, ContentHash, SourceCode};
pub use span::Span;
