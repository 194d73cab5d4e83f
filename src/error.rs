//! The engine's error surface, bridging the per-subsystem error enums.

use spyglass_php::imports::ImportError;
use spyglass_php::reflect::ReflectError;
use thiserror::Error;

use crate::dump::DumpError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The query named a path no open file has.
    #[error("no open file at '{path}'")]
    UnknownFile { path: String },

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Dump(#[from] DumpError),
}
