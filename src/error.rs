//! Error type for the fallible edges of the crate.
//!
//! Builder operations never fail. Errors only come from turning names into
//! node or mark types and from the JSON/I/O boundary used by the CLI.

use thiserror::Error;

/// Errors produced by name parsing and (de)serialization.
#[derive(Debug, Error)]
pub enum Error {
    /// A node type name that is not part of the schema.
    #[error("unknown node type `{0}`")]
    UnknownNodeType(String),

    /// A mark type name that is not a known formatting mark.
    #[error("unknown mark type `{0}`")]
    UnknownMarkType(String),

    /// Event input or document output could not be (de)serialized.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading events or writing the document failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
