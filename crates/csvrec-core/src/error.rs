//! Error types for csvrec-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in csvrec-core
#[derive(Debug, Error)]
pub enum Error {
    /// A field name that is not a column of the owning header
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A set-once property was assigned a second time
    #[error("{0} has already been set")]
    AlreadySet(&'static str),

    /// Header written after record output has started
    #[error("header cannot be written once records have been written")]
    AlreadyWriting,

    /// The input ended inside an unterminated quoted field
    #[error("unterminated quoted field at end of input")]
    MalformedInput,

    /// Invalid column mapping specification
    #[error("invalid column mapping: {0}")]
    Mapping(String),

    /// A required configuration key is absent
    #[error("missing configuration key '{0}'")]
    MissingKey(String),

    /// A configuration value has the wrong type
    #[error("configuration key '{key}' is not a {expected}")]
    BadValue { key: String, expected: &'static str },

    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
