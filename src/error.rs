//! Error types for the dictionary parser library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dictionary parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while deserializing a token into a field tree.
///
/// These never abort a whole parse. A failing field reports one of these to its
/// parent composite, which stops binding and passes the failure further up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A leaf token could not be converted to the field's primitive type
    #[error("cannot convert {token:?} to {type_name} for field `{field}`")]
    Conversion {
        field: String,
        type_name: &'static str,
        token: String,
    },

    /// A composite or array token does not follow its structural grammar
    #[error("malformed token for field `{field}`: {reason}")]
    SplitFormat { field: String, reason: String },

    /// Number of split tokens differs from the number of child fields
    #[error("field `{field}` has {expected} sub fields but the token split into {actual} items")]
    CountMismatch {
        field: String,
        expected: usize,
        actual: usize,
    },

    /// A child with the same name already exists in the container
    #[error("duplicated field name `{0}`")]
    DuplicateName(String),

    /// No factory is registered under this type name
    #[error("unknown field type `{0}`")]
    UnknownType(String),
}

/// Errors that can occur when reading dictionary files or writing parsed records.
#[derive(Error, Debug)]
pub enum Error {
    /// A header or data source could not be opened
    #[error("cannot open {}: {source}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Field deserialization or schema construction error
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Registry initialization error
    #[error("Registry error: {0}")]
    Registry(String),

    /// Output format error (e.g., JSON encoding failure)
    #[error("Output error: {0}")]
    Output(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Output(err.to_string())
    }
}
