//! Error types for papershelf-core

use thiserror::Error;

use crate::gateway::GatewayError;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;

/// Main error type for library operations
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Input matched none of the known identifier shapes
    #[error("unrecognized identifier: {0}")]
    UnrecognizedIdentifier(String),

    /// No paper with this bibcode is stored
    #[error("paper not found in library: {0}")]
    RecordNotFound(String),

    /// Name is neither a paper attribute nor a registered tag
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Tag is not registered
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// Paper is already in the library
    #[error("paper already in library: {0}")]
    DuplicateRecord(String),

    /// Value must be unique and another paper or tag already uses it
    #[error("{attribute} '{value}' is already in use")]
    DuplicateValue { attribute: String, value: String },

    /// Malformed input: wrong type, disallowed characters, empty text
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Catalog lookups failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The underlying database failed
    #[error("storage error: {0}")]
    Storage(String),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<papershelf_identifiers::IdentifierError> for LibraryError {
    fn from(e: papershelf_identifiers::IdentifierError) -> Self {
        match e {
            papershelf_identifiers::IdentifierError::Unrecognized(text) => {
                LibraryError::UnrecognizedIdentifier(text)
            }
        }
    }
}

/// Wrap a SQLite error with the operation it came from.
pub(crate) fn storage(context: &'static str) -> impl FnOnce(rusqlite::Error) -> LibraryError {
    move |e| LibraryError::Storage(format!("{}: {}", context, e))
}
