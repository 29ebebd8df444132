//! Domain-specific errors for resolution sessions.
//!
//! [`FetchError`] and [`ParseError`] are recovered locally: they are recorded
//! against one repository or one file and never abort an operation. Only
//! [`SessionError`] escapes an operation.

use depset_schema::IdentifierError;
use thiserror::Error;

/// Why a repository descriptor could not be obtained.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("No descriptor found for '{0}'")]
    NotFound(String),

    #[error("Timed out after {secs}s fetching descriptor for '{id}'")]
    Timeout { id: String, secs: u64 },

    #[error("Transport error fetching '{id}': {message}")]
    Transport { id: String, message: String },

    #[error("Malformed descriptor for '{id}': {message}")]
    Malformed { id: String, message: String },

    #[error("Unresolvable dependency reference: {0}")]
    Unresolvable(#[from] IdentifierError),
}

impl FetchError {
    /// Create a transport error for `id`.
    pub fn transport(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Transport {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed-descriptor error for `id`.
    pub fn malformed(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Malformed {
            id: id.into(),
            message: message.to_string(),
        }
    }
}

/// Why a binary package's manifest could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Not a package archive: {0}")]
    Archive(String),

    #[error("Package does not contain {0}")]
    MissingManifest(&'static str),

    #[error("Manifest has no <App> element")]
    MissingApp,

    #[error("Manifest <App> element has no '{0}' attribute")]
    MissingAttribute(&'static str),

    #[error("Timed out after {0}s reading package manifest")]
    Timeout(u64),

    #[error("Manifest reader failed: {0}")]
    Task(String),
}

/// Errors that abort a session operation.
///
/// An aborted operation leaves the session exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session was cancelled")]
    Cancelled,
}
