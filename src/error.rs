//! Error types for markfind.
//!
//! Pattern, connection and restricted-context failures are the three kinds a
//! caller is expected to tell apart; IO and JSON errors come from the
//! terminal host, the history file and the serve transport.

/// Result type alias for markfind operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pattern failed to compile; carries the diagnostic verbatim
    #[error("{0}")]
    Pattern(String),

    /// The document behind the target cannot be reached
    #[error("Cannot connect to the document: {0}. Reload it or try another one")]
    Connection(String),

    /// The target is a privileged location where searching is disallowed
    #[error("Searching is not allowed on {0}. Switch to a regular page and retry")]
    RestrictedContext(String),

    /// A leaf changed between location and highlighting
    #[error("Document changed during search (node {0})")]
    DocumentChanged(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Short category name used in status lines and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Pattern(_) => "pattern",
            Error::Connection(_) => "connection",
            Error::RestrictedContext(_) => "restricted",
            Error::DocumentChanged(_) => "document",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}
