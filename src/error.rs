//! Error types for the quill support core.

/// Top-level error type for the text-expansion support core.
#[derive(Debug, thiserror::Error)]
pub enum ExpanderError {
    /// Preferences load/save error.
    #[error("preferences error: {0}")]
    Prefs(String),

    /// Update check error (version query, manifest parse).
    #[error("update error: {0}")]
    Update(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// Logging setup error.
    #[error("logging error: {0}")]
    Logging(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ExpanderError>;
