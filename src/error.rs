//! Error types for tablechat.

use thiserror::Error;

/// Failure kinds surfaced by the request-to-response pipeline.
///
/// Document rendering has no variant: a failed render is signalled as an
/// absent result (`None`) and never propagates.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The chat-completion service was unreachable or returned no usable text.
    #[error("completion error: {0}")]
    Completion(String),

    /// The generated SQL failed to execute. Carries the driver's message
    /// verbatim so the user can diagnose the statement.
    #[error("SQL execution failed: {0}")]
    Execution(String),

    /// The chart-extraction response did not match the expected shape.
    #[error("chart extraction failed: {0}")]
    Extraction(String),

    /// Database failures outside statement execution (opening the file,
    /// enumerating the catalog).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for tablechat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
