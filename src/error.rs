//! Error types for schedule block operations.

/// Result type for schedule block operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for schedule block operations
///
/// Structural gaps in schedule data are never reported here; they are
/// repaired where they are found.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid schedule data: {0}")]
    InvalidEnvelope(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schedule block is read-only")]
    ReadOnly,

    #[error("No day at index {0}")]
    UnknownDay(usize),

    #[error("No schedule item with id {0}")]
    UnknownItem(String),

    #[error("No schedule block at index {0}")]
    UnknownBlock(usize),

    #[error("Host rejected the request: {0}")]
    Host(String),

    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),
}
