//! Error types for the records crate.
//!
//! Only the parsing entry points return these. Individual malformed
//! entries inside a payload are skipped or defaulted, never surfaced here.

use thiserror::Error;

/// Errors that can occur while loading or parsing restaurant payloads
#[derive(Error, Debug)]
pub enum RecordError {
    /// Fixture file could not be found
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a payload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload was not valid JSON or did not have the expected envelope
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The Places service answered with a non-success status
    ///
    /// `ZERO_RESULTS` is not an error; it simply yields an empty list.
    #[error("Places API returned status {status}: {message}")]
    ApiStatus { status: String, message: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecordError>;
