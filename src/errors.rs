//! Error types for lindol.
//!
//! Uses `thiserror` for library-style error definitions.

use thiserror::Error;

/// Errors that can occur in lindol operations.
#[derive(Error, Debug)]
pub enum LindolError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// API returned an error status
    #[error("seismic API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Feed payload carried an error descriptor instead of events
    #[error("feed error: {0}")]
    Feed(String),
}
