//! Error types for keysweep

use thiserror::Error;

/// Errors that can occur while setting up or running a key sweep.
///
/// Per-key outcomes are never errors: a key that cannot be verified ends up
/// with an `Invalid` verdict and the run continues. The only batch-level
/// failure is empty input, rejected before any request is sent.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Input parsed to zero credentials
    #[error("no API keys found in input (empty or all-blank lines)")]
    EmptyInput,

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(String),

    /// IO error (reading input, writing exports)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (export)
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for CheckError {
    fn from(err: reqwest::Error) -> Self {
        CheckError::Http(err.to_string())
    }
}
