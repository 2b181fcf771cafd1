//! Error types for the Navigator domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The highlighting
//! boundary has its own error type; everything else folds in here.

use crate::highlight::HighlightError;
use thiserror::Error;

/// The top-level error type for Navigator operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- DOM highlighting ---
    #[error("Highlight error: {0}")]
    Highlight(#[from] HighlightError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- I/O ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;
