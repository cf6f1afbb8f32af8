//! Error types for the intent detection library.
//!
//! All fallible operations return [`IntentError`] through the crate-wide
//! [`Result`] alias. Note that the top-level detection entry point,
//! [`IntentDetector::detect_intents`](crate::intent::IntentDetector::detect_intents),
//! never returns an error: embedding and language failures are logged and
//! absorbed there.
//!
//! # Examples
//!
//! ```
//! use multivio_intent::error::{IntentError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(IntentError::invalid_config("threshold out of range"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for intent detection operations.
#[derive(Error, Debug)]
pub enum IntentError {
    /// I/O errors (config and example bank files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid regular expression in a pattern table
    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Text encoder failures (model load, tokenization, forward pass)
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// The embedding classifier is not configured or was disabled
    #[error("Embedding classifier unavailable")]
    EmbeddingUnavailable,

    /// Language identification failures
    #[error("Language detection error: {0}")]
    Language(String),

    /// Invalid configuration values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A label that does not name an intent category
    #[error("Unknown intent category: {0}")]
    UnknownCategory(String),

    /// Feedback storage errors
    #[error("Feedback error: {0}")]
    Feedback(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with IntentError.
pub type Result<T> = std::result::Result<T, IntentError>;

impl IntentError {
    /// Create a new embedding error.
    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        IntentError::Embedding(msg.into())
    }

    /// Create a new language detection error.
    pub fn language<S: Into<String>>(msg: S) -> Self {
        IntentError::Language(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        IntentError::InvalidConfig(msg.into())
    }

    /// Create a new unknown category error.
    pub fn unknown_category<S: Into<String>>(msg: S) -> Self {
        IntentError::UnknownCategory(msg.into())
    }

    /// Create a new feedback error.
    pub fn feedback<S: Into<String>>(msg: S) -> Self {
        IntentError::Feedback(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        IntentError::Other(format!("Invalid argument: {}", msg.into()))
    }
}
