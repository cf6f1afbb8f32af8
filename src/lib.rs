//! # Multivio Intent
//!
//! Multilingual intent detection for chat messages.
//!
//! ## Features
//!
//! - Declarative regex pattern sets per intent category
//! - Nearest-example embedding classification with a pluggable text encoder
//! - Conflict resolution with a total precedence order
//! - Structured parameter extraction per intent
//! - Feedback loop that grows the example bank at runtime

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod intent;

pub mod prelude {
    pub use crate::config::DetectorConfig;
    pub use crate::embedding::{HashingTextEmbedder, TextEmbedder, Vector};
    pub use crate::error::{IntentError, Result};
    pub use crate::intent::{
        DetectionResult, DispatchPlan, IntentCategory, IntentDetector, IntentExampleBank,
        IntentMatch, IntentParams,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
