//! Command line argument parsing for the multivio-intent CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::embedding::hashing_embedder::DEFAULT_DIMENSION;
use crate::intent::IntentCategory;

/// multivio-intent - Multilingual intent detection for chat messages
#[derive(Parser, Debug, Clone)]
#[command(name = "multivio-intent")]
#[command(about = "Detect the action intents of chat messages")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct IntentArgs {
    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Detector configuration file (JSON)
    #[arg(long, value_name = "CONFIG_FILE", env = "MULTIVIO_INTENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl IntentArgs {
    /// Get the effective verbosity level (0 = quiet, 1 = default)
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Detect the intents of a message
    Detect(DetectArgs),

    /// Run the parameter extractor of one category
    Extract(ExtractArgs),

    /// Show the pattern score of every category
    Score(ScoreArgs),

    /// Detect intents and show the resulting dispatch plan
    Plan(DetectArgs),

    /// List the pattern table
    Patterns(PatternsArgs),
}

/// Arguments for detection
#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    /// Message to classify
    #[arg(value_name = "MESSAGE")]
    pub message: String,

    /// Text encoder for the embedding path
    #[arg(short, long, default_value = "none")]
    pub encoder: EncoderKind,

    /// Dimension of the hashing encoder
    #[arg(long, default_value_t = DEFAULT_DIMENSION)]
    pub dimension: usize,

    /// Model identifier for the candle encoder
    #[arg(long, value_name = "MODEL_ID")]
    pub model: Option<String>,

    /// Example bank file (JSON map of label to examples)
    #[arg(long, value_name = "EXAMPLES_FILE")]
    pub examples: Option<PathBuf>,
}

/// Arguments for running one extractor
#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    /// Intent category (e.g. web_search, local_search)
    #[arg(value_name = "CATEGORY")]
    pub category: IntentCategory,

    /// Message to extract from
    #[arg(value_name = "MESSAGE")]
    pub message: String,
}

/// Arguments for pattern scoring
#[derive(Parser, Debug, Clone)]
pub struct ScoreArgs {
    /// Message to score
    #[arg(value_name = "MESSAGE")]
    pub message: String,
}

/// Arguments for listing patterns
#[derive(Parser, Debug, Clone)]
pub struct PatternsArgs {
    /// Only list the patterns of this category
    #[arg(short, long)]
    pub category: Option<IntentCategory>,
}

/// Text encoders selectable from the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncoderKind {
    /// Pattern scoring only
    None,
    /// Model-free hashing encoder
    Hashing,
    /// Sentence transformer via candle (needs the embeddings-candle feature)
    Candle,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
