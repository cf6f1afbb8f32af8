//! Command implementations for the multivio-intent CLI.

use std::sync::Arc;

use log::{info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::DetectorConfig;
use crate::embedding::{HashingTextEmbedder, TextEmbedder};
use crate::error::Result;
use crate::intent::extractor::extract;
use crate::intent::patterns::{pattern_set, pattern_sets};
use crate::intent::scorer::score_from_count;
use crate::intent::{DispatchPlan, EmbeddingClassifier, IntentCategory, IntentDetector, IntentExampleBank};

/// Execute a CLI command.
pub async fn execute_command(args: IntentArgs) -> Result<()> {
    let config = load_config(&args)?;
    match &args.command {
        Command::Detect(detect_args) => detect(detect_args, config, &args).await,
        Command::Extract(extract_args) => extract_params(extract_args, &args),
        Command::Score(score_args) => score_message(score_args, &config, &args),
        Command::Plan(plan_args) => plan(plan_args, config, &args).await,
        Command::Patterns(patterns_args) => list_patterns(patterns_args, &args),
    }
}

fn load_config(args: &IntentArgs) -> Result<DetectorConfig> {
    match &args.config {
        Some(path) => {
            info!("Loading detector configuration from {}", path.display());
            DetectorConfig::from_json_file(path)
        }
        None => Ok(DetectorConfig::default()),
    }
}

/// The encoder selected on the command line.
///
/// A model that cannot be loaded leaves the detector on patterns only.
fn build_encoder(args: &DetectArgs) -> Result<Option<Arc<dyn TextEmbedder>>> {
    match args.encoder {
        EncoderKind::None => Ok(None),
        EncoderKind::Hashing => Ok(Some(Arc::new(HashingTextEmbedder::new(args.dimension)?))),
        EncoderKind::Candle => Ok(load_candle_encoder(args.model.as_deref())),
    }
}

#[cfg(feature = "embeddings-candle")]
fn load_candle_encoder(model: Option<&str>) -> Option<Arc<dyn TextEmbedder>> {
    use crate::embedding::CandleTextEmbedder;
    use crate::embedding::candle_text_embedder::DEFAULT_MODEL;

    let model = model.unwrap_or(DEFAULT_MODEL);
    match CandleTextEmbedder::new(model) {
        Ok(embedder) => Some(Arc::new(embedder)),
        Err(e) => {
            warn!("Could not load {model}, using patterns only: {e}");
            None
        }
    }
}

#[cfg(not(feature = "embeddings-candle"))]
fn load_candle_encoder(_model: Option<&str>) -> Option<Arc<dyn TextEmbedder>> {
    warn!("Built without the embeddings-candle feature, using patterns only");
    None
}

async fn build_detector(args: &DetectArgs, config: DetectorConfig) -> Result<IntentDetector> {
    let Some(encoder) = build_encoder(args)? else {
        return Ok(IntentDetector::new(config));
    };

    let bank = match &args.examples {
        Some(path) => IntentExampleBank::from_json_file(path)?,
        None => IntentExampleBank::default(),
    };
    let detector = IntentDetector::with_classifier(config, EmbeddingClassifier::new(encoder, bank));
    detector.warm_up().await;
    Ok(detector)
}

fn encoder_label(detector: &IntentDetector) -> String {
    detector
        .classifier()
        .map(|c| c.encoder_name().to_string())
        .unwrap_or_else(|| "none".to_string())
}

async fn detect(args: &DetectArgs, config: DetectorConfig, cli_args: &IntentArgs) -> Result<()> {
    let detector = build_detector(args, config).await?;
    let intents = detector.detect_intents(&args.message).await;

    let output = DetectionOutput {
        message: args.message.clone(),
        encoder: encoder_label(&detector),
        embedding_active: detector.classifier().is_some_and(|c| c.is_ready()),
        primary: intents.primary().map(|(category, _)| category),
        intents,
    };
    output_result(&format!("Message: {}", args.message), &output, cli_args)
}

async fn plan(args: &DetectArgs, config: DetectorConfig, cli_args: &IntentArgs) -> Result<()> {
    let detector = build_detector(args, config).await?;
    let intents = detector.detect_intents(&args.message).await;
    let plan = DispatchPlan::from_result(&intents);

    let output = PlanOutput {
        message: args.message.clone(),
        intents,
        plan,
    };
    output_result(&format!("Message: {}", args.message), &output, cli_args)
}

fn extract_params(args: &ExtractArgs, cli_args: &IntentArgs) -> Result<()> {
    let output = ExtractionOutput {
        category: args.category,
        params: extract(args.category, &args.message),
    };
    output_result(&format!("Message: {}", args.message), &output, cli_args)
}

fn score_message(args: &ScoreArgs, config: &DetectorConfig, cli_args: &IntentArgs) -> Result<()> {
    let scores = pattern_sets()
        .iter()
        .map(|set| {
            let matches = set.match_count(&args.message);
            CategoryScore {
                category: set.category(),
                score: score_from_count(matches, set.len()),
                matches,
                patterns: set.len(),
                threshold: match set.category() {
                    IntentCategory::Calculation => config.calculation_threshold,
                    _ => config.pattern_threshold,
                },
            }
        })
        .collect();

    let output = ScoreOutput {
        message: args.message.clone(),
        scores,
    };
    output_result(&format!("Message: {}", args.message), &output, cli_args)
}

fn list_patterns(args: &PatternsArgs, cli_args: &IntentArgs) -> Result<()> {
    let sets: Vec<_> = match args.category {
        Some(category) => pattern_set(category).into_iter().collect(),
        None => pattern_sets().iter().collect(),
    };

    let listings: Vec<PatternListing> = sets
        .into_iter()
        .map(|set| PatternListing {
            category: set.category(),
            patterns: set.sources().iter().map(|p| p.to_string()).collect(),
        })
        .collect();
    output_result("Pattern table", &listings, cli_args)
}
