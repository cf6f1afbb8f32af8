//! Output formatting for CLI commands.

use serde::Serialize;

use crate::cli::args::{IntentArgs, OutputFormat};
use crate::error::Result;
use crate::intent::{DetectionResult, DispatchPlan, IntentCategory, IntentMatch, IntentParams};

/// Result of the `detect` command.
#[derive(Debug, Serialize)]
pub struct DetectionOutput {
    pub message: String,
    pub encoder: String,
    pub embedding_active: bool,
    pub primary: Option<IntentCategory>,
    pub intents: DetectionResult,
}

/// Result of the `extract` command.
#[derive(Debug, Serialize)]
pub struct ExtractionOutput {
    pub category: IntentCategory,
    pub params: IntentParams,
}

/// Pattern score of one category.
#[derive(Debug, Serialize)]
pub struct CategoryScore {
    pub category: IntentCategory,
    pub score: f32,
    pub matches: usize,
    pub patterns: usize,
    pub threshold: f32,
}

/// Result of the `score` command.
#[derive(Debug, Serialize)]
pub struct ScoreOutput {
    pub message: String,
    pub scores: Vec<CategoryScore>,
}

/// Result of the `plan` command.
#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub message: String,
    pub intents: DetectionResult,
    pub plan: DispatchPlan,
}

/// Patterns of one category.
#[derive(Debug, Serialize)]
pub struct PatternListing {
    pub category: IntentCategory,
    pub patterns: Vec<String>,
}

/// Human-readable rendering of a command result.
pub trait HumanOutput {
    fn print_human(&self, args: &IntentArgs);
}

/// Output a command result in the format selected on the command line.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &IntentArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            result.print_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

fn output_json<T: Serialize>(result: &T, args: &IntentArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

fn params_summary(params: &IntentParams) -> String {
    match params {
        IntentParams::LocalSearch { query, location } => match location {
            Some(location) => format!("query={query:?} location={location:?}"),
            None => format!("query={query:?}"),
        },
        IntentParams::Puppeteer { url, action } => match url {
            Some(url) => format!("{action} {url}"),
            None => format!("{action} (no url)"),
        },
        IntentParams::SocialMedia {
            platforms,
            content_types,
            ..
        } => format!(
            "platforms={} content_types={}",
            platforms.join(","),
            content_types.join(",")
        ),
        IntentParams::ImageGeneration { prompt } => format!("prompt={prompt:?}"),
        IntentParams::Calculation { expression } => format!("expression={expression:?}"),
        IntentParams::Conversation { query, kind } => format!("{kind} query={query:?}"),
        IntentParams::Query { query } => format!("query={query:?}"),
    }
}

fn print_intent(category: IntentCategory, intent: &IntentMatch) {
    println!(
        "{:<18} {:.3}  [{}, {}]  {}",
        category.as_str(),
        intent.confidence,
        serde_json::to_value(intent.source)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
        intent.language,
        params_summary(&intent.params)
    );
    if let Some(example) = &intent.matched_example {
        println!("{:<18} matched example: {example:?}", "");
    }
}

fn print_intents(result: &DetectionResult) {
    println!("Detected Intents:");
    println!("═════════════════");
    for (category, intent) in result.iter() {
        print_intent(*category, intent);
    }
}

impl HumanOutput for DetectionOutput {
    fn print_human(&self, args: &IntentArgs) {
        print_intents(&self.intents);
        if args.verbosity() > 0 {
            println!();
            if let Some(primary) = self.primary {
                println!("Primary intent: {primary}");
            }
            let path = if self.embedding_active {
                "embedding"
            } else {
                "patterns"
            };
            println!("Encoder: {} ({path})", self.encoder);
        }
    }
}

impl HumanOutput for ExtractionOutput {
    fn print_human(&self, _args: &IntentArgs) {
        println!("{}: {}", self.category, params_summary(&self.params));
    }
}

impl HumanOutput for ScoreOutput {
    fn print_human(&self, _args: &IntentArgs) {
        println!("Pattern Scores:");
        println!("═══════════════");
        for score in &self.scores {
            let marker = if score.score > score.threshold { "*" } else { " " };
            println!(
                "{marker} {:<18} {:.3}  ({}/{} patterns)",
                score.category.as_str(),
                score.score,
                score.matches,
                score.patterns
            );
        }
    }
}

impl HumanOutput for PlanOutput {
    fn print_human(&self, _args: &IntentArgs) {
        print_intents(&self.intents);
        println!();
        println!("Dispatch Plan:");
        println!("──────────────");
        for (i, step) in self.plan.steps().iter().enumerate() {
            let intents: Vec<&str> = step.intents.iter().map(|c| c.as_str()).collect();
            println!(
                "{}. {:?} (weight {:.2}) [{}]",
                i + 1,
                step.action,
                step.weight,
                intents.join(", ")
            );
        }
    }
}

impl HumanOutput for Vec<PatternListing> {
    fn print_human(&self, _args: &IntentArgs) {
        for listing in self {
            println!("{}:", listing.category);
            for pattern in &listing.patterns {
                println!("  {pattern}");
            }
        }
    }
}
