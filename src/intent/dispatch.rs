//! Dispatch planning.
//!
//! Turns a [`DetectionResult`] into the ordered list of actions the request
//! router runs. Search and browser steps come first because they provide
//! context to the later steps; a general knowledge answer always closes the
//! plan.

use serde::Serialize;

use crate::intent::category::IntentCategory;
use crate::intent::detector::general_knowledge_coverage;
use crate::intent::types::{DetectionResult, IntentParams};

/// An action run by the request router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchAction {
    /// Web or local search.
    Search,
    Browse,
    GenerateImage,
    SocialMedia,
    Calculate,
    Converse,
    GeneralKnowledge,
}

impl DispatchAction {
    /// The action serving a category.
    pub fn for_category(category: IntentCategory) -> Self {
        match category {
            IntentCategory::WebSearch | IntentCategory::LocalSearch => DispatchAction::Search,
            IntentCategory::Puppeteer => DispatchAction::Browse,
            IntentCategory::ImageGeneration => DispatchAction::GenerateImage,
            IntentCategory::SocialMedia => DispatchAction::SocialMedia,
            IntentCategory::Calculation => DispatchAction::Calculate,
            IntentCategory::Conversation => DispatchAction::Converse,
            IntentCategory::GeneralKnowledge => DispatchAction::GeneralKnowledge,
        }
    }
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchStep {
    pub action: DispatchAction,
    /// Detected categories served by this step, in precedence order.
    pub intents: Vec<IntentCategory>,
    /// Highest confidence among `intents`, or the coverage confidence for the
    /// closing general knowledge step.
    pub weight: f32,
    /// Parameters of the first intent of the step.
    pub params: Option<IntentParams>,
}

/// Ordered actions for one message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchPlan {
    steps: Vec<DispatchStep>,
}

impl DispatchPlan {
    pub fn from_result(result: &DetectionResult) -> Self {
        let mut steps: Vec<DispatchStep> = Vec::new();

        for (category, intent) in result.iter() {
            if *category == IntentCategory::GeneralKnowledge {
                continue;
            }
            let action = DispatchAction::for_category(*category);
            match steps.iter_mut().find(|step| step.action == action) {
                Some(step) => {
                    step.intents.push(*category);
                    step.weight = step.weight.max(intent.confidence);
                }
                None => steps.push(DispatchStep {
                    action,
                    intents: vec![*category],
                    weight: intent.confidence,
                    params: Some(intent.params.clone()),
                }),
            }
        }

        let mut coverage_input = result.clone();
        coverage_input.remove(IntentCategory::GeneralKnowledge);
        let general = result.get(IntentCategory::GeneralKnowledge);
        steps.push(DispatchStep {
            action: DispatchAction::GeneralKnowledge,
            intents: general
                .map(|_| vec![IntentCategory::GeneralKnowledge])
                .unwrap_or_default(),
            weight: general_knowledge_coverage(&coverage_input),
            params: general.map(|intent| intent.params.clone()),
        });

        Self { steps }
    }

    pub fn steps(&self) -> &[DispatchStep] {
        &self.steps
    }

    pub fn actions(&self) -> Vec<DispatchAction> {
        self.steps.iter().map(|step| step.action).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::types::{DetectionSource, IntentMatch};

    fn intent(confidence: f32) -> IntentMatch {
        IntentMatch::new(
            confidence,
            DetectionSource::Pattern,
            IntentParams::Query {
                query: "q".to_string(),
            },
        )
    }

    #[test]
    fn test_searches_collapse_into_one_step() {
        let mut result = DetectionResult::new();
        result.insert(IntentCategory::SocialMedia, intent(0.6));
        result.insert(IntentCategory::LocalSearch, intent(0.7));
        result.insert(IntentCategory::WebSearch, intent(0.4));

        let plan = DispatchPlan::from_result(&result);
        assert_eq!(
            plan.actions(),
            vec![
                DispatchAction::Search,
                DispatchAction::SocialMedia,
                DispatchAction::GeneralKnowledge
            ]
        );
        let search = &plan.steps()[0];
        assert_eq!(
            search.intents,
            vec![IntentCategory::WebSearch, IntentCategory::LocalSearch]
        );
        assert_eq!(search.weight, 0.7);
        assert_eq!(plan.steps()[2].weight, 0.2);
    }

    #[test]
    fn test_general_knowledge_only_plan() {
        let mut result = DetectionResult::new();
        result.insert(IntentCategory::GeneralKnowledge, intent(1.0));

        let plan = DispatchPlan::from_result(&result);
        assert_eq!(plan.len(), 1);
        let step = &plan.steps()[0];
        assert_eq!(step.action, DispatchAction::GeneralKnowledge);
        assert_eq!(step.intents, vec![IntentCategory::GeneralKnowledge]);
        assert_eq!(step.weight, 1.0);
        assert!(step.params.is_some());
    }

    #[test]
    fn test_browse_runs_before_image_generation() {
        let mut result = DetectionResult::new();
        result.insert(IntentCategory::ImageGeneration, intent(0.9));
        result.insert(IntentCategory::Puppeteer, intent(0.3));

        let plan = DispatchPlan::from_result(&result);
        assert_eq!(
            plan.actions(),
            vec![
                DispatchAction::Browse,
                DispatchAction::GenerateImage,
                DispatchAction::GeneralKnowledge
            ]
        );
        assert_eq!(plan.steps()[2].weight, 0.5);
    }
}
