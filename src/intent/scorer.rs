//! Pattern scorer.
//!
//! The score of a message against a pattern set rewards broad coverage of the
//! set: any match gives at least `0.3`, and every further distinct pattern
//! adds its share of the remaining `0.7`.

use regex::Regex;

use crate::intent::category::IntentCategory;
use crate::intent::patterns::{PatternSet, pattern_sets};

/// Score floor for a message matching at least one pattern.
pub const MATCH_FLOOR: f32 = 0.3;

/// Score a message against a list of patterns.
///
/// Returns `0.0` when nothing matches, otherwise
/// `min(0.3 + matches / patterns.len() * 0.7, 1.0)`.
pub fn score(message: &str, patterns: &[Regex]) -> f32 {
    if patterns.is_empty() {
        return 0.0;
    }
    let matches = patterns.iter().filter(|re| re.is_match(message)).count();
    score_from_count(matches, patterns.len())
}

/// Score from a match count and a set size.
pub fn score_from_count(matches: usize, set_size: usize) -> f32 {
    if matches == 0 || set_size == 0 {
        return 0.0;
    }
    (MATCH_FLOOR + (matches as f32 / set_size as f32) * (1.0 - MATCH_FLOOR)).min(1.0)
}

/// Score a message against one pattern set.
pub fn score_set(message: &str, set: &PatternSet) -> f32 {
    score(message, set.patterns())
}

/// Score a message against every pattern set, in precedence order.
pub fn score_all(message: &str) -> Vec<(IntentCategory, f32)> {
    pattern_sets()
        .iter()
        .map(|set| (set.category(), score_set(message, set)))
        .collect()
}
