//! Declarative pattern tables.
//!
//! Each intent category that can be detected by pattern matching owns one
//! ordered [`PatternSet`]. The sets are plain data: category → list of
//! regular expressions, compiled once, case-insensitive.
//! `general_knowledge` has no set; it is only ever synthesized.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::intent::category::IntentCategory;

const WEB_SEARCH_PATTERNS: &[&str] = &[
    r"search\s+for",
    r"search\s+the\s+(web|internet)",
    r"find\s+information\s+(about|on)",
    r"look\s+up",
    r"find\s+(me\s+)?(some\s+)?information",
    r"find\s+(me\s+)?(some\s+)?(top|best|latest)",
    r"what\s+are\s+the\s+latest",
    r"tell\s+me\s+about\s+recent",
    r"what\s+(is|are|was|were)",
    r"tell\s+me\s+about",
    r"where\s+(is|can\s+I\s+find)",
    r"how\s+(to|do|does|can|could)",
    r"(latest|recent)\s+news\s+(about|on)",
    r"who\s+(is|was)",
    r"when\s+(is|was|did)",
    r"why\s+(is|are|do|does)",
    r"(top|best)\s+\d+",
    r"news\s+(about|in|from|happened)",
    r"news.*?today",
];

const LOCAL_SEARCH_PATTERNS: &[&str] = &[
    r"near\s+me",
    r"nearby",
    r"in\s+(my|this)\s+area",
    r"close\s+to",
    r"restaurants\s+in",
    r"businesses\s+in",
    r"places\s+in",
    r"within\s+\d+\s+(miles|kilometers)",
    r"stores\s+in",
    r"services\s+in",
    r"find\s+a\s+(place|restaurant|store|hotel)",
];

/// Order matters: the image extractor takes the prompt after the first match.
pub(crate) const IMAGE_GENERATION_PATTERNS: &[&str] = &[
    r"create\s+(?:an\s+)?image",
    r"generate\s+(?:an\s+)?image",
    r"show\s+(?:me\s+)?(?:an\s+)?image",
    r"make\s+(?:an\s+)?image",
    r"draw\s+(?:an\s+)?image",
    r"create\s+(?:a\s+)?picture",
    r"generate\s+(?:a\s+)?picture",
    r"visualize",
    r"illustrate",
    r"image\s+of",
    r"picture\s+of",
];

const PUPPETEER_PATTERNS: &[&str] = &[
    r"browse\s+(to|the|site)",
    r"navigate\s+to",
    r"go\s+to\s+(the\s+)?(website|site|page)",
    r"visit\s+(the\s+)?(website|site|page)",
    r"open\s+(the\s+)?(website|site|page)",
    r"take\s+a\s+screenshot",
    r"capture\s+(the\s+)?(screen|page)",
    r"click\s+on",
    r"interact\s+with",
    r"fill\s+(in|out)",
    r"type\s+into",
    r"scrape\s+(the|this)",
    r"extract\s+(content|data)",
];

const SOCIAL_MEDIA_PATTERNS: &[&str] = &[
    r"\b(facebook|fb|instagram|ig|twitter|x\.com|threads|linkedin|tiktok|youtube)\b",
    r"\b(post|tweet|reel|story|caption|video)\b",
    r"(create|write|draft|schedule|make)\s+(a|an|my|some)?\s*(post|tweet|content|update)",
    r"social\s+media\s+(content|strategy|post|campaign)",
    r"(instagram|ig|facebook|fb|twitter)\s*(post|story|reel|tweet)",
    r"(engagement|followers|likes|shares|comments)",
    r"(hashtag|audience|content\s+calendar|brand\s+voice)",
    r"help\s+(me|with)\s+(my)?\s+social\s+media",
];

const CALCULATION_PATTERNS: &[&str] = &[
    r"\d+\s*[+\-*/^%]\s*\d+",
    r"what\s+is\s+\d+\s*[+\-*/^%]\s*\d+",
    r"calculate\s+\d+\s*[+\-*/^%]\s*\d+",
    r"compute\s+\d+\s*[+\-*/^%]\s*\d+",
    r"solve\s+\d+\s*[+\-*/^%]\s*\d+",
    r"(\d+)\s*squared",
    r"square\s+root\s+of\s+(\d+)",
    r"cube\s+of\s+(\d+)",
    r"(\d+)\s*cubed",
    r"factorial\s+of\s+(\d+)",
    r"(\d+)\s*factorial",
    r"log\s+of\s+(\d+)",
    r"sine\s+of\s+(\d+)",
    r"cosine\s+of\s+(\d+)",
    r"tangent\s+of\s+(\d+)",
];

const CONVERSATION_PATTERNS: &[&str] = &[
    r"^\s*(hi|hello|hey|howdy|yo)\b",
    r"^\s*greetings\b",
    r"^\s*good\s+(morning|afternoon|evening|night)\b",
    r"^\s*(hola|bonjour|salut|ciao|hallo|olá|namaste)\b",
    r"^\s*(你好|您好|こんにちは|안녕)",
    r"how\s+are\s+you",
    r"what'?s\s+up",
    r"^\s*(thanks|thank\s+you|thx)\b",
    r"^\s*(bye|goodbye|see\s+you)\b",
];

/// Compile a table pattern case-insensitively.
///
/// Table patterns are constants covered by tests; a failure here is a
/// programming error.
pub(crate) fn compile(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

/// An ordered set of regular expressions associated with one category.
#[derive(Debug)]
pub struct PatternSet {
    category: IntentCategory,
    sources: &'static [&'static str],
    regexes: Vec<Regex>,
}

impl PatternSet {
    fn new(category: IntentCategory, sources: &'static [&'static str]) -> Self {
        Self {
            category,
            sources,
            regexes: sources.iter().map(|p| compile(p)).collect(),
        }
    }

    /// The category this set detects.
    pub fn category(&self) -> IntentCategory {
        self.category
    }

    /// Compiled patterns, in declaration order.
    pub fn patterns(&self) -> &[Regex] {
        &self.regexes
    }

    /// Pattern sources, in declaration order.
    pub fn sources(&self) -> &'static [&'static str] {
        self.sources
    }

    pub fn len(&self) -> usize {
        self.regexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regexes.is_empty()
    }

    /// Number of distinct patterns matching anywhere in `message`.
    pub fn match_count(&self, message: &str) -> usize {
        self.regexes.iter().filter(|re| re.is_match(message)).count()
    }
}

static PATTERN_SETS: LazyLock<Vec<PatternSet>> = LazyLock::new(|| {
    vec![
        PatternSet::new(IntentCategory::WebSearch, WEB_SEARCH_PATTERNS),
        PatternSet::new(IntentCategory::LocalSearch, LOCAL_SEARCH_PATTERNS),
        PatternSet::new(IntentCategory::Puppeteer, PUPPETEER_PATTERNS),
        PatternSet::new(IntentCategory::ImageGeneration, IMAGE_GENERATION_PATTERNS),
        PatternSet::new(IntentCategory::SocialMedia, SOCIAL_MEDIA_PATTERNS),
        PatternSet::new(IntentCategory::Calculation, CALCULATION_PATTERNS),
        PatternSet::new(IntentCategory::Conversation, CONVERSATION_PATTERNS),
    ]
});

static ARITHMETIC_BODY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[\d\s+\-*/^%().]+\??$"));

static WHAT_IS_PREFIX: LazyLock<Regex> = LazyLock::new(|| compile(r"^(what\s+is|what's)\s*"));

/// Every pattern set, in category precedence order.
pub fn pattern_sets() -> &'static [PatternSet] {
    &PATTERN_SETS
}

/// The pattern set of one category, if it has one.
pub fn pattern_set(category: IntentCategory) -> Option<&'static PatternSet> {
    PATTERN_SETS.iter().find(|set| set.category == category)
}

/// Whether the message opens with a greeting or is small talk.
pub fn is_greeting(message: &str) -> bool {
    pattern_set(IntentCategory::Conversation)
        .map(|set| set.match_count(message) > 0)
        .unwrap_or(false)
}

/// Whether the message is nothing but an arithmetic expression, optionally
/// introduced by "what is" / "what's" and closed by a question mark.
pub fn is_pure_arithmetic(message: &str) -> bool {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return false;
    }

    if let Some(prefix) = WHAT_IS_PREFIX.find(trimmed) {
        let remainder = trimmed[prefix.end()..].trim();
        if !remainder.is_empty() && ARITHMETIC_BODY.is_match(remainder) {
            return true;
        }
    }

    ARITHMETIC_BODY.is_match(trimmed)
}
