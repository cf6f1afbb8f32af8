//! Parameter extraction.
//!
//! One pure function per intent category pulls structured fields out of the
//! raw message. Extractors never fail: when nothing can be recognised they
//! fall back to a sensible default, usually the whole message.

use std::sync::LazyLock;

use regex::Regex;

use crate::intent::category::IntentCategory;
use crate::intent::patterns::{compile, pattern_set};
use crate::intent::types::IntentParams;

/// Search prefixes, longest first so "search the web for" wins over "search for".
const SEARCH_PREFIXES: &[&str] = &[
    "search the internet for",
    "search the web for",
    "search for",
    "find information about",
    "find information on",
    "look up",
    "tell me about",
    "what is",
    "what are",
    "how to",
    "how do I",
];

/// Location words that do not name a place.
const NON_LOCATIONS: &[&str] = &["me", "here", "there", "my area", "this area"];

/// Every platform the social media flow can publish to.
pub const SOCIAL_PLATFORMS: &[&str] = &[
    "facebook",
    "instagram",
    "twitter",
    "threads",
    "linkedin",
    "tiktok",
    "youtube",
];

/// Browser action attached to every puppeteer extraction.
pub const NAVIGATE_ACTION: &str = "navigate";

/// Conversation type used when no greeting was recognised.
pub const GENERAL_CONVERSATION: &str = "general_conversation";

static SEARCH_PREFIX_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SEARCH_PREFIXES
        .iter()
        .map(|prefix| {
            let words: Vec<String> = prefix.split_whitespace().map(regex::escape).collect();
            compile(&format!(r"\b{}\b", words.join(r"\s+")))
        })
        .collect()
});

static LEADING_ME: LazyLock<Regex> = LazyLock::new(|| compile(r"^me\s+"));

static TRAILING_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| compile(r"[.!?\[\](){}]+$"));

static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bin\s+([A-Za-z\s]+)",
        r"\bnear\s+([A-Za-z\s]+)",
        r"\baround\s+([A-Za-z\s]+)",
        r"\bclose\s+to\s+([A-Za-z\s]+)",
    ]
    .iter()
    .map(|p| compile(p))
    .collect()
});

static LOCATION_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\s*\b(?:near|around|close\s+to|in|within\s+\d+\s+(?:miles|kilometers)\s+of)\s+[A-Za-z\s]*$",
    )
});

static NEARBY: LazyLock<Regex> = LazyLock::new(|| compile(r"\s*\bnearby\b"));

static IMAGE_PROMPT_LEAD: LazyLock<Regex> = LazyLock::new(|| compile(r"^(of|showing)\s+"));

static EXPLICIT_URL: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"https?://[^\s>)"]+|www\.[^\s>)"]+\.[^\s>)"]+"#));

static NAVIGATION_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b(?:browse\s+to|navigate\s+to|go\s+to|visit|open)\s+(?:the\s+)?(?:website\s+)?([a-z0-9][-a-z0-9]{0,62}(?:\.[a-z0-9][-a-z0-9]{0,62})*(?:\.[a-z]{2,})+)",
    )
});

static BARE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"\b([a-z0-9][-a-z0-9]{0,62}\.(?:com|org|net|edu|gov|io|app|ai|co|me|info|biz))\b",
    )
});

static PLATFORM_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("facebook", compile(r"\b(facebook|fb)\b")),
        ("instagram", compile(r"\b(instagram|ig)\b")),
        ("twitter", compile(r"\b(twitter|x\.com|tweet)\b")),
        ("threads", compile(r"\bthreads\b")),
        ("linkedin", compile(r"\blinkedin\b")),
        ("tiktok", compile(r"\btiktok\b")),
        ("youtube", compile(r"\byoutube\b")),
    ]
});

static CONTENT_TYPE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        ("post", compile(r"\bpost\b")),
        ("video", compile(r"\bvideo\b")),
        ("reel", compile(r"\breel\b")),
        ("story", compile(r"\bstory\b")),
        ("tweet", compile(r"\btweet\b")),
    ]
});

/// Run the extractor of `category` on `message`.
pub fn extract(category: IntentCategory, message: &str) -> IntentParams {
    match category {
        IntentCategory::WebSearch => IntentParams::Query {
            query: extract_search_query(message),
        },
        IntentCategory::LocalSearch => {
            let (query, location) = extract_local_search(message);
            IntentParams::LocalSearch { query, location }
        }
        IntentCategory::ImageGeneration => IntentParams::ImageGeneration {
            prompt: extract_image_prompt(message),
        },
        IntentCategory::Puppeteer => IntentParams::Puppeteer {
            url: extract_url(message),
            action: NAVIGATE_ACTION.to_string(),
        },
        IntentCategory::SocialMedia => {
            let (platforms, content_types) = extract_social_media(message);
            IntentParams::SocialMedia {
                platforms,
                content_types,
                prompt: message.to_string(),
            }
        }
        IntentCategory::Calculation => IntentParams::Calculation {
            expression: message.to_string(),
        },
        IntentCategory::Conversation => IntentParams::Conversation {
            query: message.to_string(),
            kind: GENERAL_CONVERSATION.to_string(),
        },
        IntentCategory::GeneralKnowledge => IntentParams::Query {
            query: message.to_string(),
        },
    }
}

/// Search query: the text after the first recognised search prefix, without a
/// leading "me" or trailing punctuation. Defaults to the whole message.
pub fn extract_search_query(message: &str) -> String {
    let cleaned = message.trim();

    for prefix in SEARCH_PREFIX_REGEXES.iter() {
        if let Some(found) = prefix.find(cleaned) {
            let rest = cleaned[found.end()..].trim();
            let rest = LEADING_ME.replace(rest, "");
            let query = TRAILING_PUNCTUATION.replace(rest.trim(), "");
            let query = query.trim();
            if !query.is_empty() {
                return query.to_string();
            }
            break;
        }
    }

    cleaned.to_string()
}

/// Local search query and location.
///
/// The location comes from the first "in / near / around / close to" phrase
/// that does not start with a stoplisted word. The query is the search query
/// with any trailing location clause removed.
pub fn extract_local_search(message: &str) -> (String, Option<String>) {
    let search_query = extract_search_query(message);
    (strip_location_clause(&search_query), extract_location(message))
}

fn extract_location(message: &str) -> Option<String> {
    for pattern in LOCATION_PATTERNS.iter() {
        let Some(captures) = pattern.captures(message) else {
            continue;
        };
        let Some(group) = captures.get(1) else {
            continue;
        };
        let candidate = group.as_str().trim();
        if candidate.is_empty() || is_non_location(candidate) {
            continue;
        }
        return Some(candidate.to_string());
    }
    None
}

fn is_non_location(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    NON_LOCATIONS
        .iter()
        .any(|stop| lower == *stop || lower.starts_with(&format!("{stop} ")))
}

fn strip_location_clause(query: &str) -> String {
    let trimmed = query.trim().trim_end_matches(['.', '!', '?']);
    let without_nearby = NEARBY.replace_all(trimmed, "");
    let stripped = LOCATION_CLAUSE.replace(&without_nearby, "");
    let stripped = stripped.trim();

    if stripped.is_empty() {
        query.trim().to_string()
    } else {
        stripped.to_string()
    }
}

/// Image prompt: the text after the first image pattern, without a leading
/// "of" / "showing". Defaults to the whole message.
pub fn extract_image_prompt(message: &str) -> String {
    let Some(set) = pattern_set(IntentCategory::ImageGeneration) else {
        return message.to_string();
    };

    for pattern in set.patterns() {
        if let Some(found) = pattern.find(message) {
            let rest = message[found.end()..].trim();
            let prompt = IMAGE_PROMPT_LEAD.replace(rest, "");
            let prompt = prompt.trim();
            return if prompt.is_empty() {
                message.trim().to_string()
            } else {
                prompt.to_string()
            };
        }
    }

    message.to_string()
}

/// Target URL of a browsing request, normalised to carry a scheme.
///
/// Priority: an explicit `http(s)://` or `www.` URL, then a domain following
/// a navigation verb, then any bare word ending in a well-known TLD.
pub fn extract_url(message: &str) -> Option<String> {
    if let Some(found) = EXPLICIT_URL.find(message) {
        let url = found.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', '\'']);
        return Some(with_scheme(url));
    }

    if let Some(domain) = NAVIGATION_TARGET
        .captures(message)
        .and_then(|captures| captures.get(1))
    {
        return Some(with_scheme(domain.as_str()));
    }

    BARE_DOMAIN
        .captures(message)
        .and_then(|captures| captures.get(1))
        .map(|domain| with_scheme(domain.as_str()))
}

fn with_scheme(url: &str) -> String {
    let lower = url.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Platforms and content types mentioned in a social media request.
///
/// No platform mentioned means every platform; no content type means `post`.
pub fn extract_social_media(message: &str) -> (Vec<String>, Vec<String>) {
    let mut platforms: Vec<String> = PLATFORM_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(message))
        .map(|(name, _)| name.to_string())
        .collect();
    if platforms.is_empty() {
        platforms = SOCIAL_PLATFORMS.iter().map(|p| p.to_string()).collect();
    }

    let mut content_types: Vec<String> = CONTENT_TYPE_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(message))
        .map(|(name, _)| name.to_string())
        .collect();
    if content_types.is_empty() {
        content_types.push("post".to_string());
    }

    (platforms, content_types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_strips_prefix() {
        assert_eq!(extract_search_query("search for rust async runtimes"), "rust async runtimes");
        assert_eq!(
            extract_search_query("Please search the web for the latest Rust release!"),
            "the latest Rust release"
        );
        assert_eq!(extract_search_query("look up me the weather in Oslo?"), "the weather in Oslo");
        assert_eq!(extract_search_query("what is borrow checking?"), "borrow checking");
    }

    #[test]
    fn test_search_query_defaults_to_message() {
        assert_eq!(extract_search_query("rust news"), "rust news");
        assert_eq!(extract_search_query("search for"), "search for");
        assert_eq!(extract_search_query(""), "");
    }

    #[test]
    fn test_local_search_stoplisted_location() {
        let (query, location) = extract_local_search("find restaurants near me");
        assert_eq!(location, None);
        assert_eq!(query, "find restaurants");
        assert!(!query.contains("near"));
    }

    #[test]
    fn test_local_search_named_location() {
        let (query, location) = extract_local_search("search for coffee shops in Lisbon");
        assert_eq!(location.as_deref(), Some("Lisbon"));
        assert_eq!(query, "coffee shops");

        let (_, location) = extract_local_search("hotels close to Central Park");
        assert_eq!(location.as_deref(), Some("Central Park"));

        let (query, location) = extract_local_search("pharmacies nearby");
        assert_eq!(location, None);
        assert_eq!(query, "pharmacies");
    }

    #[test]
    fn test_local_search_stopword_phrases() {
        let (_, location) = extract_local_search("bakeries in my area");
        assert_eq!(location, None);
        let (_, location) = extract_local_search("bars around here tonight");
        assert_eq!(location, None);
    }

    #[test]
    fn test_image_prompt() {
        let prompt = extract_image_prompt("create an image of a sunset");
        assert_eq!(prompt, "a sunset");

        let prompt = extract_image_prompt("Generate a picture showing two cats playing chess");
        assert_eq!(prompt, "two cats playing chess");

        assert_eq!(extract_image_prompt("a sunset over the sea"), "a sunset over the sea");
    }

    #[test]
    fn test_url_priority() {
        assert_eq!(
            extract_url("open https://docs.rs/regex, then summarize").as_deref(),
            Some("https://docs.rs/regex")
        );
        assert_eq!(
            extract_url("check www.rust-lang.org.").as_deref(),
            Some("https://www.rust-lang.org")
        );
        assert_eq!(
            extract_url("navigate to example.com").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            extract_url("go to the website crates.io please").as_deref(),
            Some("https://crates.io")
        );
        assert_eq!(
            extract_url("take a screenshot of github.com").as_deref(),
            Some("https://github.com")
        );
        assert_eq!(extract_url("take a screenshot"), None);
    }

    #[test]
    fn test_explicit_http_scheme_kept() {
        assert_eq!(
            extract_url("browse to http://localhost:8080/status").as_deref(),
            Some("http://localhost:8080/status")
        );
    }

    #[test]
    fn test_social_media_platforms_and_types() {
        let (platforms, types) = extract_social_media("write an Instagram reel and a tweet");
        assert_eq!(platforms, vec!["instagram", "twitter"]);
        assert_eq!(types, vec!["reel", "tweet"]);

        let (platforms, types) = extract_social_media("draft something for our launch");
        assert_eq!(platforms.len(), SOCIAL_PLATFORMS.len());
        assert_eq!(types, vec!["post"]);
    }

    #[test]
    fn test_identity_extractors() {
        assert_eq!(
            extract(IntentCategory::Calculation, "2 + 2"),
            IntentParams::Calculation {
                expression: "2 + 2".to_string()
            }
        );
        assert_eq!(
            extract(IntentCategory::GeneralKnowledge, "why is the sky blue"),
            IntentParams::Query {
                query: "why is the sky blue".to_string()
            }
        );
        match extract(IntentCategory::Conversation, "hey") {
            IntentParams::Conversation { query, kind } => {
                assert_eq!(query, "hey");
                assert_eq!(kind, GENERAL_CONVERSATION);
            }
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn test_extractors_are_total() {
        for category in IntentCategory::ALL {
            for message in ["", "   ", "🤖🤖", "??", "in", "near"] {
                let _ = extract(category, message);
            }
        }
    }
}
