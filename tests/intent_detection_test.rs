use multivio_intent::config::DetectorConfig;
use multivio_intent::intent::{
    DetectionSource, IntentCategory, IntentDetector, IntentParams, UNKNOWN_LANGUAGE,
};

fn detector() -> IntentDetector {
    IntentDetector::new(DetectorConfig::default())
}

const MESSAGES: &[&str] = &[
    "",
    " ",
    "hi",
    "what is 10+10",
    "find restaurants near me",
    "navigate to example.com",
    "create an image of a sunset",
    "write an instagram post and a tweet about our launch, then search for competitor news",
    "take a screenshot of github.com and tell me about recent rust releases",
    "量子コンピュータとは何ですか",
    "¿Dónde está el restaurante más cercano?",
    "🙂🙂🙂",
];

#[tokio::test]
async fn test_result_is_never_empty_and_confidences_are_bounded() {
    let detector = detector();
    for message in MESSAGES {
        let result = detector.detect_intents(message).await;
        assert!(!result.is_empty(), "empty result for {message:?}");
        for (category, intent) in result.iter() {
            assert!(
                (0.0..=1.0).contains(&intent.confidence),
                "{category} confidence {} out of range for {message:?}",
                intent.confidence
            );
        }
    }
}

#[tokio::test]
async fn test_pure_arithmetic_is_calculation_only() {
    let result = detector().detect_intents("what is 10+10").await;
    let calculation = result.get(IntentCategory::Calculation).unwrap();
    assert!(calculation.confidence >= 0.8);
    assert!(!result.contains(IntentCategory::WebSearch));
    assert_eq!(
        calculation.params,
        IntentParams::Calculation {
            expression: "what is 10+10".to_string()
        }
    );
}

#[tokio::test]
async fn test_greeting_yields_conversation() {
    let result = detector().detect_intents("hi").await;
    let conversation = result.get(IntentCategory::Conversation).unwrap();
    assert!(conversation.confidence >= 0.7);
}

#[tokio::test]
async fn test_local_search_stoplisted_location() {
    let result = detector().detect_intents("find restaurants near me").await;
    let local = result.get(IntentCategory::LocalSearch).unwrap();
    match &local.params {
        IntentParams::LocalSearch { query, location } => {
            assert_eq!(location, &None);
            assert!(!query.split_whitespace().any(|w| w.eq_ignore_ascii_case("near")));
        }
        other => panic!("unexpected params {other:?}"),
    }
}

#[tokio::test]
async fn test_local_search_named_location() {
    let result = detector().detect_intents("find a hotel close to Central Park").await;
    let local = result.get(IntentCategory::LocalSearch).unwrap();
    match &local.params {
        IntentParams::LocalSearch { location, .. } => {
            assert_eq!(location.as_deref(), Some("Central Park"));
        }
        other => panic!("unexpected params {other:?}"),
    }
}

#[tokio::test]
async fn test_puppeteer_url_gets_https_scheme() {
    let result = detector().detect_intents("navigate to example.com").await;
    let browse = result.get(IntentCategory::Puppeteer).unwrap();
    assert_eq!(
        browse.params,
        IntentParams::Puppeteer {
            url: Some("https://example.com".to_string()),
            action: "navigate".to_string(),
        }
    );
    assert_eq!(browse.source, DetectionSource::Pattern);
    assert_eq!(browse.matched_example, None);
}

#[tokio::test]
async fn test_image_prompt_drops_leading_of() {
    let result = detector().detect_intents("create an image of a sunset").await;
    let image = result.get(IntentCategory::ImageGeneration).unwrap();
    match &image.params {
        IntentParams::ImageGeneration { prompt } => {
            assert!(prompt.contains("sunset"));
            assert!(!prompt.starts_with("of"));
        }
        other => panic!("unexpected params {other:?}"),
    }
}

#[tokio::test]
async fn test_multi_intent_message_keeps_precedence_order() {
    let result = detector()
        .detect_intents("write an instagram post and search for competitor news")
        .await;
    let categories = result.categories();
    assert!(categories.contains(&IntentCategory::WebSearch));
    assert!(categories.contains(&IntentCategory::SocialMedia));

    let mut sorted = categories.clone();
    sorted.sort();
    assert_eq!(categories, sorted);
}

#[tokio::test]
async fn test_language_failure_yields_unknown() {
    let result = detector().detect_intents("12 * 12").await;
    for (_, intent) in result.iter() {
        assert_eq!(intent.language, UNKNOWN_LANGUAGE);
    }
}
