//! Criterion benchmarks for multivio-intent.
//!
//! Covers the three hot paths of intent detection:
//! - Pattern scoring and resolution
//! - Parameter extraction
//! - Embedding classification with the hashing encoder

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use multivio_intent::config::DetectorConfig;
use multivio_intent::embedding::HashingTextEmbedder;
use multivio_intent::intent::extractor::extract;
use multivio_intent::intent::scorer::score_all;
use multivio_intent::intent::{IntentCategory, IntentDetector};

/// Representative chat messages.
fn generate_test_messages(count: usize) -> Vec<String> {
    let templates = [
        "search for the latest news about {}",
        "find {} near me",
        "create an image of {} at sunset",
        "navigate to {}.com and take a screenshot",
        "write an instagram post about {}",
        "what is 12 * {}",
        "hello, how are you",
        "tell me about {}",
    ];
    let topics = ["rust", "coffee", "mountains", "pizza", "electric cars", "42"];

    (0..count)
        .map(|i| {
            let template = templates[i % templates.len()];
            let topic = topics[(i * 7) % topics.len()];
            template.replace("{}", topic)
        })
        .collect()
}

/// Benchmark the pattern path.
fn bench_pattern_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_path");
    let messages = generate_test_messages(100);
    let detector = IntentDetector::new(DetectorConfig::default());

    group.bench_function("score_all_single_message", |b| {
        b.iter(|| black_box(score_all(black_box(&messages[0]))))
    });

    group.throughput(Throughput::Elements(messages.len() as u64));
    group.bench_function("detect_with_patterns_batch", |b| {
        b.iter(|| {
            for message in &messages {
                black_box(detector.detect_with_patterns(black_box(message)));
            }
        })
    });

    group.finish();
}

/// Benchmark parameter extraction.
fn bench_extractors(c: &mut Criterion) {
    let mut group = c.benchmark_group("extractors");
    let cases = [
        (IntentCategory::WebSearch, "search for the latest rust release notes"),
        (IntentCategory::LocalSearch, "find coffee shops in Lisbon"),
        (IntentCategory::Puppeteer, "go to the website crates.io please"),
        (IntentCategory::ImageGeneration, "generate a picture showing two cats"),
        (IntentCategory::SocialMedia, "draft a tweet and an instagram reel"),
    ];

    for (category, message) in cases {
        group.bench_function(category.as_str(), |b| {
            b.iter(|| black_box(extract(category, black_box(message))))
        });
    }

    group.finish();
}

/// Benchmark the embedding path.
fn bench_embedding_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("embedding_path");
    group.sample_size(30);

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let detector = IntentDetector::with_encoder(
        DetectorConfig::default(),
        Arc::new(HashingTextEmbedder::default()),
    );
    runtime.block_on(detector.warm_up());
    let messages = generate_test_messages(50);

    group.throughput(Throughput::Elements(messages.len() as u64));
    group.bench_function("detect_intents_batch", |b| {
        b.iter(|| {
            runtime.block_on(async {
                for message in &messages {
                    black_box(detector.detect_intents(black_box(message)).await);
                }
            })
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pattern_path, bench_extractors, bench_embedding_path);

criterion_main!(benches);
