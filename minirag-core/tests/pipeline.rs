//! End-to-end runs of the pipeline with a real tokenizer and local fakes

use minirag_core::embeddings::{HfTokenizer, MockEmbeddingModel};
use minirag_core::generation::MockGenerator;
use minirag_core::pipeline::FALLBACK_MESSAGE;
use minirag_core::retrieval::top_k_search;
use minirag_core::{Embedder, RagConfig, RagPipeline, TokenCodec};
use std::sync::Arc;

const DOC: &str = "the sky is blue water boils at 100 degrees celsius";

fn tokenizer() -> Arc<dyn TokenCodec> {
    let json = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {
                "[UNK]": 0, "the": 1, "sky": 2, "is": 3, "blue": 4, "water": 5,
                "boils": 6, "at": 7, "100": 8, "degrees": 9, "celsius": 10
            },
            "unk_token": "[UNK]"
        }
    }"#;
    Arc::new(HfTokenizer::from_json(json).unwrap())
}

/// One dimension per topic word stem
struct TopicEmbedder;

impl Embedder for TopicEmbedder {
    fn embed(&self, text: &str) -> minirag_core::embeddings::Result<Vec<f32>> {
        let topics: [&[&str]; 5] = [
            &["sky"],
            &["blue"],
            &["water"],
            &["boil"],
            &["temperature", "degree", "celsius"],
        ];
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .collect();
        Ok(topics
            .iter()
            .map(|stems| {
                words
                    .iter()
                    .filter(|w| stems.iter().any(|s| w.starts_with(s)))
                    .count() as f32
            })
            .collect())
    }
}

fn small_chunks() -> RagConfig {
    let mut config = RagConfig::default();
    config.chunking.chunk_size_tokens = 6;
    config.chunking.overlap_tokens = 2;
    config
}

#[test]
fn test_water_question_is_grounded_in_relevant_chunk() {
    let generator = MockGenerator::new().with_response("Water boils at 100 degrees Celsius.");
    let pipeline = RagPipeline::new(
        small_chunks(),
        tokenizer(),
        Arc::new(TopicEmbedder),
        Arc::new(generator.clone()),
    );

    let store = pipeline.build_store(DOC).unwrap();
    let answer = pipeline
        .answer_with_details("At what temperature does water boil?", Some(&store))
        .unwrap();

    let texts: Vec<_> = store.all().iter().map(|r| r.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "the sky is blue water boils",
            "water boils at 100 degrees celsius"
        ]
    );

    assert!(!answer.is_fallback());
    assert_eq!(answer.text(), "Water boils at 100 degrees Celsius.");

    let hits = &answer.retrieval().hits;
    assert_eq!(hits[0].chunk_id, Some(1));
    assert!((hits[0].score - 0.9428).abs() < 1e-3);
    assert!((hits[1].score - 0.5774).abs() < 1e-3);

    let prompt = &generator.prompts()[0];
    assert!(prompt.contains("water boils at 100 degrees celsius"));
}

#[test]
fn test_unrelated_question_falls_back_without_generation() {
    let generator = MockGenerator::new();
    let pipeline = RagPipeline::new(
        small_chunks(),
        tokenizer(),
        Arc::new(TopicEmbedder),
        Arc::new(generator.clone()),
    );

    let store = pipeline.build_store(DOC).unwrap();
    let answer = pipeline
        .answer("Who wrote the printer manual?", Some(&store))
        .unwrap();

    assert_eq!(answer, FALLBACK_MESSAGE);
    assert_eq!(generator.call_count(), 0);
}

#[test]
fn test_chunks_cover_document_with_overlap() {
    let pipeline = RagPipeline::new(
        small_chunks(),
        tokenizer(),
        Arc::new(TopicEmbedder),
        Arc::new(MockGenerator::new()),
    );

    let spans = pipeline.chunker().chunk_spans(DOC).unwrap();

    assert_eq!(spans.first().unwrap().token_start, 0);
    assert_eq!(spans.last().unwrap().token_end, 10);
    for pair in spans.windows(2) {
        assert_eq!(pair[0].token_end - pair[1].token_start, 2);
    }
}

#[test]
fn test_exact_chunk_text_ranks_first_with_mock_embeddings() {
    let embedder = Arc::new(MockEmbeddingModel::new(64));
    let pipeline = RagPipeline::new(
        small_chunks(),
        tokenizer(),
        embedder.clone(),
        Arc::new(MockGenerator::new().with_response("ok")),
    );
    let store = pipeline.build_store(DOC).unwrap();

    let query = embedder.embed("water boils at 100 degrees celsius").unwrap();
    let results = top_k_search(&query, &store, store.len());

    assert_eq!(results[0].record.chunk_id(), Some(1));
    assert!((results[0].score - 1.0).abs() < 1e-5);
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}
