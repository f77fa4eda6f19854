//! Ingestion and question answering
//!
//! Two flows share one configuration:
//! 1. Ingest - chunk a document, embed every chunk, fill a [`VectorStore`]
//! 2. Answer - embed the question, retrieve the best chunks, then either
//!    ground a completion on them or return the fallback message

pub mod config;
pub mod documents;

pub use config::{
    ConfigError, ConfigValidationError, EmbeddingProvider, RagConfig, CONFIG_FILE,
};
pub use documents::load_document;

use crate::embeddings::{
    EmbeddingError, Embedder, HfTokenizer, MockEmbeddingModel, OpenAiEmbedder, TokenChunker,
    TokenCodec,
};
use crate::generation::{build_rag_prompt, GenerationError, Generator, OpenAiGenerator};
use crate::retrieval::{top_k_search, INVALID_SIMILARITY};
use crate::storage::{ChunkRecord, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Reply used when no stored chunk is relevant enough
pub const FALLBACK_MESSAGE: &str = "I don't know based on the provided documents.";

/// Embedding width of the mock provider when none is configured
pub const DEFAULT_MOCK_DIMENSIONS: usize = 384;

/// Chunks sent to the embedder per call during ingestion
pub const EMBED_BATCH_SIZE: usize = 64;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Embedding error: {0}")]
    Embedding(EmbeddingError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EmbeddingError> for PipelineError {
    fn from(err: EmbeddingError) -> Self {
        match err {
            EmbeddingError::InvalidConfiguration(msg) => PipelineError::InvalidConfiguration(msg),
            other => PipelineError::Embedding(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// A chunk selected for a question
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f32,
    pub chunk_id: Option<usize>,
}

/// Retrieved chunks, best match first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    pub hits: Vec<RetrievedChunk>,
}

impl Retrieval {
    /// Best score, or the invalid-similarity sentinel when nothing was retrieved
    pub fn top_score(&self) -> f32 {
        self.hits
            .first()
            .map(|hit| hit.score)
            .unwrap_or(INVALID_SIMILARITY)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.text.as_str()).collect()
    }
}

/// Outcome of answering one question
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Retrieval was not confident enough; generation was skipped
    Fallback { retrieval: Retrieval },
    /// The model answered from the retrieved chunks
    Grounded { text: String, retrieval: Retrieval },
}

impl Answer {
    /// Text shown to the user
    pub fn text(&self) -> &str {
        match self {
            Answer::Fallback { .. } => FALLBACK_MESSAGE,
            Answer::Grounded { text, .. } => text,
        }
    }

    pub fn retrieval(&self) -> &Retrieval {
        match self {
            Answer::Fallback { retrieval } | Answer::Grounded { retrieval, .. } => retrieval,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Answer::Fallback { .. })
    }
}

/// The question-answering pipeline
pub struct RagPipeline {
    config: RagConfig,
    codec: Arc<dyn TokenCodec>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
}

impl RagPipeline {
    pub fn new(
        config: RagConfig,
        codec: Arc<dyn TokenCodec>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            config,
            codec,
            embedder,
            generator,
        }
    }

    /// Build a pipeline with the collaborators named in the config
    pub fn from_config(config: RagConfig) -> Result<Self> {
        let errors = config.validate();
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(PipelineError::InvalidConfiguration(messages.join("; ")));
        }

        let api_key = config.api_key()?.to_string();
        let codec: Arc<dyn TokenCodec> = Arc::new(HfTokenizer::load(&config.chunking.tokenizer)?);

        let embedder: Arc<dyn Embedder> = match config.embedding.provider {
            EmbeddingProvider::OpenAi => Arc::new(OpenAiEmbedder::new(
                &api_key,
                &config.openai.base_url,
                &config.embedding.model,
                config.embedding.dimensions,
                Duration::from_secs(config.embedding.timeout_secs),
                config.embedding.max_retries,
            )?),
            EmbeddingProvider::Mock => Arc::new(MockEmbeddingModel::new(
                config.embedding.dimensions.unwrap_or(DEFAULT_MOCK_DIMENSIONS),
            )),
        };

        let generator: Arc<dyn Generator> = Arc::new(OpenAiGenerator::new(
            &api_key,
            &config.openai.base_url,
            &config.llm.model,
            config.llm.temperature,
            Duration::from_secs(config.llm.timeout_secs),
        )?);

        Ok(Self::new(config, codec, embedder, generator))
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Chunker configured from this pipeline's settings
    pub fn chunker(&self) -> TokenChunker {
        TokenChunker::new(self.config.chunker_config(), self.codec.clone())
    }

    /// Read the configured document
    pub fn load_documents(&self) -> Result<String> {
        load_document(&self.config.documents.path)
    }

    /// Chunk and embed `doc_text` into a fresh store
    ///
    /// Chunks whose embedding comes back empty are still stored; retrieval
    /// ranks them last.
    pub fn build_store(&self, doc_text: &str) -> Result<VectorStore> {
        let chunks = self.chunker().chunk_text(doc_text)?;
        let total = chunks.len();
        tracing::info!(chunks = total, "Indexing token chunks");

        let mut store = VectorStore::new();
        for (batch_no, batch) in chunks.chunks(EMBED_BATCH_SIZE).enumerate() {
            let first = batch_no * EMBED_BATCH_SIZE;
            tracing::info!("  chunk {}/{}", first + 1, total);

            let texts: Vec<&str> = batch.iter().map(String::as_str).collect();
            let embeddings = self.embedder.embed_batch(&texts)?;
            if embeddings.len() != batch.len() {
                return Err(PipelineError::Embedding(EmbeddingError::InvalidResponse(
                    format!("{} embeddings for {} chunks", embeddings.len(), batch.len()),
                )));
            }

            for (offset, (chunk, embedding)) in batch.iter().zip(embeddings).enumerate() {
                let chunk_id = first + offset;
                if embedding.is_empty() {
                    tracing::warn!(chunk_id, "Empty embedding, chunk will rank last");
                }
                store.add(ChunkRecord::new(chunk.clone(), embedding, chunk_id));
            }
        }

        tracing::info!(records = store.len(), "Vector store built");
        Ok(store)
    }

    /// Load the configured document and index it
    pub fn index_documents(&self) -> Result<VectorStore> {
        let text = self.load_documents()?;
        self.build_store(&text)
    }

    /// Find the chunks most similar to `question`
    pub fn retrieve(&self, question: &str, store: &VectorStore) -> Result<Retrieval> {
        let query = self.embedder.embed(question)?;
        let hits: Vec<RetrievedChunk> = top_k_search(&query, store, self.config.retrieval.top_k)
            .into_iter()
            .map(|scored| RetrievedChunk {
                text: scored.record.text.clone(),
                score: scored.score,
                chunk_id: scored.record.chunk_id(),
            })
            .collect();

        let retrieval = Retrieval { hits };
        tracing::debug!(
            hits = retrieval.hits.len(),
            top_score = retrieval.top_score(),
            "Retrieved chunks"
        );
        Ok(retrieval)
    }

    /// Answer a question, reporting what was retrieved
    ///
    /// Without a store the configured document is loaded and indexed first.
    pub fn answer_with_details(
        &self,
        question: &str,
        store: Option<&VectorStore>,
    ) -> Result<Answer> {
        let built;
        let store = match store {
            Some(store) => store,
            None => {
                built = self.index_documents()?;
                &built
            }
        };

        let retrieval = self.retrieve(question, store)?;
        let top_score = retrieval.top_score();
        let threshold = self.config.retrieval.similarity_threshold;

        // NaN fails the comparison and falls back too
        if !(top_score >= threshold) {
            tracing::info!(top_score, threshold, "Below similarity threshold, not answering");
            return Ok(Answer::Fallback { retrieval });
        }

        let prompt = build_rag_prompt(question, &retrieval.texts());
        let text = self.generator.complete(&prompt)?;
        Ok(Answer::Grounded { text, retrieval })
    }

    /// Answer a question with the generated text or the fallback message
    pub fn answer(&self, question: &str, store: Option<&VectorStore>) -> Result<String> {
        Ok(self.answer_with_details(question, store)?.text().to_string())
    }
}
