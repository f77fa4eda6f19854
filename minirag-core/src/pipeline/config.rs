//! Pipeline configuration
//!
//! Built once at startup and passed into the pipeline. Every section has
//! defaults, so a config file only needs the keys it changes:
//!
//! ```toml
//! [chunking]
//! chunk_size_tokens = 70
//! overlap_tokens = 25
//!
//! [retrieval]
//! top_k = 4
//! similarity_threshold = 0.22
//! ```

use crate::embeddings::ChunkerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "minirag.toml";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const LLM_MODEL_ENV: &str = "OPENAI_LLM_MODEL";
pub const EMBED_MODEL_ENV: &str = "OPENAI_EMBED_MODEL";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Missing API key. Set [openai] api_key or the OPENAI_API_KEY env var.")]
    MissingApiKey,
}

/// Configuration for the whole pipeline
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RagConfig {
    /// Document source settings
    pub documents: DocumentsConfig,
    /// Token window settings
    pub chunking: ChunkingConfig,
    /// Retrieval and fallback settings
    pub retrieval: RetrievalConfig,
    /// Embedding model settings
    pub embedding: EmbeddingConfig,
    /// Completion model settings
    pub llm: LlmConfig,
    /// Credentials and endpoint shared by the OpenAI clients
    pub openai: OpenAiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Text file to index
    pub path: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/docs.txt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size_tokens: usize,
    pub overlap_tokens: usize,
    /// `tokenizer.json` path or HuggingFace hub identifier
    pub tokenizer: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: 70,
            overlap_tokens: 25,
            tokenizer: "Xenova/gpt-4o".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks passed to the model
    pub top_k: usize,
    /// Best score below this answers with the fallback message
    pub similarity_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            similarity_threshold: 0.22,
        }
    }
}

/// Which embedder backs the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    #[default]
    OpenAi,
    /// Deterministic hash embeddings, no network
    Mock,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    pub max_retries: usize,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::OpenAi,
            model: "text-embedding-3-small".to_string(),
            dimensions: None,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// A single problem found by [`RagConfig::validate`]
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl ConfigValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl RagConfig {
    /// Parse a TOML document
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key/value source. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(API_KEY_ENV) {
            self.openai.api_key = Some(key);
        }
        if let Some(model) = get(LLM_MODEL_ENV) {
            self.llm.model = model;
        }
        if let Some(model) = get(EMBED_MODEL_ENV) {
            self.embedding.model = model;
        }
        if let Some(url) = get(BASE_URL_ENV) {
            self.openai.base_url = url;
        }
    }

    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig::new(self.chunking.chunk_size_tokens, self.chunking.overlap_tokens)
    }

    /// The API key, if one is configured
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.openai
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// Validate the configuration.
    ///
    /// Returns every problem found; an empty list means the config is usable.
    /// Credentials are checked separately by [`RagConfig::api_key`].
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.chunking.chunk_size_tokens == 0 {
            errors.push(ConfigValidationError::new(
                "chunking.chunk_size_tokens",
                "Chunk size must be greater than 0.",
            ));
        }

        if self.chunking.overlap_tokens >= self.chunking.chunk_size_tokens {
            errors.push(ConfigValidationError::new(
                "chunking.overlap_tokens",
                format!(
                    "Overlap ({}) must be smaller than chunk size ({}).",
                    self.chunking.overlap_tokens, self.chunking.chunk_size_tokens
                ),
            ));
        }

        if self.chunking.tokenizer.trim().is_empty() {
            errors.push(ConfigValidationError::new(
                "chunking.tokenizer",
                "Tokenizer cannot be empty.",
            ));
        }

        if !self.retrieval.similarity_threshold.is_finite() {
            errors.push(ConfigValidationError::new(
                "retrieval.similarity_threshold",
                "Threshold must be a finite number.",
            ));
        }

        if self.embedding.provider == EmbeddingProvider::OpenAi
            && self.embedding.model.trim().is_empty()
        {
            errors.push(ConfigValidationError::new(
                "embedding.model",
                "Embedding model cannot be empty.",
            ));
        }

        if self.embedding.dimensions == Some(0) {
            errors.push(ConfigValidationError::new(
                "embedding.dimensions",
                "Dimensions must be greater than 0 when set.",
            ));
        }

        if self.llm.model.trim().is_empty() {
            errors.push(ConfigValidationError::new(
                "llm.model",
                "LLM model cannot be empty.",
            ));
        }

        errors
    }

    /// Render as TOML with the API key masked
    pub fn to_toml_redacted(&self) -> Result<String, ConfigError> {
        let mut redacted = self.clone();
        if redacted.openai.api_key.is_some() {
            redacted.openai.api_key = Some("********".to_string());
        }
        Ok(toml::to_string_pretty(&redacted)?)
    }
}
