//! Token codecs used by the chunker
//!
//! A codec is a reversible text <-> token id mapping tied to one model family.

use super::{EmbeddingError, Result};
use std::path::Path;
use tokenizers::Tokenizer;

/// Trait for tokenizers (allows swapping in fakes)
pub trait TokenCodec: Send + Sync {
    /// Split text into token ids
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Turn a window of token ids back into text
    fn decode(&self, ids: &[u32]) -> Result<String>;
}

/// HuggingFace `tokenizers` backed codec
///
/// The source is either a path to a `tokenizer.json` file or a hub
/// identifier such as `Xenova/gpt-4o`.
pub struct HfTokenizer {
    inner: Tokenizer,
    source: String,
}

impl HfTokenizer {
    /// Load from a local file when `source` points at one, otherwise from the hub
    pub fn load(source: &str) -> Result<Self> {
        let path = Path::new(source);
        let inner = if path.is_file() {
            Tokenizer::from_file(path)
        } else {
            Tokenizer::from_pretrained(source, None)
        }
        .map_err(|e| EmbeddingError::Tokenizer(format!("failed to load '{}': {}", source, e)))?;

        tracing::debug!(tokenizer = source, "Loaded tokenizer");

        Ok(Self {
            inner,
            source: source.to_string(),
        })
    }

    /// Build from an in-memory `tokenizer.json` document
    pub fn from_json(json: &str) -> Result<Self> {
        let inner = Tokenizer::from_bytes(json.as_bytes())
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
        Ok(Self {
            inner,
            source: "<inline>".to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl TokenCodec for HfTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        // Special tokens would leak [CLS]/[SEP] into every window
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.inner
            .decode(ids, true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))
    }
}
