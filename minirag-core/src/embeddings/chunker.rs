//! Token-bounded chunking for embedding generation
//!
//! Splits documents into overlapping windows of tokens. Windows are measured
//! in tokens of a specific model family, then decoded back to text.

use super::{EmbeddingError, Result, TokenCodec};
use std::sync::Arc;

/// Configuration for the token chunker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Maximum number of tokens per chunk
    pub chunk_size_tokens: usize,
    /// Number of tokens shared by consecutive windows
    pub overlap_tokens: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size_tokens: 70,
            overlap_tokens: 25,
        }
    }
}

impl ChunkerConfig {
    pub fn new(chunk_size_tokens: usize, overlap_tokens: usize) -> Self {
        Self {
            chunk_size_tokens,
            overlap_tokens,
        }
    }

    /// Reject window settings that could never advance
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size_tokens == 0 {
            return Err(EmbeddingError::InvalidConfiguration(
                "chunk_size_tokens must be > 0".to_string(),
            ));
        }
        if self.overlap_tokens >= self.chunk_size_tokens {
            return Err(EmbeddingError::InvalidConfiguration(format!(
                "overlap_tokens ({}) must be < chunk_size_tokens ({})",
                self.overlap_tokens, self.chunk_size_tokens
            )));
        }
        Ok(())
    }

    /// Distance between the starts of two consecutive windows
    pub fn stride(&self) -> usize {
        self.chunk_size_tokens - self.overlap_tokens
    }
}

/// A chunk of text cut from a document
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Decoded, trimmed text of the window
    pub text: String,
    /// Index of this chunk among emitted chunks (0-based)
    pub chunk_index: usize,
    /// First token of the window (inclusive)
    pub token_start: usize,
    /// Last token of the window (exclusive)
    pub token_end: usize,
}

/// Chunker for splitting documents into overlapping token windows
pub struct TokenChunker {
    config: ChunkerConfig,
    codec: Arc<dyn TokenCodec>,
}

impl TokenChunker {
    pub fn new(config: ChunkerConfig, codec: Arc<dyn TokenCodec>) -> Self {
        Self { config, codec }
    }

    pub fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk a document, keeping the token span of every emitted window
    pub fn chunk_spans(&self, text: &str) -> Result<Vec<Chunk>> {
        self.config.validate()?;

        let tokens = self.codec.encode(text)?;
        let n = tokens.len();
        let mut chunks = Vec::new();
        let mut start = 0;

        while start < n {
            let end = (start + self.config.chunk_size_tokens).min(n);

            let decoded = self.codec.decode(&tokens[start..end])?;
            let trimmed = decoded.trim();
            if !trimmed.is_empty() {
                chunks.push(Chunk {
                    text: trimmed.to_string(),
                    chunk_index: chunks.len(),
                    token_start: start,
                    token_end: end,
                });
            }

            if end == n {
                break;
            }

            // Advance on raw token position, whether or not the window was kept
            start += self.config.stride();
        }

        Ok(chunks)
    }

    /// Chunk a document into plain strings
    pub fn chunk_text(&self, text: &str) -> Result<Vec<String>> {
        Ok(self
            .chunk_spans(text)?
            .into_iter()
            .map(|chunk| chunk.text)
            .collect())
    }
}

/// Split `text` into overlapping chunks of at most `chunk_size_tokens` tokens
///
/// Fails with [`EmbeddingError::InvalidConfiguration`] before tokenizing when
/// `overlap_tokens >= chunk_size_tokens`.
pub fn chunk_text_by_tokens(
    text: &str,
    chunk_size_tokens: usize,
    overlap_tokens: usize,
    codec: Arc<dyn TokenCodec>,
) -> Result<Vec<String>> {
    TokenChunker::new(ChunkerConfig::new(chunk_size_tokens, overlap_tokens), codec).chunk_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// One token per character; ids are code points
    struct CharCodec {
        encode_calls: AtomicUsize,
    }

    impl CharCodec {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                encode_calls: AtomicUsize::new(0),
            })
        }
    }

    impl TokenCodec for CharCodec {
        fn encode(&self, text: &str) -> Result<Vec<u32>> {
            self.encode_calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.chars().map(|c| c as u32).collect())
        }

        fn decode(&self, ids: &[u32]) -> Result<String> {
            Ok(ids.iter().filter_map(|&id| char::from_u32(id)).collect())
        }
    }

    fn chunker(size: usize, overlap: usize) -> (TokenChunker, Arc<CharCodec>) {
        let codec = CharCodec::new();
        let chunker = TokenChunker::new(ChunkerConfig::new(size, overlap), codec.clone());
        (chunker, codec)
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let (chunker, _) = chunker(10, 2);
        assert!(chunker.chunk_text("").unwrap().is_empty());
    }

    #[test]
    fn test_overlap_equal_to_size_rejected() {
        let (chunker, codec) = chunker(10, 10);

        let result = chunker.chunk_text("some text");

        assert!(matches!(
            result,
            Err(EmbeddingError::InvalidConfiguration(_))
        ));
        assert_eq!(
            codec.encode_calls.load(Ordering::SeqCst),
            0,
            "Validation must happen before tokenizing"
        );
    }

    #[test]
    fn test_overlap_larger_than_size_rejected() {
        let (chunker, _) = chunker(10, 15);
        assert!(matches!(
            chunker.chunk_text("some text"),
            Err(EmbeddingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_overlap_just_below_size_accepted() {
        let (chunker, _) = chunker(10, 9);
        let chunks = chunker.chunk_text("abcdefghijkl").unwrap();
        assert_eq!(chunks, vec!["abcdefghij", "bcdefghijk", "cdefghijkl"]);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let (chunker, _) = chunker(0, 0);
        assert!(chunker.chunk_text("abc").is_err());
    }

    #[test]
    fn test_windows_overlap_by_configured_tokens() {
        let (chunker, _) = chunker(4, 1);

        let chunks = chunker.chunk_text("abcdefghij").unwrap();

        assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
    }

    #[test]
    fn test_final_partial_window_kept() {
        let (chunker, _) = chunker(4, 1);

        let chunks = chunker.chunk_text("abcdefgh").unwrap();

        assert_eq!(chunks, vec!["abcd", "defg", "gh"]);
    }

    #[test]
    fn test_text_shorter_than_window() {
        let (chunker, _) = chunker(70, 25);
        assert_eq!(chunker.chunk_text("  short  ").unwrap(), vec!["short"]);
    }

    #[test]
    fn test_window_starts_follow_stride() {
        let (chunker, _) = chunker(5, 2);
        let stride = chunker.config().stride();

        let spans = chunker.chunk_spans(&"x".repeat(23)).unwrap();

        for (i, span) in spans.iter().enumerate() {
            assert_eq!(span.token_start, i * stride);
            assert!(span.token_end - span.token_start <= 5);
        }
        assert_eq!(spans.last().unwrap().token_end, 23);
    }

    #[test]
    fn test_whitespace_window_dropped_without_shifting_positions() {
        let (chunker, _) = chunker(3, 0);

        // Second window is all spaces
        let spans = chunker.chunk_spans("abc   def").unwrap();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "abc");
        assert_eq!(spans[1].text, "def");
        assert_eq!(spans[1].chunk_index, 1);
        assert_eq!(spans[1].token_start, 6);
    }

    #[test]
    fn test_chunks_are_trimmed() {
        let (chunker, _) = chunker(5, 0);

        let chunks = chunker.chunk_text(" ab  cd   ").unwrap();

        assert_eq!(chunks, vec!["ab", "cd"]);
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let (chunker, _) = chunker(7, 3);
        let text = "The sky is blue. Water boils at 100 degrees Celsius.";

        let first = chunker.chunk_text(text).unwrap();
        let second = chunker.chunk_text(text).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_free_function_matches_chunker() {
        let codec = CharCodec::new();
        let text = "overlapping windows of characters";

        let via_fn = chunk_text_by_tokens(text, 8, 3, codec.clone()).unwrap();
        let via_struct = TokenChunker::new(ChunkerConfig::new(8, 3), codec)
            .chunk_text(text)
            .unwrap();

        assert_eq!(via_fn, via_struct);
    }

    #[test]
    fn test_multibyte_characters() {
        let (chunker, _) = chunker(3, 1);

        let chunks = chunker.chunk_text("你好🎉世界").unwrap();

        assert_eq!(chunks, vec!["你好🎉", "🎉世界"]);
    }

    #[test]
    fn test_default_config() {
        let config = ChunkerConfig::default();

        assert_eq!(config.chunk_size_tokens, 70);
        assert_eq!(config.overlap_tokens, 25);
        assert_eq!(config.stride(), 45);
        assert!(config.validate().is_ok());
    }
}
