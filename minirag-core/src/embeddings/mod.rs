//! Embeddings module for semantic retrieval
//!
//! Provides token-bounded chunking and embedding generation.

pub mod chunker;
pub mod model;
pub mod openai;
pub mod tokenizer;

pub use chunker::{chunk_text_by_tokens, Chunk, ChunkerConfig, TokenChunker};
pub use model::{Embedder, MockEmbeddingModel};
pub use openai::OpenAiEmbedder;
pub use tokenizer::{HfTokenizer, TokenCodec};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;
