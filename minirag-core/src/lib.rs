pub mod embeddings;
pub mod generation;
pub mod pipeline;
pub mod retrieval;
pub mod storage;

pub use embeddings::{Embedder, TokenCodec, TokenChunker};
pub use generation::Generator;
pub use pipeline::{Answer, RagConfig, RagPipeline};
pub use storage::{ChunkRecord, VectorStore};
