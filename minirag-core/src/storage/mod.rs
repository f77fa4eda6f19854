//! In-memory vector storage
//!
//! Holds embedded chunks for the lifetime of one session. The store only
//! appends and lists; ranking lives in [`crate::retrieval`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata key carrying the sequential ingestion index of a chunk
pub const CHUNK_ID_KEY: &str = "chunk_id";

/// One indexed chunk: its text, its embedding, and free-form metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: HashMap<String, Value>,
}

impl ChunkRecord {
    /// Create a record tagged with its ingestion order
    pub fn new(text: impl Into<String>, embedding: Vec<f32>, chunk_id: usize) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert(CHUNK_ID_KEY.to_string(), Value::from(chunk_id));
        Self {
            text: text.into(),
            embedding,
            metadata,
        }
    }

    pub fn chunk_id(&self) -> Option<usize> {
        self.metadata
            .get(CHUNK_ID_KEY)
            .and_then(Value::as_u64)
            .map(|id| id as usize)
    }
}

/// Append-only, insertion-ordered collection of chunk records
#[derive(Debug, Clone, Default)]
pub struct VectorStore {
    records: Vec<ChunkRecord>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Dimensions are not checked against existing records.
    pub fn add(&mut self, record: ChunkRecord) {
        self.records.push(record);
    }

    /// All records, in insertion order
    pub fn all(&self) -> &[ChunkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<ChunkRecord> for VectorStore {
    fn from_iter<I: IntoIterator<Item = ChunkRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
