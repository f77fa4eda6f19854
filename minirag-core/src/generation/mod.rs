//! Answer generation from grounded prompts
//!
//! Provides the prompt template and a chat-completions client.

pub mod openai;
pub mod prompts;

pub use openai::OpenAiGenerator;
pub use prompts::{build_rag_prompt, CONTEXT_SEPARATOR, SYSTEM_PROMPT};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Mock generator has no response queued")]
    Exhausted,
}

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Trait for language models that complete a prompt
pub trait Generator: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Generator that replays queued responses and records every prompt
#[derive(Clone, Default)]
pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next call
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response.into());
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Generator for MockGenerator {
    fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or(GenerationError::Exhausted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_replays_in_order() {
        let generator = MockGenerator::new()
            .with_response("first")
            .with_response("second");

        assert_eq!(generator.complete("a").unwrap(), "first");
        assert_eq!(generator.complete("b").unwrap(), "second");
        assert_eq!(generator.prompts(), vec!["a", "b"]);
    }

    #[test]
    fn test_mock_exhausted() {
        let generator = MockGenerator::new();

        let result = generator.complete("prompt");

        assert!(matches!(result, Err(GenerationError::Exhausted)));
        assert_eq!(generator.call_count(), 1);
    }

    #[test]
    fn test_mock_clones_share_state() {
        let generator = MockGenerator::new().with_response("ok");
        let handle = generator.clone();

        let boxed: Box<dyn Generator> = Box::new(generator);
        boxed.complete("hello").unwrap();

        assert_eq!(handle.call_count(), 1);
    }
}
