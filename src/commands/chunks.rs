use minirag_core::embeddings::HfTokenizer;
use minirag_core::pipeline::load_document;
use minirag_core::{RagConfig, TokenChunker};
use std::sync::Arc;

pub fn run(limit: Option<usize>, config: &RagConfig) -> anyhow::Result<()> {
    let text = load_document(&config.documents.path)?;
    let tokenizer = HfTokenizer::load(&config.chunking.tokenizer)?;
    let source = tokenizer.source().to_string();
    let chunker = TokenChunker::new(config.chunker_config(), Arc::new(tokenizer));

    let chunks = chunker.chunk_spans(&text)?;
    println!(
        "{} chunks ({} tokens, {} overlap, tokenizer {})\n",
        chunks.len(),
        config.chunking.chunk_size_tokens,
        config.chunking.overlap_tokens,
        source
    );

    for chunk in chunks.iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "[{}] tokens {}..{}",
            chunk.chunk_index, chunk.token_start, chunk.token_end
        );
        println!("{}", chunk.text);
        println!();
    }

    Ok(())
}
