use minirag_core::{Answer, RagConfig, RagPipeline};

pub fn run(question: &str, sources: bool, config: RagConfig) -> anyhow::Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("Question cannot be empty");
    }

    let pipeline = RagPipeline::from_config(config)?;
    let answer = pipeline.answer_with_details(question, None)?;

    println!("{}", answer.text());
    if sources {
        print_sources(&answer);
    }

    Ok(())
}

pub fn print_sources(answer: &Answer) {
    let hits = &answer.retrieval().hits;
    if hits.is_empty() {
        println!("\nNo chunks retrieved.");
        return;
    }

    println!("\nSources:");
    for hit in hits {
        let id = hit
            .chunk_id
            .map(|id| format!("#{}", id))
            .unwrap_or_else(|| "#?".to_string());
        println!("  {} ({:.3}) {}", id, hit.score, hit.text);
    }
}
