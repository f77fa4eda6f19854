use minirag_core::{RagConfig, RagPipeline};
use std::io::{self, BufRead, Write};

pub fn run(config: RagConfig) -> anyhow::Result<()> {
    let pipeline = RagPipeline::from_config(config)?;

    println!("Loading documents and building vector store...");
    let store = pipeline.index_documents()?;
    println!("Vector store built ({} chunks).\n", store.len());

    println!("Mini RAG ready. Type a question (or 'exit').\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Q> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let question = line?;
        let question = question.trim();

        if question.is_empty() {
            continue;
        }
        if is_exit(question) {
            break;
        }

        // A failed question should not end the session
        match pipeline.answer(question, Some(&store)) {
            Ok(answer) => println!("\n{}\n", answer),
            Err(e) => eprintln!("\nError: {}\n", e),
        }
    }

    Ok(())
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("exit now"));
    }
}
