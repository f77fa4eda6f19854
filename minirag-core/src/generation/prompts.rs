//! Prompt template for grounded answers

/// Fixed instruction that restricts the model to the retrieved documents
pub const SYSTEM_PROMPT: &str = "You are an IT support assistant.\n\
Use ONLY the provided DOCUMENTS.\n\
If the answer is not explicitly present, say: \"I don't know based on the provided documents.\"";

/// Separator placed between retrieved chunks
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Build the completion prompt from the question and retrieved chunk texts.
///
/// Chunks are kept in the order given, which is best match first.
pub fn build_rag_prompt<S: AsRef<str>>(question: &str, retrieved_chunks: &[S]) -> String {
    let context = retrieved_chunks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR);

    format!(
        "{}\n\nDOCUMENTS:\n{}\n\nQUESTION:\n{}\n\nANSWER:",
        SYSTEM_PROMPT,
        context.trim(),
        question
    )
}
