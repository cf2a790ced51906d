//! Prompt context assembly

use super::ranker::ScoredDocument;

/// One block per ranked document, separated by a blank line
pub fn build_context(ranked: &[ScoredDocument]) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(i, doc)| format!("Document {}: {}\n{}\n", i + 1, doc.name, doc.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Full answering prompt around the assembled context
pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "You are an AI assistant that helps users find information in their documents.\n\
         The user query is: \"{query}\"\n\n\
         Here are the most relevant documents found in their collection:\n\n\
         {context}\n\
         Answer the user's query based ONLY on the information in these documents.\n\
         If the documents do not contain enough information to answer, say so honestly.\n\
         Always cite the document(s) each piece of information comes from.\n\
         Use markdown formatting when it makes the answer clearer."
    )
}

/// At most `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Content preview with an ellipsis when cut
pub fn snippet(content: &str, max_chars: usize) -> String {
    let cut = truncate_chars(content, max_chars);
    if cut.len() < content.len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}
