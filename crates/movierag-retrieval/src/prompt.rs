//! Prompt construction for grounded movie answers

use movierag_core::models::ScoredChunk;
use serde_json::json;

const ASSISTANT_INSTRUCTIONS: &str =
    "You are a helpful movie assistant. Answer the user question based ONLY on the provided context.";

/// Join retrieved chunks into the context block, in retrieval order
pub fn build_context(chunks: &[ScoredChunk]) -> String {
    chunks
        .iter()
        .map(|scored| {
            format!("Movie: {}\nPlot: {}", scored.chunk.metadata.title, scored.chunk.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// JSON schema of [`movierag_core::models::Answer`]
pub fn answer_schema() -> serde_json::Value {
    json!({
        "properties": {
            "answer": {
                "title": "Answer",
                "description": "The natural language answer to the user's question.",
                "type": "string"
            },
            "contexts": {
                "title": "Contexts",
                "description": "A list of direct plot snippets used to answer the question.",
                "type": "array",
                "items": {"type": "string"}
            },
            "reasoning": {
                "title": "Reasoning",
                "description": "A short explanation of how the answer was formed based on the context.",
                "type": "string"
            }
        },
        "required": ["answer", "contexts", "reasoning"]
    })
}

/// Instructions telling the model to reply with one JSON object matching the schema
pub fn format_instructions() -> String {
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
         As an example, for the schema {{\"properties\": {{\"foo\": {{\"title\": \"Foo\", \"description\": \"a list of strings\", \
         \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
         the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
         The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
         Here is the output schema:\n```\n{}\n```",
        answer_schema()
    )
}

/// System message: assistant role followed by the output format
pub fn system_prompt() -> String {
    format!(
        "{}\nOutput must be valid JSON following this format:\n{}",
        ASSISTANT_INSTRUCTIONS,
        format_instructions()
    )
}

/// User message carrying the retrieved context and the question
pub fn user_prompt(context: &str, question: &str) -> String {
    format!("Context:\n{}\n\nQuestion: {}", context, question)
}
