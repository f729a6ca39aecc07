use serde::{Deserialize, Serialize};

/// Structured answer produced by the language model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// The natural language answer to the user's question
    pub answer: String,

    /// Direct plot snippets used to answer the question
    pub contexts: Vec<String>,

    /// Short explanation of how the answer was formed from the context
    pub reasoning: String,
}
