//! LLM port definitions

use movierag_core::error::{MovieRagError, Result};
use std::sync::Arc;

/// Port for embedding text into vector representations
pub trait Embedder: Send + Sync {
    /// Generate embeddings for a batch of passages
    ///
    /// # Arguments
    /// * `texts` - Slice of text strings to embed
    ///
    /// # Returns
    /// Vector of embedding vectors, one per input text, in input order
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Generate the embedding used to search for `text`
    ///
    /// Models with asymmetric passage/query modes override this.
    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text])?.into_iter().next().ok_or_else(|| MovieRagError::Embedding {
            reason: "Embedder returned no vector for the query".to_string(),
            remediation: "Check embedder configuration".to_string(),
        })
    }

    /// Get the dimensionality of embeddings produced by this embedder
    fn dimensions(&self) -> usize;

    /// Get the name/identifier of the embedding model
    fn model_name(&self) -> &str;
}

/// Port for chat completion
pub trait ChatModel: Send + Sync {
    /// Complete a conversation made of one system and one user message
    ///
    /// # Returns
    /// The raw text of the model's reply
    fn complete(&self, system: &str, user: &str) -> Result<String>;

    /// Get the name/identifier of the chat model
    fn model_name(&self) -> &str;
}

impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        (**self).embed(texts)
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed_query(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

impl<T: ChatModel + ?Sized> ChatModel for Arc<T> {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
