use movierag_core::error::{MovieRagError, Result};
use movierag_core::models::{Chunk, Embedding};
use movierag_llm::ports::Embedder;

/// Pipeline for generating embeddings from text chunks
pub struct EmbeddingPipeline<'a, E: Embedder> {
    embedder: &'a E,
    batch_size: usize,
}

impl<'a, E: Embedder> EmbeddingPipeline<'a, E> {
    /// Create a new embedding pipeline with the specified embedder and batch size
    pub fn new(embedder: &'a E, batch_size: usize) -> Self {
        Self { embedder, batch_size: batch_size.max(1) }
    }

    /// Generate embeddings for all chunks with progress callback
    ///
    /// The callback receives `(processed, total)` after every batch. The first
    /// failing batch aborts the whole run.
    pub fn generate_embeddings<F>(
        &self,
        chunks: &[Chunk],
        mut progress: F,
    ) -> Result<Vec<Embedding>>
    where
        F: FnMut(usize, usize),
    {
        let total = chunks.len();
        let mut all_embeddings = Vec::with_capacity(total);

        for chunk_batch in chunks.chunks(self.batch_size) {
            let texts: Vec<&str> = chunk_batch.iter().map(|c| c.text.as_str()).collect();

            let vectors = self.embedder.embed(&texts)?;

            if vectors.len() != chunk_batch.len() {
                return Err(MovieRagError::Embedding {
                    reason: format!(
                        "embedder returned {} vectors for {} texts",
                        vectors.len(),
                        chunk_batch.len()
                    ),
                    remediation: "Check the embedding model's batch limits".to_string(),
                });
            }

            let expected = self.embedder.dimensions();
            if let Some(vector) = vectors.iter().find(|v| v.len() != expected) {
                return Err(MovieRagError::Embedding {
                    reason: format!(
                        "{} returned a {}-dimensional vector, expected {}",
                        self.embedder.model_name(),
                        vector.len(),
                        expected
                    ),
                    remediation: "Set embed_dimensions to the embedding model's output size"
                        .to_string(),
                });
            }

            all_embeddings.extend(
                chunk_batch
                    .iter()
                    .zip(vectors)
                    .map(|(chunk, vector)| Embedding { chunk_id: chunk.id, vector }),
            );

            tracing::debug!(processed = all_embeddings.len(), total, "Embedded batch");
            progress(all_embeddings.len(), total);
        }

        Ok(all_embeddings)
    }
}
