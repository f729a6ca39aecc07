use movierag_core::error::Result;
use movierag_core::models::Chunk;
use movierag_llm::ports::Embedder;
use movierag_store::ports::VectorIndex;
use std::path::Path;

use crate::embedding::EmbeddingPipeline;

/// Progress information for index building
#[derive(Debug, Clone)]
pub struct IndexProgress {
    pub phase: IndexPhase,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Current phase of index building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPhase {
    GeneratingEmbeddings,
    BuildingIndex,
    Finalizing,
}

/// Builds a vector index by embedding every chunk
pub struct IndexBuilder<'a, E: Embedder> {
    embedder: &'a E,
    batch_size: usize,
}

impl<'a, E: Embedder> IndexBuilder<'a, E> {
    /// Create a new index builder
    pub fn new(embedder: &'a E) -> Self {
        Self { embedder, batch_size: 50 }
    }

    /// Set the batch size for embedding generation
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Build the index without progress reporting
    pub fn build<I: VectorIndex>(&self, chunks: Vec<Chunk>) -> Result<I> {
        self.build_with_progress(chunks, |_| {})
    }

    /// Build the index with progress reporting
    ///
    /// Either every chunk is embedded and indexed or an error is returned;
    /// a partial index is never produced.
    pub fn build_with_progress<I, F>(&self, chunks: Vec<Chunk>, mut progress: F) -> Result<I>
    where
        I: VectorIndex,
        F: FnMut(IndexProgress),
    {
        let total = chunks.len();
        tracing::info!(chunks = total, model = self.embedder.model_name(), "Embedding chunks");

        progress(IndexProgress {
            phase: IndexPhase::GeneratingEmbeddings,
            current: 0,
            total,
            message: "Generating embeddings".to_string(),
        });

        let pipeline = EmbeddingPipeline::new(self.embedder, self.batch_size);
        let embeddings = pipeline.generate_embeddings(&chunks, |current, total| {
            progress(IndexProgress {
                phase: IndexPhase::GeneratingEmbeddings,
                current,
                total,
                message: format!("Generated {}/{} embeddings", current, total),
            })
        })?;

        progress(IndexProgress {
            phase: IndexPhase::BuildingIndex,
            current: 0,
            total: 1,
            message: "Building vector index".to_string(),
        });

        let index = I::build(self.embedder.model_name(), chunks, embeddings)?;

        progress(IndexProgress {
            phase: IndexPhase::Finalizing,
            current: 1,
            total: 1,
            message: format!("Indexed {} chunks", index.len()),
        });

        Ok(index)
    }
}

/// Load the index saved in `dir` if it was built with `embedder`'s model
///
/// Returns `Ok(None)` when there is no usable index, including one whose
/// vectors came from a different model.
pub fn open_index<I, E>(dir: &Path, embedder: &E) -> Result<Option<I>>
where
    I: VectorIndex,
    E: Embedder,
{
    let Some(index) = I::load(dir)? else {
        return Ok(None);
    };

    let built_with = &index.manifest().embedder;
    if built_with != embedder.model_name() {
        tracing::warn!(
            dir = %dir.display(),
            index_model = %built_with,
            configured_model = embedder.model_name(),
            "Saved index was built with a different embedding model"
        );
        return Ok(None);
    }

    Ok(Some(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use movierag_core::error::MovieRagError;
    use movierag_core::models::{ChunkId, ChunkMetadata};
    use movierag_llm::mock::{FailingEmbedder, HashingEmbedder};
    use movierag_store::FlatIndex;
    use tempfile::TempDir;

    fn chunks() -> Vec<Chunk> {
        ["A heist crew robs a bank", "Two lovers meet in Paris", "Astronauts are stranded on Mars"]
            .iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                id: ChunkId(i as u64),
                text: text.to_string(),
                metadata: ChunkMetadata { title: format!("Movie {}", i), release_year: Some(2000) },
            })
            .collect()
    }

    #[test]
    fn test_build_reports_phases() {
        let embedder = HashingEmbedder::new(32);
        let mut phases = Vec::new();

        let index: FlatIndex = IndexBuilder::new(&embedder)
            .with_batch_size(2)
            .build_with_progress(chunks(), |p| phases.push((p.phase, p.current, p.total)))
            .unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.manifest().embedder, "hashing-32");
        assert_eq!(
            phases,
            vec![
                (IndexPhase::GeneratingEmbeddings, 0, 3),
                (IndexPhase::GeneratingEmbeddings, 2, 3),
                (IndexPhase::GeneratingEmbeddings, 3, 3),
                (IndexPhase::BuildingIndex, 0, 1),
                (IndexPhase::Finalizing, 1, 1),
            ]
        );
    }

    #[test]
    fn test_build_is_all_or_nothing() {
        let embedder = FailingEmbedder::after(1, 16);

        let result: Result<FlatIndex> =
            IndexBuilder::new(&embedder).with_batch_size(1).build(chunks());

        assert!(matches!(result, Err(MovieRagError::Embedding { .. })));
    }

    #[test]
    fn test_open_index_round_trip() {
        let dir = TempDir::new().unwrap();
        let embedder = HashingEmbedder::new(32);

        assert!(open_index::<FlatIndex, _>(dir.path(), &embedder).unwrap().is_none());

        let index: FlatIndex = IndexBuilder::new(&embedder).build(chunks()).unwrap();
        index.save(dir.path()).unwrap();

        let reopened: FlatIndex = open_index(dir.path(), &embedder).unwrap().unwrap();
        assert_eq!(reopened.len(), 3);
    }

    #[test]
    fn test_open_index_rejects_other_model() {
        let dir = TempDir::new().unwrap();
        let index: FlatIndex =
            IndexBuilder::new(&HashingEmbedder::new(32)).build(chunks()).unwrap();
        index.save(dir.path()).unwrap();

        let other = HashingEmbedder::new(64);
        assert!(open_index::<FlatIndex, _>(dir.path(), &other).unwrap().is_none());
    }
}
