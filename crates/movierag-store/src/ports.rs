use movierag_core::error::Result;
use movierag_core::models::{Chunk, Embedding, IndexManifest, ScoredChunk};
use std::path::Path;

/// Port for a searchable, persistable vector index
pub trait VectorIndex: Sized + Send + Sync {
    /// Build an index from chunks and their embeddings
    ///
    /// Every chunk must have exactly one embedding and every vector must share
    /// one dimension.
    fn build(embedder: &str, chunks: Vec<Chunk>, embeddings: Vec<Embedding>) -> Result<Self>;

    /// Write the index to `dir`, replacing anything saved there before
    fn save(&self, dir: &Path) -> Result<()>;

    /// Read an index saved by [`VectorIndex::save`]
    ///
    /// Returns `Ok(None)` when nothing usable is stored at `dir`.
    fn load(dir: &Path) -> Result<Option<Self>>;

    /// Return the `k` chunks most similar to `query`, most similar first
    fn query(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Description of the index contents
    fn manifest(&self) -> &IndexManifest;

    /// Number of chunks in the index
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
