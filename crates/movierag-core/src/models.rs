pub mod answer;
pub mod document;
pub mod index;
pub mod record;

pub use answer::Answer;
pub use document::{Chunk, ChunkId, ChunkMetadata, Embedding, ScoredChunk};
pub use index::IndexManifest;
pub use record::{LoadReport, Record};
