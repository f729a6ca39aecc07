use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a text chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(pub u64);

/// Slice of one movie's plot, the unit that gets embedded and retrieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier
    pub id: ChunkId,

    /// Text content
    pub text: String,

    /// Movie the text was taken from
    pub metadata: ChunkMetadata,
}

/// Per-chunk metadata copied from the source record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub title: String,
    pub release_year: Option<u16>,
}

impl ChunkMetadata {
    /// Release year for display, `"Unknown"` when absent
    pub fn year_label(&self) -> String {
        match self.release_year {
            Some(year) => year.to_string(),
            None => "Unknown".to_string(),
        }
    }
}

impl fmt::Display for ChunkMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.year_label())
    }
}

/// Embedding vector for a chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// Associated chunk ID
    pub chunk_id: ChunkId,

    /// Embedding vector
    pub vector: Vec<f32>,
}

/// Chunk returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,

    /// Cosine similarity to the query
    pub score: f32,
}
