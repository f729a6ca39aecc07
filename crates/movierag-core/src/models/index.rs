use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Description of a built index, persisted next to its data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// On-disk layout version
    pub format_version: u32,

    /// Hex fingerprint over chunk text and vectors
    pub fingerprint: String,

    /// When the index was built
    pub built_at: DateTime<Utc>,

    /// Embedding model that produced the vectors
    pub embedder: String,

    /// Number of chunks in the index
    pub chunk_count: usize,

    /// Embedding dimension
    pub embedding_dim: usize,
}
