pub mod chunk;

use crate::error::{MovieRagError, Result};
use crate::models::{Chunk, ChunkId, ChunkMetadata, Record};

pub use chunk::RecursiveSplitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,

    /// Overlap size in characters for context preservation
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self { chunk_size: 1500, chunk_overlap: 150 }
    }
}

impl ChunkConfig {
    /// Create a validated chunk configuration
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        let config = Self { chunk_size, chunk_overlap };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(MovieRagError::ConfigInvalid {
                key: "chunk_size".to_string(),
                reason: "chunk_size must be greater than zero".to_string(),
            });
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(MovieRagError::ConfigInvalid {
                key: "chunk_overlap".to_string(),
                reason: format!(
                    "overlap ({}) must be less than chunk_size ({})",
                    self.chunk_overlap, self.chunk_size
                ),
            });
        }

        Ok(())
    }
}

/// Split every record's plot into chunks carrying the record's title and year
///
/// Chunks keep record order and, within a record, left-to-right text order.
/// Ids are assigned sequentially across the whole output.
pub fn chunk_records(records: &[Record], config: &ChunkConfig) -> Result<Vec<Chunk>> {
    config.validate()?;

    let splitter = RecursiveSplitter::new(config);
    let mut chunks = Vec::new();
    let mut next_id = 0u64;

    for record in records {
        let metadata = ChunkMetadata {
            title: record.title.clone(),
            release_year: record.release_year,
        };

        for text in splitter.split_text(&record.plot) {
            chunks.push(Chunk { id: ChunkId(next_id), text, metadata: metadata.clone() });
            next_id += 1;
        }
    }

    tracing::info!(records = records.len(), chunks = chunks.len(), "Chunked plots");

    Ok(chunks)
}
