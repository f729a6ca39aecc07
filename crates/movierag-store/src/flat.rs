//! Flat vector index held in memory and persisted as JSON
//!
//! Search is exhaustive cosine similarity, which is plenty for a few thousand
//! plot chunks. On disk an index is a directory with two files:
//! `index.json` (chunks and vectors) and `manifest.json` (an [`IndexManifest`]
//! whose fingerprint covers the data file's content).

use chrono::Utc;
use movierag_core::error::{MovieRagError, Result};
use movierag_core::models::{Chunk, ChunkId, Embedding, IndexManifest, ScoredChunk};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::hash::Hasher;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use twox_hash::XxHash64;

use crate::ports::VectorIndex;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const DATA_FILE: &str = "index.json";
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Exhaustive cosine-similarity index
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    manifest: IndexManifest,
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    /// Read the manifest saved in `dir` without loading the vectors
    pub fn read_manifest(dir: &Path) -> Result<Option<IndexManifest>> {
        if dir.is_file() {
            tracing::warn!(dir = %dir.display(), "Index path is a file, not a directory");
            return Ok(None);
        }

        match read_json::<IndexManifest>(&dir.join(MANIFEST_FILE)) {
            Ok(manifest) => Ok(manifest),
            Err(MovieRagError::Serialization(reason)) => {
                tracing::warn!(dir = %dir.display(), %reason, "Unreadable index manifest");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Check a loaded index against its manifest
    fn validate(&self) -> std::result::Result<(), String> {
        let manifest = &self.manifest;

        if manifest.format_version != FORMAT_VERSION {
            return Err(format!(
                "unsupported format version {} (expected {})",
                manifest.format_version, FORMAT_VERSION
            ));
        }

        if manifest.chunk_count != self.entries.len() {
            return Err(format!(
                "manifest lists {} chunks but data holds {}",
                manifest.chunk_count,
                self.entries.len()
            ));
        }

        let wrong_dim = self.entries.iter().find(|e| e.vector.len() != manifest.embedding_dim);
        if let Some(entry) = wrong_dim {
            return Err(format!(
                "chunk {} has dimension {} (expected {})",
                entry.chunk.id.0,
                entry.vector.len(),
                manifest.embedding_dim
            ));
        }

        let actual = fingerprint(&self.entries);
        if actual != manifest.fingerprint {
            return Err(format!("fingerprint mismatch ({} != {})", actual, manifest.fingerprint));
        }

        Ok(())
    }
}

impl VectorIndex for FlatIndex {
    fn build(embedder: &str, chunks: Vec<Chunk>, embeddings: Vec<Embedding>) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(MovieRagError::IndexInvalid {
                reason: format!("{} chunks but {} embeddings", chunks.len(), embeddings.len()),
            });
        }

        let mut vectors: HashMap<ChunkId, Vec<f32>> = HashMap::with_capacity(embeddings.len());
        for embedding in embeddings {
            if vectors.insert(embedding.chunk_id, embedding.vector).is_some() {
                return Err(MovieRagError::IndexInvalid {
                    reason: format!("duplicate embedding for chunk {}", embedding.chunk_id.0),
                });
            }
        }

        let mut entries = Vec::with_capacity(chunks.len());
        let mut dim: Option<usize> = None;

        for chunk in chunks {
            let vector = vectors.remove(&chunk.id).ok_or_else(|| MovieRagError::IndexInvalid {
                reason: format!("no embedding for chunk {}", chunk.id.0),
            })?;

            match dim {
                None => dim = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    return Err(MovieRagError::IndexInvalid {
                        reason: format!(
                            "chunk {} has dimension {} (expected {})",
                            chunk.id.0,
                            vector.len(),
                            expected
                        ),
                    });
                }
                Some(_) => {}
            }

            entries.push(IndexEntry { chunk, vector });
        }

        let manifest = IndexManifest {
            format_version: FORMAT_VERSION,
            fingerprint: fingerprint(&entries),
            built_at: Utc::now(),
            embedder: embedder.to_string(),
            chunk_count: entries.len(),
            embedding_dim: dim.unwrap_or(0),
        };

        tracing::info!(
            chunks = manifest.chunk_count,
            dim = manifest.embedding_dim,
            "Built flat index"
        );

        Ok(Self { manifest, entries })
    }

    fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        // Data first, so a crash leaves a manifest whose fingerprint no longer matches
        write_json_atomic(&dir.join(DATA_FILE), &self.entries)?;
        write_json_atomic(&dir.join(MANIFEST_FILE), &self.manifest)?;

        tracing::info!(dir = %dir.display(), chunks = self.entries.len(), "Saved index");
        Ok(())
    }

    fn load(dir: &Path) -> Result<Option<Self>> {
        let Some(manifest) = Self::read_manifest(dir)? else {
            tracing::debug!(dir = %dir.display(), "No saved index");
            return Ok(None);
        };

        let entries = match read_json::<Vec<IndexEntry>>(&dir.join(DATA_FILE)) {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                tracing::warn!(dir = %dir.display(), "Index manifest present but data missing");
                return Ok(None);
            }
            Err(MovieRagError::Serialization(reason)) => {
                tracing::warn!(dir = %dir.display(), %reason, "Unreadable index data");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let index = Self { manifest, entries };
        if let Err(reason) = index.validate() {
            tracing::warn!(dir = %dir.display(), %reason, "Discarding saved index");
            return Ok(None);
        }

        tracing::info!(dir = %dir.display(), chunks = index.entries.len(), "Loaded index");
        Ok(Some(index))
    }

    fn query(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.manifest.embedding_dim {
            return Err(MovieRagError::IndexInvalid {
                reason: format!(
                    "query has dimension {} but the index holds dimension {}",
                    query.len(),
                    self.manifest.embedding_dim
                ),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.vector)))
            .collect();

        // Stable sort keeps build order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk { chunk: self.entries[i].chunk.clone(), score })
            .collect())
    }

    fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Calculate cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// XxHash64 over every chunk and vector, hex encoded
fn fingerprint(entries: &[IndexEntry]) -> String {
    let mut hasher = XxHash64::with_seed(0);

    for entry in entries {
        let chunk = &entry.chunk;
        hasher.write_u64(chunk.id.0);
        hasher.write(chunk.metadata.title.as_bytes());
        hasher.write_u8(0);
        hasher.write_u16(chunk.metadata.release_year.unwrap_or(0));
        hasher.write_u8(u8::from(chunk.metadata.release_year.is_some()));
        hasher.write(chunk.text.as_bytes());
        hasher.write_u8(0);
        hasher.write_u64(entry.vector.len() as u64);
        for value in &entry.vector {
            hasher.write(&value.to_le_bytes());
        }
    }

    format!("{:016x}", hasher.finish())
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");

    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
    }

    fs::rename(&tmp, path)?;
    Ok(())
}

/// `Ok(None)` when the file or one of its parent directories does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Ok(None)
        }
        Err(e) => return Err(e.into()),
    };

    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use movierag_core::models::ChunkMetadata;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn chunk(id: u64, title: &str, text: &str) -> Chunk {
        Chunk {
            id: ChunkId(id),
            text: text.to_string(),
            metadata: ChunkMetadata {
                title: title.to_string(),
                release_year: Some(1990 + id as u16),
            },
        }
    }

    fn sample_index() -> FlatIndex {
        let chunks =
            vec![chunk(0, "North", "up"), chunk(1, "East", "right"), chunk(2, "NorthEast", "both")];
        let embeddings = vec![
            Embedding { chunk_id: ChunkId(0), vector: vec![0.0, 1.0] },
            Embedding { chunk_id: ChunkId(1), vector: vec![1.0, 0.0] },
            Embedding { chunk_id: ChunkId(2), vector: vec![1.0, 1.0] },
        ];
        FlatIndex::build("test-embedder", chunks, embeddings).unwrap()
    }

    fn titles(results: &[ScoredChunk]) -> Vec<&str> {
        results.iter().map(|r| r.chunk.metadata.title.as_str()).collect()
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_build_manifest() {
        let index = sample_index();
        let manifest = index.manifest();

        assert_eq!(manifest.chunk_count, 3);
        assert_eq!(manifest.embedding_dim, 2);
        assert_eq!(manifest.embedder, "test-embedder");
        assert_eq!(manifest.fingerprint.len(), 16);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_build_rejects_mismatched_inputs() {
        let chunks = vec![chunk(0, "A", "a"), chunk(1, "B", "b")];

        let missing = vec![Embedding { chunk_id: ChunkId(0), vector: vec![1.0] }];
        assert!(matches!(
            FlatIndex::build("e", chunks.clone(), missing),
            Err(MovieRagError::IndexInvalid { .. })
        ));

        let ragged = vec![
            Embedding { chunk_id: ChunkId(0), vector: vec![1.0] },
            Embedding { chunk_id: ChunkId(1), vector: vec![1.0, 2.0] },
        ];
        assert!(FlatIndex::build("e", chunks.clone(), ragged).is_err());

        let wrong_ids = vec![
            Embedding { chunk_id: ChunkId(0), vector: vec![1.0] },
            Embedding { chunk_id: ChunkId(7), vector: vec![1.0] },
        ];
        assert!(FlatIndex::build("e", chunks, wrong_ids).is_err());
    }

    #[test]
    fn test_query_orders_by_similarity() {
        let index = sample_index();

        let results = index.query(&[0.1, 1.0], 3).unwrap();
        assert_eq!(titles(&results), vec!["North", "NorthEast", "East"]);
        assert!(results[0].score >= results[1].score);

        let top = index.query(&[1.0, 0.0], 1).unwrap();
        assert_eq!(titles(&top), vec!["East"]);
    }

    #[test]
    fn test_query_k_larger_than_index() {
        let index = sample_index();
        assert_eq!(index.query(&[1.0, 1.0], 10).unwrap().len(), 3);
        assert!(index.query(&[1.0, 1.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_query_ties_keep_build_order() {
        let chunks = vec![chunk(0, "First", "a"), chunk(1, "Second", "b"), chunk(2, "Third", "c")];
        let embeddings =
            (0..3).map(|i| Embedding { chunk_id: ChunkId(i), vector: vec![1.0, 0.0] }).collect();
        let index = FlatIndex::build("e", chunks, embeddings).unwrap();

        let results = index.query(&[1.0, 0.0], 3).unwrap();
        assert_eq!(titles(&results), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index = sample_index();
        let result = index.query(&[1.0, 0.0, 0.0], 1);
        assert!(matches!(result, Err(MovieRagError::IndexInvalid { .. })));
    }

    #[test]
    fn test_empty_index() {
        let index = FlatIndex::build("e", Vec::new(), Vec::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.query(&[1.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movie_index");
        let index = sample_index();

        index.save(&path).unwrap();
        assert!(path.join(MANIFEST_FILE).exists());
        assert!(path.join(DATA_FILE).exists());

        let loaded = FlatIndex::load(&path).unwrap().expect("index should load");
        assert_eq!(loaded, index);

        let query = [0.3, 0.9];
        assert_eq!(loaded.query(&query, 2).unwrap(), index.query(&query, 2).unwrap());
    }

    #[test]
    fn test_save_overwrites_previous_index() {
        let dir = TempDir::new().unwrap();
        sample_index().save(dir.path()).unwrap();

        let replacement =
            FlatIndex::build("other", vec![chunk(0, "Only", "one")], vec![Embedding {
                chunk_id: ChunkId(0),
                vector: vec![0.5],
            }])
            .unwrap();
        replacement.save(dir.path()).unwrap();

        let loaded = FlatIndex::load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.manifest().embedder, "other");
    }

    #[test]
    fn test_load_missing_directory_is_absent() {
        let dir = TempDir::new().unwrap();
        assert!(FlatIndex::load(&dir.path().join("nope")).unwrap().is_none());
        assert!(FlatIndex::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_from_regular_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("movie_index");
        fs::write(&path, b"not an index").unwrap();

        assert!(FlatIndex::load(&path).unwrap().is_none());
        assert!(FlatIndex::read_manifest(&path).unwrap().is_none());
        assert!(read_json::<IndexManifest>(&path.join(MANIFEST_FILE)).unwrap().is_none());
    }

    #[test]
    fn test_load_missing_data_file_is_absent() {
        let dir = TempDir::new().unwrap();
        sample_index().save(dir.path()).unwrap();
        fs::remove_file(dir.path().join(DATA_FILE)).unwrap();

        assert!(FlatIndex::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_corrupt_files_are_absent() {
        let dir = TempDir::new().unwrap();
        sample_index().save(dir.path()).unwrap();
        fs::write(dir.path().join(DATA_FILE), b"{ not json").unwrap();
        assert!(FlatIndex::load(dir.path()).unwrap().is_none());

        sample_index().save(dir.path()).unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), b"[]").unwrap();
        assert!(FlatIndex::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_tampered_data_fails_fingerprint() {
        let dir = TempDir::new().unwrap();
        sample_index().save(dir.path()).unwrap();

        let data = fs::read_to_string(dir.path().join(DATA_FILE)).unwrap();
        fs::write(dir.path().join(DATA_FILE), data.replace("\"up\"", "\"down\"")).unwrap();

        assert!(FlatIndex::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_read_manifest() {
        let dir = TempDir::new().unwrap();
        assert!(FlatIndex::read_manifest(dir.path()).unwrap().is_none());

        let index = sample_index();
        index.save(dir.path()).unwrap();

        let manifest = FlatIndex::read_manifest(dir.path()).unwrap().unwrap();
        assert_eq!(&manifest, index.manifest());
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let a = sample_index();
        let b = FlatIndex::build("test-embedder", vec![chunk(0, "North", "up")], vec![Embedding {
            chunk_id: ChunkId(0),
            vector: vec![0.0, 1.0],
        }])
        .unwrap();

        assert_ne!(a.manifest().fingerprint, b.manifest().fingerprint);
        assert_eq!(a.manifest().fingerprint, sample_index().manifest().fingerprint);
    }

    proptest! {
        #[test]
        fn prop_query_sorted_and_bounded(
            vectors in prop::collection::vec(prop::collection::vec(-1.0f32..1.0, 3), 1..40),
            query in prop::collection::vec(-1.0f32..1.0, 3),
            k in 0usize..50,
        ) {
            let chunks = (0..vectors.len()).map(|i| chunk(i as u64, "T", "t")).collect();
            let embeddings = vectors
                .iter()
                .enumerate()
                .map(|(i, v)| Embedding { chunk_id: ChunkId(i as u64), vector: v.clone() })
                .collect();
            let index = FlatIndex::build("e", chunks, embeddings).unwrap();

            let results = index.query(&query, k).unwrap();

            prop_assert_eq!(results.len(), k.min(vectors.len()));
            for pair in results.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
