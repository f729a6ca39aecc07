//! Build command and the shared ingest path

use anyhow::{Context, Result};
use movierag_core::config::LayeredConfig;
use movierag_core::loader::load_records;
use movierag_core::processing::chunk_records;
use movierag_llm::ports::Embedder;
use movierag_retrieval::{open_index, IndexBuilder};
use movierag_store::{FlatIndex, VectorIndex};

use crate::cli::BuildArgs;
use crate::output::OutputWriter;
use crate::output_types::BuildOutput;
use crate::progress::BuildProgress;

pub fn execute(args: BuildArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let embedder = super::embedder(config)?;
    let index_path = &config.index_path.value;

    if !args.force {
        if let Some(index) = open_index::<FlatIndex, _>(index_path, &embedder)? {
            output.info("Index already exists. Use --force to rebuild.");
            let manifest = index.manifest();
            return output.result(BuildOutput {
                index_path: index_path.clone(),
                rebuilt: false,
                records: 0,
                skipped_rows: 0,
                chunk_count: manifest.chunk_count,
                embedding_dim: manifest.embedding_dim,
                embedder: manifest.embedder.clone(),
                fingerprint: manifest.fingerprint.clone(),
            });
        }
    }

    let (index, summary) = ingest(config, &embedder, output)?;
    let manifest = index.manifest();

    output.result(BuildOutput {
        index_path: index_path.clone(),
        rebuilt: true,
        records: summary.records,
        skipped_rows: summary.skipped,
        chunk_count: manifest.chunk_count,
        embedding_dim: manifest.embedding_dim,
        embedder: manifest.embedder.clone(),
        fingerprint: manifest.fingerprint.clone(),
    })
}

/// Counts from an ingest run
pub struct IngestSummary {
    pub records: usize,
    pub skipped: usize,
}

/// Load the saved index, or ingest the dataset and save a new one
pub fn prepare_index<E: Embedder>(
    config: &LayeredConfig,
    embedder: &E,
    output: &OutputWriter,
) -> Result<FlatIndex> {
    let index_path = &config.index_path.value;

    if let Some(index) = open_index::<FlatIndex, _>(index_path, embedder)? {
        output.success(format!(
            "Loaded existing index from {} ({} chunks)",
            index_path.display(),
            index.len()
        ));
        return Ok(index);
    }

    output.info("No existing index found. Creating new one...");
    let (index, _) = ingest(config, embedder, output)?;
    Ok(index)
}

/// Loader -> chunker -> embeddings -> index -> disk
pub fn ingest<E: Embedder>(
    config: &LayeredConfig,
    embedder: &E,
    output: &OutputWriter,
) -> Result<(FlatIndex, IngestSummary)> {
    let chunk_config = config.chunk_config()?;
    let data_path = &config.data_path.value;

    let report = load_records(data_path, config.max_rows.value)?;
    output.success(format!(
        "Loaded {} movies from {} ({} rows skipped)",
        report.records.len(),
        data_path.display(),
        report.skipped
    ));

    let chunks = chunk_records(&report.records, &chunk_config)?;
    output.success(format!("Split plots into {} chunks", chunks.len()));

    let mut progress = BuildProgress::new(!output.is_json());
    let built = IndexBuilder::new(embedder)
        .with_batch_size(config.batch_size.value)
        .build_with_progress::<FlatIndex, _>(chunks, |event| progress.update(event));

    let index = match built {
        Ok(index) => index,
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };

    let index_path = &config.index_path.value;
    index
        .save(index_path)
        .with_context(|| format!("Failed to save index to {}", index_path.display()))?;
    output.success(format!("New index created and saved to {}", index_path.display()));

    Ok((index, IngestSummary { records: report.records.len(), skipped: report.skipped }))
}
