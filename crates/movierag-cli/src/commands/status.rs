//! Status command implementation

use anyhow::Result;
use movierag_core::config::LayeredConfig;
use movierag_store::FlatIndex;

use crate::output::OutputWriter;
use crate::output_types::{ConfigRow, IndexStatus, StatusOutput};

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: source.label().to_string() })
        .collect();

    let dataset_present = config.data_path.value.is_file();
    let manifest = FlatIndex::read_manifest(&config.index_path.value)?;

    if output.is_json() {
        let index = IndexStatus {
            built: manifest.is_some(),
            fingerprint: manifest.as_ref().map(|m| m.fingerprint.clone()),
            built_at: manifest.as_ref().map(|m| m.built_at),
            embedder: manifest.as_ref().map(|m| m.embedder.clone()),
            chunk_count: manifest.as_ref().map(|m| m.chunk_count),
            embedding_dim: manifest.as_ref().map(|m| m.embedding_dim),
        };
        return output.result(StatusOutput { config: rows, dataset_present, index });
    }

    output.section("Configuration");
    output.table(rows)?;

    output.section("Dataset");
    output.kv("Path", config.data_path.value.display());
    output.kv("Present", if dataset_present { "✓" } else { "✗" });

    output.section("Index Status");
    output.kv("Location", config.index_path.value.display());
    match manifest {
        Some(manifest) => {
            output.kv("Status", "Built");
            output.kv("Fingerprint", &manifest.fingerprint);
            output.kv("Built At", manifest.built_at.format("%Y-%m-%d %H:%M:%S UTC"));
            output.kv("Embedder", &manifest.embedder);
            output.kv("Chunks", manifest.chunk_count);
            output.kv("Embedding Dimension", manifest.embedding_dim);

            if manifest.embedder != config.embed_model.value {
                output.warning(format!(
                    "Index was built with '{}' but the configured model is '{}'; it will be rebuilt",
                    manifest.embedder, config.embed_model.value
                ));
            }
        }
        None => {
            output.kv("Status", "Not built");
            output.info("Run 'movierag build' to create the index");
        }
    }

    Ok(())
}
