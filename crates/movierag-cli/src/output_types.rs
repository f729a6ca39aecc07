use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Output for build command
#[derive(Debug, Serialize)]
pub struct BuildOutput {
    pub index_path: PathBuf,
    pub rebuilt: bool,
    pub records: usize,
    pub skipped_rows: usize,
    pub chunk_count: usize,
    pub embedding_dim: usize,
    pub embedder: String,
    pub fingerprint: String,
}

/// One resolved configuration setting
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Setting")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

/// Output for status command
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub config: Vec<ConfigRow>,
    pub dataset_present: bool,
    pub index: IndexStatus,
}

#[derive(Debug, Serialize)]
pub struct IndexStatus {
    pub built: bool,
    pub fingerprint: Option<String>,
    pub built_at: Option<DateTime<Utc>>,
    pub embedder: Option<String>,
    pub chunk_count: Option<usize>,
    pub embedding_dim: Option<usize>,
}
