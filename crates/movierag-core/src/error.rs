//! Error types for MovieRAG

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MovieRagError {
    // Dataset errors
    #[error("Dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    #[error("Dataset is missing required column '{column}'")]
    MissingColumn { column: String },

    // Index errors
    #[error("Index is invalid: {reason}")]
    IndexInvalid { reason: String },

    // Remote service errors
    #[error("Embedding failed: {reason}. Try: {remediation}")]
    Embedding {
        reason: String,
        remediation: String,
    },

    #[error("Language model request failed: {reason}. Try: {remediation}")]
    Service {
        reason: String,
        remediation: String,
    },

    #[error("Model output does not match the answer schema: {reason}")]
    SchemaValidation { reason: String, raw: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MovieRagError {
    fn from(err: serde_json::Error) -> Self {
        MovieRagError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MovieRagError>;
