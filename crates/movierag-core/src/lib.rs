//! MovieRAG Core - Domain models, dataset loading, chunking and configuration
//!
//! This crate contains the domain types shared by every other MovieRAG crate,
//! plus the two purely local pipeline stages: loading plot records from CSV and
//! splitting plots into chunks.

pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod processing;

pub use error::{MovieRagError, Result};
