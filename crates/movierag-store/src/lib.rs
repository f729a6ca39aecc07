//! MovieRAG Store - Vector index port and adapters
//!
//! This crate defines the vector index port and the flat, file-backed
//! adapter used to persist an index between runs.

pub mod flat;
pub mod ports;

pub use flat::FlatIndex;
pub use ports::VectorIndex;
