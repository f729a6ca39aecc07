//! MovieRAG Retrieval - Index building and question answering
//!
//! This crate implements the retrieval use cases: embedding chunks into an
//! index, retrieving the chunks closest to a question and asking the chat
//! model for a structured answer grounded in them.

pub mod embedding;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod prompt;

pub use embedding::EmbeddingPipeline;
pub use index::{open_index, IndexBuilder, IndexPhase, IndexProgress};
pub use models::{parse_answer, Reply, NOT_READY_MESSAGE};
pub use pipeline::{QuestionAnswerer, Retriever};
