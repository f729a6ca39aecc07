//! MovieRAG LLM - Embedding and chat ports
//!
//! This crate defines the ports for embedding and chat completion,
//! along with the hosted NVIDIA adapters and offline test doubles.

pub mod mock;
pub mod nvidia;
pub mod ports;

// Re-export main types
pub use nvidia::{NvidiaChat, NvidiaConfig, NvidiaEmbedder};
pub use ports::{ChatModel, Embedder};
