//! Interactive chat command

use anyhow::{Context, Result};
use movierag_core::config::LayeredConfig;
use movierag_retrieval::QuestionAnswerer;
use movierag_store::VectorIndex;
use std::io;

use super::build::prepare_index;
use crate::output::OutputWriter;
use crate::session;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    output.section("Initializing MovieRAG");

    let top_k = config.retrieval_k()?;
    let embedder = super::embedder(config)?;
    let chat = super::chat_model(config)?;
    let index = prepare_index(config, &embedder, output)?;

    let mut answerer = QuestionAnswerer::new(embedder, chat, top_k);
    answerer.attach(index);

    if let Some(index) = answerer.index() {
        output.kv("Indexed chunks", index.len());
        output.kv("Embedding model", &index.manifest().embedder);
    }
    output.kv("Chunks per question", answerer.top_k());
    output.success("System ready! Type 'exit' to quit.");

    let stdin = io::stdin();
    let stdout = io::stdout();
    session::run(&answerer, stdin.lock(), stdout.lock()).context("Session input/output failed")?;

    Ok(())
}
