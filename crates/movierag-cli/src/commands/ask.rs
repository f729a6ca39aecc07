//! One-shot question command

use anyhow::Result;
use movierag_core::config::LayeredConfig;
use movierag_retrieval::QuestionAnswerer;
use std::io;

use super::build::prepare_index;
use crate::cli::AskArgs;
use crate::output::OutputWriter;
use crate::session::write_reply;

pub fn execute(args: AskArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let question = args.text();

    let top_k = config.retrieval_k()?;
    let embedder = super::embedder(config)?;
    let chat = super::chat_model(config)?;
    let index = prepare_index(config, &embedder, output)?;

    let mut answerer = QuestionAnswerer::new(embedder, chat, top_k);
    answerer.attach(index);

    let reply = answerer.answer(&question)?;

    if output.is_json() {
        output.result(&reply)
    } else {
        write_reply(io::stdout().lock(), &reply)?;
        Ok(())
    }
}
