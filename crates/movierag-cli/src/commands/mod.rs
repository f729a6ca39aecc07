//! Command implementations

mod ask;
mod build;
mod chat;
mod status;

use anyhow::Result;
use movierag_core::config::LayeredConfig;
use movierag_llm::{NvidiaChat, NvidiaConfig, NvidiaEmbedder};

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::output::OutputWriter;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => chat::execute(&config, &output),
        Commands::Build(args) => build::execute(args, &config, &output),
        Commands::Ask(args) => ask::execute(args, &config, &output),
        Commands::Status => status::execute(&config, &output),
    }
}

fn nvidia_config(config: &LayeredConfig) -> Result<NvidiaConfig> {
    Ok(NvidiaConfig::new(config.require_api_key()?)
        .with_base_url(config.api_base.value.clone())
        .with_timeout_secs(config.timeout_secs.value))
}

/// Embedder for the configured model
pub(crate) fn embedder(config: &LayeredConfig) -> Result<NvidiaEmbedder> {
    Ok(NvidiaEmbedder::new(
        nvidia_config(config)?,
        config.embed_model.value.clone(),
        config.embed_dimensions.value,
    )?)
}

/// Chat model for the configured model, temperature and reply budget
pub(crate) fn chat_model(config: &LayeredConfig) -> Result<NvidiaChat> {
    let chat = NvidiaChat::new(
        nvidia_config(config)?,
        config.chat_model.value.clone(),
        config.temperature.value,
    )?;
    Ok(chat.with_max_tokens(config.max_tokens.value))
}
