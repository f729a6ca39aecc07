use clap::{Parser, Subcommand};
use std::path::PathBuf;

use movierag_core::config::CliConfigOverrides;

/// MovieRAG - Ask questions about movie plots
#[derive(Parser, Debug)]
#[command(name = "movierag")]
#[command(about = "Retrieval-augmented question answering over movie plots", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./movierag.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the movie plots CSV
    #[arg(long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Directory holding the saved index
    #[arg(long, global = true, value_name = "DIR")]
    pub index: Option<PathBuf>,

    /// Number of usable dataset rows to ingest
    #[arg(long, global = true)]
    pub max_rows: Option<usize>,

    /// Number of plot chunks retrieved per question
    #[arg(long, short = 'k', global = true)]
    pub top_k: Option<usize>,

    /// Maximum chunk size in characters
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Characters shared between consecutive chunks
    #[arg(long, global = true)]
    pub chunk_overlap: Option<usize>,

    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Settings given on the command line, layered over file and environment
    pub fn overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides {
            data_path: self.data.clone(),
            index_path: self.index.clone(),
            max_rows: self.max_rows,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            top_k: self.top_k,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask questions interactively (default)
    Chat,

    /// Ingest the dataset and save the index
    Build(BuildArgs),

    /// Answer a single question and exit
    Ask(AskArgs),

    /// Show configuration and index status
    Status,
}

#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Rebuild even if a saved index is usable
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The question to answer
    #[arg(required = true)]
    pub question: Vec<String>,
}

impl AskArgs {
    pub fn text(&self) -> String {
        self.question.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_chat() {
        let cli = Cli::parse_from(["movierag"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from([
            "movierag", "ask", "who", "dies?", "--top-k", "5", "--data", "plots.csv",
        ]);

        let overrides = cli.overrides();
        assert_eq!(overrides.top_k, Some(5));
        assert_eq!(overrides.data_path, Some(PathBuf::from("plots.csv")));
        assert!(overrides.max_rows.is_none());

        match cli.command {
            Some(Commands::Ask(args)) => assert_eq!(args.text(), "who dies?"),
            other => panic!("expected ask, got {:?}", other),
        }
    }

    #[test]
    fn test_build_force() {
        let cli = Cli::parse_from(["movierag", "build", "--force", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Some(Commands::Build(BuildArgs { force: true }))));
    }
}
