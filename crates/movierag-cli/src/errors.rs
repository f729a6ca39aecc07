use console::style;
use movierag_core::config::API_KEY_ENV;
use movierag_core::MovieRagError;
use std::fmt;
use std::path::Path;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    /// Plain-text rendering, as printed without styling
    pub fn render(&self) -> String {
        let mut out = self.message.clone();

        if let Some(ref context) = self.context {
            out.push_str("\n\n");
            out.push_str(context);
        }

        if !self.suggestions.is_empty() {
            out.push_str("\n\nTo fix this:");
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                out.push_str(&format!("\n  {}. {}", i + 1, suggestion));
            }
        }

        out
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a missing API key
pub fn api_key_missing() -> CliError {
    CliError::new("API key not configured")
        .with_context(format!(
            "Embedding and chat requests need an NVIDIA API key.\n\n\
             Looking for: {} or api_key in movierag.toml",
            API_KEY_ENV
        ))
        .with_suggestion(format!("Set the key: export {}=\"nvapi-...\"", API_KEY_ENV))
        .with_suggestion("Check the current settings: movierag status")
        .with_help("Run: movierag --help")
}

/// Create error for missing dataset
pub fn dataset_not_found(path: &Path) -> CliError {
    CliError::new("Dataset file not found")
        .with_context(format!("The movie plots CSV does not exist.\n\nPath: {}", path.display()))
        .with_suggestion("Download wiki_movie_plots_deduped.csv into the data directory")
        .with_suggestion("Or point to it: movierag --data /path/to/plots.csv")
        .with_help("Run: movierag build --help")
}

/// Create error for a dataset without the required columns
pub fn missing_column(column: &str) -> CliError {
    CliError::new("Dataset is missing a required column")
        .with_context(format!(
            "Column not found: {}\n\nThe CSV needs a header row with Title and Plot columns.",
            column
        ))
        .with_suggestion("Check the first line of the CSV file")
        .with_help("Run: movierag build --help")
}

/// Create error for invalid configuration
pub fn invalid_config(key: &str, reason: &str) -> CliError {
    CliError::new(format!("Invalid configuration: {}", key))
        .with_context(format!("Configuration value is invalid.\n\nReason: {}", reason))
        .with_suggestion("Check movierag.toml, MOVIERAG_* variables and command-line flags")
        .with_suggestion("Show resolved values: movierag status")
        .with_help("Run: movierag --help")
}

/// Create error for an unreachable or failing model service
pub fn service_unavailable(reason: &str, remediation: &str) -> CliError {
    CliError::new("Model service request failed")
        .with_context(format!("Error: {}", reason))
        .with_suggestion(remediation.to_string())
        .with_suggestion("Check network access to the API")
        .with_help("Run: movierag status")
}

/// Convert a domain error to CliError with suggestions
pub fn from_domain(error: &MovieRagError) -> CliError {
    match error {
        MovieRagError::DatasetNotFound { path } => dataset_not_found(path),
        MovieRagError::MissingColumn { column } => missing_column(column),
        MovieRagError::ConfigMissing { key } if key == API_KEY_ENV || key == "api_key" => {
            api_key_missing()
        }
        MovieRagError::ConfigMissing { key } => invalid_config(key, "value is required"),
        MovieRagError::ConfigInvalid { key, reason } => invalid_config(key, reason),
        MovieRagError::Embedding { reason, remediation }
        | MovieRagError::Service { reason, remediation } => {
            service_unavailable(reason, remediation)
        }
        MovieRagError::SchemaValidation { reason, raw } => {
            CliError::new("Model reply was not a valid answer")
                .with_context(format!("Error: {}\n\nReply:\n{}", reason, raw))
                .with_suggestion("Ask the question again")
                .with_suggestion("Or try a different chat model (chat_model in movierag.toml)")
        }
        other => CliError::new(other.to_string()),
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        return CliError {
            message: cli_error.message.clone(),
            context: cli_error.context.clone(),
            suggestions: cli_error.suggestions.clone(),
            help_command: cli_error.help_command.clone(),
        };
    }

    if let Some(domain) = error.chain().find_map(|cause| cause.downcast_ref::<MovieRagError>()) {
        let mut converted = from_domain(domain);
        let outer = error.to_string();
        if outer != domain.to_string() {
            converted.context = Some(match converted.context.take() {
                Some(context) => format!("{}\n\n{}", outer, context),
                None => outer,
            });
        }
        return converted;
    }

    let message = error.to_string();

    if message.contains("permission denied") || message.contains("Permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {:#}", error))
            .with_suggestion("Check file permissions")
            .with_suggestion("Or choose another index directory: movierag --index /path/to/dir")
    } else {
        CliError::new(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_dataset_not_found_mentions_path() {
        let error =
            from_domain(&MovieRagError::DatasetNotFound { path: PathBuf::from("data/plots.csv") });

        assert_eq!(error.message, "Dataset file not found");
        assert!(error.render().contains("data/plots.csv"));
        assert!(!error.suggestions.is_empty());
    }

    #[test]
    fn test_missing_api_key() {
        let error = from_domain(&MovieRagError::ConfigMissing { key: API_KEY_ENV.to_string() });

        assert_eq!(error.message, "API key not configured");
        assert!(error.render().contains("export NVIDIA_API_KEY"));
    }

    #[test]
    fn test_from_anyhow_finds_domain_error_in_chain() {
        let result: std::result::Result<(), MovieRagError> = Err(MovieRagError::ConfigInvalid {
            key: "top_k".to_string(),
            reason: "must be at least 1".to_string(),
        });
        let error = result.context("Failed to start").unwrap_err();

        let converted = from_anyhow(error);
        assert_eq!(converted.message, "Invalid configuration: top_k");
    }

    #[test]
    fn test_from_anyhow_keeps_cli_error() {
        let error = anyhow::Error::new(CliError::new("Custom").with_suggestion("Do something"));

        let converted = from_anyhow(error);
        assert_eq!(converted.message, "Custom");
        assert_eq!(converted.suggestions, vec!["Do something".to_string()]);
    }

    #[test]
    fn test_render_numbers_suggestions() {
        let error = CliError::new("Broken").with_suggestion("first").with_suggestion("second");
        assert_eq!(error.render(), "Broken\n\nTo fix this:\n  1. first\n  2. second");
    }
}
