use crate::error::{MovieRagError, Result};
use crate::processing::ChunkConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "NVIDIA_API_KEY";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for MovieRAG
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub data_path: ConfigValue<PathBuf>,
    pub index_path: ConfigValue<PathBuf>,
    pub max_rows: ConfigValue<usize>,
    pub chunk_size: ConfigValue<usize>,
    pub chunk_overlap: ConfigValue<usize>,
    pub top_k: ConfigValue<usize>,
    pub embed_model: ConfigValue<String>,
    pub embed_dimensions: ConfigValue<usize>,
    pub chat_model: ConfigValue<String>,
    pub temperature: ConfigValue<f32>,
    pub max_tokens: ConfigValue<u32>,
    pub api_base: ConfigValue<String>,
    pub batch_size: ConfigValue<usize>,
    pub timeout_secs: ConfigValue<u64>,
    pub api_key: ConfigValue<Option<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let d = ConfigSource::Default;
        Self {
            data_path: ConfigValue::new(PathBuf::from("data/wiki_movie_plots_deduped.csv"), d),
            index_path: ConfigValue::new(PathBuf::from("data/movie_index"), d),
            max_rows: ConfigValue::new(500, d),
            chunk_size: ConfigValue::new(1500, d),
            chunk_overlap: ConfigValue::new(150, d),
            top_k: ConfigValue::new(3, d),
            embed_model: ConfigValue::new("nvidia/nv-embed-v1".to_string(), d),
            embed_dimensions: ConfigValue::new(4096, d),
            chat_model: ConfigValue::new("meta/llama-3.1-70b-instruct".to_string(), d),
            temperature: ConfigValue::new(0.1, d),
            max_tokens: ConfigValue::new(1024, d),
            api_base: ConfigValue::new("https://integrate.api.nvidia.com/v1".to_string(), d),
            batch_size: ConfigValue::new(50, d),
            timeout_secs: ConfigValue::new(120, d),
            api_key: ConfigValue::new(None, d),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| MovieRagError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| MovieRagError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let f = ConfigSource::File;
        if let Some(v) = file_config.data_path {
            self.data_path.update(v, f);
        }
        if let Some(v) = file_config.index_path {
            self.index_path.update(v, f);
        }
        if let Some(v) = file_config.max_rows {
            self.max_rows.update(v, f);
        }
        if let Some(v) = file_config.chunk_size {
            self.chunk_size.update(v, f);
        }
        if let Some(v) = file_config.chunk_overlap {
            self.chunk_overlap.update(v, f);
        }
        if let Some(v) = file_config.top_k {
            self.top_k.update(v, f);
        }
        if let Some(v) = file_config.embed_model {
            self.embed_model.update(v, f);
        }
        if let Some(v) = file_config.embed_dimensions {
            self.embed_dimensions.update(v, f);
        }
        if let Some(v) = file_config.chat_model {
            self.chat_model.update(v, f);
        }
        if let Some(v) = file_config.temperature {
            self.temperature.update(v, f);
        }
        if let Some(v) = file_config.max_tokens {
            self.max_tokens.update(v, f);
        }
        if let Some(v) = file_config.api_base {
            self.api_base.update(v, f);
        }
        if let Some(v) = file_config.batch_size {
            self.batch_size.update(v, f);
        }
        if let Some(v) = file_config.timeout_secs {
            self.timeout_secs.update(v, f);
        }
        if let Some(v) = file_config.api_key {
            self.api_key.update(Some(v), f);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        let e = ConfigSource::Environment;

        if let Ok(v) = env::var("MOVIERAG_DATA_PATH") {
            self.data_path.update(PathBuf::from(v), e);
        }
        if let Ok(v) = env::var("MOVIERAG_INDEX_PATH") {
            self.index_path.update(PathBuf::from(v), e);
        }
        if let Some(v) = parse_env("MOVIERAG_MAX_ROWS") {
            self.max_rows.update(v, e);
        }
        if let Some(v) = parse_env("MOVIERAG_CHUNK_SIZE") {
            self.chunk_size.update(v, e);
        }
        if let Some(v) = parse_env("MOVIERAG_CHUNK_OVERLAP") {
            self.chunk_overlap.update(v, e);
        }
        if let Some(v) = parse_env("MOVIERAG_TOP_K") {
            self.top_k.update(v, e);
        }
        if let Ok(v) = env::var("MOVIERAG_EMBED_MODEL") {
            self.embed_model.update(v, e);
        }
        if let Some(v) = parse_env("MOVIERAG_EMBED_DIMENSIONS") {
            self.embed_dimensions.update(v, e);
        }
        if let Ok(v) = env::var("MOVIERAG_CHAT_MODEL") {
            self.chat_model.update(v, e);
        }
        if let Some(v) = parse_env("MOVIERAG_TEMPERATURE") {
            self.temperature.update(v, e);
        }
        if let Some(v) = parse_env("MOVIERAG_MAX_TOKENS") {
            self.max_tokens.update(v, e);
        }
        if let Ok(v) = env::var("MOVIERAG_API_BASE") {
            self.api_base.update(v, e);
        }
        if let Some(v) = parse_env("MOVIERAG_BATCH_SIZE") {
            self.batch_size.update(v, e);
        }
        if let Some(v) = parse_env("MOVIERAG_TIMEOUT_SECS") {
            self.timeout_secs.update(v, e);
        }
        if let Ok(v) = env::var(API_KEY_ENV) {
            if !v.trim().is_empty() {
                self.api_key.update(Some(v), e);
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        let c = ConfigSource::Cli;
        if let Some(v) = overrides.data_path {
            self.data_path.update(v, c);
        }
        if let Some(v) = overrides.index_path {
            self.index_path.update(v, c);
        }
        if let Some(v) = overrides.max_rows {
            self.max_rows.update(v, c);
        }
        if let Some(v) = overrides.chunk_size {
            self.chunk_size.update(v, c);
        }
        if let Some(v) = overrides.chunk_overlap {
            self.chunk_overlap.update(v, c);
        }
        if let Some(v) = overrides.top_k {
            self.top_k.update(v, c);
        }
    }

    /// Validated chunking parameters
    pub fn chunk_config(&self) -> Result<ChunkConfig> {
        ChunkConfig::new(self.chunk_size.value, self.chunk_overlap.value)
    }

    /// Retrieval depth, which must be positive
    pub fn retrieval_k(&self) -> Result<usize> {
        if self.top_k.value == 0 {
            return Err(MovieRagError::ConfigInvalid {
                key: "top_k".to_string(),
                reason: "top_k must be at least 1".to_string(),
            });
        }
        Ok(self.top_k.value)
    }

    /// The API credential, required before any remote call
    pub fn require_api_key(&self) -> Result<String> {
        self.api_key
            .value
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| MovieRagError::ConfigMissing { key: API_KEY_ENV.to_string() })
    }

    /// Get all configuration values as a map for inspection
    ///
    /// The credential is masked.
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        let mut put = |key: &str, value: String, source: ConfigSource| {
            map.insert(key.to_string(), (value, source));
        };

        put("data_path", self.data_path.value.display().to_string(), self.data_path.source);
        put("index_path", self.index_path.value.display().to_string(), self.index_path.source);
        put("max_rows", self.max_rows.value.to_string(), self.max_rows.source);
        put("chunk_size", self.chunk_size.value.to_string(), self.chunk_size.source);
        put("chunk_overlap", self.chunk_overlap.value.to_string(), self.chunk_overlap.source);
        put("top_k", self.top_k.value.to_string(), self.top_k.source);
        put("embed_model", self.embed_model.value.clone(), self.embed_model.source);
        put(
            "embed_dimensions",
            self.embed_dimensions.value.to_string(),
            self.embed_dimensions.source,
        );
        put("chat_model", self.chat_model.value.clone(), self.chat_model.source);
        put("temperature", self.temperature.value.to_string(), self.temperature.source);
        put("max_tokens", self.max_tokens.value.to_string(), self.max_tokens.source);
        put("api_base", self.api_base.value.clone(), self.api_base.source);
        put("batch_size", self.batch_size.value.to_string(), self.batch_size.source);
        put("timeout_secs", self.timeout_secs.value.to_string(), self.timeout_secs.source);

        let masked = match &self.api_key.value {
            Some(_) => "********".to_string(),
            None => "(not set)".to_string(),
        };
        put("api_key", masked, self.api_key.source);

        map
    }
}

fn parse_env<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Invalid {} value '{}': {}", name, raw, e);
            None
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    data_path: Option<PathBuf>,
    index_path: Option<PathBuf>,
    max_rows: Option<usize>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    embed_model: Option<String>,
    embed_dimensions: Option<usize>,
    chat_model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    api_base: Option<String>,
    batch_size: Option<usize>,
    timeout_secs: Option<u64>,
    api_key: Option<String>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub data_path: Option<PathBuf>,
    pub index_path: Option<PathBuf>,
    pub max_rows: Option<usize>,
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
    pub top_k: Option<usize>,
}
