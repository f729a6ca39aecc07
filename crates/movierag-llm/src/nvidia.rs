//! Adapters for the NVIDIA API catalog
//!
//! Both endpoints speak the OpenAI-compatible wire format. The ports are
//! blocking, so each adapter owns a single-threaded tokio runtime and blocks
//! on the reqwest future for the duration of one request.

use movierag_core::error::{MovieRagError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{ChatModel, Embedder};

pub const DEFAULT_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Connection settings shared by the NVIDIA adapters
#[derive(Debug, Clone)]
pub struct NvidiaConfig {
    /// Bearer credential
    pub api_key: String,

    /// Base URL, without a trailing `/embeddings` or `/chat/completions`
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl NvidiaConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 120,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Why a request did not produce a decoded response
#[derive(Debug)]
enum ApiFailure {
    Transport(String),
    Status { status: u16, body: String },
    Decode(String),
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiFailure::Transport(e) => write!(f, "request failed: {}", e),
            ApiFailure::Status { status, body } => write!(f, "API error ({}): {}", status, body),
            ApiFailure::Decode(e) => write!(f, "failed to parse response: {}", e),
        }
    }
}

/// HTTP plumbing shared by the embedder and the chat model
struct ApiClient {
    config: NvidiaConfig,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl ApiClient {
    fn new(config: NvidiaConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(MovieRagError::ConfigMissing { key: "api_key".to_string() });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MovieRagError::ConfigInvalid {
                key: "http_client".to_string(),
                reason: e.to_string(),
            })?;

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        Ok(Self { config, client, runtime })
    }

    fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> std::result::Result<Resp, ApiFailure>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{}", self.config.base_url, path);
        tracing::debug!(%url, "POST");

        self.runtime.block_on(async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .json(body)
                .send()
                .await
                .map_err(|e| ApiFailure::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiFailure::Status { status: status.as_u16(), body });
            }

            response.json::<Resp>().await.map_err(|e| ApiFailure::Decode(e.to_string()))
        })
    }

    fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

/// Embedding input mode; retrieval models embed documents and queries differently
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum InputType {
    Passage,
    Query,
}

/// NVIDIA embedder implementation
pub struct NvidiaEmbedder {
    api: ApiClient,

    /// Model name to use for embeddings
    model: String,

    /// Embedding dimensions (model-specific)
    dimensions: usize,
}

impl NvidiaEmbedder {
    /// Create a new NVIDIA embedder
    pub fn new(config: NvidiaConfig, model: impl Into<String>, dimensions: usize) -> Result<Self> {
        Ok(Self { api: ApiClient::new(config)?, model: model.into(), dimensions })
    }

    fn request(&self, texts: &[&str], input_type: InputType) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: &self.model,
            input: texts,
            input_type,
            encoding_format: "float",
            truncate: "END",
        };

        let response: EmbedResponse =
            self.api.post_json("embeddings", &request).map_err(|failure| MovieRagError::Embedding {
                reason: failure.to_string(),
                remediation: format!(
                    "Check that {} is reachable, the API key is valid and the model '{}' is available",
                    self.api.base_url(),
                    self.model
                ),
            })?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        if data.len() != texts.len() {
            return Err(MovieRagError::Embedding {
                reason: format!("expected {} embeddings, received {}", texts.len(), data.len()),
                remediation: "Check API compatibility".to_string(),
            });
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

impl Embedder for NvidiaEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts, InputType::Passage)
    }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.request(&[text], InputType::Query)?.into_iter().next().ok_or_else(|| {
            MovieRagError::Embedding {
                reason: "No embedding returned for the query".to_string(),
                remediation: "Check API compatibility".to_string(),
            }
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// NVIDIA chat completion implementation
pub struct NvidiaChat {
    api: ApiClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl NvidiaChat {
    pub fn new(config: NvidiaConfig, model: impl Into<String>, temperature: f32) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config)?,
            model: model.into(),
            temperature,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

impl ChatModel for NvidiaChat {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let service_error = |reason: String| MovieRagError::Service {
            reason,
            remediation: format!(
                "Check that {} is reachable, the API key is valid and the model '{}' is available",
                self.api.base_url(),
                self.model
            ),
        };

        let response: ChatResponse = self
            .api
            .post_json("chat/completions", &request)
            .map_err(|failure| service_error(failure.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| service_error("response contained no message content".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Request body for the embeddings API
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    input_type: InputType,
    encoding_format: &'a str,
    truncate: &'a str,
}

/// Response from the embeddings API
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}
