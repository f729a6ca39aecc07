//! Deterministic in-process models for tests and offline runs

use movierag_core::error::{MovieRagError, Result};
use std::hash::Hasher;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use twox_hash::XxHash64;

use crate::ports::{ChatModel, Embedder};

/// Bag-of-words embedder that hashes lowercase tokens into a fixed number of buckets
///
/// Texts sharing words get similar vectors, which is enough for retrieval tests.
/// Vectors are L2-normalized; text without tokens maps to the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
    name: String,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1), name: format!("hashing-{}", dimensions.max(1)) }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.to_lowercase().as_bytes());
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// Embedder that succeeds for a number of calls and then fails every call after
#[derive(Debug)]
pub struct FailingEmbedder {
    inner: HashingEmbedder,
    remaining: AtomicUsize,
}

impl FailingEmbedder {
    pub fn after(successful_calls: usize, dimensions: usize) -> Self {
        Self {
            inner: HashingEmbedder::new(dimensions),
            remaining: AtomicUsize::new(successful_calls),
        }
    }

    fn take_call(&self) -> Result<()> {
        let allowed = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if allowed {
            Ok(())
        } else {
            Err(MovieRagError::Embedding {
                reason: "embedding service unavailable".to_string(),
                remediation: "Retry later".to_string(),
            })
        }
    }
}

impl Embedder for FailingEmbedder {
    fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.take_call()?;
        self.inner.embed(texts)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Prompts received by a [`ScriptedChat`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPrompt {
    pub system: String,
    pub user: String,
}

/// Chat model that replays canned replies in order, repeating the last one
#[derive(Debug)]
pub struct ScriptedChat {
    replies: Vec<String>,
    fail: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<RecordedPrompt>>,
}

impl ScriptedChat {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            fail: false,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A chat model whose every call fails with a service error
    pub fn failing() -> Self {
        Self { fail: true, ..Self::new(Vec::<String>::new()) }
    }

    /// Every prompt received so far, oldest first
    pub fn prompts(&self) -> Vec<RecordedPrompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl ChatModel for ScriptedChat {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(RecordedPrompt { system: system.to_string(), user: user.to_string() });
        }

        if self.fail {
            return Err(MovieRagError::Service {
                reason: "chat service unavailable".to_string(),
                remediation: "Retry later".to_string(),
            });
        }

        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.replies.len().saturating_sub(1));

        self.replies.get(index).cloned().ok_or_else(|| MovieRagError::Service {
            reason: "no scripted reply".to_string(),
            remediation: "Provide at least one reply".to_string(),
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
