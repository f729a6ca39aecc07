use movierag_core::error::Result;
use movierag_core::models::ScoredChunk;
use movierag_llm::ports::{ChatModel, Embedder};
use movierag_store::ports::VectorIndex;

use crate::models::{parse_answer, Reply};
use crate::prompt::{build_context, system_prompt, user_prompt};

/// Semantic search over an index
pub struct Retriever<'a, E: Embedder, I: VectorIndex> {
    embedder: &'a E,
    index: &'a I,
}

impl<'a, E: Embedder, I: VectorIndex> Retriever<'a, E, I> {
    pub fn new(embedder: &'a E, index: &'a I) -> Self {
        Self { embedder, index }
    }

    /// The `k` chunks closest to `text`, most similar first
    pub fn query(&self, text: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let vector = self.embedder.embed_query(text)?;
        self.index.query(&vector, k)
    }
}

/// Answers questions from the chunks of an attached index
///
/// Starts unready; [`QuestionAnswerer::attach`] supplies the index. Until then
/// every question gets [`Reply::NotReady`].
pub struct QuestionAnswerer<E, C, I>
where
    E: Embedder,
    C: ChatModel,
    I: VectorIndex,
{
    embedder: E,
    chat: C,
    index: Option<I>,
    top_k: usize,
}

impl<E, C, I> QuestionAnswerer<E, C, I>
where
    E: Embedder,
    C: ChatModel,
    I: VectorIndex,
{
    pub fn new(embedder: E, chat: C, top_k: usize) -> Self {
        Self { embedder, chat, index: None, top_k }
    }

    /// Attach the index questions are answered from
    pub fn attach(&mut self, index: I) {
        tracing::info!(chunks = index.len(), "Index attached");
        self.index = Some(index);
    }

    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&I> {
        self.index.as_ref()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve context for `question` and ask the chat model for a structured answer
    ///
    /// A reply that does not match the answer schema is a `SchemaValidation` error.
    pub fn answer(&self, question: &str) -> Result<Reply> {
        let Some(index) = &self.index else {
            return Ok(Reply::NotReady);
        };

        let retrieved = Retriever::new(&self.embedder, index).query(question, self.top_k)?;
        tracing::debug!(
            retrieved = retrieved.len(),
            titles = ?retrieved.iter().map(|s| s.chunk.metadata.title.as_str()).collect::<Vec<_>>(),
            "Retrieved context"
        );

        let context = build_context(&retrieved);
        let raw = self.chat.complete(&system_prompt(), &user_prompt(&context, question))?;
        tracing::debug!(model = self.chat.model_name(), chars = raw.len(), "Chat model replied");

        Ok(Reply::Answered(parse_answer(&raw)?))
    }
}
