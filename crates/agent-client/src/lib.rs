//! # Agent client
//!
//! The conversational agent behind the symptom tracker, seen from the bot's side: open a turn with the user's
//! text and per-turn options, get back a stream of [`ProviderChunk`]s.
//!
//! - [`Agent`]: the seam the bot depends on; tests substitute scripted agents.
//! - [`OpenAiAgent`]: OpenAI-compatible implementation with the report and working memory tools.
//! - [`MemoryStore`]: thread history, semantic recall over it, and per-user working memory.
//! - [`EmbeddingService`]: text embeddings for recall; [`OpenAiEmbedding`] over the `/embeddings` endpoint.

use async_trait::async_trait;
use futures::stream::BoxStream;

mod chunk;
pub mod config;
mod embedding;
mod memory;
mod openai_agent;
pub mod tools;

pub use chunk::{AgentError, ProviderChunk};
pub use config::{AgentConfig, EnvAgentConfig};
pub use embedding::{cosine_similarity, EmbeddingService, OpenAiEmbedding};
pub use memory::{InMemoryMemoryStore, MemoryStore, RecallOptions, StoredMessage};
pub use openai_agent::{mask_token, OpenAiAgent};
pub use tools::{generate_report, MedicalReport};

/// Stream of provider chunks for one turn. An `Err` item ends the turn.
pub type ChunkStream = BoxStream<'static, Result<ProviderChunk, AgentError>>;

/// Who is talking and when, injected into every turn as a system message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    pub display_name: String,
    pub username: Option<String>,
    /// Local date, `YYYY-MM-DD`.
    pub date: String,
    /// Local time, `HH:MM:SS`.
    pub time: String,
}

impl TurnContext {
    pub fn to_system_message(&self) -> String {
        prompt::format_context_message(
            &self.display_name,
            self.username.as_deref(),
            &self.date,
            &self.time,
        )
    }
}

/// Identifiers and context for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOptions {
    /// Conversation thread, `"{platform}-{chat_id}"`.
    pub thread_id: String,
    /// Owner of the working memory, `"{platform}-{user_id}"`.
    pub resource_id: String,
    pub context: TurnContext,
}

impl TurnOptions {
    /// Builds options for a message in `chat_id` on `platform`.
    ///
    /// Without a sender id the resource falls back to `"{platform}-anonymous-{chat_id}"`.
    pub fn new(platform: &str, chat_id: i64, user_id: Option<i64>, context: TurnContext) -> Self {
        let resource_id = match user_id {
            Some(id) => format!("{}-{}", platform, id),
            None => format!("{}-anonymous-{}", platform, chat_id),
        };
        Self {
            thread_id: format!("{}-{}", platform, chat_id),
            resource_id,
            context,
        }
    }
}

/// Conversational agent: one call per user message.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Starts a turn and returns its chunk stream. Errors here mean the turn never started.
    async fn open_turn(&self, input: &str, options: TurnOptions) -> Result<ChunkStream, AgentError>;
}
