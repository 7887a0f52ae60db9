//! Agent configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;

/// Agent configuration interface for OpenAI-compatible APIs.
pub trait AgentConfig: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    fn model(&self) -> &str;
    /// How many prior thread messages are sent with each turn.
    fn history_limit(&self) -> usize;
    /// Upper bound on model calls per turn (each tool round trip is one step).
    fn max_steps(&self) -> usize;
    fn embedding_model(&self) -> &str;
    /// How many similar earlier messages are recalled per turn; 0 turns recall off.
    fn recall_top_k(&self) -> usize;
    /// Neighbours included on each side of a recalled message.
    fn recall_message_range(&self) -> usize;
}

/// Agent config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvAgentConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub agent_model: String,
    pub agent_history_limit: usize,
    pub agent_max_steps: usize,
    pub embedding_model: String,
    pub recall_top_k: usize,
    pub recall_message_range: usize,
}

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_MAX_STEPS: usize = 5;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_RECALL_TOP_K: usize = 5;
pub const DEFAULT_RECALL_MESSAGE_RANGE: usize = 2;

impl AgentConfig for EnvAgentConfig {
    fn api_key(&self) -> &str {
        &self.openai_api_key
    }
    fn base_url(&self) -> &str {
        &self.openai_base_url
    }
    fn model(&self) -> &str {
        &self.agent_model
    }
    fn history_limit(&self) -> usize {
        self.agent_history_limit
    }
    fn max_steps(&self) -> usize {
        self.agent_max_steps
    }
    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
    fn recall_top_k(&self) -> usize {
        self.recall_top_k
    }
    fn recall_message_range(&self) -> usize {
        self.recall_message_range
    }
}

impl EnvAgentConfig {
    /// Load from environment variables. `OPENAI_API_KEY` is required.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
        let openai_base_url =
            env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let agent_model = env::var("AGENT_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let agent_history_limit = env::var("AGENT_HISTORY_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_LIMIT);
        let agent_max_steps = env::var("AGENT_MAX_STEPS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_MAX_STEPS);
        let embedding_model = env::var("EMBEDDING_MODEL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
        let recall_top_k = env::var("AGENT_RECALL_TOP_K")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RECALL_TOP_K);
        let recall_message_range = env::var("AGENT_RECALL_RANGE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RECALL_MESSAGE_RANGE);
        Ok(Self {
            openai_api_key,
            openai_base_url,
            agent_model,
            agent_history_limit,
            agent_max_steps,
            embedding_model,
            recall_top_k,
            recall_message_range,
        })
    }
}
