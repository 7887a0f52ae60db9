//! Agent memory: per-thread message history and per-resource working memory (the patient profile).
//!
//! Thread messages may carry an embedding; [`MemoryStore::semantic_recall`] ranks earlier messages by cosine
//! similarity to a query embedding and returns the best matches with their neighbours.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use prompt::ChatMessage;
use tokio::sync::RwLock;

use crate::embedding::cosine_similarity;
use crate::AgentError;

/// One thread message, with its embedding when one was computed.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub message: ChatMessage,
    pub embedding: Option<Vec<f32>>,
}

impl StoredMessage {
    pub fn new(message: ChatMessage, embedding: Option<Vec<f32>>) -> Self {
        Self { message, embedding }
    }
}

impl From<ChatMessage> for StoredMessage {
    fn from(message: ChatMessage) -> Self {
        Self::new(message, None)
    }
}

/// How much semantic recall adds to a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecallOptions {
    /// Best-matching messages to recall; 0 disables recall.
    pub top_k: usize,
    /// Messages included before and after each match.
    pub message_range: usize,
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self {
            top_k: crate::config::DEFAULT_RECALL_TOP_K,
            message_range: crate::config::DEFAULT_RECALL_MESSAGE_RANGE,
        }
    }
}

/// Storage for conversation history and working memory.
///
/// Threads are keyed by `"{platform}-{chat_id}"`, working memory by `"{platform}-{user_id}"`.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    async fn working_memory(&self, resource_id: &str) -> Result<Option<String>, AgentError>;

    /// Replaces the stored profile for `resource_id`.
    async fn set_working_memory(&self, resource_id: &str, memory: String)
        -> Result<(), AgentError>;

    /// The last `limit` messages of a thread, oldest first.
    async fn recent_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, AgentError>;

    async fn append_messages(
        &self,
        thread_id: &str,
        messages: Vec<StoredMessage>,
    ) -> Result<(), AgentError>;

    /// Earlier messages most similar to `query`, each with `options.message_range` neighbours, oldest first.
    ///
    /// The last `skip_recent` messages of the thread are already in the turn's history and are never returned.
    async fn semantic_recall(
        &self,
        thread_id: &str,
        query: &[f32],
        options: RecallOptions,
        skip_recent: usize,
    ) -> Result<Vec<ChatMessage>, AgentError>;
}

/// Process-local memory store; contents are lost on restart.
#[derive(Clone)]
pub struct InMemoryMemoryStore {
    working: Arc<RwLock<HashMap<String, String>>>,
    threads: Arc<RwLock<HashMap<String, Vec<StoredMessage>>>>,
    max_thread_len: usize,
}

/// Messages kept per thread before the oldest are dropped.
pub const DEFAULT_MAX_THREAD_LEN: usize = 200;

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::with_max_thread_len(DEFAULT_MAX_THREAD_LEN)
    }

    pub fn with_max_thread_len(max_thread_len: usize) -> Self {
        Self {
            working: Arc::new(RwLock::new(HashMap::new())),
            threads: Arc::new(RwLock::new(HashMap::new())),
            max_thread_len,
        }
    }
}

impl Default for InMemoryMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryMemoryStore {
    async fn working_memory(&self, resource_id: &str) -> Result<Option<String>, AgentError> {
        Ok(self.working.read().await.get(resource_id).cloned())
    }

    async fn set_working_memory(
        &self,
        resource_id: &str,
        memory: String,
    ) -> Result<(), AgentError> {
        self.working
            .write()
            .await
            .insert(resource_id.to_string(), memory);
        Ok(())
    }

    async fn recent_messages(
        &self,
        thread_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, AgentError> {
        let threads = self.threads.read().await;
        let Some(thread) = threads.get(thread_id) else {
            return Ok(Vec::new());
        };
        let start = thread.len().saturating_sub(limit);
        Ok(thread[start..].iter().map(|m| m.message.clone()).collect())
    }

    async fn append_messages(
        &self,
        thread_id: &str,
        messages: Vec<StoredMessage>,
    ) -> Result<(), AgentError> {
        let mut threads = self.threads.write().await;
        let thread = threads.entry(thread_id.to_string()).or_default();
        thread.extend(messages);
        if thread.len() > self.max_thread_len {
            let excess = thread.len() - self.max_thread_len;
            thread.drain(..excess);
        }
        Ok(())
    }

    async fn semantic_recall(
        &self,
        thread_id: &str,
        query: &[f32],
        options: RecallOptions,
        skip_recent: usize,
    ) -> Result<Vec<ChatMessage>, AgentError> {
        if options.top_k == 0 {
            return Ok(Vec::new());
        }
        let threads = self.threads.read().await;
        let Some(thread) = threads.get(thread_id) else {
            return Ok(Vec::new());
        };
        let searchable = thread.len().saturating_sub(skip_recent);

        let mut scored: Vec<(f32, usize)> = thread[..searchable]
            .iter()
            .enumerate()
            .filter_map(|(i, m)| {
                m.embedding
                    .as_deref()
                    .map(|e| (cosine_similarity(query, e), i))
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let mut picked = BTreeSet::new();
        for (_, i) in scored.into_iter().take(options.top_k) {
            let from = i.saturating_sub(options.message_range);
            let to = (i + options.message_range).min(searchable - 1);
            picked.extend(from..=to);
        }
        Ok(picked
            .into_iter()
            .map(|i| thread[i].message.clone())
            .collect())
    }
}
