//! Text embeddings for semantic recall of earlier thread messages.

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::config::AgentConfig;
use crate::AgentError;

/// Single embed request timeout (connect + request + response).
const EMBED_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns text into a vector; similar texts give vectors with high cosine similarity.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError>;
}

/// Embeddings from an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedding {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedding {
    /// Uses the agent's key and base URL with the configured embedding model.
    pub fn new(config: &dyn AgentConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key())
            .with_api_base(config.base_url());
        Self::with_client(Client::with_config(openai_config), config.embedding_model())
    }

    pub fn with_client(client: Client<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbedding {
    #[instrument(skip(self, text), fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError> {
        info!(model = %self.model, text_len = text.len(), "step: embedding request");

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(text)
            .build()?;

        let embeddings = self.client.embeddings();
        let response = match tokio::time::timeout(EMBED_TIMEOUT, embeddings.create(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "Embedding request failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout_secs = EMBED_TIMEOUT.as_secs(), "Embedding request timed out");
                return Err(AgentError::Transport(format!(
                    "embedding request timed out after {}s",
                    EMBED_TIMEOUT.as_secs()
                )));
            }
        };

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|e| e.embedding)
            .ok_or_else(|| AgentError::Transport("embedding response has no data".to_string()))?;
        debug!(dimension = embedding.len(), "Embedding received");
        Ok(embedding)
    }
}

/// Cosine similarity in `[-1, 1]`; 0 for empty, mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
