//! OpenAI-backed [`Agent`]: streams chat completions, runs tool calls between steps, and persists thread history.
//!
//! With an [`EmbeddingService`] attached, each turn also recalls earlier thread messages similar to the user's
//! text, and persisted messages carry embeddings for later recall.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use futures::StreamExt;
use prompt::{format_system_prompt, format_turn_messages, ChatMessage, MessageRole};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info, instrument, warn};

use crate::config::AgentConfig;
use crate::embedding::EmbeddingService;
use crate::memory::{RecallOptions, StoredMessage};
use crate::tools::{self, tool_specs};
use crate::{Agent, AgentError, ChunkStream, MemoryStore, ProviderChunk, TurnOptions};

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let len = token.len();
    if len <= 11 || !token.is_ascii() {
        "***".to_string()
    } else {
        format!("{}***{}", &token[..7], &token[len - 4..])
    }
}

impl From<OpenAIError> for AgentError {
    fn from(e: OpenAIError) -> Self {
        AgentError::Transport(e.to_string())
    }
}

/// Symptom tracker agent over an OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct OpenAiAgent {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    instructions: String,
    memory: Arc<dyn MemoryStore>,
    embedding: Option<Arc<dyn EmbeddingService>>,
    history_limit: usize,
    recall: RecallOptions,
    max_steps: usize,
    /// API key stored only for logging (masked). None when created via `with_client()`.
    api_key_for_logging: Option<String>,
}

impl OpenAiAgent {
    pub fn new(config: &dyn AgentConfig, memory: Arc<dyn MemoryStore>) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key())
            .with_api_base(config.base_url());
        Self {
            client: Arc::new(Client::with_config(openai_config)),
            model: config.model().to_string(),
            instructions: prompt::SYMPTOM_TRACKER_INSTRUCTIONS.to_string(),
            memory,
            embedding: None,
            history_limit: config.history_limit(),
            recall: RecallOptions {
                top_k: config.recall_top_k(),
                message_range: config.recall_message_range(),
            },
            max_steps: config.max_steps().max(1),
            api_key_for_logging: Some(config.api_key().to_string()),
        }
    }

    /// Builds an agent from an existing async-openai client (no API key stored for logging).
    pub fn with_client(
        client: Client<OpenAIConfig>,
        model: impl Into<String>,
        memory: Arc<dyn MemoryStore>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            model: model.into(),
            instructions: prompt::SYMPTOM_TRACKER_INSTRUCTIONS.to_string(),
            memory,
            embedding: None,
            history_limit: crate::config::DEFAULT_HISTORY_LIMIT,
            recall: RecallOptions::default(),
            max_steps: crate::config::DEFAULT_MAX_STEPS,
            api_key_for_logging: None,
        }
    }

    /// Enables semantic recall and message embeddings.
    pub fn with_embedding(mut self, embedding: Arc<dyn EmbeddingService>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Embeds the user's text for recall; `None` when recall is off or embedding fails.
    async fn embed_query(&self, input: &str) -> Option<Vec<f32>> {
        let service = self.embedding.as_ref()?;
        if self.recall.top_k == 0 || input.trim().is_empty() {
            return None;
        }
        match service.embed(input).await {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                warn!(error = %e, "Query embedding failed, skipping semantic recall");
                None
            }
        }
    }
}

/// Converts a single [`ChatMessage`] into OpenAI API message format.
fn chat_message_to_openai(msg: &ChatMessage) -> Result<ChatCompletionRequestMessage, AgentError> {
    let content = msg.content.clone();
    let openai_msg: ChatCompletionRequestMessage = match msg.role {
        MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(openai_msg)
}

fn openai_tools() -> Result<Vec<ChatCompletionTool>, AgentError> {
    tool_specs()
        .into_iter()
        .map(|spec| -> Result<ChatCompletionTool, AgentError> {
            let function = FunctionObjectArgs::default()
                .name(spec.name)
                .description(spec.description)
                .parameters(spec.parameters)
                .build()?;
            Ok(ChatCompletionToolArgs::default()
                .r#type(ChatCompletionToolType::Function)
                .function(function)
                .build()?)
        })
        .collect()
}

#[async_trait]
impl Agent for OpenAiAgent {
    #[instrument(skip(self, input, options), fields(thread_id = %options.thread_id))]
    async fn open_turn(&self, input: &str, options: TurnOptions) -> Result<ChunkStream, AgentError> {
        let working_memory = self.memory.working_memory(&options.resource_id).await?;
        let history = self
            .memory
            .recent_messages(&options.thread_id, self.history_limit)
            .await?;

        let input_embedding = self.embed_query(input).await;
        let recalled = match &input_embedding {
            Some(query) => {
                self.memory
                    .semantic_recall(&options.thread_id, query, self.recall, history.len())
                    .await?
            }
            None => Vec::new(),
        };
        if !recalled.is_empty() {
            info!(recalled = recalled.len(), "step: semantic recall done");
        }

        let system_prompt = format_system_prompt(&self.instructions, working_memory.as_deref());
        let messages = format_turn_messages(
            &system_prompt,
            &options.context.to_system_message(),
            &recalled,
            &history,
            input,
        );
        let request_messages = messages
            .iter()
            .map(chat_message_to_openai)
            .collect::<Result<Vec<_>, _>>()?;

        let masked = self
            .api_key_for_logging
            .as_deref()
            .map(mask_token)
            .unwrap_or_else(|| "***".to_string());
        info!(
            model = %self.model,
            message_count = request_messages.len(),
            history_len = history.len(),
            api_key = %masked,
            "step: agent turn opened"
        );

        let run = TurnRun {
            client: self.client.clone(),
            model: self.model.clone(),
            tools: openai_tools()?,
            memory: self.memory.clone(),
            embedding: self.embedding.clone(),
            max_steps: self.max_steps,
            input: input.to_string(),
            input_embedding,
            options,
        };
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run.drive(request_messages, tx));

        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

type ChunkSender = mpsc::UnboundedSender<Result<ProviderChunk, AgentError>>;

/// Tool call assembled from streamed fragments.
#[derive(Debug, Default)]
struct PendingToolCall {
    id: String,
    name: String,
    arguments: String,
}

/// One turn's worth of state, owned by the spawned task that produces chunks.
struct TurnRun {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    tools: Vec<ChatCompletionTool>,
    memory: Arc<dyn MemoryStore>,
    embedding: Option<Arc<dyn EmbeddingService>>,
    max_steps: usize,
    input: String,
    input_embedding: Option<Vec<f32>>,
    options: TurnOptions,
}

impl TurnRun {
    async fn drive(self, mut messages: Vec<ChatCompletionRequestMessage>, tx: ChunkSender) {
        match self.run_steps(&mut messages, &tx).await {
            Ok((reply, finish_reason)) => {
                let mut turn = vec![StoredMessage::new(
                    ChatMessage::user(self.input.clone()),
                    self.input_embedding.clone(),
                )];
                if !reply.is_empty() {
                    let embedding = self.embed_reply(&reply).await;
                    turn.push(StoredMessage::new(ChatMessage::assistant(reply), embedding));
                }
                if let Err(e) = self
                    .memory
                    .append_messages(&self.options.thread_id, turn)
                    .await
                {
                    warn!(error = %e, thread_id = %self.options.thread_id, "Failed to persist turn history");
                }
                let _ = tx.send(Ok(ProviderChunk::Finish { finish_reason }));
            }
            Err(e) => {
                error!(error = %e, thread_id = %self.options.thread_id, "Agent turn failed");
                let _ = tx.send(Err(e));
            }
        }
    }

    async fn embed_reply(&self, reply: &str) -> Option<Vec<f32>> {
        let service = self.embedding.as_ref()?;
        match service.embed(reply).await {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                warn!(error = %e, "Reply embedding failed, stored without embedding");
                None
            }
        }
    }

    /// Runs model steps until one finishes without tool calls. Returns the full reply text and finish reason.
    async fn run_steps(
        &self,
        messages: &mut Vec<ChatCompletionRequestMessage>,
        tx: &ChunkSender,
    ) -> Result<(String, String), AgentError> {
        let mut reply = String::new();

        for step in 0..self.max_steps {
            let _ = tx.send(Ok(ProviderChunk::StepStart));

            let request = CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages(messages.clone())
                .tools(self.tools.clone())
                .build()?;
            let mut stream = self.client.chat().create_stream(request).await?;

            let mut text = String::new();
            let mut calls: BTreeMap<i32, PendingToolCall> = BTreeMap::new();
            let mut finish_reason = String::from("stop");

            while let Some(result) = stream.next().await {
                let response = result?;
                let Some(choice) = response.choices.into_iter().next() else {
                    continue;
                };
                if let Some(content) = choice.delta.content {
                    if !content.is_empty() {
                        text.push_str(&content);
                        let _ = tx.send(Ok(ProviderChunk::TextDelta {
                            text_delta: content,
                        }));
                    }
                }
                for fragment in choice.delta.tool_calls.unwrap_or_default() {
                    let entry = calls.entry(fragment.index).or_default();
                    if let Some(id) = fragment.id {
                        entry.id = id;
                    }
                    if let Some(function) = fragment.function {
                        if let Some(name) = function.name {
                            entry.name.push_str(&name);
                        }
                        if let Some(arguments) = function.arguments {
                            entry.arguments.push_str(&arguments);
                        }
                    }
                }
                if let Some(reason) = choice.finish_reason {
                    finish_reason = format!("{:?}", reason).to_lowercase();
                }
            }

            reply.push_str(&text);
            let _ = tx.send(Ok(ProviderChunk::StepFinish {
                finish_reason: finish_reason.clone(),
            }));
            info!(
                step = step,
                text_len = text.len(),
                tool_calls = calls.len(),
                finish_reason = %finish_reason,
                "step: model step finished"
            );

            if calls.is_empty() {
                return Ok((reply, finish_reason));
            }

            messages.push(self.assistant_tool_call_message(&text, &calls)?);
            for call in calls.into_values() {
                let args: Value = serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
                    warn!(tool = %call.name, error = %e, "Tool arguments are not valid JSON");
                    json!({})
                });
                let _ = tx.send(Ok(ProviderChunk::ToolCall {
                    tool_call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    args: args.clone(),
                }));

                let result = match tools::call_tool(
                    &call.name,
                    &args,
                    &self.options.resource_id,
                    self.memory.as_ref(),
                )
                .await
                {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "Tool call failed");
                        json!({ "error": e.to_string() })
                    }
                };
                let _ = tx.send(Ok(ProviderChunk::ToolResult {
                    tool_call_id: call.id.clone(),
                    tool_name: call.name.clone(),
                    result: result.clone(),
                }));

                messages.push(
                    ChatCompletionRequestToolMessageArgs::default()
                        .content(result.to_string())
                        .tool_call_id(call.id)
                        .build()?
                        .into(),
                );
            }
        }

        warn!(max_steps = self.max_steps, "Agent turn reached step limit");
        Ok((reply, "length".to_string()))
    }

    fn assistant_tool_call_message(
        &self,
        text: &str,
        calls: &BTreeMap<i32, PendingToolCall>,
    ) -> Result<ChatCompletionRequestMessage, AgentError> {
        let tool_calls: Vec<ChatCompletionMessageToolCall> = calls
            .values()
            .map(|call| ChatCompletionMessageToolCall {
                id: call.id.clone(),
                r#type: ChatCompletionToolType::Function,
                function: FunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect();
        let mut args = ChatCompletionRequestAssistantMessageArgs::default();
        if !text.is_empty() {
            args.content(text.to_string());
        }
        Ok(args.tool_calls(tool_calls).build()?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_tools_cover_both_tools() {
        let tools = openai_tools().unwrap();
        let names: Vec<_> = tools.iter().map(|t| t.function.name.as_str()).collect();
        assert_eq!(
            names,
            vec![tools::GENERATE_REPORT_TOOL, tools::UPDATE_WORKING_MEMORY_TOOL]
        );
    }
}
