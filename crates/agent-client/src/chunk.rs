//! Provider stream chunks and agent errors.
//!
//! [`ProviderChunk`] mirrors the provider's full-stream wire format (`{"type": "text-delta", "textDelta": ...}`).
//! Kinds this crate does not know deserialize to [`ProviderChunk::Unknown`] so consumers can drop them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One chunk of an agent turn, in provider order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ProviderChunk {
    /// Incremental assistant text.
    TextDelta { text_delta: String },
    /// Incremental model reasoning text.
    Reasoning { text_delta: String },
    /// The model invoked a tool with parsed arguments.
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        args: Value,
    },
    /// A tool finished; `result` is its JSON output.
    ToolResult {
        tool_call_id: String,
        tool_name: String,
        result: Value,
    },
    /// The provider reported a failure inside the stream.
    Error { error: String },
    StepStart,
    StepFinish { finish_reason: String },
    Finish { finish_reason: String },
    #[serde(other)]
    Unknown,
}

/// Errors from opening or consuming an agent turn.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Network or provider API failure.
    #[error("Agent transport error: {0}")]
    Transport(String),

    /// Request could not be built from the turn inputs.
    #[error("Agent request error: {0}")]
    Request(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Memory store error: {0}")]
    Memory(String),
}
