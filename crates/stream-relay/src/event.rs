//! Event stream adapter: provider chunks in, [`StreamEvent`]s out.
//!
//! Order is preserved and nothing is buffered. Bookkeeping and unknown chunk kinds are dropped.
//! An `Err` item ends the output with a final [`StreamEvent::Error`].

use agent_client::{AgentError, ProviderChunk};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

/// One renderable event of an agent turn.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextFragment(String),
    ToolCall { name: String, args: Value },
    ToolResult { name: String, result: Value },
    Reasoning(String),
    /// Failure reported by the agent; the cause is for logs only.
    Error(String),
}

impl StreamEvent {
    /// Whether this event should trigger an in-progress edit (still subject to throttling).
    pub fn updates_immediately(&self, show_tool_results: bool) -> bool {
        match self {
            StreamEvent::ToolResult { .. } => show_tool_results,
            _ => true,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::TextFragment(_) => "text",
            StreamEvent::ToolCall { .. } => "tool-call",
            StreamEvent::ToolResult { .. } => "tool-result",
            StreamEvent::Reasoning(_) => "reasoning",
            StreamEvent::Error(_) => "error",
        }
    }
}

pub type EventStream = BoxStream<'static, StreamEvent>;

/// Maps one provider chunk; `None` for kinds that carry nothing to render.
pub fn from_chunk(chunk: ProviderChunk) -> Option<StreamEvent> {
    match chunk {
        ProviderChunk::TextDelta { text_delta } => Some(StreamEvent::TextFragment(text_delta)),
        ProviderChunk::Reasoning { text_delta } => Some(StreamEvent::Reasoning(text_delta)),
        ProviderChunk::ToolCall {
            tool_name, args, ..
        } => Some(StreamEvent::ToolCall {
            name: tool_name,
            args,
        }),
        ProviderChunk::ToolResult {
            tool_name, result, ..
        } => Some(StreamEvent::ToolResult {
            name: tool_name,
            result,
        }),
        ProviderChunk::Error { error } => Some(StreamEvent::Error(error)),
        other @ (ProviderChunk::StepStart
        | ProviderChunk::StepFinish { .. }
        | ProviderChunk::Finish { .. }
        | ProviderChunk::Unknown) => {
            debug!(chunk = ?other, "Dropping non-renderable chunk");
            None
        }
    }
}

/// Adapts a provider chunk stream into an event stream.
pub fn adapt<S>(chunks: S) -> EventStream
where
    S: Stream<Item = Result<ProviderChunk, AgentError>> + Send + Unpin + 'static,
{
    stream::unfold(Some(chunks), |state| async move {
        let mut chunks = state?;
        loop {
            match chunks.next().await {
                None => return None,
                Some(Ok(chunk)) => {
                    if let Some(event) = from_chunk(chunk) {
                        return Some((event, Some(chunks)));
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Agent stream failed, ending turn");
                    return Some((StreamEvent::Error(e.to_string()), None));
                }
            }
        }
    })
    .boxed()
}

/// Stream for a turn that could not be opened: a single [`StreamEvent::Error`].
pub fn open_failed(error: &AgentError) -> EventStream {
    warn!(error = %error, "Agent turn could not be opened");
    stream::iter(vec![StreamEvent::Error(error.to_string())]).boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_adapt_keeps_order_and_drops_bookkeeping() {
        let chunks = stream::iter(vec![
            Ok(ProviderChunk::StepStart),
            Ok(ProviderChunk::TextDelta {
                text_delta: "Hi".to_string(),
            }),
            Ok(ProviderChunk::ToolCall {
                tool_call_id: "c1".to_string(),
                tool_name: "generate_medical_report".to_string(),
                args: json!({"timeframe": "all"}),
            }),
            Ok(ProviderChunk::Unknown),
            Ok(ProviderChunk::TextDelta {
                text_delta: "!".to_string(),
            }),
            Ok(ProviderChunk::Finish {
                finish_reason: "stop".to_string(),
            }),
        ]);

        let events: Vec<_> = adapt(chunks).collect().await;
        assert_eq!(
            events,
            vec![
                StreamEvent::TextFragment("Hi".to_string()),
                StreamEvent::ToolCall {
                    name: "generate_medical_report".to_string(),
                    args: json!({"timeframe": "all"}),
                },
                StreamEvent::TextFragment("!".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_adapt_err_terminates_with_error_event() {
        let chunks = stream::iter(vec![
            Ok(ProviderChunk::TextDelta {
                text_delta: "partial".to_string(),
            }),
            Err(AgentError::Transport("connection reset".to_string())),
            Ok(ProviderChunk::TextDelta {
                text_delta: "never seen".to_string(),
            }),
        ]);

        let events: Vec<_> = adapt(chunks).collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], StreamEvent::TextFragment("partial".to_string()));
        assert!(matches!(&events[1], StreamEvent::Error(cause) if cause.contains("connection reset")));
    }

    #[tokio::test]
    async fn test_open_failed_is_single_error() {
        let events: Vec<_> = open_failed(&AgentError::Transport("503".to_string()))
            .collect()
            .await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), "error");
    }

    #[test]
    fn test_tool_result_update_flag() {
        let result = StreamEvent::ToolResult {
            name: "t".to_string(),
            result: json!(1),
        };
        assert!(!result.updates_immediately(false));
        assert!(result.updates_immediately(true));
        assert!(StreamEvent::Reasoning("r".to_string()).updates_immediately(false));
    }
}
