//! Platform renderers: turn a [`StreamEvent`] into a text segment in the platform's markup.

use serde_json::Value;
use tracker_core::TrackerError;
use tracing::warn;

use crate::event::StreamEvent;
use crate::split::{LengthUnit, Markup, TextFormat};

/// Appended to every chunk but the last when a reply spans several messages.
pub const TRUNCATION_MARKER: &str = "\n\n... [continued]";

/// Tool results longer than this (in characters) are cut and suffixed with `... [truncated]`.
pub const MAX_RESULT_LENGTH: usize = 500;

/// What the user sees for an error segment; the cause goes to the logs.
pub const ERROR_NOTICE: &str = "Something went wrong while preparing this reply. Please try again.";

pub const TELEGRAM_MAX_MESSAGE_LEN: usize = 4096;
pub const DISCORD_MAX_MESSAGE_LEN: usize = 2000;

/// Renders events for one chat platform.
pub trait Renderer: Send + Sync {
    /// Platform limit for one message, in [`Renderer::text_format`] units.
    fn max_message_len(&self) -> usize;

    /// How the platform counts length and which markup splits must keep intact. Plain characters by default.
    fn text_format(&self) -> TextFormat {
        TextFormat::default()
    }

    fn render(&self, event: &StreamEvent) -> String;
}

/// Telegram HTML parse mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelegramHtml;

/// Discord Markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscordMarkdown;

/// Escapes `& < > "` for Telegram HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Cuts `text` to `max_chars` characters, marking the cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}... [truncated]", &text[..idx]),
        None => text.to_string(),
    }
}

/// Pretty-printed JSON, truncated to [`MAX_RESULT_LENGTH`].
pub fn format_tool_result(result: &Value) -> Result<String, TrackerError> {
    let json = serde_json::to_string_pretty(result).map_err(|e| TrackerError::Format(e.to_string()))?;
    Ok(truncate_chars(&json, MAX_RESULT_LENGTH))
}

/// [`format_tool_result`], falling back to a placeholder naming the value kind.
fn tool_result_or_placeholder(result: &Value) -> String {
    format_tool_result(result).unwrap_or_else(|e| {
        warn!(error = %e, "Tool result could not be formatted");
        format!("[Complex data structure - {}]", value_kind(result))
    })
}

impl Renderer for TelegramHtml {
    fn max_message_len(&self) -> usize {
        TELEGRAM_MAX_MESSAGE_LEN
    }

    /// Telegram counts message length in UTF-16 code units.
    fn text_format(&self) -> TextFormat {
        TextFormat::new(LengthUnit::Utf16, Markup::Html)
    }

    fn render(&self, event: &StreamEvent) -> String {
        match event {
            StreamEvent::TextFragment(text) => escape_html(text),
            StreamEvent::ToolCall { name, .. } => {
                format!("\n🛠️ <b>Using tool:</b> {}\n", escape_html(name))
            }
            StreamEvent::ToolResult { result, .. } => format!(
                "✨ <b>Result:</b>\n<pre>{}</pre>\n",
                escape_html(&tool_result_or_placeholder(result))
            ),
            StreamEvent::Reasoning(text) => format!("\n💭 {}\n", escape_html(text)),
            StreamEvent::Error(_) => format!("\n❌ <b>Error:</b> {}\n", ERROR_NOTICE),
        }
    }
}

impl Renderer for DiscordMarkdown {
    fn max_message_len(&self) -> usize {
        DISCORD_MAX_MESSAGE_LEN
    }

    fn text_format(&self) -> TextFormat {
        TextFormat::new(LengthUnit::Chars, Markup::Markdown)
    }

    fn render(&self, event: &StreamEvent) -> String {
        match event {
            StreamEvent::TextFragment(text) => text.clone(),
            StreamEvent::ToolCall { name, .. } => format!("\n🛠️ **Using tool:** {}\n", name),
            StreamEvent::ToolResult { result, .. } => format!(
                "✨ **Result:**\n```json\n{}\n```\n",
                tool_result_or_placeholder(result)
            ),
            StreamEvent::Reasoning(text) => format!("\n💭 {}\n", text),
            StreamEvent::Error(_) => format!("\n❌ **Error:** {}\n", ERROR_NOTICE),
        }
    }
}
