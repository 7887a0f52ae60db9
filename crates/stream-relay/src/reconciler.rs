//! Message reconciler: keeps the chat in step with a turn's transcript.
//!
//! A placeholder is sent first; rendered events are appended to a [`RenderBuffer`] and the placeholder is edited
//! in place no more often than the throttle allows. [`Reconciler::finish`] always flushes the whole transcript,
//! splitting it over several messages when it exceeds the platform budget.
//!
//! Phases: `Idle` (placeholder sent) → `Streaming` (first event) → `Finalizing` (final flush).

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use tracker_core::{Bot, Chat, Result, TrackerError};

use crate::buffer::RenderBuffer;
use crate::event::StreamEvent;
use crate::render::{Renderer, TRUNCATION_MARKER};
use crate::split::{split_chunks, TextFormat};

pub const DEFAULT_PLACEHOLDER: &str = "Thinking...";
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(500);
/// Sent in place of an empty transcript.
pub const DEFAULT_EMPTY_NOTICE: &str =
    "Sorry, I couldn't come up with a response. Please try again.";

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    pub placeholder: String,
    /// Minimum gap between in-progress edits.
    pub throttle: Duration,
    /// Edit as soon as a tool result arrives (otherwise it waits for the next edit).
    pub show_tool_results: bool,
    pub empty_notice: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            throttle: DEFAULT_THROTTLE,
            show_tool_results: false,
            empty_notice: DEFAULT_EMPTY_NOTICE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Streaming,
    Finalizing,
}

/// A platform message the reconciler writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub message_id: String,
    /// Length of the chunk shown, in the platform's unit (marker excluded). Never above the budget.
    pub len: usize,
    pub last_edit: Instant,
}

/// Outcome of a finished turn.
#[derive(Debug, Clone)]
pub struct TurnReport {
    /// Concatenation of every rendered segment, in order.
    pub transcript: String,
    /// Messages holding the final content, in order.
    pub messages: Vec<OutboundMessage>,
    pub sends: usize,
    pub edits: usize,
    /// In-progress edits skipped because the transcript had outgrown one message.
    pub deferred_edits: usize,
}

/// Budget for one message: platform maximum minus the truncation marker. The marker is ASCII, so its length
/// is the same in every unit.
pub fn message_budget(max_message_len: usize) -> usize {
    max_message_len
        .saturating_sub(TRUNCATION_MARKER.len())
        .max(1)
}

fn as_transport(e: TrackerError) -> TrackerError {
    match e {
        TrackerError::Transport(_) => e,
        other => TrackerError::Transport(other.to_string()),
    }
}

/// Drives one turn's outbound messages. Owned by the task handling the turn, so edits are ordered.
pub struct Reconciler {
    bot: Arc<dyn Bot>,
    renderer: Arc<dyn Renderer>,
    chat: Chat,
    config: ReconcilerConfig,
    phase: Phase,
    buffer: RenderBuffer,
    format: TextFormat,
    budget: usize,
    current: OutboundMessage,
    sends: usize,
    edits: usize,
    deferred_edits: usize,
}

impl Reconciler {
    /// Sends the placeholder and enters `Idle`. A failed send ends the turn with `TrackerError::Transport`.
    #[instrument(skip(bot, renderer, chat, config), fields(chat = %chat.key()))]
    pub async fn begin(
        bot: Arc<dyn Bot>,
        renderer: Arc<dyn Renderer>,
        chat: Chat,
        config: ReconcilerConfig,
    ) -> Result<Self> {
        let message_id = bot
            .send_message_and_return_id(&chat, &config.placeholder)
            .await
            .map_err(as_transport)?;
        info!(message_id = %message_id, "step: placeholder sent");

        let format = renderer.text_format();
        let budget = message_budget(renderer.max_message_len());
        let current = OutboundMessage {
            message_id,
            len: format.measure(&config.placeholder),
            last_edit: Instant::now(),
        };
        Ok(Self {
            bot,
            renderer,
            chat,
            config,
            phase: Phase::Idle,
            buffer: RenderBuffer::new(format.unit),
            format,
            budget,
            current,
            sends: 1,
            edits: 0,
            deferred_edits: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn transcript(&self) -> &str {
        self.buffer.as_str()
    }

    /// Renders and appends one event, then edits the current message if the event and throttle allow.
    pub async fn on_event(&mut self, event: &StreamEvent) -> Result<()> {
        if self.phase == Phase::Finalizing {
            warn!(kind = event.kind(), "Event after finish ignored");
            return Ok(());
        }
        if let StreamEvent::Error(cause) = event {
            warn!(chat = %self.chat.key(), cause = %cause, "step: agent reported an error");
        }

        let segment = self.renderer.render(event);
        self.buffer.push(&segment);
        self.phase = Phase::Streaming;

        if !event.updates_immediately(self.config.show_tool_results) {
            return Ok(());
        }
        if self.current.last_edit.elapsed() < self.config.throttle {
            return Ok(());
        }
        if self.buffer.measured_len() > self.budget {
            self.deferred_edits += 1;
            debug!(
                len = self.buffer.measured_len(),
                budget = self.budget,
                "Transcript over budget, edit deferred to final flush"
            );
            return Ok(());
        }

        let text = self.buffer.as_str().to_string();
        let len = self.buffer.measured_len();
        self.write_current(&text, len).await
    }

    /// Consumes all events, then finishes.
    pub async fn run<S>(mut self, mut events: S) -> Result<TurnReport>
    where
        S: Stream<Item = StreamEvent> + Unpin,
    {
        while let Some(event) = events.next().await {
            self.on_event(&event).await?;
        }
        self.finish().await
    }

    /// Final flush: chunk 0 is edited into the current message, later chunks are sent as new messages.
    ///
    /// Runs once; later events and a second call are rejected.
    #[instrument(skip(self), fields(chat = %self.chat.key()))]
    pub async fn finish(&mut self) -> Result<TurnReport> {
        if self.phase == Phase::Finalizing {
            return Err(TrackerError::Stream("turn already finished".to_string()));
        }
        self.phase = Phase::Finalizing;

        let content = if self.buffer.is_blank() {
            info!("step: empty transcript, sending fallback notice");
            self.config.empty_notice.clone()
        } else {
            self.buffer.as_str().to_string()
        };
        let chunks = split_chunks(&content, self.budget, self.format);
        let last = chunks.len().saturating_sub(1);

        let mut messages = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let len = self.format.measure(chunk);
            let text = if i < last {
                format!("{}{}", chunk, TRUNCATION_MARKER)
            } else {
                chunk.clone()
            };
            if i == 0 {
                self.write_current(&text, len).await?;
            } else {
                self.send_new(&text, len).await?;
            }
            messages.push(self.current.clone());
        }

        info!(
            transcript_len = self.buffer.measured_len(),
            segments = self.buffer.segments(),
            messages = messages.len(),
            sends = self.sends,
            edits = self.edits,
            deferred_edits = self.deferred_edits,
            "step: turn flushed"
        );

        Ok(TurnReport {
            transcript: self.buffer.as_str().to_string(),
            messages,
            sends: self.sends,
            edits: self.edits,
            deferred_edits: self.deferred_edits,
        })
    }

    /// Edits the current message; on failure sends `text` as a new message that becomes current.
    async fn write_current(&mut self, text: &str, len: usize) -> Result<()> {
        match self
            .bot
            .edit_message(&self.chat, &self.current.message_id, text)
            .await
        {
            Ok(()) => {
                self.edits += 1;
                self.current.len = len;
                self.current.last_edit = Instant::now();
                Ok(())
            }
            Err(e) => {
                warn!(
                    error = %e,
                    message_id = %self.current.message_id,
                    "Edit failed, sending as a new message"
                );
                self.send_new(text, len).await
            }
        }
    }

    async fn send_new(&mut self, text: &str, len: usize) -> Result<()> {
        let message_id = self
            .bot
            .send_message_and_return_id(&self.chat, text)
            .await
            .map_err(as_transport)?;
        self.sends += 1;
        self.current = OutboundMessage {
            message_id,
            len,
            last_edit: Instant::now(),
        };
        Ok(())
    }
}

/// Sends the placeholder, relays every event, and flushes.
pub async fn run_turn<S>(
    bot: Arc<dyn Bot>,
    renderer: Arc<dyn Renderer>,
    chat: &Chat,
    config: ReconcilerConfig,
    events: S,
) -> Result<TurnReport>
where
    S: Stream<Item = StreamEvent> + Unpin,
{
    Reconciler::begin(bot, renderer, chat.clone(), config)
        .await?
        .run(events)
        .await
}
