//! # Stream relay
//!
//! Relays one agent turn into chat messages:
//!
//! 1. [`event::adapt`] turns provider chunks into [`StreamEvent`]s (unknown kinds dropped, errors terminal).
//! 2. A platform [`Renderer`] turns each event into a markup segment.
//! 3. The [`Reconciler`] edits a placeholder message as segments arrive (throttled) and flushes the full
//!    transcript at the end, split over as many messages as the platform limit requires without breaking
//!    the platform's markup ([`split`]).

pub mod buffer;
pub mod event;
pub mod reconciler;
pub mod render;
pub mod split;

pub use buffer::RenderBuffer;
pub use event::{adapt, open_failed, EventStream, StreamEvent};
pub use reconciler::{
    message_budget, run_turn, OutboundMessage, Phase, Reconciler, ReconcilerConfig, TurnReport,
};
pub use render::{
    escape_html, format_tool_result, DiscordMarkdown, Renderer, TelegramHtml, ERROR_NOTICE,
    TRUNCATION_MARKER,
};
pub use split::{split_chunks, LengthUnit, Markup, TextFormat};
