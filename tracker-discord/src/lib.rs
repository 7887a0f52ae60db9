//! # tracker-discord
//!
//! Discord transport: serenity → core type adapters, a [`tracker_core::Bot`] implementation over the Discord
//! HTTP API, config, and the gateway runner that feeds every user message to the handler chain.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{DiscordMessageWrapper, DiscordUserWrapper};
pub use bot_adapter::DiscordBotAdapter;
pub use config::DiscordConfig;
pub use runner::{gateway_intents, run_gateway};
