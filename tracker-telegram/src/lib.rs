//! # tracker-telegram
//!
//! Telegram transport: teloxide → core type adapters, a [`tracker_core::Bot`] implementation speaking HTML
//! parse mode, minimal config, and the REPL runner that feeds every message to the handler chain.
//! No agent or reminder logic lives here.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::{
    html_to_plain_text, is_message_not_modified_error, is_parse_entities_error,
    TelegramBotAdapter,
};
pub use config::TelegramConfig;
pub use runner::{register_commands, run_repl};
