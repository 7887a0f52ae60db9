//! # tracker-bot
//!
//! The symptom tracker application: command handling, agent turns relayed into chat messages, and daily
//! check-in reminders, served over Telegram and (optionally) Discord.
//!
//! Each inbound message runs through a [`handler_chain::HandlerChain`]: [`CommandHandler`] answers
//! `/start`, `/reminder_on`, `/reminder_off` and `/help`; everything else reaches [`AgentHandler`].

pub mod agent_handler;
pub mod cli;
pub mod commands;
pub mod config;
pub mod replies;
pub mod runner;

pub use agent_handler::{turn_options, AgentHandler};
pub use cli::{Cli, Commands};
pub use commands::{Command, CommandHandler};
pub use config::BotConfig;
pub use replies::{check_in, check_in_template, replies, Replies, COMMANDS};
pub use runner::{build_chain, build_scheduler, run_alongside, run_bot};
