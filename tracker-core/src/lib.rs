//! # tracker-core
//!
//! Core types and traits for the symptom tracker bot: [`Bot`], [`Handler`], message, chat and user types,
//! the error taxonomy and tracing initialization. Platform-agnostic; used by tracker-telegram, tracker-discord,
//! handler-chain, stream-relay and reminder.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{parse_message_id, Bot};
pub use error::{Result, TrackerError};
pub use logger::init_tracing;
pub use types::{
    Chat, ChatKey, Handler, HandlerResponse, Message, Platform, ToCoreMessage, ToCoreUser, User,
};
