//! Scripted [`agent_client::Agent`]: each turn plays the next script and records what it was asked.

use std::collections::VecDeque;
use std::sync::Mutex;

use agent_client::{Agent, AgentError, ChunkStream, ProviderChunk, TurnOptions};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};

pub enum Script {
    Chunks(Vec<Result<ProviderChunk, AgentError>>),
    OpenFails(String),
}

pub fn text(s: &str) -> Result<ProviderChunk, AgentError> {
    Ok(ProviderChunk::TextDelta {
        text_delta: s.to_string(),
    })
}

pub fn error_chunk(s: &str) -> Result<ProviderChunk, AgentError> {
    Ok(ProviderChunk::Error {
        error: s.to_string(),
    })
}

pub fn finish() -> Result<ProviderChunk, AgentError> {
    Ok(ProviderChunk::Finish {
        finish_reason: "stop".to_string(),
    })
}

#[derive(Default)]
pub struct ScriptedAgent {
    scripts: Mutex<VecDeque<Script>>,
    turns: Mutex<Vec<(String, TurnOptions)>>,
}

impl ScriptedAgent {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            turns: Mutex::new(Vec::new()),
        }
    }

    /// Inputs and options of every opened turn, in order.
    pub fn turns(&self) -> Vec<(String, TurnOptions)> {
        self.turns.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn open_turn(&self, input: &str, options: TurnOptions) -> Result<ChunkStream, AgentError> {
        self.turns.lock().unwrap().push((input.to_string(), options));
        match self.scripts.lock().unwrap().pop_front() {
            Some(Script::Chunks(chunks)) => Ok(stream::iter(chunks).boxed()),
            Some(Script::OpenFails(reason)) => Err(AgentError::Transport(reason)),
            None => Ok(stream::iter(vec![finish()]).boxed()),
        }
    }
}
