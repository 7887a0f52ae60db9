#![allow(dead_code)]

pub mod mock_agent;
pub mod mock_bot;
