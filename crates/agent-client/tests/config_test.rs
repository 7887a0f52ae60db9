//! Tests for [`agent_client::EnvAgentConfig::from_env`].

use agent_client::{AgentConfig, EnvAgentConfig};
use serial_test::serial;
use std::env;

fn clear_agent_env() {
    for key in [
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "AGENT_MODEL",
        "AGENT_HISTORY_LIMIT",
        "AGENT_MAX_STEPS",
        "EMBEDDING_MODEL",
        "AGENT_RECALL_TOP_K",
        "AGENT_RECALL_RANGE",
    ] {
        env::remove_var(key);
    }
}

/// **Test: Missing OPENAI_API_KEY is a startup error.**
#[test]
#[serial]
fn test_missing_api_key_fails() {
    clear_agent_env();
    assert!(EnvAgentConfig::from_env().is_err());
}

/// **Test: Defaults apply when only the key is set.**
#[test]
#[serial]
fn test_defaults() {
    clear_agent_env();
    env::set_var("OPENAI_API_KEY", "sk-test");

    let config = EnvAgentConfig::from_env().unwrap();
    assert_eq!(config.model(), "gpt-4o");
    assert_eq!(config.base_url(), "https://api.openai.com/v1");
    assert_eq!(config.history_limit(), 10);
    assert_eq!(config.max_steps(), 5);
    assert_eq!(config.embedding_model(), "text-embedding-3-small");
    assert_eq!(config.recall_top_k(), 5);
    assert_eq!(config.recall_message_range(), 2);

    clear_agent_env();
}

/// **Test: Overrides are read; invalid numbers fall back to defaults.**
#[test]
#[serial]
fn test_overrides() {
    clear_agent_env();
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("AGENT_MODEL", "gpt-4o-mini");
    env::set_var("AGENT_HISTORY_LIMIT", "4");
    env::set_var("AGENT_MAX_STEPS", "zero");

    let config = EnvAgentConfig::from_env().unwrap();
    assert_eq!(config.model(), "gpt-4o-mini");
    assert_eq!(config.history_limit(), 4);
    assert_eq!(config.max_steps(), 5);

    clear_agent_env();
}

/// **Test: Recall settings are read; 0 turns recall off.**
#[test]
#[serial]
fn test_recall_overrides() {
    clear_agent_env();
    env::set_var("OPENAI_API_KEY", "sk-test");
    env::set_var("EMBEDDING_MODEL", "text-embedding-3-large");
    env::set_var("AGENT_RECALL_TOP_K", "0");
    env::set_var("AGENT_RECALL_RANGE", "1");

    let config = EnvAgentConfig::from_env().unwrap();
    assert_eq!(config.embedding_model(), "text-embedding-3-large");
    assert_eq!(config.recall_top_k(), 0);
    assert_eq!(config.recall_message_range(), 1);

    clear_agent_env();
}
