//! Integration tests: core Message → HandlerChain (CommandHandler, AgentHandler) → MockBot / ScriptedAgent.
//!
//! Covers command replies without agent calls, reminder arming through commands on tokio's paused clock,
//! the text-only notice, and the free-text path into the agent.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use handler_chain::HandlerChain;
use reminder::ReminderScheduler;
use stream_relay::{ReconcilerConfig, TelegramHtml};
use tracker_bot::{build_chain, build_scheduler, replies, COMMANDS};
use tracker_core::{Chat, HandlerResponse, Message, Platform, User};

use common::mock_agent::ScriptedAgent;
use common::mock_bot::{BotCall, MockBot};

const PERIOD: Duration = Duration::from_secs(60);

fn message(chat_id: i64, content: &str) -> Message {
    Message {
        id: "100".to_string(),
        user: User {
            id: 7,
            username: Some("jdoe".to_string()),
            first_name: Some("Jane".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: chat_id,
            platform: Platform::Telegram,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        created_at: Utc::now(),
    }
}

struct Harness {
    bot: Arc<MockBot>,
    agent: Arc<ScriptedAgent>,
    scheduler: Arc<ReminderScheduler>,
    chain: HandlerChain,
}

fn harness(agent: ScriptedAgent) -> Harness {
    let bot = Arc::new(MockBot::new());
    let agent = Arc::new(agent);
    let scheduler = build_scheduler(bot.clone(), Platform::Telegram, PERIOD);
    let chain = build_chain(
        bot.clone(),
        agent.clone(),
        Arc::new(TelegramHtml),
        scheduler.clone(),
        ReconcilerConfig::default(),
    );
    Harness {
        bot,
        agent,
        scheduler,
        chain,
    }
}

/// **Test: /help replies with every command and never reaches the agent.**
#[tokio::test]
async fn test_help_lists_commands_without_agent() {
    let h = harness(ScriptedAgent::default());

    let response = h.chain.handle(&message(42, "/help")).await.unwrap();

    let help = replies(Platform::Telegram).help;
    assert_eq!(response, HandlerResponse::Reply(help.to_string()));
    let calls = h.bot.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], BotCall::Reply { reply_to, .. } if reply_to == "100"));
    for (command, _) in COMMANDS {
        assert!(calls[0].text().contains(&format!("/{}", command)));
    }
    assert!(h.agent.turns().is_empty());
}

/// **Test: /start@botname is recognized as /start.**
#[tokio::test]
async fn test_start_with_bot_suffix() {
    let h = harness(ScriptedAgent::default());

    let response = h.chain.handle(&message(42, "/Start@SymptomBot")).await.unwrap();

    assert_eq!(
        response,
        HandlerResponse::Reply(replies(Platform::Telegram).welcome.to_string())
    );
    assert!(h.agent.turns().is_empty());
    assert_eq!(h.scheduler.armed_count(), 0);
}

/// **Test: /reminder_on twice keeps one timer; exactly one check-in per period.**
#[tokio::test(start_paused = true)]
async fn test_reminder_on_twice_fires_once_per_period() {
    let h = harness(ScriptedAgent::default());
    let msg = message(42, "/reminder_on");

    h.chain.handle(&msg).await.unwrap();
    h.chain.handle(&msg).await.unwrap();
    assert_eq!(h.scheduler.armed_count(), 1);

    tokio::time::sleep(PERIOD + Duration::from_secs(1)).await;
    assert_eq!(h.bot.sends_containing("Daily Symptom Check-in"), 1);

    tokio::time::sleep(PERIOD).await;
    assert_eq!(h.bot.sends_containing("Daily Symptom Check-in"), 2);

    let replies_sent = h
        .bot
        .calls()
        .iter()
        .filter(|c| matches!(c, BotCall::Reply { .. }))
        .count();
    assert_eq!(replies_sent, 2);
    assert!(h.agent.turns().is_empty());
}

/// **Test: /reminder_off disarms; a second /reminder_off reports nothing to disarm.**
#[tokio::test(start_paused = true)]
async fn test_reminder_off() {
    let h = harness(ScriptedAgent::default());
    let texts = replies(Platform::Telegram);

    let response = h.chain.handle(&message(42, "/reminder_off")).await.unwrap();
    assert_eq!(
        response,
        HandlerResponse::Reply(texts.no_active_reminders.to_string())
    );

    h.chain.handle(&message(42, "/reminder_on")).await.unwrap();
    let response = h.chain.handle(&message(42, "/reminder_off")).await.unwrap();
    assert_eq!(response, HandlerResponse::Reply(texts.reminder_off.to_string()));
    assert_eq!(h.scheduler.armed_count(), 0);

    tokio::time::sleep(PERIOD * 2).await;
    assert_eq!(h.bot.sends_containing("Daily Symptom Check-in"), 0);
}

/// **Test: a message without text gets the text-only notice and stops the chain.**
#[tokio::test]
async fn test_empty_text_gets_notice() {
    let h = harness(ScriptedAgent::default());

    let response = h.chain.handle(&message(42, "   ")).await.unwrap();

    assert_eq!(response, HandlerResponse::Stop);
    assert_eq!(
        h.bot.calls(),
        vec![BotCall::Send {
            chat_id: 42,
            text: replies(Platform::Telegram).text_only.to_string(),
        }]
    );
    assert!(h.agent.turns().is_empty());
}

/// **Test: free text and unknown commands go to the agent with chat/user scoped ids.**
#[tokio::test]
async fn test_free_text_reaches_agent() {
    let h = harness(ScriptedAgent::default());

    h.chain.handle(&message(42, "My head hurts")).await.unwrap();
    h.chain.handle(&message(42, "/unknown")).await.unwrap();

    let turns = h.agent.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].0, "My head hurts");
    assert_eq!(turns[0].1.thread_id, "telegram-42");
    assert_eq!(turns[0].1.resource_id, "telegram-7");
    assert_eq!(turns[0].1.context.username.as_deref(), Some("jdoe"));
    assert_eq!(turns[1].0, "/unknown");
}
