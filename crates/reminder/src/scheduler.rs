//! Reminder scheduler: one tokio interval task per chat, tracked in a [`DashMap`].

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracker_core::{Bot, Chat, ChatKey};

pub const DEFAULT_REMINDER_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Builds the check-in text from the formatted local date (see [`check_in_date`]).
pub type CheckInTemplate = Arc<dyn Fn(&str) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmOutcome {
    Armed,
    /// A timer was already running for the chat; it was replaced.
    Rearmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisarmOutcome {
    Disarmed,
    NothingToDisarm,
}

/// Local date as shown in check-ins, e.g. `Friday, October 16`.
pub fn check_in_date() -> String {
    chrono::Local::now().format("%A, %B %-d").to_string()
}

/// Per-chat check-in timers. Shared as `Arc<ReminderScheduler>`; dropping it stops every timer.
pub struct ReminderScheduler {
    bot: Arc<dyn Bot>,
    period: Duration,
    template: CheckInTemplate,
    timers: DashMap<ChatKey, JoinHandle<()>>,
}

impl ReminderScheduler {
    /// A zero period falls back to [`DEFAULT_REMINDER_PERIOD`].
    pub fn new(bot: Arc<dyn Bot>, period: Duration, template: CheckInTemplate) -> Self {
        let period = if period.is_zero() {
            warn!("Reminder period of zero replaced with the default");
            DEFAULT_REMINDER_PERIOD
        } else {
            period
        };
        Self {
            bot,
            period,
            template,
            timers: DashMap::new(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts the chat's timer; the first check-in is one period from now. Must run inside a tokio runtime.
    ///
    /// An existing timer is aborted by the same map operation that installs the new one.
    pub fn arm(&self, chat: &Chat) -> ArmOutcome {
        let key = chat.key();
        let handle = tokio::spawn(run_timer(
            self.bot.clone(),
            chat.clone(),
            Instant::now() + self.period,
            self.period,
            self.template.clone(),
        ));

        match self.timers.insert(key, handle) {
            Some(previous) => {
                previous.abort();
                info!(chat = %key, period_secs = self.period.as_secs(), "step: reminder rearmed");
                ArmOutcome::Rearmed
            }
            None => {
                info!(chat = %key, period_secs = self.period.as_secs(), "step: reminder armed");
                ArmOutcome::Armed
            }
        }
    }

    pub fn disarm(&self, key: &ChatKey) -> DisarmOutcome {
        match self.timers.remove(key) {
            Some((_, handle)) => {
                handle.abort();
                info!(chat = %key, "step: reminder disarmed");
                DisarmOutcome::Disarmed
            }
            None => DisarmOutcome::NothingToDisarm,
        }
    }

    pub fn is_armed(&self, key: &ChatKey) -> bool {
        self.timers
            .get(key)
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        for entry in self.timers.iter() {
            entry.value().abort();
        }
    }
}

async fn run_timer(
    bot: Arc<dyn Bot>,
    chat: Chat,
    first_tick: Instant,
    period: Duration,
    template: CheckInTemplate,
) {
    let mut ticker = interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let text = template(&check_in_date());
        match bot.send_message(&chat, &text).await {
            Ok(()) => info!(chat = %chat.key(), "step: check-in reminder sent"),
            Err(e) => warn!(chat = %chat.key(), error = %e, "Failed to send check-in reminder"),
        }
    }
}
