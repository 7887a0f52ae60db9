//! # Reminder
//!
//! Daily check-in reminders. One timer per chat; arming again replaces the running timer.

mod scheduler;

pub use scheduler::{
    check_in_date, ArmOutcome, CheckInTemplate, DisarmOutcome, ReminderScheduler,
    DEFAULT_REMINDER_PERIOD,
};
