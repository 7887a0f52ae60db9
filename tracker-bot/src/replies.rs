//! Fixed reply texts, per platform markup (Telegram HTML, Discord Markdown).

use std::sync::Arc;

use reminder::CheckInTemplate;
use tracker_core::Platform;

/// Command menu registered with Telegram: (command, description).
pub const COMMANDS: &[(&str, &str)] = &[
    ("start", "Start the symptom tracker and set up reminders"),
    ("reminder_on", "Turn on symptom check-in reminders"),
    ("reminder_off", "Turn off symptom check-in reminders"),
    ("help", "Show available commands"),
];

/// Canned texts for one platform.
#[derive(Debug)]
pub struct Replies {
    pub welcome: &'static str,
    pub reminder_on: &'static str,
    pub reminder_off: &'static str,
    pub no_active_reminders: &'static str,
    pub help: &'static str,
    pub text_only: &'static str,
    pub failure: &'static str,
}

static TELEGRAM: Replies = Replies {
    welcome: "👋 <b>Welcome to your Symptom Tracker Assistant!</b>\n\n\
        I'm here to help you track your symptoms for chronic conditions and prepare detailed reports for your doctor visits.\n\n\
        ✅ I can check in with you daily to record your symptoms\n\
        ✅ Track patterns and changes over time\n\
        ✅ Generate comprehensive medical reports when needed\n\n\
        Let's get started! How are you feeling today?\n\n\
        Use /reminder_on to activate daily check-in reminders.",
    reminder_on: "✅ <b>Daily Check-in Reminders Activated</b>\n\n\
        I'll send you a symptom check-in reminder once every 24 hours to help maintain consistent tracking.\n\n\
        Consistent tracking helps identify patterns that might otherwise be missed!",
    reminder_off: "❌ <b>Daily Check-in Reminders Deactivated</b>\n\n\
        I've turned off your daily symptom check-in reminders. You can turn them back on anytime with /reminder_on",
    no_active_reminders:
        "You don't currently have any active reminders. Use /reminder_on to activate daily check-ins.",
    help: "🔍 <b>Available Commands:</b>\n\n\
        • <code>/start</code> - Initialize the symptom tracker\n\
        • <code>/reminder_on</code> - Activate daily check-in reminders\n\
        • <code>/reminder_off</code> - Deactivate daily reminders\n\
        • <code>/help</code> - Display this help message\n\n\
        <b>How to use:</b>\n\
        • Simply tell me how you're feeling each day\n\
        • Request a 'doctor report' when you need a summary\n\
        • The more consistent you are, the better patterns I can identify",
    text_only: "Sorry, I can only process text messages.",
    failure: "Sorry, I encountered an error processing your message. Please try again.",
};

static DISCORD: Replies = Replies {
    welcome: "👋 **Welcome to Symptom Tracker!**\nUse `/reminder_on` to start daily check-ins.",
    reminder_on: "✅ Daily reminders activated!",
    reminder_off: "❌ Daily reminders deactivated!",
    no_active_reminders: "No active reminders. Use `/reminder_on` to start.",
    help: "**Commands:**\n\
        `/start` – Welcome message\n\
        `/reminder_on` – Turn on daily check-in\n\
        `/reminder_off` – Turn off daily check-in\n\
        `/help` – Show this message\n\
        Otherwise, just tell me how you feel today!",
    text_only: "Sorry, I can only process text messages.",
    failure: "❌ Sorry, something went wrong.",
};

pub fn replies(platform: Platform) -> &'static Replies {
    match platform {
        Platform::Telegram => &TELEGRAM,
        Platform::Discord => &DISCORD,
    }
}

/// Daily check-in text for `platform`, given the formatted date.
pub fn check_in(platform: Platform, date: &str) -> String {
    match platform {
        Platform::Telegram => format!(
            "📋 <b>Daily Symptom Check-in</b> | {}\n\n\
             Hi there! It's time for your daily symptom tracking. How are you feeling today? Any changes from yesterday?",
            date
        ),
        Platform::Discord => format!(
            "📋 **Daily Symptom Check-in | {}**\nHow are you feeling today?",
            date
        ),
    }
}

/// [`check_in`] as a scheduler template.
pub fn check_in_template(platform: Platform) -> CheckInTemplate {
    Arc::new(move |date: &str| check_in(platform, date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_command() {
        for platform in [Platform::Telegram, Platform::Discord] {
            let help = replies(platform).help;
            for (command, _) in COMMANDS {
                assert!(
                    help.contains(&format!("/{}", command)),
                    "{:?} help is missing /{}",
                    platform,
                    command
                );
            }
        }
    }

    #[test]
    fn test_check_in_markup() {
        let telegram = check_in(Platform::Telegram, "Friday, October 16");
        assert!(telegram.starts_with("📋 <b>Daily Symptom Check-in</b> | Friday, October 16"));

        let discord = check_in_template(Platform::Discord)("Friday, October 16");
        assert_eq!(
            discord,
            "📋 **Daily Symptom Check-in | Friday, October 16**\nHow are you feeling today?"
        );
    }
}
