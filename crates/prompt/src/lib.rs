//! # Prompt
//!
//! Prompt text and message assembly for the symptom tracker agent.
//!
//! ## Format
//!
//! One agent turn is sent to the model as:
//!
//! - **System**: agent instructions, followed by the `Working memory:` section (the stored patient profile,
//!   or the empty [`WORKING_MEMORY_TEMPLATE`] when nothing is stored yet)
//! - **System**: per-turn context (`Current user`, `Current date`, `Current time`)
//! - **System**: earlier messages recalled by similarity to the question, when any were found
//!   ([`format_recall_message`])
//! - **History**: the last messages of the thread, in order
//! - **User**: the current message
//!
//! ## External interactions
//!
//! - **AI models**: Output is sent to the OpenAI Chat Completions API by `agent-client`.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values used in history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Section title introducing the stored patient profile in the system prompt.
pub const SECTION_WORKING_MEMORY: &str = "Working memory:";

/// Agent instructions for the symptom tracker.
pub const SYMPTOM_TRACKER_INSTRUCTIONS: &str = "\
You are a medical symptom tracking assistant who helps users track their symptoms for chronic conditions.
You conduct daily check-ins, record symptoms in detail, and help prepare reports for doctor visits.

SYMPTOM TRACKING:
- Ask about the user's symptoms daily in a conversational way
- Record detailed information about symptom intensity, duration, triggers, and patterns
- Use the exact date provided in the system message for tracking (format: YYYY-MM-DD)
- Follow up on previously reported symptoms to track changes
- Update the working memory with all symptom information, always including the current date

CONVERSATION APPROACH:
- Keep a warm, natural conversation, like talking with a caring medical assistant
- Ask one thoughtful question at a time, followed by relevant insights
- Never use numbered or bulleted lists of questions

MEDICAL REPORTING:
- When asked for a \"doctor report\" or \"medical summary\", call the generate_medical_report tool
- You may suggest treatments or preventative strategies to discuss with their doctor
- Always emphasize that you are not replacing medical advice, just helping prepare for doctor visits

WORKING MEMORY:
1. Call update_working_memory with the complete updated profile whenever you learn something new
2. Only keep the last 30 days of symptom history
3. Start each new symptom entry with the exact date from the system message, as [YYYY-MM-DD]
4. Always record the time of day when symptoms occur
5. Never mention the working memory to the user; just use the information naturally

REMEMBER:
- Keep responses concise and focused
- You are NOT providing medical advice, just tracking symptoms
- Always maintain a warm, empathetic tone";

/// Empty patient profile used until the agent stores one.
pub const WORKING_MEMORY_TEMPLATE: &str = "\
# Patient Health Profile

## Personal Information
- Name:
- Age:
- Diagnosed Conditions:
- Primary Physician:
- Next Appointment:

## Current Medication
- Medication:
- Dosage:
- Frequency:
- Observed Effects:
- Side Effects:

## Symptom Tracking (Last 30 Days)
<!-- Organize by date, most recent first. Format: [YYYY-MM-DD] -->

[DATE]:
- Symptom:
- Severity (1-10):
- Duration:
- Triggers/Factors:
- Notes:

## Patterns & Observations
- Recurring Symptoms:
- Time Patterns:
- Environmental Triggers:
- Stress Correlation:
- Sleep Impact:

## Patient Preferences
- Communication Style:
- Areas of Concern:
- Goals:
";

/// Builds the system prompt: instructions, then the working memory section.
///
/// `working_memory` is the stored profile for the user; `None` or blank falls back to [`WORKING_MEMORY_TEMPLATE`].
pub fn format_system_prompt(instructions: &str, working_memory: Option<&str>) -> String {
    let memory = working_memory
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(WORKING_MEMORY_TEMPLATE);
    format!(
        "{}\n\n{}\n{}",
        instructions.trim_end(),
        SECTION_WORKING_MEMORY,
        memory.trim_end()
    )
}

/// Per-turn context block: who is talking and the current local date/time.
///
/// `date` is `YYYY-MM-DD`, `time` is `HH:MM:SS`. Username is shown in parentheses when known.
pub fn format_context_message(
    display_name: &str,
    username: Option<&str>,
    date: &str,
    time: &str,
) -> String {
    let user = match username {
        Some(u) if !u.is_empty() => format!("{} ({})", display_name, u),
        _ => display_name.to_string(),
    };
    format!(
        "Current user: {}\nCurrent date: {}\nCurrent time: {}",
        user, date, time
    )
}

/// Section title introducing recalled messages.
pub const SECTION_RECALLED: &str = "Relevant messages from earlier in this conversation:";

/// Recalled messages as one block, one `Role: content` line each, oldest first. `None` when nothing was recalled.
pub fn format_recall_message(recalled: &[ChatMessage]) -> Option<String> {
    if recalled.is_empty() {
        return None;
    }
    let lines: Vec<String> = recalled
        .iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::System => "System",
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
            };
            format!("{}: {}", role, m.content)
        })
        .collect();
    Some(format!("{}\n{}", SECTION_RECALLED, lines.join("\n")))
}

/// Assembles the message list for one turn: system prompt → context → recalled → history → current question.
pub fn format_turn_messages(
    system_prompt: &str,
    context: &str,
    recalled: &[ChatMessage],
    history: &[ChatMessage],
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 4);
    messages.push(ChatMessage::system(system_prompt));
    if !context.is_empty() {
        messages.push(ChatMessage::system(context));
    }
    if let Some(block) = format_recall_message(recalled) {
        messages.push(ChatMessage::system(block));
    }
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(question));
    messages
}
