use chrono::{DateTime, Local};
use rand::seq::SliceRandom;

use crate::ai_provider::AiTransport;
use crate::directive::{parse_reply, ActionDirective};
use crate::message::{Feedback, Message, Sender};
use crate::mood::{Mood, MoodLog};
use crate::quote::daily_quote;
use crate::sanitize::sanitize_input;
use crate::store::{KvStore, CHECKIN_KEY};
use crate::streak::{StreakRecord, StreakTracker, StreakUpdate};

/// Fixed user-facing text substituted for a failed AI call.
pub const CONNECTION_ERROR_TEXT: &str =
    "I'm having trouble connecting right now. Please try again in a moment.";

const FIRST_VISIT_TEXT: &str = "Hey, I'm Aura. It's nice to meet you. This is a quiet, \
    private space just for you, where you can share anything at all without judgment. \
    I'm here to listen whenever you're ready. To start, how are you feeling right now?";

const CHECKIN_PROMPTS: [&str; 6] = [
    "How are you feeling today?",
    "How has your day been treating you so far?",
    "What's the emotional weather like for you right now?",
    "How are you, really? It's okay to not be okay.",
    "What's on your mind at this moment?",
    "Just gently checking in. How are things on your end?",
];

const WELCOME_BACK_PROMPTS: [&str; 3] = [
    "Welcome back! It's good to see you again. I'm here if you'd like to talk.",
    "Hey, glad you're back. Remember this is a safe space to share whatever is on your mind.",
    "Hi again. I'm here to listen if anything has come up for you.",
];

/// Result of one send: what was appended, and which directives to dispatch.
///
/// Directives are emitted here, exactly once, at message-append time; the
/// appended message is flagged so re-display can never re-trigger them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input sanitized to nothing; no message was appended.
    Ignored,
    Reply {
        message_id: String,
        directives: Vec<ActionDirective>,
    },
    Failed {
        message_id: String,
    },
}

/// Owns the message list, the mood log and the streak record, and drives
/// the AI transport. All operations run to completion on the caller's
/// single event sequence; `send` awaits the transport before returning, so
/// replies always land in issuance order.
pub struct ConversationOrchestrator<T: AiTransport, K: KvStore> {
    transport: T,
    store: K,
    messages: Vec<Message>,
    mood_log: MoodLog,
    streak: StreakRecord,
    active_scenario: Option<String>,
}

impl<T: AiTransport, K: KvStore> ConversationOrchestrator<T, K> {
    /// Load persisted state and append the opening AI message.
    pub fn new(transport: T, store: K, now: DateTime<Local>) -> Self {
        let mood_log = MoodLog::load(&store);
        let streak = StreakTracker::load(&store);

        let mut orchestrator = ConversationOrchestrator {
            transport,
            store,
            messages: Vec::new(),
            mood_log,
            streak,
            active_scenario: None,
        };

        let greeting = orchestrator.initial_message(now);
        orchestrator.messages.push(Message::ai(greeting));
        orchestrator
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn mood_log(&self) -> &MoodLog {
        &self.mood_log
    }

    pub fn streak(&self) -> &StreakRecord {
        &self.streak
    }

    pub fn active_scenario(&self) -> Option<&str> {
        self.active_scenario.as_deref()
    }

    /// First visit: fixed welcome. 24h or more since the last check-in: the
    /// daily quote plus a check-in prompt. Otherwise: a welcome-back line.
    fn initial_message(&mut self, now: DateTime<Local>) -> String {
        let last_checkin = match self.store.get(CHECKIN_KEY) {
            Ok(Some(raw)) => DateTime::parse_from_rfc3339(&raw)
                .ok()
                .map(|dt| dt.with_timezone(&Local)),
            Ok(None) => None,
            Err(e) => {
                eprintln!("Could not get last check-in time: {}", e);
                None
            }
        };

        match last_checkin {
            None => {
                self.update_checkin_time(now);
                FIRST_VISIT_TEXT.to_string()
            }
            Some(last) if (now - last).num_hours() >= 24 => {
                self.update_checkin_time(now);
                self.daily_message(now)
            }
            Some(_) => WELCOME_BACK_PROMPTS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(WELCOME_BACK_PROMPTS[0])
                .to_string(),
        }
    }

    fn daily_message(&mut self, now: DateTime<Local>) -> String {
        let quote = daily_quote(&mut self.store, now);
        let checkin = CHECKIN_PROMPTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(CHECKIN_PROMPTS[0]);
        format!(
            "Here's a little thought for your day:\n\n\"{}\"\n\nWith that in mind, {}",
            quote.quote,
            checkin.to_lowercase()
        )
    }

    fn update_checkin_time(&mut self, now: DateTime<Local>) {
        if let Err(e) = self.store.set(CHECKIN_KEY, &now.to_rfc3339()) {
            eprintln!("Could not update last check-in time: {}", e);
        }
    }

    /// Sanitize and send user text, appending the user message and either
    /// the parsed AI reply or the fixed error message.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        let sanitized = sanitize_input(text);
        if sanitized.is_empty() {
            return SendOutcome::Ignored;
        }

        self.messages.push(Message::user(sanitized));

        let reply = self
            .transport
            .get_reply(
                &self.messages,
                &self.mood_log.entries,
                self.active_scenario.as_deref(),
                &self.streak,
            )
            .await;

        match reply {
            Ok(raw) => {
                let parsed = parse_reply(&raw);
                let mut message = Message::ai(parsed.cleaned);
                message.directives_dispatched = true;
                let message_id = message.id.clone();
                self.messages.push(message);

                SendOutcome::Reply {
                    message_id,
                    directives: dedup_breathing(parsed.directives),
                }
            }
            Err(e) => {
                eprintln!("AI transport failed: {}", e);
                let message = Message::ai_error(CONNECTION_ERROR_TEXT);
                let message_id = message.id.clone();
                self.messages.push(message);
                SendOutcome::Failed { message_id }
            }
        }
    }

    /// Retry a failed AI call: drop the error message and everything after
    /// it, then resubmit the preceding user text through the full send path.
    ///
    /// No-op unless `error_id` names an error message whose immediately
    /// preceding message was authored by the user.
    pub async fn retry(&mut self, error_id: &str) -> SendOutcome {
        let Some(error_index) = self.messages.iter().position(|m| m.id == error_id) else {
            return SendOutcome::Ignored;
        };
        if error_index == 0 || !self.messages[error_index].is_error {
            return SendOutcome::Ignored;
        }

        let preceding = &self.messages[error_index - 1];
        if preceding.sender != Sender::User {
            return SendOutcome::Ignored;
        }
        let text = preceding.text.clone();

        self.messages.truncate(error_index);
        self.send(&text).await
    }

    /// Set feedback on an AI-authored, non-error message. The first write
    /// wins; any later call, even with a different value, is a no-op.
    pub fn set_feedback(&mut self, message_id: &str, feedback: Feedback) {
        if let Some(message) = self.messages.iter_mut().find(|m| m.id == message_id) {
            if message.sender == Sender::Ai && !message.is_error && message.feedback.is_none() {
                message.feedback = Some(feedback);
            }
        }
    }

    /// Append a mood entry, persist the log, and advance the streak.
    pub fn log_mood(&mut self, mood: Mood, now: DateTime<Local>) -> StreakUpdate {
        self.mood_log.append(mood, now);
        self.mood_log.save(&mut self.store);

        let update = StreakTracker::record_log_event(&mut self.store, now);
        self.streak = update.record.clone();
        update
    }

    /// Activate a role-play scenario and append its kickoff message.
    pub fn select_scenario(&mut self, scenario: impl Into<String>) {
        let scenario = scenario.into();
        let kickoff = format!(
            "Okay, let's practice the \"{}\" scenario. I'm ready when you are. \
             You can start the conversation.",
            scenario
        );
        self.active_scenario = Some(scenario);
        self.messages.push(Message::ai(kickoff));
    }

    pub fn clear_scenario(&mut self) {
        self.active_scenario = None;
    }

    /// Share a logged mood with the companion in chat.
    pub async fn share_mood(&mut self, mood: Mood) -> SendOutcome {
        self.send(&format!("User Selected Mood: {}", mood)).await
    }

    /// Ask for music matching a mood.
    pub async fn request_music(&mut self, mood: Mood) -> SendOutcome {
        self.send(&format!(
            "I'm feeling {}, can you suggest some music?",
            mood.to_string().to_lowercase()
        ))
        .await
    }
}

/// The breathing flow triggers at most once per message, however many times
/// the marker appears. Other directive kinds pass through untouched.
fn dedup_breathing(directives: Vec<ActionDirective>) -> Vec<ActionDirective> {
    let mut seen_breathing = false;
    directives
        .into_iter()
        .filter(|d| {
            if matches!(d, ActionDirective::Breathing) {
                !std::mem::replace(&mut seen_breathing, true)
            } else {
                true
            }
        })
        .collect()
}
