use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Up,
    Down,
}

/// One chat transcript entry.
///
/// `feedback` is settable at most once, and only on AI-authored non-error
/// messages; the orchestrator enforces both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(default)]
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Feedback>,
    /// Set once the message's embedded directives have been dispatched, so
    /// re-displaying the transcript can never re-trigger a flow.
    #[serde(default)]
    pub directives_dispatched: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender: Sender::User,
            is_error: false,
            feedback: None,
            directives_dispatched: false,
        }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender: Sender::Ai,
            is_error: false,
            feedback: None,
            directives_dispatched: false,
        }
    }

    pub fn ai_error(text: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender: Sender::Ai,
            is_error: true,
            feedback: None,
            directives_dispatched: false,
        }
    }
}
