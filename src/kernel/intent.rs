use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentAction {
    AddReminder,
    Chat,
    /// Read a topic report. Without a topic the classifier is asking the user to name one.
    InitiateFollowTopic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    #[default]
    Info,
    Alert,
    #[serde(rename = "action")]
    Task,
}

impl ReminderKind {
    /// Name used by the classifier schema and the reminder collection.
    pub fn as_wire(&self) -> &'static str {
        match self {
            ReminderKind::Info => "info",
            ReminderKind::Alert => "alert",
            ReminderKind::Task => "action",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Some(ReminderKind::Info),
            "alert" => Some(ReminderKind::Alert),
            "action" | "task" => Some(ReminderKind::Task),
            _ => None,
        }
    }
}

/// Structured result of classifying one command transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub action: IntentAction,
    pub text: Option<String>,
    pub reminder_kind: Option<ReminderKind>,
    pub spoken_response: String,
}

impl Intent {
    pub fn chat(spoken_response: impl Into<String>) -> Self {
        Self {
            action: IntentAction::Chat,
            text: None,
            reminder_kind: None,
            spoken_response: spoken_response.into(),
        }
    }

    /// Local stand-in when the classifier fails or returns something unusable.
    pub fn fallback(apology: &str) -> Self {
        Self::chat(apology)
    }

    pub fn add_reminder(text: impl Into<String>, kind: ReminderKind, spoken_response: impl Into<String>) -> Self {
        Self {
            action: IntentAction::AddReminder,
            text: Some(text.into()),
            reminder_kind: Some(kind),
            spoken_response: spoken_response.into(),
        }
    }

    pub fn follow_topic(topic: Option<String>, spoken_response: impl Into<String>) -> Self {
        Self {
            action: IntentAction::InitiateFollowTopic,
            text: topic,
            reminder_kind: None,
            spoken_response: spoken_response.into(),
        }
    }

    /// The payload text, if present and not blank.
    pub fn payload(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}
