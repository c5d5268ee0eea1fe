use super::intent::{Intent, IntentAction, ReminderKind};
use super::speech::planner::SpeechCue;

/// What an intent turns into once the controller enters `Executing`.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// Persist first, then speak `response` (or an apology if the store fails).
    Commit {
        text: String,
        kind: ReminderKind,
        response: String,
    },
    /// Fetch topic content, then narrate it.
    FetchTopic { topic: String },
    /// Speak only. With `arm_follow_up`, the next command utterance is the topic.
    Speak { cue: SpeechCue, arm_follow_up: bool },
}

pub struct ActionExecutor;

impl ActionExecutor {
    /// Pure Projection: Intent -> Execution
    pub fn plan(&self, intent: Intent) -> Execution {
        match intent.action {
            IntentAction::AddReminder => match intent.payload() {
                Some(text) => Execution::Commit {
                    text: text.to_string(),
                    kind: intent.reminder_kind.unwrap_or_default(),
                    response: intent.spoken_response.clone(),
                },
                // Nothing to store; the classifier broke its contract.
                None => Execution::Speak {
                    cue: SpeechCue::Fallback,
                    arm_follow_up: false,
                },
            },
            IntentAction::Chat => Execution::Speak {
                cue: SpeechCue::Response(intent.spoken_response),
                arm_follow_up: false,
            },
            IntentAction::InitiateFollowTopic => match intent.payload() {
                Some(topic) => Execution::FetchTopic {
                    topic: topic.to_string(),
                },
                None => Execution::Speak {
                    cue: SpeechCue::Response(intent.spoken_response),
                    arm_follow_up: true,
                },
            },
        }
    }

    /// A follow-up answer is used as the topic directly.
    pub fn follow_up(&self, answer: &str) -> Execution {
        Execution::FetchTopic {
            topic: answer.trim().to_string(),
        }
    }
}
