use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::intent::{Intent, ReminderKind};
use crate::error::ServiceError;

/// Identity of one recognition run. Terminal events are only honored for the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

/// Identity of one `speak` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtteranceId(pub u64);

/// Identity of one external call (classifier, content service, reminder store).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecognitionMode {
    /// Continuous, interim results on. Only scanned for the wake phrase.
    Ambient,
    /// Single utterance, final results only.
    Command,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: Option<f32>,
}

impl Alternative {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
            confidence: None,
        }
    }
}

/// One recognizer result. Engines may deliver results with no alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub alternatives: Vec<Alternative>,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn partial(transcript: impl Into<String>) -> Self {
        Self {
            alternatives: vec![Alternative::new(transcript)],
            is_final: false,
        }
    }

    pub fn final_(transcript: impl Into<String>) -> Self {
        Self {
            alternatives: vec![Alternative::new(transcript)],
            is_final: true,
        }
    }

    pub fn best(&self) -> Option<&str> {
        self.alternatives.first().map(|a| a.transcript.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub is_final: bool,
}

impl Utterance {
    /// Last final, non-blank result of the run, if any.
    pub fn final_from(results: &[RecognitionResult]) -> Option<Self> {
        results
            .iter()
            .rev()
            .filter(|r| r.is_final)
            .filter_map(|r| r.best())
            .map(str::trim)
            .find(|t| !t.is_empty())
            .map(|text| Utterance {
                text: text.to_string(),
                is_final: true,
            })
    }
}

/// Why a recognition run ended in error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionFault {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    /// Engine refused to start, even after the guarded retry.
    StartRejected,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Cumulative results for the run so far.
    Results(Vec<RecognitionResult>),
    End,
    Error(RecognitionFault),
}

/// Messages delivered to the controller's transition function.
#[derive(Debug, Clone)]
pub enum Event {
    Recognition {
        session: SessionId,
        event: RecognitionEvent,
    },
    SpeechDone {
        utterance: UtteranceId,
    },
    Classified {
        request: RequestId,
        outcome: Result<Intent, ServiceError>,
    },
    NarrationReady {
        request: RequestId,
        outcome: Result<String, ServiceError>,
    },
    ReminderCommitted {
        request: RequestId,
        outcome: Result<(), ServiceError>,
    },
    TimerElapsed {
        timer: TimerId,
    },
}

/// Work the driver performs on behalf of the controller, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffect {
    StartRecognition {
        session: SessionId,
        mode: RecognitionMode,
    },
    StopRecognition {
        session: SessionId,
    },
    Speak {
        utterance: UtteranceId,
        text: String,
        rate: f32,
    },
    Classify {
        request: RequestId,
        transcript: String,
    },
    FetchNarration {
        request: RequestId,
        topic: String,
    },
    CommitReminder {
        request: RequestId,
        text: String,
        kind: ReminderKind,
    },
    ArmTimer {
        timer: TimerId,
        after: Duration,
    },
}
