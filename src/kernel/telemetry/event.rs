use serde::{Deserialize, Serialize};

use crate::kernel::event::{RecognitionFault, RecognitionMode};
use crate::kernel::state::DialogueState;
use crate::kernel::time::Tick;
use crate::error::ServiceError;

// Allowed: states, modes, ticks, counts, enums
// Forbidden: transcripts, spoken text, topics, reminder text

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    Transition {
        from: DialogueState,
        to: DialogueState,
        tick: Tick,
    },

    SessionStarted {
        mode: RecognitionMode,
    },

    /// Event from a superseded session, utterance, request or timer.
    StaleDiscarded {
        source: StaleSource,
    },

    /// Results with no usable alternatives.
    MalformedResults,

    RecognizerFault {
        kind: FaultKind,
        mode: RecognitionMode,
    },

    ServiceFallback {
        service: ServiceKind,
        reason: FallbackReason,
    },

    CycleCompleted {
        duration_ticks: u64,
        follow_up_rounds: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaleSource {
    Session,
    Speech,
    Request,
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultKind {
    NoSpeech,
    Aborted,
    AudioCapture,
    Network,
    NotAllowed,
    StartRejected,
    /// Session ended without ever producing a final utterance.
    EndedEmpty,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    Classifier,
    Content,
    Reminders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    Timeout,
    Failure,
    /// Service answered but the payload was unusable.
    Unusable,
}

impl From<&RecognitionFault> for FaultKind {
    fn from(fault: &RecognitionFault) -> Self {
        match fault {
            RecognitionFault::NoSpeech => FaultKind::NoSpeech,
            RecognitionFault::Aborted => FaultKind::Aborted,
            RecognitionFault::AudioCapture => FaultKind::AudioCapture,
            RecognitionFault::Network => FaultKind::Network,
            RecognitionFault::NotAllowed => FaultKind::NotAllowed,
            RecognitionFault::StartRejected => FaultKind::StartRejected,
            RecognitionFault::Other(_) => FaultKind::Other, // Detail STRIPPED
        }
    }
}

impl From<&ServiceError> for FallbackReason {
    fn from(err: &ServiceError) -> Self {
        match err {
            ServiceError::Timeout => FallbackReason::Timeout,
            ServiceError::Decode(_) => FallbackReason::Unusable,
            _ => FallbackReason::Failure,
        }
    }
}
