use super::event::{RequestId, TimerId, UtteranceId};

/// What the controller is waiting on from an external call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Classify,
    Narration,
    /// Reminder commit; the response is spoken once the store acknowledges.
    Commit { response: String },
}

/// Tracks the single outstanding request, utterance and timer.
///
/// Issuing a new id supersedes the previous one, so completions for anything
/// superseded or cleared are reported as stale and dropped by the caller.
#[derive(Debug, Default)]
pub struct Outstanding {
    next: u64,
    request: Option<(RequestId, Pending)>,
    utterance: Option<UtteranceId>,
    timer: Option<TimerId>,
}

impl Outstanding {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }

    pub fn issue_request(&mut self, pending: Pending) -> RequestId {
        let id = RequestId(self.bump());
        self.request = Some((id, pending));
        id
    }

    /// Takes the pending entry if `id` is the current request.
    pub fn settle_request(&mut self, id: RequestId) -> Option<Pending> {
        match &self.request {
            Some((current, _)) if *current == id => self.request.take().map(|(_, p)| p),
            _ => None,
        }
    }

    pub fn request_in_flight(&self) -> bool {
        self.request.is_some()
    }

    pub fn issue_utterance(&mut self) -> UtteranceId {
        let id = UtteranceId(self.bump());
        self.utterance = Some(id);
        id
    }

    pub fn settle_utterance(&mut self, id: UtteranceId) -> bool {
        if self.utterance == Some(id) {
            self.utterance = None;
            true
        } else {
            false
        }
    }

    pub fn speaking(&self) -> bool {
        self.utterance.is_some()
    }

    pub fn arm_timer(&mut self) -> TimerId {
        let id = TimerId(self.bump());
        self.timer = Some(id);
        id
    }

    pub fn settle_timer(&mut self, id: TimerId) -> bool {
        if self.timer == Some(id) {
            self.timer = None;
            true
        } else {
            false
        }
    }

    pub fn disarm_timer(&mut self) {
        self.timer = None;
    }
}
