use super::event::{RecognitionMode, SessionId, SideEffect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSession {
    pub id: SessionId,
    pub mode: RecognitionMode,
}

/// The controller's single recognition slot.
///
/// `start` and `stop` are the only mutators besides `release`, and `start`
/// always stops the previous session first, so at most one session is ever
/// live no matter how calls interleave.
#[derive(Debug, Default)]
pub struct SessionHandle {
    active: Option<ActiveSession>,
    next: u64,
}

impl SessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop-then-start. Returns the effects in the order the driver must run them.
    pub fn start(&mut self, mode: RecognitionMode) -> Vec<SideEffect> {
        let mut effects: Vec<SideEffect> = self.stop().into_iter().collect();

        self.next += 1;
        let id = SessionId(self.next);
        self.active = Some(ActiveSession { id, mode });
        effects.push(SideEffect::StartRecognition { session: id, mode });
        effects
    }

    /// Idempotent. Any late event from the stopped session becomes stale.
    pub fn stop(&mut self) -> Option<SideEffect> {
        self.active
            .take()
            .map(|s| SideEffect::StopRecognition { session: s.id })
    }

    /// Forget a session that ended on its own (terminal event). No effect is
    /// needed because the engine run is already over.
    pub fn release(&mut self, id: SessionId) -> bool {
        if self.is_current(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn is_current(&self, id: SessionId) -> bool {
        self.active.map(|s| s.id == id).unwrap_or(false)
    }

    pub fn current(&self) -> Option<ActiveSession> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}
