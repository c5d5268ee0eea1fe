use serde::{Deserialize, Serialize};

use crate::kernel::time::Tick;

/// Exactly one of these is active at any instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialogueState {
    /// Continuous listening for the wake phrase.
    #[default]
    Ambient,
    /// Ambient stopped, acknowledgement playing.
    Acknowledging,
    /// One-shot command session live.
    CapturingCommand,
    /// Classifier call in flight.
    Classifying,
    /// Side effect running and/or response playing.
    Executing,
    /// Command session live for the follow-up answer; no wake phrase needed.
    AwaitingFollowUp,
    /// Apology playing after a recognizer failure.
    Recovering,
}

impl DialogueState {
    /// States in which a recognition session may exist.
    pub fn allows_session(&self) -> bool {
        matches!(
            self,
            DialogueState::Ambient | DialogueState::CapturingCommand | DialogueState::AwaitingFollowUp
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FollowUpContext {
    pub pending: bool,
}

/// Strict state delta. This is the ONLY way dialogue state mutates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateDelta {
    Enter(DialogueState),
    ArmFollowUp,
    ClearFollowUp,
    Tick(Tick),
}

#[derive(Debug, Clone, Default)]
pub struct SharedState {
    current: DialogueState,
    follow_up: FollowUpContext,
    /// Monotonic version, bumped on every reduction.
    pub version: u64,
    pub last_tick: Tick,
    /// Tick at which the current wake-to-resolution cycle began.
    pub cycle_started: Option<Tick>,
    /// Follow-up rounds chained in the current cycle.
    pub follow_up_rounds: u32,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> DialogueState {
        self.current
    }

    pub fn follow_up(&self) -> FollowUpContext {
        self.follow_up
    }

    /// Pure reduction: State + Delta -> Mutated State
    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::Tick(t) => {
                self.last_tick = t;
            }
            StateDelta::Enter(next) => {
                match (self.current, next) {
                    (DialogueState::Ambient, DialogueState::Acknowledging) => {
                        self.cycle_started = Some(self.last_tick);
                        self.follow_up_rounds = 0;
                    }
                    (_, DialogueState::AwaitingFollowUp) => {
                        self.follow_up_rounds += 1;
                    }
                    (_, DialogueState::Ambient) => {
                        self.cycle_started = None;
                    }
                    _ => {}
                }
                self.current = next;
            }
            StateDelta::ArmFollowUp => {
                self.follow_up.pending = true;
            }
            StateDelta::ClearFollowUp => {
                self.follow_up.pending = false;
            }
        }
    }
}
