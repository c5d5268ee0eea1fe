use std::time::Duration;

use tracing::{debug, info, warn};

use super::cancel::{Outstanding, Pending};
use super::event::{
    Event, RecognitionEvent, RecognitionFault, RecognitionMode, RecognitionResult, RequestId, SessionId,
    SideEffect, TimerId, Utterance, UtteranceId,
};
use super::executor::{ActionExecutor, Execution};
use super::intent::Intent;
use super::session::SessionHandle;
use super::speech::planner::{SpeechCue, SpeechPlanner};
use super::state::{DialogueState, FollowUpContext, SharedState, StateDelta};
use super::telemetry::event::{FaultKind, FallbackReason, ServiceKind, StaleSource, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::time::Tick;
use super::wake;
use crate::config::{SpeechConfig, VoiceConfig, WakeConfig};
use crate::error::ServiceError;

/// The subset of configuration the transition function depends on.
#[derive(Debug, Clone, Default)]
pub struct DialogueConfig {
    pub wake: WakeConfig,
    pub speech: SpeechConfig,
    pub ambient_retry: Duration,
}

impl From<&VoiceConfig> for DialogueConfig {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            wake: config.wake.clone(),
            speech: config.speech.clone(),
            ambient_retry: config.timeouts.ambient_retry(),
        }
    }
}

/// Owns the dialogue state, the single recognition slot and every
/// outstanding id. All mutation happens in [`DialogueController::step`].
pub struct DialogueController {
    wake: WakeConfig,
    ambient_retry: Duration,
    pub state: SharedState,
    session: SessionHandle,
    outstanding: Outstanding,
    planner: SpeechPlanner,
    executor: ActionExecutor,
    pub telemetry: TelemetryRecorder,
    pub tick: Tick,
}

impl DialogueController {
    pub fn new(config: DialogueConfig) -> Self {
        Self {
            wake: config.wake,
            ambient_retry: config.ambient_retry,
            state: SharedState::new(),
            session: SessionHandle::new(),
            outstanding: Outstanding::new(),
            planner: SpeechPlanner::new(config.speech),
            executor: ActionExecutor,
            telemetry: TelemetryRecorder::new(),
            tick: Tick::new(),
        }
    }

    pub fn current(&self) -> DialogueState {
        self.state.current()
    }

    pub fn follow_up(&self) -> FollowUpContext {
        self.state.follow_up()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn speaking(&self) -> bool {
        self.outstanding.speaking()
    }

    pub fn request_in_flight(&self) -> bool {
        self.outstanding.request_in_flight()
    }

    /// Enter `Ambient` and open the first ambient session.
    pub fn boot(&mut self) -> Vec<SideEffect> {
        info!("Voice controller booting into ambient listening");
        let mut effects = Vec::new();
        self.start_session(RecognitionMode::Ambient, &mut effects);
        effects
    }

    /// Single transition function. Returns side effects for the driver, in order.
    /// MUST NOT await I/O or timers.
    pub fn step(&mut self, event: Event) -> Vec<SideEffect> {
        self.tick = self.tick.next();
        self.state.reduce(StateDelta::Tick(self.tick));
        let mut effects = Vec::new();

        match event {
            Event::Recognition { session, event } => self.on_recognition(session, event, &mut effects),
            Event::SpeechDone { utterance } => self.on_speech_done(utterance, &mut effects),
            Event::Classified { request, outcome } => self.on_classified(request, outcome, &mut effects),
            Event::NarrationReady { request, outcome } => self.on_narration(request, outcome, &mut effects),
            Event::ReminderCommitted { request, outcome } => self.on_committed(request, outcome, &mut effects),
            Event::TimerElapsed { timer } => self.on_timer(timer, &mut effects),
        }

        effects
    }

    // === Recognition ===

    fn on_recognition(&mut self, session: SessionId, event: RecognitionEvent, effects: &mut Vec<SideEffect>) {
        if !self.session.is_current(session) {
            debug!("Discarded event from stale session {:?}", session);
            self.stale(StaleSource::Session);
            return;
        }

        match event {
            RecognitionEvent::Results(results) => self.on_results(&results, effects),
            RecognitionEvent::End => {
                self.session.release(session);
                self.on_session_closed(None, effects);
            }
            RecognitionEvent::Error(fault) => {
                self.session.release(session);
                self.on_session_closed(Some(fault), effects);
            }
        }
    }

    fn on_results(&mut self, results: &[RecognitionResult], effects: &mut Vec<SideEffect>) {
        match self.current() {
            DialogueState::Ambient => {
                let transcript = wake::run_transcript(results);
                if transcript.trim().is_empty() {
                    self.telemetry.record(TelemetryEvent::MalformedResults);
                    return;
                }
                if wake::detect(&transcript, &self.wake.phrases, self.wake.window_chars) {
                    info!("Wake phrase detected");
                    effects.extend(self.session.stop());
                    self.enter(DialogueState::Acknowledging);
                    self.speak(SpeechCue::Acknowledge, effects);
                }
            }
            DialogueState::CapturingCommand | DialogueState::AwaitingFollowUp => {
                let Some(utterance) = Utterance::final_from(results) else {
                    if !results.iter().any(|r| r.best().is_some()) {
                        self.telemetry.record(TelemetryEvent::MalformedResults);
                    }
                    return;
                };
                debug!("Final command utterance: '{}'", utterance.text);
                effects.extend(self.session.stop());
                self.dispatch(utterance, effects);
            }
            // No session can be current in the other states.
            other => debug!("Ignoring results in {:?}", other),
        }
    }

    /// Route a final command utterance: a pending follow-up consumes it as
    /// the topic, everything else goes to the classifier.
    fn dispatch(&mut self, utterance: Utterance, effects: &mut Vec<SideEffect>) {
        if self.follow_up().pending {
            self.state.reduce(StateDelta::ClearFollowUp);
            self.enter(DialogueState::Executing);
            let execution = self.executor.follow_up(&utterance.text);
            self.run(execution, effects);
        } else {
            self.enter(DialogueState::Classifying);
            let request = self.outstanding.issue_request(Pending::Classify);
            effects.push(SideEffect::Classify {
                request,
                transcript: utterance.text,
            });
        }
    }

    fn on_session_closed(&mut self, fault: Option<RecognitionFault>, effects: &mut Vec<SideEffect>) {
        match self.current() {
            DialogueState::Ambient => match fault {
                None => {
                    // Continuous runs end on their own; keep listening.
                    self.start_session(RecognitionMode::Ambient, effects);
                }
                Some(fault) => {
                    warn!("Ambient recognizer error: {:?}", fault);
                    self.fault(&fault, RecognitionMode::Ambient);
                    let timer = self.outstanding.arm_timer();
                    effects.push(SideEffect::ArmTimer {
                        timer,
                        after: self.ambient_retry,
                    });
                }
            },
            DialogueState::CapturingCommand | DialogueState::AwaitingFollowUp => {
                match &fault {
                    Some(f) => {
                        warn!("Command recognizer error: {:?}", f);
                        self.fault(f, RecognitionMode::Command);
                    }
                    None => {
                        info!("Command session ended without a final utterance");
                        self.telemetry.record(TelemetryEvent::RecognizerFault {
                            kind: FaultKind::EndedEmpty,
                            mode: RecognitionMode::Command,
                        });
                    }
                }
                if self.follow_up().pending {
                    self.state.reduce(StateDelta::ClearFollowUp);
                }
                self.enter(DialogueState::Recovering);
                self.speak(SpeechCue::Apologize, effects);
            }
            other => debug!("Session closed in {:?}", other),
        }
    }

    // === Synthesis ===

    /// The single authoritative resumption point after speech.
    fn on_speech_done(&mut self, utterance: UtteranceId, effects: &mut Vec<SideEffect>) {
        if !self.outstanding.settle_utterance(utterance) {
            debug!("Discarded completion of superseded utterance {:?}", utterance);
            self.stale(StaleSource::Speech);
            return;
        }

        match self.current() {
            DialogueState::Acknowledging => {
                self.enter(DialogueState::CapturingCommand);
                self.start_session(RecognitionMode::Command, effects);
            }
            DialogueState::Executing if self.follow_up().pending => {
                self.enter(DialogueState::AwaitingFollowUp);
                self.start_session(RecognitionMode::Command, effects);
            }
            DialogueState::Executing | DialogueState::Recovering => self.return_to_ambient(effects),
            other => debug!("Speech finished in {:?}", other),
        }
    }

    // === External services ===

    fn on_classified(&mut self, request: RequestId, outcome: Result<Intent, ServiceError>, effects: &mut Vec<SideEffect>) {
        if self.settle(request, |p| matches!(p, Pending::Classify)).is_none() {
            return;
        }

        let intent = match outcome {
            Ok(intent) => intent,
            Err(e) => {
                warn!("Classifier failed: {}", e);
                self.fallback(ServiceKind::Classifier, &e);
                Intent::fallback(self.planner.fallback_text())
            }
        };

        info!("Executing {:?}", intent.action);
        self.enter(DialogueState::Executing);
        let execution = self.executor.plan(intent);
        self.run(execution, effects);
    }

    fn on_narration(&mut self, request: RequestId, outcome: Result<String, ServiceError>, effects: &mut Vec<SideEffect>) {
        if self.settle(request, |p| matches!(p, Pending::Narration)).is_none() {
            return;
        }

        let cue = match outcome {
            Ok(text) => SpeechCue::Narration(text),
            Err(e) => {
                warn!("Content service failed: {}", e);
                self.fallback(ServiceKind::Content, &e);
                SpeechCue::NarrationFailed
            }
        };
        self.speak(cue, effects);
    }

    fn on_committed(&mut self, request: RequestId, outcome: Result<(), ServiceError>, effects: &mut Vec<SideEffect>) {
        let Some(Pending::Commit { response }) = self.settle(request, |p| matches!(p, Pending::Commit { .. })) else {
            return;
        };

        let cue = match outcome {
            Ok(()) => SpeechCue::Response(response),
            Err(e) => {
                warn!("Reminder store failed: {}", e);
                self.fallback(ServiceKind::Reminders, &e);
                SpeechCue::StoreFailed
            }
        };
        self.speak(cue, effects);
    }

    fn on_timer(&mut self, timer: TimerId, effects: &mut Vec<SideEffect>) {
        if !self.outstanding.settle_timer(timer) {
            self.stale(StaleSource::Timer);
            return;
        }
        if self.current() == DialogueState::Ambient && !self.session.is_active() {
            info!("Re-arming ambient listening");
            self.start_session(RecognitionMode::Ambient, effects);
        }
    }

    // === Helpers ===

    fn run(&mut self, execution: Execution, effects: &mut Vec<SideEffect>) {
        match execution {
            Execution::Commit { text, kind, response } => {
                let request = self.outstanding.issue_request(Pending::Commit { response });
                effects.push(SideEffect::CommitReminder { request, text, kind });
            }
            Execution::FetchTopic { topic } => {
                let request = self.outstanding.issue_request(Pending::Narration);
                effects.push(SideEffect::FetchNarration { request, topic });
            }
            Execution::Speak { cue, arm_follow_up } => {
                if arm_follow_up {
                    self.state.reduce(StateDelta::ArmFollowUp);
                }
                self.speak(cue, effects);
            }
        }
    }

    /// Settles `request` if it is current and of the expected kind.
    fn settle<F>(&mut self, request: RequestId, expected: F) -> Option<Pending>
    where
        F: Fn(&Pending) -> bool,
    {
        match self.outstanding.settle_request(request) {
            Some(pending) if expected(&pending) => Some(pending),
            _ => {
                debug!("Discarded stale response for {:?}", request);
                self.stale(StaleSource::Request);
                None
            }
        }
    }

    /// Recognition is always stopped before playback starts.
    fn speak(&mut self, cue: SpeechCue, effects: &mut Vec<SideEffect>) {
        effects.extend(self.session.stop());
        let line = self.planner.plan(cue);
        let utterance = self.outstanding.issue_utterance();
        effects.push(SideEffect::Speak {
            utterance,
            text: line.text,
            rate: line.rate,
        });
    }

    fn start_session(&mut self, mode: RecognitionMode, effects: &mut Vec<SideEffect>) {
        self.outstanding.disarm_timer();
        effects.extend(self.session.start(mode));
        self.telemetry.record(TelemetryEvent::SessionStarted { mode });
    }

    fn return_to_ambient(&mut self, effects: &mut Vec<SideEffect>) {
        if let Some(started) = self.state.cycle_started {
            self.telemetry.record(TelemetryEvent::CycleCompleted {
                duration_ticks: self.tick.since(started),
                follow_up_rounds: self.state.follow_up_rounds,
            });
        }
        self.enter(DialogueState::Ambient);
        self.start_session(RecognitionMode::Ambient, effects);
    }

    fn enter(&mut self, next: DialogueState) {
        let from = self.current();
        if from == next {
            return;
        }
        debug!("Dialogue {:?} -> {:?}", from, next);
        self.state.reduce(StateDelta::Enter(next));
        self.telemetry.record(TelemetryEvent::Transition {
            from,
            to: next,
            tick: self.tick,
        });
    }

    fn stale(&mut self, source: StaleSource) {
        self.telemetry.record(TelemetryEvent::StaleDiscarded { source });
    }

    fn fault(&mut self, fault: &RecognitionFault, mode: RecognitionMode) {
        self.telemetry.record(TelemetryEvent::RecognizerFault {
            kind: FaultKind::from(fault),
            mode,
        });
    }

    fn fallback(&mut self, service: ServiceKind, err: &ServiceError) {
        self.telemetry.record(TelemetryEvent::ServiceFallback {
            service,
            reason: FallbackReason::from(err),
        });
    }
}
