use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::controller::DialogueController;
use super::event::{Event, RecognitionEvent, RecognitionFault, RecognitionMode, SessionId, SideEffect};
use crate::config::TimeoutConfig;
use crate::error::ServiceError;
use crate::services::Services;
use crate::speech::{RecognitionSession, SynthesisChannel};

// Internal Driver Events (Never touch the controller)
#[derive(Debug)]
enum DriverEvent {
    RetryStart { session: SessionId, mode: RecognitionMode },
}

/// Async driver: feeds events to the controller and executes its side effects
/// against the engines and services.
pub struct Reactor {
    receiver: mpsc::UnboundedReceiver<Event>,
    sender: mpsc::UnboundedSender<Event>,
    driver_rx: mpsc::UnboundedReceiver<DriverEvent>,
    driver_tx: mpsc::UnboundedSender<DriverEvent>,
    pub controller: DialogueController,
    recognition: RecognitionSession,
    synthesis: SynthesisChannel,
    services: Services,
    timeouts: TimeoutConfig,
}

impl Reactor {
    pub fn new(
        controller: DialogueController,
        recognition: RecognitionSession,
        synthesis: SynthesisChannel,
        services: Services,
        timeouts: TimeoutConfig,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (driver_tx, driver_rx) = mpsc::unbounded_channel();
        Self {
            receiver,
            sender,
            driver_rx,
            driver_tx,
            controller,
            recognition,
            synthesis,
            services,
            timeouts,
        }
    }

    /// Handle for injecting events from outside the engines.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }

    /// Runs until `shutdown` is cancelled.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("Voice reactor started");
        self.boot();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                Some(event) = self.receiver.recv() => {
                    let effects = self.controller.step(event);
                    self.execute(effects);
                }
                Some(driver) = self.driver_rx.recv() => self.on_driver(driver),
            }
        }

        self.recognition.stop();
        self.synthesis.cancel();
        info!("Voice reactor stopped");
    }

    /// Process every event already queued, without waiting for new ones.
    /// Returns how many controller steps ran.
    pub fn drain(&mut self) -> usize {
        let mut steps = 0;
        loop {
            while let Ok(driver) = self.driver_rx.try_recv() {
                self.on_driver(driver);
            }
            match self.receiver.try_recv() {
                Ok(event) => {
                    let effects = self.controller.step(event);
                    self.execute(effects);
                    steps += 1;
                }
                Err(_) => return steps,
            }
        }
    }

    /// Start ambient listening. `run` does this itself.
    pub fn boot(&mut self) {
        let effects = self.controller.boot();
        self.execute(effects);
    }

    fn on_driver(&mut self, event: DriverEvent) {
        match event {
            DriverEvent::RetryStart { session, mode } => {
                if !self.controller.session().is_current(session) {
                    return;
                }
                if self.recognition.start(session, mode, &self.sender).is_err() {
                    warn!("Recognition {:?} rejected twice; giving up on this run", session);
                    let _ = self.sender.send(Event::Recognition {
                        session,
                        event: RecognitionEvent::Error(RecognitionFault::StartRejected),
                    });
                }
            }
        }
    }

    fn execute(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::StartRecognition { session, mode } => {
                    if self.recognition.start(session, mode, &self.sender).is_err() {
                        // Previous run not released yet; retry once after it settles.
                        let tx = self.driver_tx.clone();
                        let delay = self.timeouts.start_retry();
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = tx.send(DriverEvent::RetryStart { session, mode });
                        });
                    }
                }
                SideEffect::StopRecognition { session } => {
                    self.recognition.stop_session(session);
                }
                SideEffect::Speak { utterance, text, rate } => {
                    self.synthesis.speak(utterance, &text, rate, &self.sender);
                }
                SideEffect::Classify { request, transcript } => {
                    let classifier = self.services.classifier.clone();
                    self.spawn_request(self.timeouts.classifier(), async move {
                        classifier.classify(&transcript).await
                    }, move |outcome| Event::Classified { request, outcome });
                }
                SideEffect::FetchNarration { request, topic } => {
                    let content = self.services.content.clone();
                    self.spawn_request(self.timeouts.content(), async move {
                        content.fetch_narration(&topic).await
                    }, move |outcome| Event::NarrationReady { request, outcome });
                }
                SideEffect::CommitReminder { request, text, kind } => {
                    let reminders = self.services.reminders.clone();
                    self.spawn_request(self.timeouts.store(), async move {
                        reminders.commit(&text, kind).await
                    }, move |outcome| Event::ReminderCommitted { request, outcome });
                }
                SideEffect::ArmTimer { timer, after } => {
                    let tx = self.sender.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(after).await;
                        let _ = tx.send(Event::TimerElapsed { timer });
                    });
                }
            }
        }
    }

    /// Runs an external call with a hard deadline; expiry is reported as
    /// `ServiceError::Timeout`, identical to an explicit failure.
    fn spawn_request<T, Fut, F>(&self, deadline: Duration, call: Fut, into_event: F)
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
        F: FnOnce(Result<T, ServiceError>) -> Event + Send + 'static,
    {
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let outcome = match tokio::time::timeout(deadline, call).await {
                Ok(result) => result,
                Err(elapsed) => Err(ServiceError::from(elapsed)),
            };
            let _ = tx.send(into_event(outcome));
        });
    }
}
