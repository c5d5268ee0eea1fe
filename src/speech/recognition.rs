use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::kernel::event::{Event, RecognitionEvent, RecognitionFault, RecognitionMode, RecognitionResult, SessionId};

/// How a run is configured on the platform engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub mode: RecognitionMode,
    pub continuous: bool,
    pub interim_results: bool,
    pub language: String,
}

impl RecognitionOptions {
    pub fn for_mode(mode: RecognitionMode, language: &str) -> Self {
        let ambient = mode == RecognitionMode::Ambient;
        Self {
            mode,
            continuous: ambient,
            interim_results: ambient,
            language: language.to_string(),
        }
    }
}

/// Platform speech recognizer binding.
///
/// `start` may fail with [`EngineError::Busy`] when the previous run has not
/// been released yet; callers treat that as recoverable.
pub trait RecognitionEngine: Send {
    fn start(&mut self, options: &RecognitionOptions, sink: RecognitionSink) -> Result<(), EngineError>;
    fn stop(&mut self);
}

/// Event channel handed to the engine for one run.
///
/// Guarantees exactly one terminal event per run: after `end` or `error`,
/// everything else the engine emits for this run is dropped.
#[derive(Debug, Clone)]
pub struct RecognitionSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<Event>,
    closed: Arc<AtomicBool>,
}

impl RecognitionSink {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<Event>) -> Self {
        Self {
            session,
            tx,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn results(&self, results: Vec<RecognitionResult>) {
        if !self.is_closed() {
            self.send(RecognitionEvent::Results(results));
        }
    }

    pub fn end(&self) {
        self.terminate(RecognitionEvent::End);
    }

    pub fn error(&self, fault: RecognitionFault) {
        self.terminate(RecognitionEvent::Error(fault));
    }

    fn terminate(&self, event: RecognitionEvent) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.send(event);
        }
    }

    fn send(&self, event: RecognitionEvent) {
        let _ = self.tx.send(Event::Recognition {
            session: self.session,
            event,
        });
    }
}

/// Driver-side wrapper around the platform recognizer.
///
/// Mirrors the controller's `SessionHandle`: starting stops whatever run is
/// still live, and `stop` is idempotent.
pub struct RecognitionSession {
    engine: Box<dyn RecognitionEngine>,
    language: String,
    running: Option<SessionId>,
}

impl RecognitionSession {
    pub fn new(engine: Box<dyn RecognitionEngine>, language: impl Into<String>) -> Self {
        Self {
            engine,
            language: language.into(),
            running: None,
        }
    }

    pub fn running(&self) -> Option<SessionId> {
        self.running
    }

    /// Start a run. A rejected start is logged and returned, never fatal.
    pub fn start(
        &mut self,
        session: SessionId,
        mode: RecognitionMode,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<(), EngineError> {
        self.stop();

        let options = RecognitionOptions::for_mode(mode, &self.language);
        match self.engine.start(&options, RecognitionSink::new(session, tx.clone())) {
            Ok(()) => {
                debug!("Recognition {:?} started in {:?} mode", session, mode);
                self.running = Some(session);
                Ok(())
            }
            Err(e) => {
                warn!("Recognition {:?} failed to start: {}", session, e);
                Err(e)
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(session) = self.running.take() {
            debug!("Stopping recognition {:?}", session);
            self.engine.stop();
        }
    }

    /// Stop only if `session` is the live run.
    pub fn stop_session(&mut self, session: SessionId) {
        if self.running == Some(session) {
            self.stop();
        }
    }
}
