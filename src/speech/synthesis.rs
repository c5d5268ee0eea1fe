use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::kernel::event::{Event, UtteranceId};

/// Platform text-to-speech binding.
pub trait SynthesisEngine: Send {
    /// Begin playback. The engine drops `done` (or calls [`SynthesisSink::finish`])
    /// when playback ends for any reason.
    fn speak(&mut self, text: &str, rate: f32, done: SynthesisSink) -> Result<(), EngineError>;
    fn cancel(&mut self);
}

/// Completion handle for one `speak` call.
///
/// Reports `SpeechDone` exactly once: on `finish`, or when dropped unfinished
/// (engine error, cancellation, panic in a playback task).
#[derive(Debug)]
pub struct SynthesisSink {
    utterance: UtteranceId,
    tx: mpsc::UnboundedSender<Event>,
}

impl SynthesisSink {
    pub fn new(utterance: UtteranceId, tx: mpsc::UnboundedSender<Event>) -> Self {
        Self { utterance, tx }
    }

    pub fn utterance(&self) -> UtteranceId {
        self.utterance
    }

    pub fn finish(self) {}
}

impl Drop for SynthesisSink {
    fn drop(&mut self) {
        let _ = self.tx.send(Event::SpeechDone {
            utterance: self.utterance,
        });
    }
}

pub struct SynthesisChannel {
    engine: Box<dyn SynthesisEngine>,
}

impl SynthesisChannel {
    pub fn new(engine: Box<dyn SynthesisEngine>) -> Self {
        Self { engine }
    }

    /// Cancels whatever is playing, then plays `text`.
    pub fn speak(&mut self, utterance: UtteranceId, text: &str, rate: f32, tx: &mpsc::UnboundedSender<Event>) {
        self.engine.cancel();
        debug!("Speaking {:?} at rate {:.2}", utterance, rate);
        if let Err(e) = self.engine.speak(text, rate, SynthesisSink::new(utterance, tx.clone())) {
            // The sink went down with the failed call, so completion is already queued.
            warn!("Speech {:?} failed to play: {}", utterance, e);
        }
    }

    pub fn cancel(&mut self) {
        self.engine.cancel();
    }
}
