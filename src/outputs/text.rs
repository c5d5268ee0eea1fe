use crate::error::EngineError;
use crate::speech::{SynthesisEngine, SynthesisSink};

/// Prints utterances instead of playing them. Playback completes immediately.
#[derive(Debug, Default)]
pub struct ConsoleSpeaker;

impl SynthesisEngine for ConsoleSpeaker {
    fn speak(&mut self, text: &str, rate: f32, done: SynthesisSink) -> Result<(), EngineError> {
        println!("[SPEECH-{:?} x{:.1}] {}", done.utterance(), rate, text);
        done.finish();
        Ok(())
    }

    fn cancel(&mut self) {}
}
