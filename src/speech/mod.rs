//! Wrappers over the platform speech bindings.

pub mod recognition;
pub mod synthesis;

pub use recognition::{RecognitionEngine, RecognitionOptions, RecognitionSession, RecognitionSink};
pub use synthesis::{SynthesisChannel, SynthesisEngine, SynthesisSink};
