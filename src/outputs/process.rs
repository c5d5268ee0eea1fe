use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::TtsConfig;
use crate::error::EngineError;
use crate::speech::{SynthesisEngine, SynthesisSink};

/// Plays utterances through an external program such as `say` or `espeak`.
pub struct ProcessSpeaker {
    program: String,
    rate_flag: String,
    words_per_minute: u32,
    playing: Option<CancellationToken>,
}

impl ProcessSpeaker {
    pub fn new(program: impl Into<String>, config: &TtsConfig) -> Self {
        Self {
            program: program.into(),
            rate_flag: config.rate_flag.clone(),
            words_per_minute: config.words_per_minute,
            playing: None,
        }
    }

    fn words_per_minute(&self, rate: f32) -> u32 {
        (self.words_per_minute as f32 * rate.clamp(0.25, 4.0)).round() as u32
    }
}

impl SynthesisEngine for ProcessSpeaker {
    fn speak(&mut self, text: &str, rate: f32, done: SynthesisSink) -> Result<(), EngineError> {
        let mut child = Command::new(&self.program)
            .arg(&self.rate_flag)
            .arg(self.words_per_minute(rate).to_string())
            .arg(text)
            .kill_on_drop(true)
            .spawn()?;

        let token = CancellationToken::new();
        self.playing = Some(token.clone());

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    if let Err(e) = status {
                        warn!("Speech process failed: {}", e);
                    }
                }
                _ = token.cancelled() => {
                    let _ = child.kill().await;
                }
            }
            done.finish();
        });

        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(token) = self.playing.take() {
            token.cancel();
        }
    }
}
