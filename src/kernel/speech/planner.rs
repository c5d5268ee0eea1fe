use crate::config::SpeechConfig;

/// What the controller wants said, before it is turned into text and rate.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechCue {
    Acknowledge,
    /// Recognizer failed or heard nothing.
    Apologize,
    /// Classifier failed; also used for unusable intents.
    Fallback,
    StoreFailed,
    NarrationFailed,
    Response(String),
    Narration(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpokenLine {
    pub text: String,
    pub rate: f32,
}

pub struct SpeechPlanner {
    lines: SpeechConfig,
}

impl SpeechPlanner {
    pub fn new(lines: SpeechConfig) -> Self {
        Self { lines }
    }

    pub fn fallback_text(&self) -> &str {
        &self.lines.fallback
    }

    pub fn plan(&self, cue: SpeechCue) -> SpokenLine {
        let normal = |text: &str| SpokenLine {
            text: text.to_string(),
            rate: self.lines.rate,
        };

        match cue {
            SpeechCue::Acknowledge => normal(&self.lines.acknowledgement),
            SpeechCue::Apologize => normal(&self.lines.apology),
            SpeechCue::Fallback => normal(&self.lines.fallback),
            SpeechCue::StoreFailed => normal(&self.lines.store_failed),
            SpeechCue::NarrationFailed => normal(&self.lines.narration_failed),
            SpeechCue::Response(text) => {
                // A blank reply would leave the user in silence.
                if text.trim().is_empty() {
                    normal(&self.lines.fallback)
                } else {
                    normal(text.trim())
                }
            }
            SpeechCue::Narration(text) => {
                if text.trim().is_empty() {
                    normal(&self.lines.narration_failed)
                } else {
                    SpokenLine {
                        text: text.trim().to_string(),
                        rate: self.lines.narration_rate,
                    }
                }
            }
        }
    }
}
