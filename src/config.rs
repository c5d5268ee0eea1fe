use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV: &str = "SMART_HOME_VOICE_CONFIG";

/// Top-level configuration. Every field has a default so a partial JSON file
/// (or none at all) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub wake: WakeConfig,
    pub recognition: RecognitionConfig,
    pub speech: SpeechConfig,
    pub timeouts: TimeoutConfig,
    pub gemini: GeminiConfig,
    pub firestore: FirestoreConfig,
    pub tts: TtsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WakeConfig {
    /// Accepted spellings, compared lower-case.
    pub phrases: Vec<String>,
    /// Trailing transcript window (in characters) scanned for a phrase.
    pub window_chars: usize,
}

impl Default for WakeConfig {
    fn default() -> Self {
        Self {
            phrases: vec!["olá smart home".to_string(), "ola smart home".to_string()],
            window_chars: 40,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language: "pt-BR".to_string(),
        }
    }
}

/// Fixed lines and playback rates used by the dialogue.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub rate: f32,
    /// Long-form narration plays faster than conversational replies.
    pub narration_rate: f32,
    pub acknowledgement: String,
    pub apology: String,
    pub fallback: String,
    pub store_failed: String,
    pub narration_failed: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            narration_rate: 1.2,
            acknowledgement: "Pois não?".to_string(),
            apology: "Desculpe, não entendi.".to_string(),
            fallback: "Desculpe, tive um problema para processar o pedido.".to_string(),
            store_failed: "Desculpe, não consegui salvar o lembrete.".to_string(),
            narration_failed: "Desculpe, não consegui buscar as notícias agora.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub classifier_ms: u64,
    pub content_ms: u64,
    pub store_ms: u64,
    /// Backoff before re-arming ambient listening after a recognizer error.
    pub ambient_retry_ms: u64,
    /// Delay before the single retry of a rejected recognizer start.
    pub start_retry_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            classifier_ms: 8_000,
            content_ms: 15_000,
            store_ms: 5_000,
            ambient_retry_ms: 1_000,
            start_retry_ms: 300,
        }
    }
}

impl TimeoutConfig {
    pub fn classifier(&self) -> Duration {
        Duration::from_millis(self.classifier_ms)
    }

    pub fn content(&self) -> Duration {
        Duration::from_millis(self.content_ms)
    }

    pub fn store(&self) -> Duration {
        Duration::from_millis(self.store_ms)
    }

    pub fn ambient_retry(&self) -> Duration {
        Duration::from_millis(self.ambient_retry_ms)
    }

    pub fn start_retry(&self) -> Duration {
        Duration::from_millis(self.start_retry_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub collection: String,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://firestore.googleapis.com".to_string(),
            project_id: None,
            api_key: None,
            collection: "smart_home_reminders".to_string(),
        }
    }
}

/// External text-to-speech program. With no program the console speaker is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub program: Option<String>,
    pub rate_flag: String,
    pub words_per_minute: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            program: None,
            rate_flag: "-r".to_string(),
            words_per_minute: 175,
        }
    }
}

impl VoiceConfig {
    /// Defaults, overlaid by the file named in `SMART_HOME_VOICE_CONFIG`, then
    /// by credential environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_path(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(project) = non_empty("FIRESTORE_PROJECT_ID") {
            self.firestore.project_id = Some(project);
        }
        if let Some(key) = non_empty("FIRESTORE_API_KEY") {
            self.firestore.api_key = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "speech": {{ "narration_rate": 1.5 }}, "timeouts": {{ "classifier_ms": 250 }} }}"#
        )
        .unwrap();

        let config = VoiceConfig::from_path(file.path()).unwrap();
        assert_eq!(config.speech.narration_rate, 1.5);
        assert_eq!(config.speech.rate, 1.0);
        assert_eq!(config.timeouts.classifier(), Duration::from_millis(250));
        assert_eq!(config.wake.window_chars, 40);
        assert_eq!(config.firestore.collection, "smart_home_reminders");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = VoiceConfig::from_path(Path::new("/nonexistent/voice.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn env_overrides_credentials_but_ignores_blanks() {
        let mut config = VoiceConfig::default();
        config.apply_env(|key| match key {
            "GEMINI_API_KEY" => Some("g-key".to_string()),
            "FIRESTORE_PROJECT_ID" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.gemini.api_key.as_deref(), Some("g-key"));
        assert!(config.firestore.project_id.is_none());
    }
}
