use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::GeminiConfig;
use crate::error::ServiceError;
use crate::kernel::intent::{Intent, IntentAction, ReminderKind};
use crate::services::{ContentService, IntentClassifier};

const CLASSIFIER_INSTRUCTION: &str = "Analise comandos Smart Home. APENAS JSON.";
const NARRATOR_INSTRUCTION: &str = "Você é o \"Smart Home Assistant\", uma IA de painel doméstico em Maricá-RJ. \
Responda em português, em texto corrido próprio para ser lido em voz alta, sem markdown.";

/// Gemini `generateContent` client used both as classifier and narrator.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

/// Reply shape enforced by the classifier's response schema.
#[derive(Debug, Deserialize, Serialize)]
struct ClassifierReply {
    action: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    response: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> Self {
        Self {
            // Request deadlines are enforced by the reactor.
            client: Client::builder().build().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        }
    }

    /// Only available with an API key.
    pub fn from_config(config: &GeminiConfig) -> Option<Self> {
        config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .map(|key| Self::new(config, key))
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, body: Value) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        let bytes = response.bytes().await?;
        first_text(&bytes).map_err(|e| ServiceError::Decode(format!("{:#}", e)))
    }
}

fn classifier_request(transcript: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": CLASSIFIER_INSTRUCTION }] },
        "contents": [{ "role": "user", "parts": [{ "text": transcript }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "action": { "type": "STRING", "enum": ["add_reminder", "chat", "read_news_init"] },
                    "text": { "type": "STRING" },
                    "type": { "type": "STRING", "enum": ["info", "alert", "action"] },
                    "response": { "type": "STRING" }
                },
                "required": ["action", "response"]
            }
        }
    })
}

fn narration_request(topic: &str) -> Value {
    let prompt = format!(
        "Narre as notícias mais recentes sobre \"{}\" em até quatro frases curtas.",
        topic
    );
    json!({
        "systemInstruction": { "parts": [{ "text": NARRATOR_INSTRUCTION }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }]
    })
}

/// Text of the first candidate part.
fn first_text(body: &[u8]) -> anyhow::Result<String> {
    let resp: GenerateResponse = serde_json::from_slice(body).context("decode generateContent JSON")?;
    resp.candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .ok_or_else(|| anyhow!("no text in generateContent response"))
}

fn parse_intent(raw: &str) -> Result<Intent, ServiceError> {
    let reply: ClassifierReply = serde_json::from_str(raw.trim())
        .map_err(|e| ServiceError::Decode(format!("classifier reply: {}", e)))?;

    let action = match reply.action.as_str() {
        "add_reminder" => IntentAction::AddReminder,
        "chat" => IntentAction::Chat,
        "read_news_init" => IntentAction::InitiateFollowTopic,
        other => return Err(ServiceError::Decode(format!("unknown action '{}'", other))),
    };

    let text = reply.text.filter(|t| !t.trim().is_empty());
    let reminder_kind = match action {
        IntentAction::AddReminder => Some(
            reply
                .kind
                .as_deref()
                .and_then(ReminderKind::from_wire)
                .unwrap_or_default(),
        ),
        _ => None,
    };

    Ok(Intent {
        action,
        text,
        reminder_kind,
        spoken_response: reply.response,
    })
}

#[async_trait]
impl IntentClassifier for GeminiClient {
    async fn classify(&self, transcript: &str) -> Result<Intent, ServiceError> {
        let raw = self.generate(classifier_request(transcript)).await?;
        debug!("Classifier reply: {}", raw);
        parse_intent(&raw)
    }
}

#[async_trait]
impl ContentService for GeminiClient {
    async fn fetch_narration(&self, topic: &str) -> Result<String, ServiceError> {
        let text = self.generate(narration_request(topic)).await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ServiceError::Decode("empty narration".into()));
        }
        Ok(text)
    }
}
