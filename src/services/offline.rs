use async_trait::async_trait;

use crate::error::ServiceError;
use crate::kernel::intent::{Intent, ReminderKind};
use crate::services::{ContentService, IntentClassifier};

/// Deterministic keyword classifier used when no Gemini key is configured.
pub struct KeywordClassifier;

const REMINDER_KEYWORDS: [&str; 2] = ["lembrete", "lembrar"];
const NEWS_KEYWORDS: [&str; 3] = ["notícias", "noticias", "notícia"];

/// Text after the first keyword found, with separators trimmed.
fn after_keyword(text: &str, keywords: &[&str]) -> Option<String> {
    let lowered = text.to_lowercase();
    keywords.iter().find_map(|k| {
        lowered.find(k).map(|at| {
            let start = at + k.len();
            // Lower-casing can shift byte offsets; fall back to the lowered text.
            let rest = text.get(start..).unwrap_or(&lowered[start..]);
            rest.trim_start_matches(|c: char| c == ':' || c == ',' || c.is_whitespace())
                .to_string()
        })
    })
}

fn topic_of(rest: &str) -> Option<String> {
    let rest = rest.trim();
    let rest = ["sobre ", "de ", "do ", "da "]
        .iter()
        .find_map(|p| rest.strip_prefix(p))
        .unwrap_or(rest)
        .trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, transcript: &str) -> Result<Intent, ServiceError> {
        let transcript = transcript.trim();
        let lowered = transcript.to_lowercase();

        if let Some(rest) = after_keyword(transcript, &REMINDER_KEYWORDS) {
            let text = rest.trim();
            if text.is_empty() {
                return Ok(Intent::chat("Qual é o lembrete?"));
            }
            let kind = if lowered.contains("urgente") {
                ReminderKind::Alert
            } else {
                ReminderKind::Info
            };
            return Ok(Intent::add_reminder(text, kind, format!("Adicionado: {}", text)));
        }

        if let Some(rest) = after_keyword(transcript, &NEWS_KEYWORDS) {
            return Ok(match topic_of(&rest) {
                Some(topic) => Intent::follow_topic(Some(topic.clone()), format!("Buscando notícias sobre {}", topic)),
                None => Intent::follow_topic(None, "Qual notícia?"),
            });
        }

        Ok(Intent::chat(format!("Você disse: {}", transcript)))
    }
}

/// Content service stand-in that always reports itself unavailable.
pub struct OfflineContent;

#[async_trait]
impl ContentService for OfflineContent {
    async fn fetch_narration(&self, _topic: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Unavailable("content service not configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::intent::IntentAction;

    #[tokio::test]
    async fn reminder_command() {
        let intent = KeywordClassifier.classify("adicione lembrete: comprar leite").await.unwrap();
        assert_eq!(
            intent,
            Intent::add_reminder("comprar leite", ReminderKind::Info, "Adicionado: comprar leite")
        );
    }

    #[tokio::test]
    async fn bare_news_asks_for_topic() {
        let intent = KeywordClassifier.classify("notícias").await.unwrap();
        assert_eq!(intent.action, IntentAction::InitiateFollowTopic);
        assert!(intent.text.is_none());

        let with_topic = KeywordClassifier.classify("notícias sobre eleições").await.unwrap();
        assert_eq!(with_topic.text.as_deref(), Some("eleições"));
    }

    #[tokio::test]
    async fn anything_else_is_chat() {
        let intent = KeywordClassifier.classify("que horas são").await.unwrap();
        assert_eq!(intent.action, IntentAction::Chat);
    }
}
