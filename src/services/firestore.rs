use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

use crate::config::FirestoreConfig;
use crate::error::ServiceError;
use crate::kernel::intent::ReminderKind;
use crate::services::ReminderStore;

/// Reminder store backed by the Firestore REST `createDocument` call.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Client,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
    collection: String,
}

impl FirestoreStore {
    /// Only available when a project is configured.
    pub fn from_config(config: &FirestoreConfig) -> Option<Self> {
        let project_id = config.project_id.clone().filter(|p| !p.trim().is_empty())?;
        Some(Self {
            client: Client::builder().build().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id,
            api_key: config.api_key.clone(),
            collection: config.collection.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}",
            self.base_url, self.project_id, self.collection
        )
    }
}

/// Document body with the dashboard's field layout: `text`, `type`,
/// `time` (local `HH:MM`) and `createdAt`.
pub fn reminder_document(text: &str, kind: ReminderKind, now: DateTime<Utc>) -> Value {
    let local = now.with_timezone(&Local);
    json!({
        "fields": {
            "text": { "stringValue": text },
            "type": { "stringValue": kind.as_wire() },
            "time": { "stringValue": local.format("%H:%M").to_string() },
            "createdAt": { "timestampValue": now.to_rfc3339() }
        }
    })
}

#[async_trait]
impl ReminderStore for FirestoreStore {
    async fn commit(&self, text: &str, kind: ReminderKind) -> Result<(), ServiceError> {
        let mut request = self
            .client
            .post(self.endpoint())
            .json(&reminder_document(text, kind, Utc::now()));
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        info!("Reminder stored in '{}'", self.collection);
        Ok(())
    }
}
