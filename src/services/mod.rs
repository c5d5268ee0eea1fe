//! External collaborators consumed by the reactor.

pub mod firestore;
pub mod llm;
pub mod memory;
pub mod offline;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::kernel::intent::{Intent, ReminderKind};

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, transcript: &str) -> Result<Intent, ServiceError>;
}

#[async_trait]
pub trait ContentService: Send + Sync {
    /// Speakable free-text narration about `topic`.
    async fn fetch_narration(&self, topic: &str) -> Result<String, ServiceError>;
}

#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn commit(&self, text: &str, kind: ReminderKind) -> Result<(), ServiceError>;
}

/// The collaborators the reactor calls, shared with spawned request tasks.
#[derive(Clone)]
pub struct Services {
    pub classifier: Arc<dyn IntentClassifier>,
    pub content: Arc<dyn ContentService>,
    pub reminders: Arc<dyn ReminderStore>,
}
