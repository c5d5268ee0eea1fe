use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ServiceError;
use crate::kernel::intent::ReminderKind;
use crate::services::ReminderStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReminder {
    pub text: String,
    pub kind: ReminderKind,
    pub created_at: DateTime<Utc>,
}

/// Process-local reminder store used when Firestore is not configured.
#[derive(Debug, Default)]
pub struct InMemoryReminderStore {
    entries: Mutex<Vec<StoredReminder>>,
}

impl InMemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first, like the dashboard list.
    pub fn reminders(&self) -> Vec<StoredReminder> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().rev().cloned().collect()
    }
}

#[async_trait]
impl ReminderStore for InMemoryReminderStore {
    async fn commit(&self, text: &str, kind: ReminderKind) -> Result<(), ServiceError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(StoredReminder {
            text: text.to_string(),
            kind,
            created_at: Utc::now(),
        });
        Ok(())
    }
}
