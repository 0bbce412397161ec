//! Ingestion event broadcaster for real-time upload status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::inputs::FileCategory;

/// What happened to a file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IngestEventKind {
    Queued,
    Progress,
    Completed,
    Failed,
    Aborted,
    Rejected,
}

impl std::fmt::Display for IngestEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestEventKind::Queued => write!(f, "Queued"),
            IngestEventKind::Progress => write!(f, "Reading"),
            IngestEventKind::Completed => write!(f, "Completed"),
            IngestEventKind::Failed => write!(f, "Failed"),
            IngestEventKind::Aborted => write!(f, "Aborted"),
            IngestEventKind::Rejected => write!(f, "Rejected"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestEvent {
    /// Absent for files rejected before an entity was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    pub file_name: String,
    pub category: FileCategory,
    pub kind: IngestEventKind,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl IngestEvent {
    pub fn new(
        file_id: &str,
        file_name: &str,
        category: FileCategory,
        kind: IngestEventKind,
        progress: u8,
    ) -> Self {
        Self {
            file_id: Some(file_id.to_string()),
            file_name: file_name.to_string(),
            category,
            kind,
            progress,
            message: None,
            timestamp: Utc::now(),
        }
    }

    pub fn rejected(file_name: &str, category: FileCategory, message: &str) -> Self {
        Self {
            file_id: None,
            file_name: file_name.to_string(),
            category,
            kind: IngestEventKind::Rejected,
            progress: 0,
            message: Some(message.to_string()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }
}

#[derive(Clone)]
pub struct IngestEventBroadcaster {
    sender: Arc<broadcast::Sender<IngestEvent>>,
}

impl IngestEventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: IngestEvent) {
        // No active receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IngestEvent> {
        self.sender.subscribe()
    }
}

impl Default for IngestEventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
