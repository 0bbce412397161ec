//! Pipeline event broadcaster.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::phase::Phase;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    PhaseChanged {
        from: Phase,
        to: Phase,
        timestamp: DateTime<Utc>,
    },
    /// A successful auto run finished; the draft may be exported.
    ExportReady {
        signal: u64,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Clone)]
pub struct PipelineEventBroadcaster {
    sender: Arc<broadcast::Sender<PipelineEvent>>,
}

impl PipelineEventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn send(&self, event: PipelineEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }
}

impl Default for PipelineEventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
