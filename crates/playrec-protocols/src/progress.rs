//! Batch generation progress events.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Initializing,
    Analyzing,
    Connecting,
    Generating,
    Processing,
    Completed,
    Error,
}

impl ProgressStage {
    /// Percentage shown for the stage.
    pub fn percent(&self) -> u8 {
        match self {
            ProgressStage::Initializing => 0,
            ProgressStage::Analyzing => 10,
            ProgressStage::Connecting => 30,
            ProgressStage::Generating => 50,
            ProgressStage::Processing => 80,
            ProgressStage::Completed | ProgressStage::Error => 100,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressStage::Completed | ProgressStage::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub session_id: String,
    pub stage: ProgressStage,
    pub progress_percent: u8,
    pub details: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl ProgressEvent {
    pub fn new(session_id: impl Into<String>, stage: ProgressStage, details: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            stage,
            progress_percent: stage.percent(),
            details: details.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Receiver of progress events. Reporting is best effort and never fails the caller.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, event: ProgressEvent);
}

/// A sink bound to one session id.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    session_id: String,
}

impl ProgressReporter {
    pub fn new(sink: Arc<dyn ProgressSink>, session_id: impl Into<String>) -> Self {
        Self {
            sink,
            session_id: session_id.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn report(&self, stage: ProgressStage, details: impl Into<String>) {
        self.sink
            .report(ProgressEvent::new(&self.session_id, stage, details))
            .await;
    }
}
