//! Capture surface contract: messages the core sends to a page and the replies it expects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::session::{SessionSnapshot, SurfaceId};

/// Load status of a surface as reported by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceStatus {
    Loading,
    Complete,
}

/// Payload of a `showGeneratedCode` push.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeNotice {
    pub code: String,
    pub is_first_step: bool,
    pub step_count: usize,
}

/// Core to surface messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SurfaceMessage {
    /// Readiness probe, answered with `{status: "ok"}`.
    Ping,
    RestoreRecordingState {
        state: SessionSnapshot,
    },
    ShowGeneratedCode(CodeNotice),
    ShowError {
        message: String,
    },
    UpdateStepCounter {
        count: usize,
    },
    ShowRestoreFailedNotification,
    ForceResetRecording,
}

impl SurfaceMessage {
    pub fn action(&self) -> &'static str {
        match self {
            SurfaceMessage::Ping => "ping",
            SurfaceMessage::RestoreRecordingState { .. } => "restoreRecordingState",
            SurfaceMessage::ShowGeneratedCode(_) => "showGeneratedCode",
            SurfaceMessage::ShowError { .. } => "showError",
            SurfaceMessage::UpdateStepCounter { .. } => "updateStepCounter",
            SurfaceMessage::ShowRestoreFailedNotification => "showRestoreFailedNotification",
            SurfaceMessage::ForceResetRecording => "forceResetRecording",
        }
    }
}

/// Surface to core acknowledgement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SurfaceReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            status: Some("ok".to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

/// A page context that owns a recording.
///
/// Implementations deliver one message and return the page's reply. They do
/// not apply per-operation deadlines; callers wrap each request in one.
#[async_trait]
pub trait Surface: Send + Sync {
    fn id(&self) -> SurfaceId;

    async fn request(&self, message: SurfaceMessage) -> Result<SurfaceReply, SurfaceError>;
}
