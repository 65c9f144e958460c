//! Frames exchanged with a page over its WebSocket.

use serde::{Deserialize, Serialize};

use playrec_protocols::{CapturedStep, SurfaceMessage, SurfaceReply};

/// Core to page: one [`SurfaceMessage`] tagged with the id its reply must carry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundFrame {
    pub request_id: String,
    #[serde(flatten)]
    pub message: SurfaceMessage,
}

/// Page to core.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundFrame {
    /// Reply to an [`OutboundFrame`].
    Ack {
        #[serde(rename = "requestId")]
        request_id: String,
        #[serde(default)]
        success: bool,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
    /// A captured interaction, same as `POST /recording/steps`.
    AddStep { step: CapturedStep },
}

impl InboundFrame {
    pub fn into_reply(self) -> Option<(String, SurfaceReply)> {
        match self {
            InboundFrame::Ack {
                request_id,
                success,
                status,
                error,
            } => Some((
                request_id,
                SurfaceReply {
                    success,
                    status,
                    error,
                },
            )),
            InboundFrame::AddStep { .. } => None,
        }
    }
}
