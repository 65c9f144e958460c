//! Session state machine errors.

use thiserror::Error;

use super::{ProviderError, StoreError};
use crate::session::SurfaceId;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("No recording in progress")]
    NotRecording,

    #[error("Surface {actual} does not own the recording (owner: {owner})")]
    SurfaceMismatch { owner: SurfaceId, actual: SurfaceId },

    #[error("Generation failed: {0}")]
    Generation(#[from] ProviderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
