//! Capture surface errors.

use thiserror::Error;

use crate::session::SurfaceId;

#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    #[error("Surface unreachable: {0}")]
    SurfaceUnreachable(SurfaceId),

    #[error("Surface {surface} did not answer within {secs} seconds")]
    RestoreTimeout { surface: SurfaceId, secs: u64 },

    #[error("Surface rejected request: {0}")]
    Rejected(String),

    #[error("Surface connection closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable() {
        let err = SurfaceError::SurfaceUnreachable(SurfaceId(42));
        assert!(err.to_string().contains("unreachable"));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn test_restore_timeout() {
        let err = SurfaceError::RestoreTimeout {
            surface: SurfaceId(3),
            secs: 15,
        };
        assert!(err.to_string().contains("15 seconds"));
    }

    #[test]
    fn test_closed() {
        assert!(SurfaceError::Closed.to_string().contains("closed"));
    }
}
