//! LLM Provider errors.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Missing API key for provider: {provider}")]
    MissingCredential { provider: String },

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("HTTP error: {status} - {body}")]
    HttpError { status: u16, body: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Whether repeating the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) => true,
            ProviderError::HttpError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
