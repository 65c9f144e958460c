//! HTTP side of the provider adapter.

use std::time::Duration;
use tracing::{debug, warn};

use playrec_protocols::{ProviderError, ProviderSettings};

use crate::extract::extract_content;
use crate::family::KnownProvider;
use crate::sanitize::sanitize;

/// Token budget of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenBudget {
    /// A complete program skeleton for the first step.
    FirstStep,
    /// A single statement.
    Incremental,
    /// A complete program for all steps; uses the configured `max_tokens`.
    Batch,
}

impl TokenBudget {
    pub fn max_tokens(&self, settings: &ProviderSettings) -> u32 {
        match self {
            TokenBudget::FirstStep => 1000,
            TokenBudget::Incremental => 150,
            TokenBudget::Batch => settings.max_tokens,
        }
    }
}

/// Uniform `complete(prompt) -> text` over all supported providers.
#[derive(Clone, Default)]
pub struct ProviderAdapter {
    client: reqwest::Client,
}

impl ProviderAdapter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send `prompt` to the configured provider and return sanitized text.
    ///
    /// Credentials are checked before any network traffic.
    pub async fn complete(
        &self,
        prompt: &str,
        budget: TokenBudget,
        settings: &ProviderSettings,
    ) -> Result<String, ProviderError> {
        let provider: KnownProvider = settings.provider.parse()?;
        if provider.requires_credential() && !settings.has_api_key() {
            return Err(ProviderError::MissingCredential {
                provider: provider.name().to_string(),
            });
        }

        let wire = provider.family().wire();
        let request = wire.build_request(prompt, settings, budget.max_tokens(settings))?;
        let timeout_secs = settings.request_timeout_secs;

        debug!(
            "Calling {} model {} ({:?} budget)",
            provider.name(),
            settings.model_name,
            budget
        );

        let mut builder = self
            .client
            .post(&request.url)
            .timeout(Duration::from_secs(timeout_secs))
            .json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned HTTP {}", provider.name(), status.as_u16());
            return Err(ProviderError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout_secs))?;

        let raw = extract_content(wire, content_type.as_deref(), &body)?;
        let code = sanitize(&raw);
        if code.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "completion was empty after cleanup".to_string(),
            ));
        }
        Ok(code)
    }
}

/// The request URL is stripped: Gemini carries the API key in its query string.
fn transport_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::Network(e.without_url().to_string())
    }
}

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod tests;
