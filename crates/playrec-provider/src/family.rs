//! Provider families and the wire format each one speaks.

use serde_json::Value;
use std::str::FromStr;

use playrec_protocols::{ProviderError, ProviderSettings};

use crate::anthropic::AnthropicWire;
use crate::gemini::GeminiWire;
use crate::openai::OpenAiWire;

/// An HTTP request ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub url: String,
    /// Extra headers; the JSON content type is added by the client.
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// Request shaping and response extraction for one family.
pub trait WireFormat: Send + Sync {
    fn build_request(
        &self,
        prompt: &str,
        settings: &ProviderSettings,
        max_tokens: u32,
    ) -> Result<PreparedRequest, ProviderError>;

    /// Content of a complete (non-streamed) JSON response.
    fn extract_json(&self, response: Value) -> Option<String>;

    /// Text carried by one `data:` event of a stream.
    fn extract_sse_event(&self, event: Value) -> Option<String>;
}

/// The closed set of request/response schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    OpenAICompatible,
    Gemini,
    Anthropic,
}

impl ProviderFamily {
    pub fn wire(&self) -> &'static dyn WireFormat {
        match self {
            ProviderFamily::OpenAICompatible => &OpenAiWire,
            ProviderFamily::Gemini => &GeminiWire,
            ProviderFamily::Anthropic => &AnthropicWire,
        }
    }
}

/// Provider names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownProvider {
    OpenAI,
    LmStudio,
    Ollama,
    Gemini,
    Anthropic,
}

impl KnownProvider {
    pub fn name(&self) -> &'static str {
        match self {
            KnownProvider::OpenAI => "openai",
            KnownProvider::LmStudio => "lmstudio",
            KnownProvider::Ollama => "ollama",
            KnownProvider::Gemini => "gemini",
            KnownProvider::Anthropic => "anthropic",
        }
    }

    pub fn family(&self) -> ProviderFamily {
        match self {
            KnownProvider::OpenAI | KnownProvider::LmStudio | KnownProvider::Ollama => {
                ProviderFamily::OpenAICompatible
            }
            KnownProvider::Gemini => ProviderFamily::Gemini,
            KnownProvider::Anthropic => ProviderFamily::Anthropic,
        }
    }

    /// Cloud vendors need an API key; local servers do not.
    pub fn requires_credential(&self) -> bool {
        matches!(
            self,
            KnownProvider::OpenAI | KnownProvider::Gemini | KnownProvider::Anthropic
        )
    }
}

impl FromStr for KnownProvider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(KnownProvider::OpenAI),
            "lmstudio" => Ok(KnownProvider::LmStudio),
            "ollama" => Ok(KnownProvider::Ollama),
            "gemini" => Ok(KnownProvider::Gemini),
            "anthropic" => Ok(KnownProvider::Anthropic),
            _ => Err(ProviderError::UnsupportedProvider(s.to_string())),
        }
    }
}

pub(crate) fn encode<T: serde::Serialize>(body: &T) -> Result<Value, ProviderError> {
    serde_json::to_value(body).map_err(|e| ProviderError::InvalidRequest(e.to_string()))
}
