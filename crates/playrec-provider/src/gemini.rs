//! Gemini `generateContent` schema. The API key travels in the query string.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use playrec_protocols::{ProviderError, ProviderSettings};

use crate::family::{PreparedRequest, WireFormat, encode};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

pub(crate) struct GeminiWire;

impl WireFormat for GeminiWire {
    fn build_request(
        &self,
        prompt: &str,
        settings: &ProviderSettings,
        max_tokens: u32,
    ) -> Result<PreparedRequest, ProviderError> {
        let body = encode(&GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                max_output_tokens: max_tokens,
            },
        })?;

        let url = if settings.has_api_key() {
            let separator = if settings.api_url.contains('?') { '&' } else { '?' };
            format!("{}{}key={}", settings.api_url, separator, settings.api_key)
        } else {
            settings.api_url.clone()
        };

        Ok(PreparedRequest {
            url,
            headers: Vec::new(),
            body,
        })
    }

    fn extract_json(&self, response: Value) -> Option<String> {
        serde_json::from_value::<GenerateResponse>(response)
            .ok()?
            .first_text()
    }

    fn extract_sse_event(&self, event: Value) -> Option<String> {
        self.extract_json(event).filter(|t| !t.is_empty())
    }
}
