//! OpenAI-compatible chat completions schema (OpenAI, LM Studio, Ollama).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use playrec_protocols::{ProviderError, ProviderSettings};

use crate::family::{PreparedRequest, WireFormat, encode};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceContent>,
    #[serde(default)]
    delta: Option<ChoiceContent>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceContent {
    #[serde(default)]
    content: Option<String>,
}

pub(crate) struct OpenAiWire;

impl WireFormat for OpenAiWire {
    fn build_request(
        &self,
        prompt: &str,
        settings: &ProviderSettings,
        max_tokens: u32,
    ) -> Result<PreparedRequest, ProviderError> {
        let body = encode(&ChatRequest {
            model: &settings.model_name,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: settings.temperature,
            max_tokens,
            stream: false,
        })?;

        let mut headers = Vec::new();
        if settings.has_api_key() {
            headers.push(("Authorization", format!("Bearer {}", settings.api_key)));
        }

        Ok(PreparedRequest {
            url: settings.api_url.clone(),
            headers,
            body,
        })
    }

    fn extract_json(&self, response: Value) -> Option<String> {
        let response: ChatResponse = serde_json::from_value(response).ok()?;
        let choice = response.choices.into_iter().next()?;
        choice
            .message
            .and_then(|m| m.content)
            .or(choice.text)
            .or_else(|| choice.delta.and_then(|d| d.content))
    }

    fn extract_sse_event(&self, event: Value) -> Option<String> {
        let chunk: ChatResponse = serde_json::from_value(event).ok()?;
        let text: String = chunk
            .choices
            .into_iter()
            .filter_map(|choice| {
                choice
                    .delta
                    .and_then(|d| d.content)
                    .or_else(|| choice.message.and_then(|m| m.content))
                    .or(choice.text)
            })
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}
