//! Anthropic Messages schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use playrec_protocols::{ProviderError, ProviderSettings};

use crate::family::{PreparedRequest, WireFormat, encode};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<TextBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct TextBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockStart { content_block: TextBlock },
    ContentBlockDelta { delta: TextBlock },
    #[serde(other)]
    Other,
}

pub(crate) struct AnthropicWire;

impl WireFormat for AnthropicWire {
    fn build_request(
        &self,
        prompt: &str,
        settings: &ProviderSettings,
        max_tokens: u32,
    ) -> Result<PreparedRequest, ProviderError> {
        let body = encode(&MessagesRequest {
            model: &settings.model_name,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: settings.temperature,
        })?;

        Ok(PreparedRequest {
            url: settings.api_url.clone(),
            headers: vec![
                ("x-api-key", settings.api_key.clone()),
                ("anthropic-version", ANTHROPIC_VERSION.to_string()),
            ],
            body,
        })
    }

    fn extract_json(&self, response: Value) -> Option<String> {
        serde_json::from_value::<MessagesResponse>(response)
            .ok()?
            .content
            .into_iter()
            .next()?
            .text
    }

    fn extract_sse_event(&self, event: Value) -> Option<String> {
        match serde_json::from_value::<StreamEvent>(event).ok()? {
            StreamEvent::ContentBlockDelta { delta } => delta.text,
            StreamEvent::ContentBlockStart { content_block } => content_block.text,
            StreamEvent::Other => None,
        }
        .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> ProviderSettings {
        ProviderSettings {
            provider: "anthropic".to_string(),
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            model_name: "claude-3-5-haiku-latest".to_string(),
            api_key: "sk-ant".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_headers_and_body() {
        let request = AnthropicWire.build_request("p", &settings(), 150).unwrap();
        assert!(request.headers.iter().any(|(k, v)| *k == "x-api-key" && v == "sk-ant"));
        assert!(
            request
                .headers
                .iter()
                .any(|(k, v)| *k == "anthropic-version" && v == "2023-06-01")
        );
        assert_eq!(request.body["max_tokens"], 150);
        assert_eq!(request.body["messages"][0]["content"], "p");
    }

    #[test]
    fn test_extract_first_block() {
        let body = json!({"content": [{"type": "text", "text": "await page.click('#a');"}]});
        assert_eq!(
            AnthropicWire.extract_json(body).as_deref(),
            Some("await page.click('#a');")
        );
    }

    #[test]
    fn test_extract_stream_events() {
        let delta = json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": "Hi"}});
        assert_eq!(AnthropicWire.extract_sse_event(delta).as_deref(), Some("Hi"));

        let start = json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}});
        assert_eq!(AnthropicWire.extract_sse_event(start), None);

        let stop = json!({"type": "message_stop"});
        assert_eq!(AnthropicWire.extract_sse_event(stop), None);
    }
}
