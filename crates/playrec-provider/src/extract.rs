//! Response extraction: JSON object, then event stream, then raw text.

use serde_json::Value;

use playrec_protocols::ProviderError;

use crate::family::WireFormat;

/// Pull the completion text out of a response body.
///
/// The content type only hints; a body labelled JSON that does not parse
/// still goes through the stream and raw-text fallbacks.
/// A body that parses as a JSON object but carries no completion is
/// rejected outright; it is never re-read as a stream or raw text.
pub fn extract_content(
    wire: &dyn WireFormat,
    content_type: Option<&str>,
    body: &str,
) -> Result<String, ProviderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ProviderError::MalformedResponse("empty response body".to_string()));
    }

    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return wire
            .extract_json(value)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::MalformedResponse("JSON response missing content".to_string())
            });
    }

    if content_type.is_some_and(|ct| ct.contains("json")) {
        tracing::debug!("Body labelled JSON did not parse, trying event stream");
    }

    match extract_event_stream(wire, body) {
        Some(text) if !text.is_empty() => Ok(text),
        Some(_) => Err(ProviderError::MalformedResponse(
            "event stream carried no content".to_string(),
        )),
        None => Ok(trimmed.to_string()),
    }
}

/// Concatenate the text of every `data:` event up to `[DONE]`.
///
/// Returns `None` when the body has no `data:` lines at all.
fn extract_event_stream(wire: &dyn WireFormat, body: &str) -> Option<String> {
    let mut saw_event = false;
    let mut text = String::new();

    for line in body.lines() {
        let Some(payload) = line.trim().strip_prefix("data:") else {
            continue;
        };
        saw_event = true;
        let payload = payload.trim();
        if payload == "[DONE]" {
            break;
        }
        if payload.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(event) => {
                if let Some(piece) = wire.extract_sse_event(event) {
                    text.push_str(&piece);
                }
            }
            Err(e) => tracing::debug!("Skipping unparseable stream event: {}", e),
        }
    }

    saw_event.then_some(text)
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
