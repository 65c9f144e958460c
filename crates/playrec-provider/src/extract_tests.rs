use super::*;
use crate::family::ProviderFamily;

fn openai() -> &'static dyn WireFormat {
    ProviderFamily::OpenAICompatible.wire()
}

#[test]
fn test_openai_event_stream_concatenates_deltas() {
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"foo\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"bar\"}}]}\n\ndata: [DONE]\n";
    let text = extract_content(openai(), Some("text/event-stream"), body).unwrap();
    assert_eq!(text, "foobar");
}

#[test]
fn test_stream_stops_at_done() {
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\ndata: [DONE]\ndata: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n";
    assert_eq!(extract_content(openai(), None, body).unwrap(), "a");
}

#[test]
fn test_json_object() {
    let body = r#"{"choices":[{"message":{"content":"await page.click('#go');"}}]}"#;
    let text = extract_content(openai(), Some("application/json"), body).unwrap();
    assert_eq!(text, "await page.click('#go');");
}

#[test]
fn test_json_without_content_type() {
    let body = r#"{"choices":[{"message":{"content":"x"}}]}"#;
    assert_eq!(extract_content(openai(), None, body).unwrap(), "x");
}

#[test]
fn test_json_missing_content_is_malformed() {
    let body = r#"{"error":{"message":"model not loaded"}}"#;
    let err = extract_content(openai(), Some("application/json"), body).unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[test]
fn test_mislabelled_stream_falls_through() {
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n";
    assert_eq!(extract_content(openai(), Some("application/json"), body).unwrap(), "ok");
}

#[test]
fn test_raw_text_fallback() {
    let body = "  await page.goto('https://example.com');  \n";
    let text = extract_content(openai(), Some("text/plain"), body).unwrap();
    assert_eq!(text, "await page.goto('https://example.com');");
}

#[test]
fn test_empty_body_is_malformed() {
    let err = extract_content(openai(), None, "   \n").unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[test]
fn test_stream_without_content_is_malformed() {
    let body = "data: {\"choices\":[{\"delta\":{}}]}\n\ndata: [DONE]\n";
    assert!(extract_content(openai(), None, body).is_err());
}

#[test]
fn test_anthropic_stream() {
    let body = concat!(
        "event: message_start\n",
        "data: {\"type\":\"message_start\",\"message\":{}}\n\n",
        "event: content_block_delta\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"await \"}}\n\n",
        "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"page\"}}\n\n",
        "data: {\"type\":\"message_stop\"}\n"
    );
    let text = extract_content(ProviderFamily::Anthropic.wire(), None, body).unwrap();
    assert_eq!(text, "await page");
}

#[test]
fn test_gemini_stream() {
    let body = concat!(
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"one \"}]}}]}\n",
        "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"two\"}]}}]}\n"
    );
    let text = extract_content(ProviderFamily::Gemini.wire(), None, body).unwrap();
    assert_eq!(text, "one two");
}
