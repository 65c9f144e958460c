use super::*;
use parking_lot::Mutex;
use serde_json::json;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

use crate::store::MemoryKvStore;
use playrec_protocols::{CapturedStep, ProgressEvent, ProgressSink, StepType};

fn lmstudio(url: String) -> ProviderSettings {
    ProviderSettings {
        provider: "lmstudio".to_string(),
        api_url: url,
        model_name: "local-model".to_string(),
        ..Default::default()
    }
}

fn click() -> Step {
    CapturedStep::new(StepType::Click, "#login")
        .with_url("https://example.com")
        .accept(0, 0, 0)
}

fn chat_reply(content: &str) -> serde_json::Value {
    json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
}

struct Collect(Mutex<Vec<ProgressEvent>>);

#[async_trait]
impl ProgressSink for Collect {
    async fn report(&self, event: ProgressEvent) {
        self.0.lock().push(event);
    }
}

#[tokio::test]
async fn test_first_step_uses_first_step_budget() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::body_partial_json(json!({"max_tokens": 1000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("await page.click('#login');")))
        .expect(1)
        .mount(&server)
        .await;

    let generator = LlmCodeGenerator::new(lmstudio(server.uri()));
    let code = generator
        .generate_step(&click(), OutputFormat::Javascript, true)
        .await
        .unwrap();
    assert_eq!(code, "await page.click('#login');");
}

#[tokio::test]
async fn test_incremental_step_budget() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::body_partial_json(json!({"max_tokens": 150})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("x")))
        .expect(1)
        .mount(&server)
        .await;

    let generator = LlmCodeGenerator::new(lmstudio(server.uri()));
    generator
        .generate_step(&click(), OutputFormat::Javascript, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_settings_store_overrides_defaults() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::body_partial_json(json!({"model": "stored-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let kv = Arc::new(MemoryKvStore::new());
    kv.set(
        PROVIDER_SETTINGS_KEY,
        json!({"provider": "ollama", "apiUrl": server.uri(), "modelName": "stored-model"}),
    )
    .await
    .unwrap();

    let generator = LlmCodeGenerator::new(lmstudio("http://127.0.0.1:9".to_string()))
        .with_settings_store(kv);
    let info = generator.info().await;
    assert_eq!(info.provider, "ollama");
    assert_eq!(info.model, "stored-model");

    generator
        .generate_step(&click(), OutputFormat::Python, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unreadable_stored_settings_fall_back() {
    let kv = Arc::new(MemoryKvStore::new());
    kv.set(PROVIDER_SETTINGS_KEY, json!("not an object")).await.unwrap();

    let generator = LlmCodeGenerator::new(lmstudio("http://localhost:1234".to_string()))
        .with_settings_store(kv);
    assert_eq!(generator.settings().await.model_name, "local-model");
}

#[tokio::test]
async fn test_batch_reports_progress_in_order() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::body_partial_json(json!({"max_tokens": 2000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("full program")))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(Collect(Mutex::new(Vec::new())));
    let reporter = ProgressReporter::new(sink.clone(), "session_1");
    let generator = LlmCodeGenerator::new(lmstudio(server.uri()));

    let code = generator
        .generate_batch(&[click()], OutputFormat::Javascript, Some(&reporter))
        .await
        .unwrap();
    assert_eq!(code, "full program");

    let stages: Vec<ProgressStage> = sink.0.lock().iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            ProgressStage::Analyzing,
            ProgressStage::Connecting,
            ProgressStage::Generating,
            ProgressStage::Processing,
        ]
    );
}

#[tokio::test]
async fn test_batch_error_propagates() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let generator = LlmCodeGenerator::new(lmstudio(server.uri()));
    let err = generator
        .generate_batch(&[click()], OutputFormat::Javascript, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::HttpError { status: 503, .. }));
}
