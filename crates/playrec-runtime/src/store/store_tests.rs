use super::*;
use chrono::{TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;

use playrec_protocols::{
    CapturedStep, KeyValueStore, OutputFormat, RecordMode, SessionRecord, SessionStore, StepType,
};

fn record(id: &str) -> SessionRecord {
    let now = Utc::now();
    SessionRecord {
        id: id.to_string(),
        mode: RecordMode::StepByStep,
        format: OutputFormat::Javascript,
        steps: vec![CapturedStep::new(StepType::Click, "#go").accept(0, 0, 0)],
        start_time: 1_000,
        end_time: 3_000,
        duration: 2_000,
        playwright_code: Some("await page.click('#go');".to_string()),
        llm_provider: "lmstudio".to_string(),
        llm_model: "lm-studio".to_string(),
        processing_error: None,
        used_fallback: false,
        created_at: now,
        updated_at: now,
    }
}

fn ids(records: &[SessionRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn test_promote_moves_to_front_without_duplicates() {
    let mut history = vec!["b".to_string(), "a".to_string()];
    assert!(promote(&mut history, "a", 50).is_empty());
    assert_eq!(history, vec!["a", "b"]);
}

#[test]
fn test_promote_reports_overflow() {
    let mut history = vec!["c".to_string(), "b".to_string(), "a".to_string()];
    let evicted = promote(&mut history, "d", 3);
    assert_eq!(history, vec!["d", "c", "b"]);
    assert_eq!(evicted, vec!["a"]);
}

#[test]
fn test_valid_ids() {
    assert!(is_valid_id("session_1700000000000_abc123xyz"));
    assert!(!is_valid_id("../etc/passwd"));
    assert!(!is_valid_id(""));
}

#[tokio::test]
async fn test_memory_store_history_is_newest_first() {
    let store = MemorySessionStore::new();
    store.save_session(&record("a")).await.unwrap();
    store.save_session(&record("b")).await.unwrap();
    store.save_session(&record("a")).await.unwrap();

    let history = store.get_history().await.unwrap();
    assert_eq!(ids(&history), vec!["a", "b"]);
}

#[tokio::test]
async fn test_memory_store_cap() {
    let store = MemorySessionStore::with_limit(2);
    for id in ["a", "b", "c"] {
        store.save_session(&record(id)).await.unwrap();
    }

    assert_eq!(ids(&store.get_history().await.unwrap()), vec!["c", "b"]);
    assert!(store.get_session("a").await.unwrap().is_none());
}

#[tokio::test]
async fn test_memory_store_delete() {
    let store = MemorySessionStore::new();
    store.save_session(&record("a")).await.unwrap();
    store.delete_session("a").await.unwrap();

    assert!(store.get_session("a").await.unwrap().is_none());
    assert!(store.get_history().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_file_store_roundtrip() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().join("sessions"));

    let saved = record("session_1_abc");
    store.save_session(&saved).await.unwrap();

    let loaded = store.get_session("session_1_abc").await.unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert!(dir.path().join("sessions/session_1_abc.json").exists());
    assert!(dir.path().join("sessions/index.json").exists());
}

#[tokio::test]
async fn test_file_store_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = FileSessionStore::new(dir.path().to_path_buf());
        store.save_session(&record("a")).await.unwrap();
        store.save_session(&record("b")).await.unwrap();
    }

    let reopened = FileSessionStore::new(dir.path().to_path_buf());
    assert_eq!(ids(&reopened.get_history().await.unwrap()), vec!["b", "a"]);
}

#[tokio::test]
async fn test_file_store_cap_deletes_files() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::with_limit(dir.path().to_path_buf(), 2);
    for id in ["a", "b", "c"] {
        store.save_session(&record(id)).await.unwrap();
    }

    assert_eq!(ids(&store.get_history().await.unwrap()), vec!["c", "b"]);
    assert!(!dir.path().join("a.json").exists());
}

#[tokio::test]
async fn test_file_store_delete() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().to_path_buf());
    store.save_session(&record("a")).await.unwrap();
    store.save_session(&record("b")).await.unwrap();

    store.delete_session("a").await.unwrap();
    assert_eq!(ids(&store.get_history().await.unwrap()), vec!["b"]);
    assert!(!dir.path().join("a.json").exists());

    // Deleting twice is fine.
    store.delete_session("a").await.unwrap();
}

#[tokio::test]
async fn test_file_store_rejects_unsafe_ids() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().to_path_buf());

    assert!(store.save_session(&record("../escape")).await.is_err());
    assert!(store.get_session("../escape").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_store_skips_missing_files() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::new(dir.path().to_path_buf());
    store.save_session(&record("a")).await.unwrap();
    store.save_session(&record("b")).await.unwrap();
    std::fs::remove_file(dir.path().join("a.json")).unwrap();

    assert_eq!(ids(&store.get_history().await.unwrap()), vec!["b"]);
}

#[tokio::test]
async fn test_memory_kv() {
    let kv = MemoryKvStore::new();
    assert!(kv.get("provider").await.unwrap().is_none());

    kv.set("provider", json!({"provider": "openai"})).await.unwrap();
    assert_eq!(kv.get("provider").await.unwrap().unwrap()["provider"], "openai");

    kv.remove("provider").await.unwrap();
    assert!(kv.get("provider").await.unwrap().is_none());
}

#[tokio::test]
async fn test_file_kv_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/settings.json");
    {
        let kv = FileKvStore::new(path.clone());
        kv.set("a", json!(1)).await.unwrap();
        kv.set("b", json!("two")).await.unwrap();
        kv.remove("a").await.unwrap();
    }

    let kv = FileKvStore::new(path);
    assert!(kv.get("a").await.unwrap().is_none());
    assert_eq!(kv.get("b").await.unwrap(), Some(json!("two")));
}

#[test]
fn test_export_json() {
    let file = export_session(&record("s1"), ExportFormat::Json).unwrap();
    assert_eq!(file.filename, "ai-steps-s1.json");
    assert_eq!(file.mime_type, "application/json");

    let value: serde_json::Value = serde_json::from_str(&file.content).unwrap();
    assert_eq!(value["id"], "s1");
    assert_eq!(value["steps"].as_array().unwrap().len(), 1);
}

#[test]
fn test_export_playwright() {
    let mut python = record("s2");
    python.format = OutputFormat::Pytest;
    python.playwright_code = None;

    let file = export_session(&python, ExportFormat::Playwright).unwrap();
    assert_eq!(file.filename, "playwright-test-s2.py");
    assert_eq!(file.content, "No Playwright code generated");

    let file = export_session(&record("s3"), ExportFormat::Playwright).unwrap();
    assert_eq!(file.filename, "playwright-test-s3.js");
    assert!(file.content.contains("page.click"));
}

#[test]
fn test_export_format_parse() {
    assert_eq!("playwright".parse::<ExportFormat>().unwrap(), ExportFormat::Playwright);
    assert!("csv".parse::<ExportFormat>().is_err());
}

#[test]
fn test_downloadable_file() {
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap();
    let file = downloadable_file(&record("s4"), now).unwrap();
    assert_eq!(file.filename, "playwright-test-2024-05-01T12-30-15-000Z.js");
    assert_eq!(file.session_id, "s4");
    assert_eq!(file.mime_type, "text/plain");
    assert_eq!(downloadable_key("s4"), "downloadable_s4");

    let mut empty = record("s5");
    empty.playwright_code = None;
    assert!(downloadable_file(&empty, now).is_none());
}
