//! Exported and downloadable artifacts of a finished session.

use serde::{Deserialize, Serialize};

use playrec_protocols::SessionRecord;

/// What to export from a session record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// The whole record as pretty JSON.
    #[default]
    Json,
    /// Only the generated code.
    Playwright,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "playwright" => Ok(ExportFormat::Playwright),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub filename: String,
    pub content: String,
    pub mime_type: String,
}

pub fn export_session(record: &SessionRecord, format: ExportFormat) -> Result<ExportedFile, serde_json::Error> {
    match format {
        ExportFormat::Json => Ok(ExportedFile {
            filename: format!("ai-steps-{}.json", record.id),
            content: serde_json::to_string_pretty(record)?,
            mime_type: "application/json".to_string(),
        }),
        ExportFormat::Playwright => Ok(ExportedFile {
            filename: format!("playwright-test-{}.{}", record.id, record.format.file_extension()),
            content: record
                .playwright_code
                .clone()
                .unwrap_or_else(|| "No Playwright code generated".to_string()),
            mime_type: record.format.mime_type().to_string(),
        }),
    }
}

/// Descriptor stored under `downloadable_<sessionId>` after stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadableFile {
    pub filename: String,
    pub content: String,
    pub mime_type: String,
    pub session_id: String,
    pub timestamp: i64,
}

/// `None` when the record has no code.
pub fn downloadable_file(record: &SessionRecord, now: chrono::DateTime<chrono::Utc>) -> Option<DownloadableFile> {
    let code = record.playwright_code.as_ref()?;
    let stamp = now.format("%Y-%m-%dT%H-%M-%S-%3fZ");
    Some(DownloadableFile {
        filename: format!("playwright-test-{}.{}", stamp, record.format.file_extension()),
        content: code.clone(),
        mime_type: "text/plain".to_string(),
        session_id: record.id.clone(),
        timestamp: now.timestamp_millis(),
    })
}

pub fn downloadable_key(session_id: &str) -> String {
    format!("downloadable_{}", session_id)
}
