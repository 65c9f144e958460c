//! Session value types: settings, snapshots pushed to surfaces, persisted records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::step::Step;

/// Identifies the page surface (browser tab) that owns a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// When code is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RecordMode {
    /// One generation per step while recording.
    #[default]
    #[serde(rename = "step-by-step")]
    StepByStep,
    /// One batch generation on stop.
    #[serde(rename = "one-time")]
    OneTime,
}

impl RecordMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordMode::StepByStep => "step-by-step",
            RecordMode::OneTime => "one-time",
        }
    }
}

impl std::str::FromStr for RecordMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "step-by-step" => Ok(RecordMode::StepByStep),
            "one-time" => Ok(RecordMode::OneTime),
            other => Err(format!("unknown record mode: {}", other)),
        }
    }
}

/// Language of the generated test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Javascript,
    Python,
    Pytest,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Javascript => "javascript",
            OutputFormat::Python => "python",
            OutputFormat::Pytest => "pytest",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            OutputFormat::Javascript => "js",
            OutputFormat::Python | OutputFormat::Pytest => "py",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Javascript => "text/javascript",
            OutputFormat::Python | OutputFormat::Pytest => "text/x-python",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "javascript" | "js" => Ok(OutputFormat::Javascript),
            "python" | "py" => Ok(OutputFormat::Python),
            "pytest" => Ok(OutputFormat::Pytest),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}

/// Immutable for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    #[serde(default)]
    pub record_mode: RecordMode,
    #[serde(default)]
    pub output_format: OutputFormat,
}

impl SessionSettings {
    pub fn new(record_mode: RecordMode, output_format: OutputFormat) -> Self {
        Self {
            record_mode,
            output_format,
        }
    }
}

/// Lifecycle phase of the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingPhase {
    #[default]
    Idle,
    Recording,
    Stopping,
}

/// The authoritative session state as pushed to a surface after a reload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub is_recording: bool,
    pub session_id: Option<String>,
    pub settings: SessionSettings,
    pub steps: Vec<Step>,
    pub accumulated_code: Option<String>,
    pub surface_id: Option<SurfaceId>,
    pub start_time: Option<i64>,
}

/// A finished session as persisted in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub mode: RecordMode,
    pub format: OutputFormat,
    pub steps: Vec<Step>,
    /// Epoch milliseconds.
    pub start_time: i64,
    pub end_time: i64,
    pub duration: i64,
    pub playwright_code: Option<String>,
    pub llm_provider: String,
    pub llm_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_error: Option<String>,
    #[serde(default)]
    pub used_fallback: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Answer to the capture collaborator's `getStatus()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderStatus {
    pub phase: RecordingPhase,
    pub is_recording: bool,
    pub session_id: Option<String>,
    pub surface_id: Option<SurfaceId>,
    pub settings: Option<SessionSettings>,
    pub step_count: usize,
    pub pending_steps: usize,
    pub has_code: bool,
}
