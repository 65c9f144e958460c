//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use playrec_protocols::{OutputFormat, ProviderSettings, RecordMode, SessionSettings};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fallback provider settings, used when the settings store has none.
    #[serde(default)]
    pub provider: ProviderSettings,

    #[serde(default)]
    pub recording: RecordingConfig,

    #[serde(default)]
    pub restore: RestoreConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Default session settings and generation deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    #[serde(default)]
    pub record_mode: RecordMode,

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Upper bound on one generation call, on top of the HTTP timeout.
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    /// Deadline for best-effort notifications to the owning surface.
    #[serde(default = "default_notify_timeout")]
    pub notify_timeout_ms: u64,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            record_mode: RecordMode::default(),
            output_format: OutputFormat::default(),
            generation_timeout_secs: default_generation_timeout(),
            notify_timeout_ms: default_notify_timeout(),
        }
    }
}

impl RecordingConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings::new(self.record_mode, self.output_format)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}

fn default_generation_timeout() -> u64 {
    180
}

fn default_notify_timeout() -> u64 {
    5000
}

/// Recovery coordinator timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreConfig {
    /// Wait after the page reports `complete` before the first attempt.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after attempt `n` (1-based) is `n * backoff_step_ms`.
    #[serde(default = "default_backoff_step")]
    pub backoff_step_ms: u64,

    #[serde(default = "default_probe_attempts")]
    pub probe_attempts: u32,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_probe_backoff")]
    pub probe_backoff_ms: u64,

    #[serde(default = "default_push_timeout")]
    pub push_timeout_ms: u64,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay(),
            max_attempts: default_max_attempts(),
            backoff_step_ms: default_backoff_step(),
            probe_attempts: default_probe_attempts(),
            probe_timeout_ms: default_probe_timeout(),
            probe_backoff_ms: default_probe_backoff(),
            push_timeout_ms: default_push_timeout(),
        }
    }
}

impl RestoreConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn probe_backoff(&self) -> Duration {
        Duration::from_millis(self.probe_backoff_ms)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

fn default_settle_delay() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_step() -> u64 {
    2000
}

fn default_probe_attempts() -> u32 {
    5
}

fn default_probe_timeout() -> u64 {
    3000
}

fn default_probe_backoff() -> u64 {
    1000
}

fn default_push_timeout() -> u64 {
    15000
}

/// Where history, settings and logs live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_limit: default_history_limit(),
        }
    }
}

impl StorageConfig {
    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir).to_string())
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.data_path().join("sessions")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_path().join("settings.json")
    }

    pub fn logs_path(&self) -> PathBuf {
        self.data_path().join("logs")
    }
}

fn default_data_dir() -> String {
    "~/.playrec".to_string()
}

fn default_history_limit() -> usize {
    50
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8765
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
