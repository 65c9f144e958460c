//! Provider configuration shared by the config layer, the settings store and the adapter.

use serde::{Deserialize, Serialize};

/// Which LLM backend to call and how.
///
/// Field names follow the settings store (`apiUrl`, `modelName`); the
/// snake_case aliases let the same struct be read from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_api_url", alias = "api_url")]
    pub api_url: String,

    #[serde(default = "default_model_name", alias = "model_name")]
    pub model_name: String,

    #[serde(default, alias = "api_key")]
    pub api_key: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens", alias = "max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_request_timeout", alias = "request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_provider() -> String {
    "lmstudio".to_string()
}

fn default_api_url() -> String {
    "http://localhost:1234/v1/chat/completions".to_string()
}

fn default_model_name() -> String {
    "lm-studio".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            model_name: default_model_name(),
            api_key: String::new(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ProviderSettings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}
