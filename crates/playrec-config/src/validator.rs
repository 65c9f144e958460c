//! Configuration validation.

use crate::schema::Config;

/// Providers that cannot be called without an API key.
const CLOUD_PROVIDERS: &[&str] = &["openai", "gemini", "anthropic"];

/// Providers the adapter knows how to call.
const KNOWN_PROVIDERS: &[&str] = &["openai", "lmstudio", "ollama", "gemini", "anthropic"];

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_provider(config, &mut result);
        Self::validate_recording(config, &mut result);
        Self::validate_restore(config, &mut result);
        Self::validate_storage(config, &mut result);
        Self::validate_server(config, &mut result);

        result
    }

    fn validate_provider(config: &Config, result: &mut ValidationResult) {
        let provider = &config.provider;

        if !KNOWN_PROVIDERS.contains(&provider.provider.as_str()) {
            result.add_error(ValidationError::new(
                "provider.provider",
                format!(
                    "Unknown provider '{}', expected one of: {}",
                    provider.provider,
                    KNOWN_PROVIDERS.join(", ")
                ),
            ));
        }

        if provider.api_url.trim().is_empty() {
            result.add_error(ValidationError::new("provider.api_url", "api_url cannot be empty"));
        } else if !provider.api_url.starts_with("http://") && !provider.api_url.starts_with("https://")
        {
            result.add_error(ValidationError::new(
                "provider.api_url",
                "api_url must start with http:// or https://",
            ));
        }

        // The key may still arrive later through the settings store.
        if CLOUD_PROVIDERS.contains(&provider.provider.as_str()) && !provider.has_api_key() {
            result.add_warning(ValidationWarning::new(
                "provider.api_key",
                format!("Provider '{}' requires an API key", provider.provider),
            ));
        }

        if !(0.0..=2.0).contains(&provider.temperature) {
            result.add_error(ValidationError::new(
                "provider.temperature",
                "temperature must be between 0 and 2",
            ));
        }

        if provider.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "provider.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }

        if provider.request_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "provider.request_timeout_secs",
                "request_timeout_secs must be greater than 0",
            ));
        }
    }

    fn validate_recording(config: &Config, result: &mut ValidationResult) {
        if config.recording.generation_timeout_secs == 0 {
            result.add_error(ValidationError::new(
                "recording.generation_timeout_secs",
                "generation_timeout_secs must be greater than 0",
            ));
        } else if config.recording.generation_timeout_secs < config.provider.request_timeout_secs {
            result.add_warning(ValidationWarning::new(
                "recording.generation_timeout_secs",
                "generation deadline is shorter than the HTTP request timeout",
            ));
        }

        if config.recording.notify_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "recording.notify_timeout_ms",
                "notify_timeout_ms must be greater than 0",
            ));
        }
    }

    fn validate_restore(config: &Config, result: &mut ValidationResult) {
        let restore = &config.restore;
        let positive = [
            ("restore.max_attempts", restore.max_attempts as u64),
            ("restore.probe_attempts", restore.probe_attempts as u64),
            ("restore.probe_timeout_ms", restore.probe_timeout_ms),
            ("restore.push_timeout_ms", restore.push_timeout_ms),
        ];
        for (path, value) in positive {
            if value == 0 {
                result.add_error(ValidationError::new(path, "must be greater than 0"));
            }
        }

        if restore.max_attempts > 20 {
            result.add_warning(ValidationWarning::new(
                "restore.max_attempts",
                "max_attempts is very high (>20), a failed restore may take minutes to give up",
            ));
        }
    }

    fn validate_storage(config: &Config, result: &mut ValidationResult) {
        if config.storage.data_dir.trim().is_empty() {
            result.add_error(ValidationError::new("storage.data_dir", "data_dir cannot be empty"));
        }

        if config.storage.history_limit == 0 {
            result.add_error(ValidationError::new(
                "storage.history_limit",
                "history_limit must be greater than 0",
            ));
        }
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
