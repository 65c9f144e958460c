//! LLM-backed code generation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use playrec_codegen::prompt::{batch_prompt, step_prompt};
use playrec_protocols::{
    CodeGenerator, GeneratorInfo, KeyValueStore, OutputFormat, ProgressReporter, ProgressStage,
    ProviderError, ProviderSettings, Step,
};
use playrec_provider::{ProviderAdapter, TokenBudget};

/// Settings-store key holding [`ProviderSettings`] as JSON.
pub const PROVIDER_SETTINGS_KEY: &str = "provider";

/// Generates code through the configured provider.
///
/// Provider settings are re-read from the settings store on every call so a
/// change applies to the next generation; the configured defaults are used
/// when the store has none.
pub struct LlmCodeGenerator {
    adapter: ProviderAdapter,
    defaults: ProviderSettings,
    settings_store: Option<Arc<dyn KeyValueStore>>,
}

impl LlmCodeGenerator {
    pub fn new(defaults: ProviderSettings) -> Self {
        Self {
            adapter: ProviderAdapter::new(),
            defaults,
            settings_store: None,
        }
    }

    pub fn with_settings_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    pub fn with_adapter(mut self, adapter: ProviderAdapter) -> Self {
        self.adapter = adapter;
        self
    }

    /// Effective provider settings for the next call.
    pub async fn settings(&self) -> ProviderSettings {
        let Some(store) = &self.settings_store else {
            return self.defaults.clone();
        };
        match store.get(PROVIDER_SETTINGS_KEY).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("Ignoring unreadable provider settings: {}", e);
                    self.defaults.clone()
                }
            },
            Ok(None) => self.defaults.clone(),
            Err(e) => {
                warn!("Failed to read provider settings: {}", e);
                self.defaults.clone()
            }
        }
    }
}

#[async_trait]
impl CodeGenerator for LlmCodeGenerator {
    async fn generate_step(
        &self,
        step: &Step,
        format: OutputFormat,
        is_first_step: bool,
    ) -> Result<String, ProviderError> {
        let settings = self.settings().await;
        let budget = if is_first_step {
            TokenBudget::FirstStep
        } else {
            TokenBudget::Incremental
        };
        debug!(
            "Generating step {} ({}) with {}",
            step.step_index,
            step.kind(),
            settings.provider
        );
        let prompt = step_prompt(step, format, is_first_step);
        self.adapter.complete(&prompt, budget, &settings).await
    }

    async fn generate_batch(
        &self,
        steps: &[Step],
        format: OutputFormat,
        progress: Option<&ProgressReporter>,
    ) -> Result<String, ProviderError> {
        if let Some(progress) = progress {
            progress
                .report(
                    ProgressStage::Analyzing,
                    format!("Analyzing {} recorded steps...", steps.len()),
                )
                .await;
        }

        let settings = self.settings().await;
        let prompt = batch_prompt(steps, format);

        if let Some(progress) = progress {
            progress
                .report(
                    ProgressStage::Connecting,
                    format!("Connecting to {}...", settings.provider),
                )
                .await;
            progress
                .report(
                    ProgressStage::Generating,
                    format!("Generating code with {}...", settings.model_name),
                )
                .await;
        }

        let code = self.adapter.complete(&prompt, TokenBudget::Batch, &settings).await?;

        if let Some(progress) = progress {
            progress
                .report(ProgressStage::Processing, "Processing generated code...")
                .await;
        }
        Ok(code)
    }

    async fn info(&self) -> GeneratorInfo {
        let settings = self.settings().await;
        GeneratorInfo {
            provider: settings.provider,
            model: settings.model_name,
        }
    }
}

#[cfg(test)]
#[path = "generator_tests.rs"]
mod tests;
