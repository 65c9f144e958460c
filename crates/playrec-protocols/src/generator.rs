//! Code generation contract used by the queue, stop and on-demand generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::progress::ProgressReporter;
use crate::session::OutputFormat;
use crate::step::Step;

/// Which backend produced the code, recorded in session history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratorInfo {
    pub provider: String,
    pub model: String,
}

#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Code for one step. With `is_first_step` the result is a complete
    /// program skeleton, otherwise a single statement.
    async fn generate_step(
        &self,
        step: &Step,
        format: OutputFormat,
        is_first_step: bool,
    ) -> Result<String, ProviderError>;

    /// A complete program for all steps.
    async fn generate_batch(
        &self,
        steps: &[Step],
        format: OutputFormat,
        progress: Option<&ProgressReporter>,
    ) -> Result<String, ProviderError>;

    async fn info(&self) -> GeneratorInfo;
}
