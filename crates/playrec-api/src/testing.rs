//! Fixtures shared by the API tests.

use std::sync::Arc;

use async_trait::async_trait;

use playrec_protocols::{
    CodeGenerator, GeneratorInfo, OutputFormat, ProgressReporter, ProviderError, Step,
};
use playrec_runtime::{
    MemoryKvStore, MemorySessionStore, Recorder, RestoreCoordinator, RestorePolicy,
    SurfaceRegistry,
};

use crate::state::AppState;

/// Writes one comment line per step; batches fail when `fail_batch` is set.
pub(crate) struct EchoGenerator {
    pub(crate) fail_batch: bool,
}

impl EchoGenerator {
    fn line(step: &Step) -> String {
        format!("// {} {}", step.kind(), step.action.selector)
    }
}

#[async_trait]
impl CodeGenerator for EchoGenerator {
    async fn generate_step(
        &self,
        step: &Step,
        _format: OutputFormat,
        _is_first_step: bool,
    ) -> Result<String, ProviderError> {
        Ok(Self::line(step))
    }

    async fn generate_batch(
        &self,
        steps: &[Step],
        _format: OutputFormat,
        _progress: Option<&ProgressReporter>,
    ) -> Result<String, ProviderError> {
        if self.fail_batch {
            return Err(ProviderError::Network("connection refused".to_string()));
        }
        Ok(steps.iter().map(Self::line).collect::<Vec<_>>().join("\n"))
    }

    async fn info(&self) -> GeneratorInfo {
        GeneratorInfo {
            provider: "echo".to_string(),
            model: "echo-1".to_string(),
        }
    }
}

pub(crate) struct TestApp {
    pub(crate) state: Arc<AppState>,
}

pub(crate) fn test_state() -> TestApp {
    test_state_with(EchoGenerator { fail_batch: false })
}

pub(crate) fn test_state_with(generator: EchoGenerator) -> TestApp {
    let surfaces = Arc::new(SurfaceRegistry::new());
    let recorder = Arc::new(Recorder::new(
        Arc::new(generator),
        Arc::new(MemorySessionStore::new()),
        Arc::new(MemoryKvStore::new()),
        surfaces,
    ));
    let coordinator = Arc::new(RestoreCoordinator::new(
        recorder.clone(),
        RestorePolicy::default(),
    ));
    TestApp {
        state: Arc::new(AppState::new(recorder, coordinator)),
    }
}
