//! Scripted collaborators shared by the runtime tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use playrec_protocols::{
    CodeGenerator, GeneratorInfo, OutputFormat, ProgressReporter, ProgressStage, ProviderError,
    Step, StepType, Surface, SurfaceError, SurfaceId, SurfaceMessage, SurfaceReply,
};

/// A surface that records every message and answers from a script.
pub(crate) struct ScriptedSurface {
    id: SurfaceId,
    received: Mutex<Vec<SurfaceMessage>>,
    hang: HashSet<&'static str>,
    reject: HashSet<&'static str>,
    failures: Mutex<HashMap<&'static str, u32>>,
}

impl ScriptedSurface {
    pub(crate) fn new(id: SurfaceId) -> Self {
        Self {
            id,
            received: Mutex::new(Vec::new()),
            hang: HashSet::new(),
            reject: HashSet::new(),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Never answer messages with this action.
    pub(crate) fn hang_on(mut self, action: &'static str) -> Self {
        self.hang.insert(action);
        self
    }

    /// Answer `{success: false}` to messages with this action.
    pub(crate) fn reject(mut self, action: &'static str) -> Self {
        self.reject.insert(action);
        self
    }

    /// Fail the first `times` messages with this action as if the page were gone.
    pub(crate) fn fail_first(self, action: &'static str, times: u32) -> Self {
        self.failures.lock().insert(action, times);
        self
    }

    pub(crate) fn received(&self) -> Vec<SurfaceMessage> {
        self.received.lock().clone()
    }

    pub(crate) fn count(&self, action: &str) -> usize {
        self.received
            .lock()
            .iter()
            .filter(|m| m.action() == action)
            .count()
    }
}

#[async_trait]
impl Surface for ScriptedSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    async fn request(&self, message: SurfaceMessage) -> Result<SurfaceReply, SurfaceError> {
        let action = message.action();
        self.received.lock().push(message);

        if self.hang.contains(action) {
            std::future::pending::<()>().await;
        }

        let failing = {
            let mut failures = self.failures.lock();
            match failures.get_mut(action) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            }
        };
        if failing {
            return Err(SurfaceError::Closed);
        }

        if self.reject.contains(action) {
            return Ok(SurfaceReply::failed("rejected"));
        }
        Ok(SurfaceReply::ok())
    }
}

/// A generator that turns steps into predictable Playwright lines.
pub(crate) struct ScriptedGenerator {
    delay: Duration,
    fail_selectors: HashSet<String>,
    fail_batch: bool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    step_calls: Mutex<Vec<usize>>,
}

impl ScriptedGenerator {
    pub(crate) fn new() -> Self {
        Self {
            delay: Duration::ZERO,
            fail_selectors: HashSet::new(),
            fail_batch: false,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            step_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn failing_on(mut self, selector: &str) -> Self {
        self.fail_selectors.insert(selector.to_string());
        self
    }

    pub(crate) fn failing_batch(mut self) -> Self {
        self.fail_batch = true;
        self
    }

    /// Highest number of concurrent `generate_step` calls observed.
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Step indexes in the order they were generated.
    pub(crate) fn step_calls(&self) -> Vec<usize> {
        self.step_calls.lock().clone()
    }

    pub(crate) fn line_for(step: &Step) -> String {
        let selector = &step.action.selector;
        match step.kind() {
            StepType::Input | StepType::Change => {
                let value = step
                    .action
                    .value
                    .as_ref()
                    .map(|v| v.as_text())
                    .unwrap_or_default();
                format!("await page.fill('{}', '{}');", selector, value)
            }
            StepType::Navigation => format!("await page.goto('{}');", selector),
            _ => format!("await page.click('{}');", selector),
        }
    }

    pub(crate) fn program(lines: &[String]) -> String {
        let body: String = lines.iter().map(|l| format!("  {}\n", l)).collect();
        format!(
            "const {{ chromium }} = require('playwright');\n\n(async () => {{\n  const browser = await chromium.launch();\n  const page = await browser.newPage();\n{}  await browser.close();\n}})();",
            body
        )
    }
}

#[async_trait]
impl CodeGenerator for ScriptedGenerator {
    async fn generate_step(
        &self,
        step: &Step,
        _format: OutputFormat,
        is_first_step: bool,
    ) -> Result<String, ProviderError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.step_calls.lock().push(step.step_index);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_selectors.contains(&step.action.selector) {
            return Err(ProviderError::HttpError {
                status: 500,
                body: "model crashed".to_string(),
            });
        }

        let line = Self::line_for(step);
        if is_first_step {
            Ok(Self::program(&[line]))
        } else {
            Ok(line)
        }
    }

    async fn generate_batch(
        &self,
        steps: &[Step],
        _format: OutputFormat,
        progress: Option<&ProgressReporter>,
    ) -> Result<String, ProviderError> {
        if let Some(progress) = progress {
            progress.report(ProgressStage::Analyzing, "analyzing").await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_batch {
            return Err(ProviderError::Network("connection refused".to_string()));
        }
        let lines: Vec<String> = steps.iter().map(Self::line_for).collect();
        Ok(Self::program(&lines))
    }

    async fn info(&self) -> GeneratorInfo {
        GeneratorInfo {
            provider: "scripted".to_string(),
            model: "test-model".to_string(),
        }
    }
}
