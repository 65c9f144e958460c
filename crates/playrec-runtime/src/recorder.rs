//! Recording session state machine: `Idle -> Recording -> Stopping -> Idle`.
//!
//! One [`Recorder`] owns the single active session. Steps are accepted under
//! the state lock, in the same critical section that queues them, so the
//! queue order is the `arrival_seq` order. The drain worker is the only
//! writer of the accumulated code while a session records.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use playrec_codegen::{CodeAccumulator, FallbackGenerator};
use playrec_config::RecordingConfig;
use playrec_protocols::{
    CapturedStep, CodeGenerator, CodeNotice, KeyValueStore, OutputFormat, ProgressReporter,
    ProgressSink, ProgressStage, RecordMode, RecorderError, RecorderStatus, RecordingPhase,
    SessionRecord, SessionSettings, SessionSnapshot, SessionStore, Step, SurfaceId, SurfaceMessage,
};

use crate::progress::StoredProgressSink;
use crate::queue::{DrainTicket, StepQueue};
use crate::session_id::new_session_id;
use crate::store::{downloadable_file, downloadable_key};
use crate::surfaces::SurfaceRegistry;
use crate::timeout::generation_deadline;

/// Deadlines applied by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderOptions {
    pub generation_timeout: Duration,
    pub notify_timeout: Duration,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(180),
            notify_timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&RecordingConfig> for RecorderOptions {
    fn from(config: &RecordingConfig) -> Self {
        Self {
            generation_timeout: config.generation_timeout(),
            notify_timeout: config.notify_timeout(),
        }
    }
}

/// Result of generating code for an arbitrary step list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub code: String,
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopOutcome {
    pub session_id: String,
    pub record: SessionRecord,
}

struct RecordingState {
    phase: RecordingPhase,
    session_id: Option<String>,
    settings: SessionSettings,
    steps: Vec<Step>,
    code: CodeAccumulator,
    surface_id: Option<SurfaceId>,
    start_time: Option<i64>,
    next_seq: u64,
}

impl RecordingState {
    fn idle() -> Self {
        Self {
            phase: RecordingPhase::Idle,
            session_id: None,
            settings: SessionSettings::default(),
            steps: Vec::new(),
            code: CodeAccumulator::new(OutputFormat::default()),
            surface_id: None,
            start_time: None,
            next_seq: 0,
        }
    }

    fn is_recording(&self) -> bool {
        self.phase == RecordingPhase::Recording
    }

    fn owned_by(&self, surface_id: SurfaceId) -> bool {
        self.is_recording() && self.surface_id == Some(surface_id)
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_recording: self.is_recording(),
            session_id: self.session_id.clone(),
            settings: self.settings,
            steps: self.steps.clone(),
            accumulated_code: self.code.code().map(str::to_string),
            surface_id: self.surface_id,
            start_time: self.start_time,
        }
    }
}

/// What the drain needs to know to generate one step.
struct DrainJob {
    format: OutputFormat,
    is_first_step: bool,
    surface_id: SurfaceId,
}

/// Session fields captured when stop begins.
struct Finished {
    session_id: String,
    settings: SessionSettings,
    steps: Vec<Step>,
    code: Option<String>,
    surface_id: Option<SurfaceId>,
    start_time: i64,
}

/// Puts the machine back to `Idle` however `stop` ends, unless a newer
/// session already replaced the one being stopped.
struct IdleOnDrop<'a> {
    state: &'a Mutex<RecordingState>,
    session_id: String,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if state.session_id.as_deref() == Some(self.session_id.as_str()) {
            *state = RecordingState::idle();
        }
    }
}

pub struct Recorder {
    state: Mutex<RecordingState>,
    queue: StepQueue,
    generator: Arc<dyn CodeGenerator>,
    sessions: Arc<dyn SessionStore>,
    kv: Arc<dyn KeyValueStore>,
    surfaces: Arc<SurfaceRegistry>,
    progress: Arc<dyn ProgressSink>,
    options: RecorderOptions,
}

impl Recorder {
    pub fn new(
        generator: Arc<dyn CodeGenerator>,
        sessions: Arc<dyn SessionStore>,
        kv: Arc<dyn KeyValueStore>,
        surfaces: Arc<SurfaceRegistry>,
    ) -> Self {
        let progress: Arc<dyn ProgressSink> = Arc::new(StoredProgressSink::new(kv.clone()));
        Self {
            state: Mutex::new(RecordingState::idle()),
            queue: StepQueue::new(),
            generator,
            sessions,
            kv,
            surfaces,
            progress,
            options: RecorderOptions::default(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_options(mut self, options: RecorderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn surfaces(&self) -> &Arc<SurfaceRegistry> {
        &self.surfaces
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn options(&self) -> RecorderOptions {
        self.options
    }

    /// Begin a new session owned by `surface_id` and return its id.
    ///
    /// A session left over from a crash is discarded rather than refused.
    pub fn start(&self, settings: SessionSettings, surface_id: SurfaceId) -> String {
        let mut state = self.state.lock();
        if state.phase != RecordingPhase::Idle {
            warn!(
                "Session {:?} still {:?}, forcing reset before starting",
                state.session_id, state.phase
            );
        }
        let dropped = self.queue.reset();
        if dropped > 0 {
            warn!("Discarded {} stale pending step(s)", dropped);
        }

        let session_id = new_session_id();
        *state = RecordingState {
            phase: RecordingPhase::Recording,
            session_id: Some(session_id.clone()),
            settings,
            steps: Vec::new(),
            code: CodeAccumulator::new(settings.output_format),
            surface_id: Some(surface_id),
            start_time: Some(Utc::now().timestamp_millis()),
            next_seq: 0,
        };
        info!(
            "Started session {} on surface {} ({}, {})",
            session_id,
            surface_id,
            settings.record_mode.as_str(),
            settings.output_format.as_str()
        );
        session_id
    }

    /// Accept a step from the owning surface.
    ///
    /// Returns `None` (and does nothing) when idle or when the step comes
    /// from another surface.
    pub fn add_step(self: &Arc<Self>, captured: CapturedStep, surface_id: SurfaceId) -> Option<Step> {
        let (step, count, step_by_step) = {
            let mut state = self.state.lock();
            if !state.is_recording() {
                debug!("Ignoring step from surface {}: not recording", surface_id);
                return None;
            }
            if state.surface_id != Some(surface_id) {
                debug!(
                    "Ignoring step from surface {}: session belongs to {:?}",
                    surface_id, state.surface_id
                );
                return None;
            }

            let arrival_seq = state.next_seq;
            state.next_seq += 1;
            let step = captured.accept(state.steps.len(), arrival_seq, Utc::now().timestamp_millis());
            state.steps.push(step.clone());

            let step_by_step = state.settings.record_mode == RecordMode::StepByStep;
            if step_by_step {
                self.queue.push(step.clone());
            }
            (step, state.steps.len(), step_by_step)
        };
        debug!("Accepted step {} ({})", step.step_index, step.kind());

        self.spawn_notify(surface_id, SurfaceMessage::UpdateStepCounter { count });
        if step_by_step {
            self.spawn_drain();
        }
        Some(step)
    }

    /// End the session, persist it and return the final record.
    ///
    /// In one-time mode the batch generation is awaited here; a failure is
    /// replaced by fallback code. Steps still pending in the queue are
    /// dropped. The machine is back to `Idle` when this returns or is
    /// cancelled.
    pub async fn stop(&self) -> Result<StopOutcome, RecorderError> {
        let finished = {
            let mut state = self.state.lock();
            if !state.is_recording() {
                return Err(RecorderError::NotRecording);
            }
            let Some(session_id) = state.session_id.clone() else {
                *state = RecordingState::idle();
                return Err(RecorderError::NotRecording);
            };
            state.phase = RecordingPhase::Stopping;

            let dropped = self.queue.reset();
            if dropped > 0 {
                warn!(
                    "Dropping {} pending step(s) of session {} on stop",
                    dropped, session_id
                );
            }

            Finished {
                session_id,
                settings: state.settings,
                steps: state.steps.clone(),
                code: state.code.code().map(str::to_string),
                surface_id: state.surface_id,
                start_time: state.start_time.unwrap_or_else(|| Utc::now().timestamp_millis()),
            }
        };

        let _reset = IdleOnDrop {
            state: &self.state,
            session_id: finished.session_id.clone(),
        };
        let record = self.finalize(finished).await?;
        Ok(StopOutcome {
            session_id: record.id.clone(),
            record,
        })
    }

    async fn finalize(&self, finished: Finished) -> Result<SessionRecord, RecorderError> {
        let info = self.generator.info().await;
        let end_time = Utc::now().timestamp_millis();
        let now = Utc::now();
        let format = finished.settings.output_format;

        let mut record = SessionRecord {
            id: finished.session_id,
            mode: finished.settings.record_mode,
            format,
            steps: finished.steps,
            start_time: finished.start_time,
            end_time,
            duration: end_time - finished.start_time,
            playwright_code: finished.code,
            llm_provider: info.provider,
            llm_model: info.model,
            processing_error: None,
            used_fallback: false,
            created_at: now,
            updated_at: now,
        };

        // Saved before generation so the session is in history even if
        // the batch takes long.
        if let Err(e) = self.sessions.save_session(&record).await {
            warn!("Failed to save session {} before generation: {}", record.id, e);
        }

        if record.mode == RecordMode::OneTime && !record.steps.is_empty() {
            self.generate_batch_into(&mut record).await;
        }

        record.updated_at = Utc::now();
        self.sessions.save_session(&record).await?;

        if let Some(file) = downloadable_file(&record, Utc::now()) {
            let stored = match serde_json::to_value(&file) {
                Ok(value) => self
                    .kv
                    .set(&downloadable_key(&record.id), value)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            if let Err(e) = stored {
                warn!("Failed to store downloadable file for {}: {}", record.id, e);
            }
        }

        if let Some(surface_id) = finished.surface_id {
            self.surfaces
                .notify(
                    surface_id,
                    SurfaceMessage::ForceResetRecording,
                    self.options.notify_timeout,
                )
                .await;
        }

        info!(
            "Stopped session {}: {} step(s), code: {}, fallback: {}",
            record.id,
            record.steps.len(),
            record.playwright_code.is_some(),
            record.used_fallback
        );
        Ok(record)
    }

    async fn generate_batch_into(&self, record: &mut SessionRecord) {
        let reporter = ProgressReporter::new(self.progress.clone(), record.id.clone());
        reporter
            .report(
                ProgressStage::Initializing,
                "Preparing to generate Playwright code...",
            )
            .await;

        let generation = self
            .generator
            .generate_batch(&record.steps, record.format, Some(&reporter));
        let result = generation_deadline(self.options.generation_timeout, generation).await;
        match result {
            Ok(code) => {
                record.playwright_code = Some(code);
                reporter
                    .report(
                        ProgressStage::Completed,
                        "Playwright code generation completed successfully!",
                    )
                    .await;
            }
            Err(e) => {
                error!("Batch generation failed for {}: {}", record.id, e);
                record.processing_error = Some(e.to_string());
                record.used_fallback = true;
                record.playwright_code = Some(FallbackGenerator::generate(&record.steps, record.format));
                reporter
                    .report(ProgressStage::Error, "Generation failed, using fallback code")
                    .await;
            }
        }
    }

    /// Generate a complete program for `steps` outside any session.
    pub async fn generate_for_steps(&self, steps: &[Step], format: OutputFormat) -> GenerationOutcome {
        let generation = self.generator.generate_batch(steps, format, None);
        match generation_deadline(self.options.generation_timeout, generation).await {
            Ok(code) => GenerationOutcome {
                code,
                used_fallback: false,
                error: None,
            },
            Err(e) => {
                warn!("Generation failed, using fallback code: {}", e);
                GenerationOutcome {
                    code: FallbackGenerator::generate(steps, format),
                    used_fallback: true,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn status(&self) -> RecorderStatus {
        let state = self.state.lock();
        RecorderStatus {
            phase: state.phase,
            is_recording: state.is_recording(),
            session_id: state.session_id.clone(),
            surface_id: state.surface_id,
            settings: state.session_id.as_ref().map(|_| state.settings),
            step_count: state.steps.len(),
            pending_steps: self.queue.len(),
            has_code: !state.code.is_empty(),
        }
    }

    /// The authoritative session state, as pushed to a reloaded surface.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().snapshot()
    }

    /// Whether a recording is running on `surface_id`.
    pub fn owns(&self, surface_id: SurfaceId) -> bool {
        self.state.lock().owned_by(surface_id)
    }

    /// The owning surface was closed: stop its recording.
    pub async fn on_surface_closed(&self, surface_id: SurfaceId) -> Option<Result<StopOutcome, RecorderError>> {
        if !self.owns(surface_id) {
            return None;
        }
        info!("Surface {} closed while recording, stopping", surface_id);
        Some(self.stop().await)
    }

    /// Resolve once the step queue is empty and no drain is running.
    pub async fn wait_for_queue_idle(&self) {
        self.queue.wait_idle().await;
    }

    fn spawn_notify(&self, surface_id: SurfaceId, message: SurfaceMessage) {
        let surfaces = self.surfaces.clone();
        let deadline = self.options.notify_timeout;
        tokio::spawn(async move {
            surfaces.notify(surface_id, message, deadline).await;
        });
    }

    fn spawn_drain(self: &Arc<Self>) {
        let recorder = Arc::clone(self);
        tokio::spawn(async move {
            recorder.drain().await;
        });
    }

    /// Generate pending steps one at a time, in order, until the queue runs
    /// dry or the session ends.
    async fn drain(&self) {
        let Some(mut ticket) = self.queue.try_acquire() else {
            debug!("Drain already running");
            return;
        };

        while let Some(step) = ticket.next() {
            let Some(job) = self.drain_job(&ticket) else {
                let dropped = ticket.discard() + 1;
                warn!("Session no longer records step by step, dropped {} step(s)", dropped);
                return;
            };

            let generation = self
                .generator
                .generate_step(&step, job.format, job.is_first_step);
            match generation_deadline(self.options.generation_timeout, generation).await {
                Ok(fragment) => {
                    let Some(step_count) = self.merge(&ticket, &fragment) else {
                        debug!("Discarding code for step {}: session ended", step.step_index);
                        continue;
                    };
                    let notice = CodeNotice {
                        code: fragment,
                        is_first_step: job.is_first_step,
                        step_count,
                    };
                    self.surfaces
                        .notify(
                            job.surface_id,
                            SurfaceMessage::ShowGeneratedCode(notice),
                            self.options.notify_timeout,
                        )
                        .await;
                }
                Err(e) => {
                    error!("Generation failed for step {}: {}", step.step_index, e);
                    self.surfaces
                        .notify(
                            job.surface_id,
                            SurfaceMessage::ShowError {
                                message: format!("LLM Error: {}", e),
                            },
                            self.options.notify_timeout,
                        )
                        .await;
                }
            }
        }
    }

    fn drain_job(&self, ticket: &DrainTicket<'_>) -> Option<DrainJob> {
        let state = self.state.lock();
        if !state.is_recording()
            || state.settings.record_mode != RecordMode::StepByStep
            || !ticket.is_current()
        {
            return None;
        }
        Some(DrainJob {
            format: state.settings.output_format,
            is_first_step: state.code.is_empty(),
            surface_id: state.surface_id?,
        })
    }

    /// Merge a fragment if its session is still recording; returns the step count.
    fn merge(&self, ticket: &DrainTicket<'_>, fragment: &str) -> Option<usize> {
        let mut state = self.state.lock();
        if !state.is_recording() || !ticket.is_current() {
            return None;
        }
        let outcome = state.code.merge(fragment);
        debug!("Merged fragment: {:?}", outcome);
        Some(state.steps.len())
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
