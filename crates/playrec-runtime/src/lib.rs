//! # Playrec Runtime
//!
//! The recording/generation coordination core: the session state machine,
//! the step processing queue, the recovery coordinator and the stores they
//! persist to.

pub mod generator;
pub mod progress;
pub mod queue;
pub mod recorder;
pub mod restore;
pub mod retry;
pub mod session_id;
pub mod store;
pub mod surfaces;
pub mod timeout;

#[cfg(test)]
pub(crate) mod testing;

pub use generator::{LlmCodeGenerator, PROVIDER_SETTINGS_KEY};
pub use progress::{LogProgressSink, StoredProgressSink, progress_key};
pub use queue::{DrainTicket, StepQueue};
pub use recorder::{GenerationOutcome, Recorder, RecorderOptions, StopOutcome};
pub use restore::{RestoreCoordinator, RestoreOutcome, RestorePolicy};
pub use retry::{Backoff, RetryError, RetryPolicy, retry_with_backoff};
pub use session_id::new_session_id;
pub use store::{
    DownloadableFile, ExportFormat, ExportedFile, FileKvStore, FileSessionStore, MemoryKvStore,
    MemorySessionStore, export_session,
};
pub use surfaces::SurfaceRegistry;
pub use timeout::with_deadline;
