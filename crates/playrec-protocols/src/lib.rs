//! # Playrec Protocols
//!
//! Value types and collaborator contracts shared by every playrec crate.
//! Contains only definitions - no implementations.
//!
//! ## Core Traits
//!
//! - [`Surface`] - A page context that owns a recording and receives pushes
//! - [`SessionStore`] - Persistence of finished session records
//! - [`KeyValueStore`] - Settings and transient progress storage
//! - [`ProgressSink`] - Receiver of batch generation progress events
//! - [`CodeGenerator`] - Turns steps into Playwright code

pub mod error;
pub mod generator;
pub mod progress;
pub mod provider;
pub mod session;
pub mod step;
pub mod store;
pub mod surface;

pub use error::{ProviderError, RecorderError, StoreError, SurfaceError};
pub use generator::{CodeGenerator, GeneratorInfo};
pub use progress::{ProgressEvent, ProgressReporter, ProgressSink, ProgressStage};
pub use provider::ProviderSettings;
pub use session::{
    OutputFormat, RecordMode, RecorderStatus, RecordingPhase, SessionRecord, SessionSettings,
    SessionSnapshot, SurfaceId,
};
pub use step::{CapturedStep, Step, StepType, StepValue};
pub use store::{KeyValueStore, SessionStore};
pub use surface::{CodeNotice, Surface, SurfaceMessage, SurfaceReply, SurfaceStatus};
