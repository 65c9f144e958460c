//! # Playrec Codegen
//!
//! Everything that knows what Playwright code looks like:
//!
//! - [`Dialect`] - skeleton, teardown anchor and indentation per output format
//! - [`prompt`] - prompts for first-step, single-line and batch generation
//! - [`CodeAccumulator`] - merges per-step fragments into one program
//! - [`FallbackGenerator`] - rule-based code when the model is unavailable

mod accumulator;
mod dialect;
mod fallback;
pub mod prompt;

pub use accumulator::{CodeAccumulator, MergeOutcome};
pub use dialect::Dialect;
pub use fallback::FallbackGenerator;
