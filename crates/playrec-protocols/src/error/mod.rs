//! Error types for the playrec protocol layer.

mod provider;
mod recorder;
mod store;
mod surface;

pub use provider::*;
pub use recorder::*;
pub use store::*;
pub use surface::*;
