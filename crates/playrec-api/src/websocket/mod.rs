//! WebSocket hub for capture surfaces.
//!
//! Core to page messages travel as `{requestId, action, ...}` frames; the
//! page answers each with `{type: "ack", requestId, ...}`. Pages may also
//! push captured steps as `{type: "addStep", step}`.

mod frame;
mod handler;
mod surface;

pub use frame::{InboundFrame, OutboundFrame};
pub use handler::ws_handler;
pub use surface::WsSurface;
