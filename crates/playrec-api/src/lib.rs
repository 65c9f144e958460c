//! # Playrec API
//!
//! The HTTP and WebSocket surface the browser side talks to:
//!
//! - **HTTP**: recording lifecycle, step capture, surface lifecycle,
//!   on-demand generation and session history
//! - **WebSocket**: one connection per page; implements
//!   [`Surface`](playrec_protocols::Surface) so the core can push messages
//!   and await acknowledgements

pub mod error;
pub mod http;
pub mod server;
pub mod state;
pub mod websocket;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ApiError, ErrorResponse};
pub use http::routes::create_router;
pub use server::ApiServer;
pub use state::AppState;
pub use websocket::{InboundFrame, OutboundFrame, WsSurface};
