//! Provider adapter for playrec.
//!
//! Turns a prompt plus [`ProviderSettings`](playrec_protocols::ProviderSettings)
//! into one completion string. Three wire families are supported: the
//! OpenAI-compatible chat schema (OpenAI, LM Studio, Ollama), Gemini and
//! Anthropic. Responses may arrive as a JSON object, a server-sent event
//! stream or raw text; the extracted text is always sanitized.

mod adapter;
mod anthropic;
mod extract;
mod family;
mod gemini;
mod openai;
mod sanitize;

pub use adapter::{ProviderAdapter, TokenBudget};
pub use extract::extract_content;
pub use family::{KnownProvider, PreparedRequest, ProviderFamily, WireFormat};
pub use sanitize::sanitize;
