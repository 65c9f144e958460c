//! HTTP interface module.

pub mod history;
pub mod monitoring;
pub mod recording;
pub mod routes;
