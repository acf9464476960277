//! Transport surface: the axum HTTP API over the workflow orchestrator.

pub mod http;
