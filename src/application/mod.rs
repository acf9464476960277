//! Application layer: the store-backed payment state machine, the
//! notification dispatcher and the workflow orchestrator that sequences
//! them for inbound requests.

pub mod dispatcher;
pub mod lifecycle;
pub mod workflow;
