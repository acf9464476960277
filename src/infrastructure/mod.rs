//! Adapters behind the domain ports: in-memory stores, the Chapa gateway
//! client and the email notification sender.

pub mod chapa;
pub mod email;
pub mod in_memory;
