//! Domain entities, value objects and the ports consumed by the
//! application layer.

pub mod booking;
pub mod notification;
pub mod payment;
pub mod ports;
