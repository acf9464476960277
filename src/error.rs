use crate::domain::payment::PaymentStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("booking not found")]
    BookingNotFound,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("amount does not match the booking total")]
    InvalidAmount,
    #[error("invalid payment transition: {from} -> {to}")]
    InvalidTransition {
        from: PaymentStatus,
        to: PaymentStatus,
    },
    #[error("payment gateway rejected the request: {0}")]
    GatewayRejected(String),
    #[error("payment gateway unreachable: {0}")]
    GatewayUnreachable(String),
    #[error("notification delivery failed: {0}")]
    NotificationDelivery(String),
    #[error("validation error: {0}")]
    ValidationError(String),
}
