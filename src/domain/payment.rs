use crate::domain::booking::BookingId;
use crate::error::PaymentError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A positive monetary amount.
///
/// Wraps `rust_decimal::Decimal` so that bookings and payments can never
/// carry a zero or negative price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique payment identifier.
///
/// The string form doubles as the transaction reference (`tx_ref`) shared
/// with the payment gateway to correlate initialize and verify calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Completed and Failed are terminal; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One attempt to pay for a booking via the external gateway.
///
/// A payment is created `Pending`, moves to exactly one of `Completed` or
/// `Failed`, and is never reused afterwards: re-initiation after a failure
/// creates a fresh record, preserving the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub booking_id: BookingId,
    pub amount: Amount,
    pub status: PaymentStatus,
    /// Gateway-assigned handle, absent until initialization succeeds.
    pub external_handle: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(booking_id: BookingId, amount: Amount) -> Self {
        Self {
            id: PaymentId::generate(),
            booking_id,
            amount,
            status: PaymentStatus::Pending,
            external_handle: None,
            created_at: Utc::now(),
        }
    }

    /// The reference sent to the gateway on initialize and verify.
    pub fn tx_ref(&self) -> String {
        self.id.to_string()
    }
}
