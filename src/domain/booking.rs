use crate::domain::payment::Amount;
use crate::error::PaymentError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Reference into the listing catalog, which lives outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Contact details of the guest who made the reservation, used both as the
/// default payer identity and as the recipient of confirmation messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A reservation of a listing for a date range at a fixed price.
///
/// Mutated only by the payment lifecycle (to `Confirmed` on settlement) or
/// by external cancellation flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub listing_id: ListingId,
    pub guest: Guest,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Amount,
    pub status: BookingStatus,
}

impl Booking {
    pub fn new(
        listing_id: ListingId,
        guest: Guest,
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_price: Amount,
    ) -> Result<Self, PaymentError> {
        if end_date <= start_date {
            return Err(PaymentError::ValidationError(
                "end_date must be after start_date".to_string(),
            ));
        }
        Ok(Self {
            id: BookingId::generate(),
            listing_id,
            guest,
            start_date,
            end_date,
            total_price,
            status: BookingStatus::Pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn guest() -> Guest {
        Guest {
            email: "guest@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[test]
    fn test_new_booking_is_pending() {
        let booking = Booking::new(
            ListingId::generate(),
            guest(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            Amount::new(dec!(400.00)).unwrap(),
        )
        .unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
    }

    #[test]
    fn test_inverted_date_range_rejected() {
        let result = Booking::new(
            ListingId::generate(),
            guest(),
            NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            Amount::new(dec!(400.00)).unwrap(),
        );
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
    }
}
