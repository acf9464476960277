use crate::domain::booking::BookingId;
use crate::domain::payment::PaymentId;

/// An asynchronous confirmation message triggered by a state transition.
///
/// Delivery is at-least-once; a duplicate confirmation is harmless in this
/// domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A booking record was created.
    BookingConfirmation(BookingId),
    /// A payment settled and its booking was confirmed.
    PaymentConfirmation(PaymentId),
}
