use crate::domain::booking::Booking;
use crate::domain::notification::Notification;
use crate::domain::payment::Payment;
use crate::domain::ports::{NotificationSender, SharedBookingStore, SharedPaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use tracing::info;

/// Renders confirmation emails from the stored booking and payment records.
///
/// Delivery here is the process log; an SMTP transport slots in behind the
/// same `NotificationSender` trait without touching the dispatcher.
pub struct EmailNotifier {
    bookings: SharedBookingStore,
    payments: SharedPaymentStore,
    from_address: String,
}

struct Email {
    to: String,
    subject: String,
    body: String,
}

impl EmailNotifier {
    pub fn new(
        bookings: SharedBookingStore,
        payments: SharedPaymentStore,
        from_address: String,
    ) -> Self {
        Self {
            bookings,
            payments,
            from_address,
        }
    }

    async fn render(&self, notification: &Notification) -> Result<Email> {
        match notification {
            Notification::BookingConfirmation(booking_id) => {
                let booking = self
                    .bookings
                    .get(booking_id)
                    .await?
                    .ok_or_else(|| missing(format!("booking {booking_id} no longer exists")))?;
                Ok(booking_confirmation(&booking))
            }
            Notification::PaymentConfirmation(payment_id) => {
                let payment = self
                    .payments
                    .get(payment_id)
                    .await?
                    .ok_or_else(|| missing(format!("payment {payment_id} no longer exists")))?;
                let booking = self
                    .bookings
                    .get(&payment.booking_id)
                    .await?
                    .ok_or_else(|| {
                        missing(format!("booking {} no longer exists", payment.booking_id))
                    })?;
                Ok(payment_confirmation(&booking, &payment))
            }
        }
    }
}

fn missing(detail: String) -> PaymentError {
    PaymentError::NotificationDelivery(detail)
}

fn booking_confirmation(booking: &Booking) -> Email {
    Email {
        to: booking.guest.email.clone(),
        subject: format!("Booking Confirmation - {}", booking.id),
        body: format!(
            "Hello {},\n\n\
             Your booking has been successfully created!\n\n\
             Booking ID: {}\n\
             Check-in: {}\n\
             Check-out: {}\n\
             Total Price: {}\n\
             Status: {}\n\n\
             We'll send you another confirmation once your payment is processed.",
            booking.guest.first_name,
            booking.id,
            booking.start_date,
            booking.end_date,
            booking.total_price,
            booking.status,
        ),
    }
}

fn payment_confirmation(booking: &Booking, payment: &Payment) -> Email {
    Email {
        to: booking.guest.email.clone(),
        subject: format!("Payment Confirmation for Booking {}", booking.id),
        body: format!(
            "Hello {},\n\n\
             Your payment for booking {} has been confirmed.\n\n\
             Dates: {} to {}\n\
             Total Amount: {}\n\
             Payment ID: {}\n\n\
             Thank you for using our service!",
            booking.guest.first_name,
            booking.id,
            booking.start_date,
            booking.end_date,
            payment.amount,
            payment.id,
        ),
    }
}

#[async_trait]
impl NotificationSender for EmailNotifier {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let email = self.render(notification).await?;
        info!(
            from = %self.from_address,
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "confirmation email sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{BookingId, Guest, ListingId};
    use crate::domain::payment::{Amount, PaymentId};
    use crate::domain::ports::{BookingStore, PaymentStore};
    use crate::infrastructure::in_memory::{InMemoryBookingStore, InMemoryPaymentStore};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn booking() -> Booking {
        Booking::new(
            ListingId::generate(),
            Guest {
                email: "guest@example.com".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
            },
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            Amount::new(dec!(400.00)).unwrap(),
        )
        .unwrap()
    }

    fn notifier() -> (EmailNotifier, Arc<InMemoryBookingStore>, Arc<InMemoryPaymentStore>) {
        let bookings = Arc::new(InMemoryBookingStore::new());
        let payments = Arc::new(InMemoryPaymentStore::new());
        let notifier = EmailNotifier::new(
            bookings.clone(),
            payments.clone(),
            "no-reply@lodgepay.example".to_string(),
        );
        (notifier, bookings, payments)
    }

    #[tokio::test]
    async fn test_booking_confirmation_addressed_to_guest() {
        let (notifier, bookings, _) = notifier();
        let b = booking();
        bookings.insert(b.clone()).await.unwrap();

        let email = notifier
            .render(&Notification::BookingConfirmation(b.id))
            .await
            .unwrap();
        assert_eq!(email.to, "guest@example.com");
        assert!(email.subject.contains(&b.id.to_string()));
        assert!(email.body.contains("400.00"));
    }

    #[tokio::test]
    async fn test_payment_confirmation_includes_payment_id() {
        let (notifier, bookings, payments) = notifier();
        let b = booking();
        let p = Payment::new(b.id, b.total_price);
        bookings.insert(b).await.unwrap();
        payments.create(p.clone()).await.unwrap();

        let email = notifier
            .render(&Notification::PaymentConfirmation(p.id))
            .await
            .unwrap();
        assert!(email.body.contains(&p.id.to_string()));
    }

    #[tokio::test]
    async fn test_missing_record_is_delivery_failure() {
        let (notifier, _, _) = notifier();
        let result = notifier
            .send(&Notification::BookingConfirmation(BookingId::generate()))
            .await;
        assert!(matches!(result, Err(PaymentError::NotificationDelivery(_))));

        let result = notifier
            .send(&Notification::PaymentConfirmation(PaymentId::generate()))
            .await;
        assert!(matches!(result, Err(PaymentError::NotificationDelivery(_))));
    }
}
