use super::dispatcher::NotificationDispatcher;
use super::lifecycle::PaymentLifecycle;
use crate::domain::booking::{Booking, BookingId};
use crate::domain::notification::Notification;
use crate::domain::payment::{PaymentId, PaymentStatus};
use crate::domain::ports::{
    CheckoutIntent, Payer, SharedBookingStore, SharedPaymentGateway, SharedPaymentStore,
};
use crate::error::{PaymentError, Result};
use tracing::{info, warn};

/// Result of a successful payment initiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub payment_id: PaymentId,
    pub checkout_url: String,
}

/// The facade invoked by inbound requests.
///
/// Sequences the booking store, the payment state machine, the gateway
/// client and the notification dispatcher. Shared across request tasks;
/// concurrent operations on different payments are fully independent, and
/// races on the same payment resolve through the lifecycle's
/// compare-and-set transitions.
pub struct PaymentWorkflow {
    bookings: SharedBookingStore,
    payments: SharedPaymentStore,
    lifecycle: PaymentLifecycle,
    gateway: SharedPaymentGateway,
    dispatcher: NotificationDispatcher,
}

impl PaymentWorkflow {
    pub fn new(
        bookings: SharedBookingStore,
        payments: SharedPaymentStore,
        gateway: SharedPaymentGateway,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        let lifecycle = PaymentLifecycle::new(bookings.clone(), payments.clone());
        Self {
            bookings,
            payments,
            lifecycle,
            gateway,
            dispatcher,
        }
    }

    /// Persists a new booking and enqueues its confirmation notification.
    ///
    /// The enqueue is synchronous with respect to the booking write but
    /// asynchronous with respect to delivery.
    pub async fn create_booking(&self, booking: Booking) -> Result<Booking> {
        self.bookings.insert(booking.clone()).await?;
        info!(booking_id = %booking.id, "booking created");
        self.dispatcher
            .enqueue(Notification::BookingConfirmation(booking.id));
        Ok(booking)
    }

    /// Creates a payment for the booking and opens a checkout session at
    /// the gateway.
    ///
    /// A gateway rejection or outage leaves a durable `Failed` payment
    /// behind before the error is surfaced; re-initiation afterwards
    /// creates a fresh payment record.
    pub async fn initiate_payment(
        &self,
        booking_id: &BookingId,
        payer: Payer,
    ) -> Result<CheckoutSession> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound)?;

        let payment = self.lifecycle.create(booking_id, booking.total_price).await?;

        let intent = CheckoutIntent {
            tx_ref: payment.tx_ref(),
            amount: payment.amount,
            payer,
            title: format!("Payment for booking {}", booking.id),
            description: format!(
                "Booking from {} to {}",
                booking.start_date, booking.end_date
            ),
        };

        // The gateway call blocks on network I/O with a bounded timeout and
        // holds no store locks; the record was created before the call and
        // is updated after it.
        match self.gateway.initialize(intent).await {
            Ok(init) => {
                if let Some(handle) = init.external_handle {
                    self.record_initialized(&payment.id, handle).await?;
                }
                Ok(CheckoutSession {
                    payment_id: payment.id,
                    checkout_url: init.checkout_url,
                })
            }
            Err(
                err @ (PaymentError::GatewayRejected(_) | PaymentError::GatewayUnreachable(_)),
            ) => {
                if let Err(mark_err) = self.lifecycle.mark_failed(&payment.id, "gateway initialization failed").await {
                    warn!(payment_id = %payment.id, %mark_err, "could not record failed initiation");
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Re-checks the transaction with the provider and settles the payment.
    ///
    /// Safe to invoke repeatedly and concurrently for the same reference:
    /// duplicate webhook and user-redirect triggers resolve to one winning
    /// transition, one booking confirmation and one enqueued notification.
    /// `GatewayUnreachable` propagates without touching payment state so
    /// the caller can simply try again.
    pub async fn verify_payment(&self, tx_ref: &str) -> Result<PaymentStatus> {
        let payment = self
            .payments
            .get_by_tx_ref(tx_ref)
            .await?
            .ok_or(PaymentError::PaymentNotFound)?;

        let verification = self.gateway.verify(tx_ref).await?;

        if verification.confirmed {
            let won = self.lifecycle.mark_completed(&payment.id).await?;
            if won {
                self.dispatcher
                    .enqueue(Notification::PaymentConfirmation(payment.id));
            }
            Ok(PaymentStatus::Completed)
        } else {
            info!(
                payment_id = %payment.id,
                raw_status = verification.raw_status.as_deref().unwrap_or("<none>"),
                "provider did not confirm payment"
            );
            self.lifecycle
                .mark_failed(&payment.id, "provider reported failure")
                .await?;
            Ok(PaymentStatus::Failed)
        }
    }

    /// A late initialization response against a settled payment is a benign
    /// race, not a failure to surface.
    async fn record_initialized(&self, id: &PaymentId, handle: String) -> Result<()> {
        match self.lifecycle.mark_initialized(id, handle).await {
            Err(PaymentError::InvalidTransition { .. }) => Ok(()),
            other => other,
        }
    }
}
