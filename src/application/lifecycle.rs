use crate::domain::booking::{BookingId, BookingStatus};
use crate::domain::payment::{Amount, Payment, PaymentId, PaymentStatus};
use crate::domain::ports::{SharedBookingStore, SharedPaymentStore};
use crate::error::{PaymentError, Result};
use tracing::{debug, info};

/// The payment state machine, backed by the booking and payment stores.
///
/// Terminal transitions go through the store's compare-and-set so that
/// duplicate or concurrent callbacks resolve to a single winner; the loser
/// observes the already-terminal state and succeeds as a no-op.
#[derive(Clone)]
pub struct PaymentLifecycle {
    bookings: SharedBookingStore,
    payments: SharedPaymentStore,
}

impl PaymentLifecycle {
    pub fn new(bookings: SharedBookingStore, payments: SharedPaymentStore) -> Self {
        Self { bookings, payments }
    }

    /// Creates a `Pending` payment for the booking.
    ///
    /// Fails with `BookingNotFound` when the booking reference does not
    /// resolve and with `InvalidAmount` when the amount diverges from the
    /// booking's current total price.
    pub async fn create(&self, booking_id: &BookingId, amount: Amount) -> Result<Payment> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or(PaymentError::BookingNotFound)?;

        if amount != booking.total_price {
            return Err(PaymentError::InvalidAmount);
        }

        let payment = Payment::new(booking.id, amount);
        self.payments.create(payment.clone()).await?;
        debug!(payment_id = %payment.id, booking_id = %booking.id, "payment created");
        Ok(payment)
    }

    /// Records the gateway-assigned handle; no status change.
    ///
    /// An initialization response landing after the payment already reached
    /// a terminal state is a benign race: this returns `InvalidTransition`
    /// and callers are expected to swallow exactly that error.
    pub async fn mark_initialized(&self, id: &PaymentId, handle: String) -> Result<()> {
        let payment = self
            .payments
            .get(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound)?;

        if payment.status.is_terminal() {
            return Err(PaymentError::InvalidTransition {
                from: payment.status,
                to: payment.status,
            });
        }

        self.payments.set_external_handle(id, handle).await
    }

    /// `Pending -> Completed`, confirming the booking as a side effect.
    ///
    /// Returns `true` iff this call performed the transition. Idempotent on
    /// `Completed`; `InvalidTransition` on `Failed`. Only the call that wins
    /// the compare-and-set confirms the booking, so the booking side effect
    /// happens exactly once however many verification callbacks race.
    pub async fn mark_completed(&self, id: &PaymentId) -> Result<bool> {
        let payment = self
            .payments
            .get(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound)?;

        match payment.status {
            PaymentStatus::Completed => Ok(false),
            PaymentStatus::Failed => Err(PaymentError::InvalidTransition {
                from: PaymentStatus::Failed,
                to: PaymentStatus::Completed,
            }),
            PaymentStatus::Pending => {
                let won = self
                    .payments
                    .compare_and_set_status(id, PaymentStatus::Pending, PaymentStatus::Completed)
                    .await?;
                if !won {
                    // Lost the race; re-read and apply the terminal rules.
                    return self.observe_settled(id, PaymentStatus::Completed).await;
                }

                self.bookings
                    .set_status(&payment.booking_id, BookingStatus::Confirmed)
                    .await?;
                info!(payment_id = %id, booking_id = %payment.booking_id, "payment completed, booking confirmed");
                Ok(true)
            }
        }
    }

    /// `Pending -> Failed`. Returns `true` iff this call performed the
    /// transition. Idempotent on `Failed`; `InvalidTransition` on
    /// `Completed`. No booking side effect.
    pub async fn mark_failed(&self, id: &PaymentId, reason: &str) -> Result<bool> {
        let payment = self
            .payments
            .get(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound)?;

        match payment.status {
            PaymentStatus::Failed => Ok(false),
            PaymentStatus::Completed => Err(PaymentError::InvalidTransition {
                from: PaymentStatus::Completed,
                to: PaymentStatus::Failed,
            }),
            PaymentStatus::Pending => {
                let won = self
                    .payments
                    .compare_and_set_status(id, PaymentStatus::Pending, PaymentStatus::Failed)
                    .await?;
                if !won {
                    return self.observe_settled(id, PaymentStatus::Failed).await;
                }
                info!(payment_id = %id, reason, "payment failed");
                Ok(true)
            }
        }
    }

    /// After a lost compare-and-set: a no-op if the concurrent winner landed
    /// on the same terminal state we wanted, an `InvalidTransition` if it
    /// landed on the other one.
    async fn observe_settled(&self, id: &PaymentId, wanted: PaymentStatus) -> Result<bool> {
        let current = self
            .payments
            .get(id)
            .await?
            .ok_or(PaymentError::PaymentNotFound)?;
        if current.status == wanted {
            Ok(false)
        } else {
            Err(PaymentError::InvalidTransition {
                from: current.status,
                to: wanted,
            })
        }
    }
}
