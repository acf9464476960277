use crate::domain::booking::{Booking, BookingId, BookingStatus};
use crate::domain::payment::{Payment, PaymentId, PaymentStatus};
use crate::domain::ports::{BookingStore, PaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory booking store.
///
/// Uses `Arc<RwLock<HashMap>>` for shared concurrent access. Suitable for
/// tests and single-process deployments; durable stores plug in behind the
/// same trait.
#[derive(Default, Clone)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<HashMap<BookingId, Booking>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn insert(&self, booking: Booking) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn get(&self, id: &BookingId) -> Result<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(id).cloned())
    }

    async fn set_status(&self, id: &BookingId, status: BookingStatus) -> Result<()> {
        let mut bookings = self.bookings.write().await;
        let booking = bookings.get_mut(id).ok_or(PaymentError::BookingNotFound)?;
        booking.status = status;
        Ok(())
    }
}

/// A thread-safe in-memory payment store.
///
/// The conditional status update runs under a single write-lock
/// acquisition, which gives the single-writer-wins guarantee the lifecycle
/// relies on.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored payment, for inspection in tests.
    pub async fn all(&self) -> Vec<Payment> {
        let payments = self.payments.read().await;
        payments.values().cloned().collect()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, id: &PaymentId) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id).cloned())
    }

    async fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<Payment>> {
        // The transaction reference is the payment id in string form; an
        // unparseable reference simply resolves to no payment.
        let Some(id) = PaymentId::parse(tx_ref) else {
            return Ok(None);
        };
        self.get(&id).await
    }

    async fn set_external_handle(&self, id: &PaymentId, handle: String) -> Result<()> {
        let mut payments = self.payments.write().await;
        let payment = payments.get_mut(id).ok_or(PaymentError::PaymentNotFound)?;
        payment.external_handle = Some(handle);
        Ok(())
    }

    async fn compare_and_set_status(
        &self,
        id: &PaymentId,
        expected: PaymentStatus,
        new: PaymentStatus,
    ) -> Result<bool> {
        let mut payments = self.payments.write().await;
        let payment = payments.get_mut(id).ok_or(PaymentError::PaymentNotFound)?;
        if payment.status != expected {
            return Ok(false);
        }
        payment.status = new;
        Ok(true)
    }
}
