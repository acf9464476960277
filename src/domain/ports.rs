use super::booking::{Booking, BookingId, BookingStatus};
use super::notification::Notification;
use super::payment::{Amount, Payment, PaymentId, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub type SharedBookingStore = Arc<dyn BookingStore>;
pub type SharedPaymentStore = Arc<dyn PaymentStore>;
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;
pub type SharedNotificationSender = Arc<dyn NotificationSender>;

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn insert(&self, booking: Booking) -> Result<()>;
    async fn get(&self, id: &BookingId) -> Result<Option<Booking>>;
    async fn set_status(&self, id: &BookingId, status: BookingStatus) -> Result<()>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: &PaymentId) -> Result<Option<Payment>>;
    async fn get_by_tx_ref(&self, tx_ref: &str) -> Result<Option<Payment>>;
    async fn set_external_handle(&self, id: &PaymentId, handle: String) -> Result<()>;

    /// Atomically moves the payment from `expected` to `new`.
    ///
    /// Returns `false` when the stored status no longer matches `expected`,
    /// i.e. a concurrent transition won. Single-writer-wins on the status
    /// field is what keeps duplicate verification callbacks safe.
    async fn compare_and_set_status(
        &self,
        id: &PaymentId,
        expected: PaymentStatus,
        new: PaymentStatus,
    ) -> Result<bool>;
}

/// The payer identity forwarded to the gateway's hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Everything the gateway needs to open a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutIntent {
    pub tx_ref: String,
    pub amount: Amount,
    pub payer: Payer,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initialization {
    /// Gateway-hosted page where the payer completes payment.
    pub checkout_url: String,
    pub external_handle: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Whether the provider confirmed the payment. A provider-reported
    /// failure is a successful call with `confirmed == false`; only
    /// transport and protocol failures surface as errors.
    pub confirmed: bool,
    pub raw_status: Option<String>,
}

/// Outbound calls against the external payment provider.
///
/// Implementations carry no retry policy; retrying an initialize call
/// blindly risks duplicate transactions at the provider, so retries are the
/// orchestrator's decision.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, intent: CheckoutIntent) -> Result<Initialization>;
    async fn verify(&self, tx_ref: &str) -> Result<Verification>;
}

/// Delivery transport for confirmation messages, driven by the dispatcher
/// worker and never by request handlers.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<()>;
}
