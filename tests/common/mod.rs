use async_trait::async_trait;
use chrono::NaiveDate;
use lodgepay::application::dispatcher::NotificationDispatcher;
use lodgepay::application::workflow::PaymentWorkflow;
use lodgepay::domain::booking::{Booking, Guest, ListingId};
use lodgepay::domain::notification::Notification;
use lodgepay::domain::payment::Amount;
use lodgepay::domain::ports::{
    BookingStore, CheckoutIntent, Initialization, NotificationSender, PaymentGateway,
    Verification,
};
use lodgepay::error::{PaymentError, Result};
use lodgepay::infrastructure::in_memory::{InMemoryBookingStore, InMemoryPaymentStore};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const CHECKOUT_URL: &str = "https://pay.example/x";

/// How the stub gateway answers a call.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Succeed,
    Reject(&'static str),
    Unreachable,
}

/// In-process stand-in for the provider, one behavior per operation.
pub struct StubGateway {
    pub init: Behavior,
    pub verify: Behavior,
}

impl StubGateway {
    pub fn succeeding() -> Self {
        Self {
            init: Behavior::Succeed,
            verify: Behavior::Succeed,
        }
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn initialize(&self, _intent: CheckoutIntent) -> Result<Initialization> {
        match self.init {
            Behavior::Succeed => Ok(Initialization {
                checkout_url: CHECKOUT_URL.to_string(),
                external_handle: Some("chapa-ref-1".to_string()),
            }),
            Behavior::Reject(msg) => Err(PaymentError::GatewayRejected(msg.to_string())),
            Behavior::Unreachable => Err(PaymentError::GatewayUnreachable(
                "connection timed out".to_string(),
            )),
        }
    }

    async fn verify(&self, _tx_ref: &str) -> Result<Verification> {
        match self.verify {
            Behavior::Succeed => Ok(Verification {
                confirmed: true,
                raw_status: Some("success".to_string()),
            }),
            // Provider-reported failure is a successful call.
            Behavior::Reject(_) => Ok(Verification {
                confirmed: false,
                raw_status: Some("failed".to_string()),
            }),
            Behavior::Unreachable => Err(PaymentError::GatewayUnreachable(
                "connection timed out".to_string(),
            )),
        }
    }
}

/// Reports every delivered notification on a channel the test holds.
pub struct RecordingSender {
    delivered: mpsc::UnboundedSender<Notification>,
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, notification: &Notification) -> Result<()> {
        let _ = self.delivered.send(*notification);
        Ok(())
    }
}

pub struct Harness {
    pub bookings: Arc<InMemoryBookingStore>,
    pub payments: Arc<InMemoryPaymentStore>,
    pub workflow: Arc<PaymentWorkflow>,
    pub delivered: mpsc::UnboundedReceiver<Notification>,
}

pub fn harness(gateway: StubGateway) -> Harness {
    let bookings = Arc::new(InMemoryBookingStore::new());
    let payments = Arc::new(InMemoryPaymentStore::new());
    let (tx, delivered) = mpsc::unbounded_channel();
    let dispatcher = NotificationDispatcher::start(Arc::new(RecordingSender { delivered: tx }));
    let workflow = Arc::new(PaymentWorkflow::new(
        bookings.clone(),
        payments.clone(),
        Arc::new(gateway),
        dispatcher,
    ));
    Harness {
        bookings,
        payments,
        workflow,
        delivered,
    }
}

pub fn guest() -> Guest {
    Guest {
        email: "guest@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}

pub fn payer() -> lodgepay::domain::ports::Payer {
    lodgepay::domain::ports::Payer {
        email: "guest@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    }
}

/// Seeds a pending booking directly into the store, bypassing the workflow
/// so no booking-confirmation notification is enqueued.
pub async fn seed_booking(bookings: &InMemoryBookingStore, total: Decimal) -> Booking {
    let booking = Booking::new(
        ListingId::generate(),
        guest(),
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
        Amount::new(total).unwrap(),
    )
    .unwrap();
    bookings.insert(booking.clone()).await.unwrap();
    booking
}

/// Receives the next delivered notification, failing the test on timeout.
pub async fn next_notification(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Notification {
    tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
        .await
        .expect("notification delivery timed out")
        .expect("dispatcher channel closed")
}

/// Asserts that nothing further gets delivered.
pub async fn assert_no_more_notifications(rx: &mut mpsc::UnboundedReceiver<Notification>) {
    let extra = tokio::time::timeout(std::time::Duration::from_millis(200), rx.recv()).await;
    assert!(extra.is_err(), "unexpected extra notification: {extra:?}");
}
