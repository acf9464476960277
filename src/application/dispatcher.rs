use crate::domain::notification::Notification;
use crate::domain::ports::SharedNotificationSender;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// Attempts per message before the worker gives up on it.
const DELIVERY_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// At-least-once dispatch of confirmation messages, decoupled from the
/// request path.
///
/// `enqueue` hands the message to an in-process channel and returns
/// immediately; a spawned worker task performs delivery with bounded
/// retries. Delivery failures are logged and never resurface to the caller
/// that triggered the notification.
#[derive(Clone)]
pub struct NotificationDispatcher {
    queue: mpsc::UnboundedSender<Notification>,
}

impl NotificationDispatcher {
    /// Spawns the delivery worker and returns the producer handle.
    pub fn start(sender: SharedNotificationSender) -> Self {
        let (dispatcher, worker) = Self::start_with_worker(sender);
        drop(worker);
        dispatcher
    }

    /// As `start`, but also hands back the worker task for callers that
    /// want to await drain on shutdown.
    pub fn start_with_worker(sender: SharedNotificationSender) -> (Self, JoinHandle<()>) {
        let (queue, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(deliver_loop(rx, sender));
        (Self { queue }, worker)
    }

    /// Accepts the message into the queue without waiting for delivery.
    pub fn enqueue(&self, notification: Notification) {
        // The receiver only drops once the worker is gone, i.e. at shutdown.
        if self.queue.send(notification).is_err() {
            warn!(?notification, "dispatcher worker gone, notification dropped");
        }
    }
}

async fn deliver_loop(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    sender: SharedNotificationSender,
) {
    while let Some(notification) = rx.recv().await {
        deliver_with_retries(&sender, &notification).await;
    }
}

async fn deliver_with_retries(sender: &SharedNotificationSender, notification: &Notification) {
    for attempt in 1..=DELIVERY_ATTEMPTS {
        match sender.send(notification).await {
            Ok(()) => return,
            Err(err) if attempt < DELIVERY_ATTEMPTS => {
                warn!(?notification, attempt, %err, "notification delivery failed, retrying");
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }
            Err(err) => {
                error!(?notification, attempts = DELIVERY_ATTEMPTS, %err, "giving up on notification");
            }
        }
    }
}
