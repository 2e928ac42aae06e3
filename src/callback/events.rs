//! Payment-completed notifications
//!
//! Published after the backend confirms a payment so other parts of the
//! application (dashboards, caches) can refresh. Delivery is best effort and
//! never affects the reconciliation outcome.

use crate::payments::types::VerificationResponse;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCompleted {
    pub transaction_id: String,
    pub payment_reference: String,
    pub verification: VerificationResponse,
}

#[derive(Debug, Clone)]
pub struct PaymentEvents {
    tx: broadcast::Sender<PaymentCompleted>,
}

impl PaymentEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PaymentCompleted> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Returns how many subscribers received the event.
    pub fn publish(&self, event: PaymentCompleted) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!("No subscribers for payment-completed event");
                0
            }
        }
    }
}
