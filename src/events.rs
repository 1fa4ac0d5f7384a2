use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Domain events published after a successful commit. Consumers are
/// notification-only; no core invariant depends on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ProductCreated {
        product_id: i64,
    },
    ProductUpdated {
        product_id: i64,
    },
    ProductPriceChanged {
        product_id: i64,
        old_price: Decimal,
        new_price: Decimal,
    },
    ProductDeleted {
        product_id: i64,
    },
    SaleRecorded {
        product_id: i64,
        movement_id: i64,
        quantity: i32,
        stock_after: i32,
    },
    StockRestocked {
        product_id: i64,
        movement_id: i64,
        quantity: i32,
        stock_after: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Runs for the lifetime of
/// the process; exits when all senders are dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::SaleRecorded {
                product_id,
                movement_id,
                quantity,
                stock_after,
            } => {
                info!(
                    product_id,
                    movement_id, quantity, stock_after, "sale recorded"
                );
            }
            Event::StockRestocked {
                product_id,
                movement_id,
                quantity,
                stock_after,
            } => {
                info!(
                    product_id,
                    movement_id, quantity, stock_after, "stock restocked"
                );
            }
            other => debug!(?other, "event processed"),
        }
    }
    info!("Event processor stopped");
}
