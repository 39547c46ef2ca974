use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Domain events emitted by the services. Consumed by a logging processor
/// task; delivery is best-effort and never blocks a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    UserRegistered { user_id: i32 },
    CartItemAdded { user_id: i32, product_id: i32 },
    OrderCreated { order_id: i32, user_id: i32 },
    OrderPaid { order_id: i32, user_id: i32 },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {}", e))
    }

    /// Send an event, logging instead of failing when the channel is closed
    /// or full.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("event dropped: {}", e);
        }
    }
}

/// Drains the event channel, recording each event. Runs until every sender
/// is dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(event = ?event, "domain event");
    }
}
