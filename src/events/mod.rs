use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after a committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Budget events
    BudgetCreated(Uuid),

    // Program-of-work events
    PowCreated(Uuid),
    PowUpdated(Uuid),
    PowDeleted(Uuid),

    // Bidding events
    BiddingCreated(Uuid),
    BiddingUpdated(Uuid),
    BiddingAwarded {
        bidding_id: Uuid,
        pow_id: Option<Uuid>,
    },
    BiddingDeleted(Uuid),

    // Contractor aggregate events
    ContractorCreated(Uuid),
    ContractorUpdated(Uuid),
    ContractorAggregatesRecomputed(Uuid),
    ContractorRatingRecomputed(Uuid),
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

/// Drains the event channel, logging each event as it arrives.
///
/// Events are observability fan-out only; no consistency rule depends on a
/// subscriber seeing them.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(event = %payload, "Domain event"),
            Err(e) => warn!("Failed to serialize event {:?}: {}", event, e),
        }
    }
    info!("Event channel closed; event processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender
            .send(Event::PowCreated(Uuid::new_v4()))
            .await
            .expect("send should succeed");
        assert!(matches!(rx.recv().await, Some(Event::PowCreated(_))));
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        let result = sender.send(Event::BudgetCreated(Uuid::new_v4())).await;
        assert!(result.is_err());
    }
}
