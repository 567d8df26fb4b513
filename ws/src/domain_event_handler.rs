use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Fans domain events out to WebSocket clients.
///
/// A created match goes to every open connection; a commentary entry goes
/// only to the connections subscribed to its match.
pub struct WsDomainEventHandler {
    ws_manager: Arc<Manager>,
}

impl WsDomainEventHandler {
    pub fn new(ws_manager: Arc<Manager>) -> Self {
        Self { ws_manager }
    }
}

#[async_trait]
impl EventHandler for WsDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::MatchCreated { match_id, r#match } => {
                let delivered = self.ws_manager.notify_match_created(r#match.clone());
                debug!("Announced match {match_id} to {delivered} connection(s)");
            }
            DomainEvent::CommentaryPosted {
                match_id,
                commentary,
            } => {
                let delivered = self
                    .ws_manager
                    .notify_commentary(*match_id, commentary.clone());
                debug!("Delivered commentary for match {match_id} to {delivered} subscriber(s)");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use events::EventPublisher;
    use serde_json::{json, Value};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn published_events_reach_websocket_clients() {
        let manager = Arc::new(Manager::new());
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(WsDomainEventHandler::new(Arc::clone(&manager))));

        let (tx_fan, mut rx_fan) = mpsc::channel(64);
        let fan = Session::open(Arc::clone(&manager), tx_fan);
        let (tx_idle, mut rx_idle) = mpsc::channel(64);
        let _idle = Session::open(Arc::clone(&manager), tx_idle);
        fan.handle_frame(br#"{"type":"subscribe","matchId":7}"#);

        publisher
            .publish(DomainEvent::MatchCreated {
                match_id: 7,
                r#match: json!({"id": 7}),
            })
            .await;
        publisher
            .publish(DomainEvent::CommentaryPosted {
                match_id: 7,
                commentary: json!({"minute": 10, "message": "Goal"}),
            })
            .await;

        let types = |rx: &mut mpsc::Receiver<crate::connection::Frame>| {
            let mut out = Vec::new();
            while let Ok(frame) = rx.try_recv() {
                let value: Value = serde_json::from_str(&frame).unwrap();
                out.push(value["type"].as_str().unwrap().to_string());
            }
            out
        };

        assert_eq!(
            types(&mut rx_fan),
            vec!["welcome", "subscribed", "match_created", "commentary"]
        );
        assert_eq!(types(&mut rx_idle), vec!["welcome", "match_created"]);
    }
}
