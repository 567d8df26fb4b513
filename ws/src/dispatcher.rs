use crate::connection::{ConnectionId, ConnectionRegistry, MatchId};
use crate::message::{ClientCommand, EventType, ServerFrame};
use log::*;
use std::sync::Arc;

/// What a single inbound frame amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Subscribed(MatchId),
    Unsubscribed(MatchId),
    /// Decodable but not a known command; nothing was sent.
    Ignored,
    /// Not decodable; one error frame was sent.
    Rejected,
}

/// Turns inbound client frames into registry mutations and replies.
pub struct CommandDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Handles one raw frame from `connection_id`. Never closes the connection.
    pub fn dispatch(&self, connection_id: &ConnectionId, raw: &[u8]) -> DispatchOutcome {
        let command = match ClientCommand::decode(raw) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejecting undecodable frame from connection {connection_id}: {e}");
                self.reply(connection_id, ServerFrame::invalid_json());
                return DispatchOutcome::Rejected;
            }
        };

        match command {
            ClientCommand::Subscribe(match_id) => {
                self.registry.subscribe(match_id, connection_id);
                self.reply(connection_id, ServerFrame::Subscribed { match_id });
                DispatchOutcome::Subscribed(match_id)
            }
            ClientCommand::Unsubscribe(match_id) => {
                self.registry.unsubscribe(match_id, connection_id);
                self.reply(connection_id, ServerFrame::Unsubscribed { match_id });
                DispatchOutcome::Unsubscribed(match_id)
            }
            ClientCommand::Unknown => {
                debug!("Ignoring unrecognized command from connection {connection_id}");
                DispatchOutcome::Ignored
            }
        }
    }

    fn reply(&self, connection_id: &ConnectionId, frame: ServerFrame) {
        match frame.serialize() {
            Ok(serialized) => {
                self.registry.send_to(connection_id, serialized);
            }
            Err(e) => error!("Failed to serialize {} frame: {e}", frame.event_type()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{ConnectionState, Frame};
    use serde_json::{json, Value};
    use tokio::sync::mpsc::{self, Receiver};

    fn setup() -> (
        Arc<ConnectionRegistry>,
        CommandDispatcher,
        ConnectionId,
        Receiver<Frame>,
    ) {
        let registry = Arc::new(ConnectionRegistry::new());
        let (tx, rx) = mpsc::channel(64);
        let conn = registry.register(tx);
        registry.set_state(&conn, ConnectionState::Open);
        let dispatcher = CommandDispatcher::new(Arc::clone(&registry));
        (registry, dispatcher, conn, rx)
    }

    fn replies(rx: &mut Receiver<Frame>) -> Vec<Value> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    #[test]
    fn subscribe_updates_registry_and_acknowledges() {
        let (registry, dispatcher, conn, mut rx) = setup();

        let outcome = dispatcher.dispatch(&conn, br#"{"type":"subscribe","matchId":7}"#);

        assert_eq!(outcome, DispatchOutcome::Subscribed(7));
        assert!(registry.subscribers_of(7).contains(&conn));
        assert!(registry.subscriptions_of(&conn).contains(&7));
        assert_eq!(
            replies(&mut rx),
            vec![json!({"type": "subscribed", "matchId": 7})]
        );
    }

    #[test]
    fn unsubscribe_updates_registry_and_acknowledges() {
        let (registry, dispatcher, conn, mut rx) = setup();
        dispatcher.dispatch(&conn, br#"{"type":"subscribe","matchId":7}"#);
        rx.try_recv().unwrap();

        let outcome = dispatcher.dispatch(&conn, br#"{"type":"unsubscribe","matchId":7}"#);

        assert_eq!(outcome, DispatchOutcome::Unsubscribed(7));
        assert!(!registry.has_match(7));
        assert!(registry.subscriptions_of(&conn).is_empty());
        assert_eq!(
            replies(&mut rx),
            vec![json!({"type": "unsubscribed", "matchId": 7})]
        );
    }

    #[test]
    fn unsubscribe_from_unknown_match_still_acknowledges() {
        let (registry, dispatcher, conn, mut rx) = setup();

        let outcome = dispatcher.dispatch(&conn, br#"{"type":"unsubscribe","matchId":3}"#);

        assert_eq!(outcome, DispatchOutcome::Unsubscribed(3));
        assert_eq!(registry.match_count(), 0);
        assert_eq!(replies(&mut rx).len(), 1);
    }

    #[test]
    fn invalid_json_yields_exactly_one_error_frame() {
        let (registry, dispatcher, conn, mut rx) = setup();

        let outcome = dispatcher.dispatch(&conn, b"{not json");

        assert_eq!(outcome, DispatchOutcome::Rejected);
        assert_eq!(
            replies(&mut rx),
            vec![json!({"type": "error", "message": "Invalid JSON payload"})]
        );
        assert_eq!(registry.match_count(), 0);
    }

    #[test]
    fn connection_keeps_working_after_invalid_json() {
        let (registry, dispatcher, conn, mut rx) = setup();

        dispatcher.dispatch(&conn, b"garbage");
        dispatcher.dispatch(&conn, br#"{"type":"subscribe","matchId":1}"#);

        assert_eq!(
            replies(&mut rx),
            vec![
                json!({"type": "error", "message": "Invalid JSON payload"}),
                json!({"type": "subscribed", "matchId": 1}),
            ]
        );
        assert!(registry.has_match(1));
    }

    #[test]
    fn unknown_commands_are_silently_ignored() {
        let (registry, dispatcher, conn, mut rx) = setup();

        for raw in [
            br#"{"type":"ping"}"#.as_slice(),
            br#"{"type":"subscribe","matchId":"7"}"#.as_slice(),
            br#"{"type":"subscribe"}"#.as_slice(),
            b"null".as_slice(),
        ] {
            assert_eq!(dispatcher.dispatch(&conn, raw), DispatchOutcome::Ignored);
        }

        assert!(replies(&mut rx).is_empty());
        assert_eq!(registry.match_count(), 0);
        assert!(registry.subscriptions_of(&conn).is_empty());
    }
}
