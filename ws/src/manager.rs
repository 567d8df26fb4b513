use crate::connection::{ConnectionId, ConnectionRegistry, ConnectionState, FrameSender, MatchId};
use crate::dispatcher::{CommandDispatcher, DispatchOutcome};
use crate::message::{EventType, Message as WsMessage, MessageScope, ServerFrame};
use log::*;
use serde_json::Value;
use std::sync::Arc;

/// Front door to the real-time subsystem: connection lifecycle for the
/// transport layer and the emission entry points for everyone else.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    dispatcher: CommandDispatcher,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ConnectionRegistry::new()))
    }

    pub fn with_registry(registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(Arc::clone(&registry)),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Register a new connection and return its unique ID
    pub fn register_connection(&self, sender: FrameSender) -> ConnectionId {
        let connection_id = self.registry.register(sender);
        info!("Registered new WebSocket connection {connection_id}");
        connection_id
    }

    /// Sends `welcome` and moves the connection to `Open`.
    pub fn open_connection(&self, connection_id: &ConnectionId) {
        self.send_to(connection_id, ServerFrame::Welcome);
        self.registry.set_state(connection_id, ConnectionState::Open);
    }

    /// Marks the connection closed so no further frames are queued for it.
    pub fn mark_closed(&self, connection_id: &ConnectionId) {
        self.registry.set_state(connection_id, ConnectionState::Closed);
    }

    /// Unregister a connection by ID, dropping all of its subscriptions
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        info!("Unregistering WebSocket connection {connection_id}");
        self.registry.unregister(connection_id);
    }

    pub fn dispatch(&self, connection_id: &ConnectionId, raw: &[u8]) -> DispatchOutcome {
        self.dispatcher.dispatch(connection_id, raw)
    }

    pub fn send_to(&self, connection_id: &ConnectionId, frame: ServerFrame) -> bool {
        match frame.serialize() {
            Ok(serialized) => self.registry.send_to(connection_id, serialized),
            Err(e) => {
                error!("Failed to serialize {} frame: {e}", frame.event_type());
                false
            }
        }
    }

    /// Send a message based on its scope. The frame is serialized once;
    /// returns how many connections it was handed to.
    pub fn send_message(&self, message: WsMessage) -> usize {
        let event_type = message.frame.event_type();

        let frame = match message.frame.serialize() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to serialize {event_type} frame: {e}");
                return 0;
            }
        };

        let delivered = match &message.scope {
            MessageScope::Broadcast => self.registry.broadcast(&frame),
            MessageScope::Match { match_id } => self.registry.send_to_match(*match_id, &frame),
        };

        debug!(
            "Sent {event_type} frame ({:?}) to {delivered} connection(s)",
            message.scope
        );
        delivered
    }

    pub fn broadcast_all(&self, frame: ServerFrame) -> usize {
        self.send_message(WsMessage {
            frame,
            scope: MessageScope::Broadcast,
        })
    }

    pub fn broadcast_to_match(&self, match_id: MatchId, frame: ServerFrame) -> usize {
        self.send_message(WsMessage {
            frame,
            scope: MessageScope::Match { match_id },
        })
    }

    /// Announce a newly stored match to every open connection.
    pub fn notify_match_created(&self, r#match: Value) -> usize {
        self.broadcast_all(ServerFrame::MatchCreated { data: r#match })
    }

    /// Announce a newly stored commentary entry to the match's subscribers.
    pub fn notify_commentary(&self, match_id: MatchId, comment: Value) -> usize {
        self.broadcast_to_match(match_id, ServerFrame::Commentary { data: comment })
    }

    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
