use dashmap::DashMap;
use log::*;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

pub use events::MatchId;

/// A serialized server frame. Serialized once per emission and shared by
/// every recipient.
pub type Frame = Arc<str>;

/// Outbound half of a connection. Bounded; a frame that does not fit is
/// dropped for that recipient only and never blocks delivery to the others.
pub type FrameSender = Sender<Frame>;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a single connection. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Per-connection bookkeeping held by the registry.
#[derive(Debug)]
pub struct ConnectionInfo {
    sender: FrameSender,
    state: ConnectionState,
    /// Mirror of every `match_index` entry this connection appears in.
    subscriptions: HashSet<MatchId>,
}

impl ConnectionInfo {
    fn new(sender: FrameSender) -> Self {
        Self {
            sender,
            state: ConnectionState::Connecting,
            subscriptions: HashSet::new(),
        }
    }

    /// Broadcasts only go to fully open connections whose writer is still alive.
    fn accepts_broadcast(&self) -> bool {
        self.state == ConnectionState::Open && !self.sender.is_closed()
    }
}

/// Bidirectional subscription index.
///
/// `connections` maps a connection to its sender and local subscription set;
/// `match_index` maps a match to the connections subscribed to it. A
/// connection appears under match M in `match_index` iff M is in that
/// connection's local set, and `match_index` never holds an empty set.
///
/// Lock ordering: a `connections` guard may be held while touching
/// `match_index`, never the other way round. Readers of `match_index` copy
/// the subscriber ids out before looking up connections.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionInfo>,
    match_index: DashMap<MatchId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            match_index: DashMap::new(),
        }
    }

    /// Register a new connection in the `Connecting` state.
    pub fn register(&self, sender: FrameSender) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.connections
            .insert(connection_id.clone(), ConnectionInfo::new(sender));
        connection_id
    }

    /// Moves a connection to `state`. A closed connection stays closed.
    pub fn set_state(&self, connection_id: &ConnectionId, state: ConnectionState) {
        if let Some(mut info) = self.connections.get_mut(connection_id) {
            if info.state != ConnectionState::Closed {
                info.state = state;
            }
        }
    }

    pub fn state_of(&self, connection_id: &ConnectionId) -> Option<ConnectionState> {
        self.connections.get(connection_id).map(|info| info.state)
    }

    /// Drops every subscription held by the connection and forgets it.
    /// Safe to call for an unknown or already removed connection.
    pub fn unregister(&self, connection_id: &ConnectionId) {
        self.set_state(connection_id, ConnectionState::Closed);
        self.cleanup_all(connection_id);
        self.connections.remove(connection_id);
    }

    /// Adds the connection to `match_id`'s subscriber set, creating the set if
    /// needed. Returns `false` if the connection was already subscribed, is
    /// unknown, or is closed.
    pub fn subscribe(&self, match_id: MatchId, connection_id: &ConnectionId) -> bool {
        let Some(mut info) = self.connections.get_mut(connection_id) else {
            return false;
        };
        if info.state == ConnectionState::Closed {
            return false;
        }

        let added = info.subscriptions.insert(match_id);
        self.match_index
            .entry(match_id)
            .or_default()
            .insert(connection_id.clone());

        if added {
            debug!("Connection {connection_id} subscribed to match {match_id}");
        }
        added
    }

    /// Removes the connection from `match_id`'s subscriber set, pruning the
    /// entry when it becomes empty. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, match_id: MatchId, connection_id: &ConnectionId) -> bool {
        let removed = match self.connections.get_mut(connection_id) {
            Some(mut info) => {
                let removed = info.subscriptions.remove(&match_id);
                self.remove_from_match(match_id, connection_id);
                removed
            }
            None => {
                self.remove_from_match(match_id, connection_id);
                false
            }
        };

        if removed {
            debug!("Connection {connection_id} unsubscribed from match {match_id}");
        }
        removed
    }

    /// Unsubscribes the connection from every match in its local set and
    /// clears that set. Returns how many subscriptions were dropped; a
    /// repeated call returns 0.
    pub fn cleanup_all(&self, connection_id: &ConnectionId) -> usize {
        let Some(mut info) = self.connections.get_mut(connection_id) else {
            return 0;
        };

        let match_ids: Vec<MatchId> = info.subscriptions.drain().collect();
        for match_id in &match_ids {
            self.remove_from_match(*match_id, connection_id);
        }

        if !match_ids.is_empty() {
            debug!(
                "Cleaned up {} subscription(s) for connection {connection_id}",
                match_ids.len()
            );
        }
        match_ids.len()
    }

    /// Snapshot of the connections currently subscribed to `match_id`.
    pub fn subscribers_of(&self, match_id: MatchId) -> HashSet<ConnectionId> {
        self.match_index
            .get(&match_id)
            .map(|subscribers| subscribers.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the connection's local subscription set.
    pub fn subscriptions_of(&self, connection_id: &ConnectionId) -> HashSet<MatchId> {
        self.connections
            .get(connection_id)
            .map(|info| info.subscriptions.clone())
            .unwrap_or_default()
    }

    pub fn has_match(&self, match_id: MatchId) -> bool {
        self.match_index.contains_key(&match_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn match_count(&self) -> usize {
        self.match_index.len()
    }

    /// Direct reply to one connection (welcome, acks, protocol errors).
    /// Allowed while `Connecting` or `Open`.
    pub fn send_to(&self, connection_id: &ConnectionId, frame: Frame) -> bool {
        let Some(info) = self.connections.get(connection_id) else {
            return false;
        };
        if info.state == ConnectionState::Closed {
            return false;
        }

        try_enqueue(connection_id, &info.sender, frame)
    }

    /// Delivers `frame` to every subscriber of `match_id`. Returns the number
    /// of connections that accepted it.
    pub fn send_to_match(&self, match_id: MatchId, frame: &Frame) -> usize {
        let subscribers = self.subscribers_of(match_id);
        if subscribers.is_empty() {
            return 0;
        }

        let mut delivered = 0;
        for connection_id in &subscribers {
            if let Some(info) = self.connections.get(connection_id) {
                if deliver(connection_id, &info, frame) {
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Delivers `frame` to every open connection. Returns the number of
    /// connections that accepted it.
    pub fn broadcast(&self, frame: &Frame) -> usize {
        let mut delivered = 0;
        for entry in self.connections.iter() {
            if deliver(entry.key(), entry.value(), frame) {
                delivered += 1;
            }
        }
        delivered
    }

    fn remove_from_match(&self, match_id: MatchId, connection_id: &ConnectionId) {
        {
            let Some(mut subscribers) = self.match_index.get_mut(&match_id) else {
                return;
            };
            subscribers.remove(connection_id);
        }
        // Checked under the shard lock so a concurrent subscribe is never pruned.
        self.match_index
            .remove_if(&match_id, |_, subscribers| subscribers.is_empty());
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn deliver(connection_id: &ConnectionId, info: &ConnectionInfo, frame: &Frame) -> bool {
    if !info.accepts_broadcast() {
        trace!("Skipping connection {connection_id} in state {:?}", info.state);
        return false;
    }

    try_enqueue(connection_id, &info.sender, Arc::clone(frame))
}

fn try_enqueue(connection_id: &ConnectionId, sender: &FrameSender, frame: Frame) -> bool {
    match sender.try_send(frame) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(
                "Send queue full for connection {connection_id} ({} frames), dropping frame",
                sender.max_capacity()
            );
            false
        }
        Err(TrySendError::Closed(_)) => {
            warn!("Connection {connection_id} receiver is gone, skipping frame");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, Receiver};

    const QUEUE: usize = 64;

    fn open_connection(registry: &ConnectionRegistry) -> (ConnectionId, Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(QUEUE);
        let id = registry.register(tx);
        registry.set_state(&id, ConnectionState::Open);
        (id, rx)
    }

    fn drain(rx: &mut Receiver<Frame>) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame.to_string());
        }
        frames
    }

    #[test]
    fn subscribe_creates_entry_and_mirrors_local_set() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = open_connection(&registry);

        assert!(!registry.has_match(7));
        assert!(registry.subscribe(7, &conn));

        assert!(registry.subscribers_of(7).contains(&conn));
        assert!(registry.subscriptions_of(&conn).contains(&7));
    }

    #[test]
    fn duplicate_subscribe_leaves_subscriber_set_unchanged() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = open_connection(&registry);

        assert!(registry.subscribe(7, &conn));
        assert!(!registry.subscribe(7, &conn));

        assert_eq!(registry.subscribers_of(7).len(), 1);
        assert_eq!(registry.subscriptions_of(&conn).len(), 1);
    }

    #[test]
    fn last_unsubscribe_prunes_match_entry() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = open_connection(&registry);
        let (b, _rx_b) = open_connection(&registry);
        registry.subscribe(7, &a);
        registry.subscribe(7, &b);

        registry.unsubscribe(7, &a);
        assert!(registry.has_match(7));

        registry.unsubscribe(7, &b);
        assert!(!registry.has_match(7));
        assert_eq!(registry.match_count(), 0);
    }

    #[test]
    fn unsubscribe_of_unknown_match_is_a_no_op() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = open_connection(&registry);

        assert!(!registry.unsubscribe(42, &conn));
        assert!(!registry.has_match(42));
        assert!(registry.subscriptions_of(&conn).is_empty());
    }

    #[test]
    fn cleanup_all_removes_only_that_connection() {
        let registry = ConnectionRegistry::new();
        let (a, _rx_a) = open_connection(&registry);
        let (b, _rx_b) = open_connection(&registry);
        for match_id in [1, 2, 3] {
            registry.subscribe(match_id, &a);
        }
        registry.subscribe(2, &b);

        assert_eq!(registry.cleanup_all(&a), 3);

        assert!(!registry.has_match(1));
        assert!(!registry.has_match(3));
        assert_eq!(registry.subscribers_of(2), HashSet::from([b.clone()]));
        assert!(registry.subscriptions_of(&a).is_empty());
        assert_eq!(registry.subscriptions_of(&b), HashSet::from([2]));
    }

    #[test]
    fn cleanup_all_twice_is_a_no_op() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = open_connection(&registry);
        registry.subscribe(5, &conn);

        assert_eq!(registry.cleanup_all(&conn), 1);
        assert_eq!(registry.cleanup_all(&conn), 0);
        registry.unregister(&conn);
        registry.unregister(&conn);
        assert_eq!(registry.cleanup_all(&conn), 0);
        assert_eq!(registry.connection_count(), 0);
    }

    #[test]
    fn closed_connection_cannot_subscribe() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = open_connection(&registry);
        registry.set_state(&conn, ConnectionState::Closed);
        registry.set_state(&conn, ConnectionState::Open);

        assert_eq!(registry.state_of(&conn), Some(ConnectionState::Closed));
        assert!(!registry.subscribe(1, &conn));
        assert!(!registry.has_match(1));
    }

    #[test]
    fn send_to_match_reaches_only_subscribers() {
        let registry = ConnectionRegistry::new();
        let (a, mut rx_a) = open_connection(&registry);
        let (b, mut rx_b) = open_connection(&registry);
        let (_c, mut rx_c) = open_connection(&registry);
        registry.subscribe(7, &a);
        registry.subscribe(7, &b);

        let frame: Frame = Arc::from("{\"type\":\"commentary\"}");
        assert_eq!(registry.send_to_match(7, &frame), 2);

        assert_eq!(drain(&mut rx_a).len(), 1);
        assert_eq!(drain(&mut rx_b).len(), 1);
        assert!(drain(&mut rx_c).is_empty());
    }

    #[test]
    fn send_to_match_without_subscribers_delivers_nothing() {
        let registry = ConnectionRegistry::new();
        let (_a, mut rx_a) = open_connection(&registry);

        assert_eq!(registry.send_to_match(99, &Arc::from("{}")), 0);
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn broadcast_skips_connections_that_are_not_open() {
        let registry = ConnectionRegistry::new();
        let (_open, mut rx_open) = open_connection(&registry);
        let (tx, mut rx_connecting) = mpsc::channel(QUEUE);
        let _connecting = registry.register(tx);
        let (closed, mut rx_closed) = open_connection(&registry);
        registry.set_state(&closed, ConnectionState::Closed);

        assert_eq!(registry.broadcast(&Arc::from("{}")), 1);

        assert_eq!(drain(&mut rx_open).len(), 1);
        assert!(drain(&mut rx_connecting).is_empty());
        assert!(drain(&mut rx_closed).is_empty());
    }

    #[test]
    fn failed_delivery_does_not_abort_remaining_recipients() {
        let registry = ConnectionRegistry::new();
        let (dead, rx_dead) = open_connection(&registry);
        let (alive, mut rx_alive) = open_connection(&registry);
        registry.subscribe(3, &dead);
        registry.subscribe(3, &alive);
        drop(rx_dead);

        assert_eq!(registry.send_to_match(3, &Arc::from("{}")), 1);
        assert_eq!(registry.broadcast(&Arc::from("{}")), 1);
        assert_eq!(drain(&mut rx_alive).len(), 2);
    }

    #[test]
    fn stalled_receiver_queue_is_capped() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx_stalled) = mpsc::channel(4);
        let stalled = registry.register(tx);
        registry.set_state(&stalled, ConnectionState::Open);
        let (_reader, mut rx_reader) = open_connection(&registry);
        let payload: Frame = Arc::from("x".repeat(64 * 1024));

        let mut delivered_to_stalled = 0;
        for _ in 0..40 {
            if registry.broadcast(&payload) == 2 {
                delivered_to_stalled += 1;
            }
            assert_eq!(drain(&mut rx_reader).len(), 1);
        }

        assert_eq!(delivered_to_stalled, 4);
        assert_eq!(drain(&mut rx_stalled).len(), 4);
        assert_eq!(registry.connection_count(), 2);
    }

    #[test]
    fn full_queue_does_not_block_direct_replies_to_others() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx_stalled) = mpsc::channel(1);
        let stalled = registry.register(tx);
        let (other, mut rx_other) = open_connection(&registry);

        assert!(registry.send_to(&stalled, Arc::from("{}")));
        assert!(!registry.send_to(&stalled, Arc::from("{}")));
        assert!(registry.send_to(&other, Arc::from("{}")));
        assert_eq!(drain(&mut rx_other).len(), 1);
    }

    #[test]
    fn registry_stays_consistent_under_concurrent_churn() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                let (tx, _rx) = mpsc::channel(QUEUE);
                let conn = registry.register(tx);
                registry.set_state(&conn, ConnectionState::Open);
                for round in 0..200 {
                    let match_id = round % 5;
                    registry.subscribe(match_id, &conn);
                    registry.send_to_match(match_id, &Arc::from("{}"));
                    if round % 3 == 0 {
                        registry.unsubscribe(match_id, &conn);
                    }
                }
                registry.unregister(&conn);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.connection_count(), 0);
        assert_eq!(registry.match_count(), 0);
    }
}
