//! Real-time match feed over WebSockets.
//!
//! Clients hold one long-lived connection and opt in to the matches they
//! care about. The server pushes two kinds of domain events:
//!
//! - `match_created` goes to every open connection.
//! - `commentary` goes only to connections subscribed to that match.
//!
//! # Architecture
//!
//! - **Dual-index registry**: [`ConnectionRegistry`] maps matches to
//!   subscribed connections and each connection to its own subscriptions,
//!   so disconnect cleanup costs O(k) in that connection's subscriptions.
//!   Empty match entries are pruned immediately.
//! - **Closed command set**: inbound frames decode into
//!   [`message::ClientCommand`] once; anything that is not `subscribe` or
//!   `unsubscribe` with an integer `matchId` is ignored, and undecodable
//!   frames get a single `error` frame.
//! - **Fire-and-forget fan-out**: each frame is serialized once and pushed
//!   onto every recipient's bounded queue without waiting. A recipient whose
//!   queue is full misses that frame; nothing is retried or replayed.
//! - **Explicit lifecycle**: [`Session`] owns one connection from `welcome`
//!   to cleanup; closing or terminating it twice is harmless.
//!
//! # Message Flow
//!
//! 1. The web layer upgrades `GET /ws` and opens a [`Session`].
//! 2. Each inbound frame goes through [`Session::handle_frame`] to the
//!    [`dispatcher::CommandDispatcher`], which updates the registry and acks.
//! 3. After a match or commentary write is persisted, `domain` publishes a
//!    `DomainEvent`; [`WsDomainEventHandler`] turns it into
//!    [`Manager::notify_match_created`] or [`Manager::notify_commentary`].
//! 4. On close or transport error the session unregisters the connection and
//!    all of its subscriptions.
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry, ConnectionId and connection state
//! - `dispatcher`: inbound command handling
//! - `manager`: lifecycle primitives and scoped fan-out
//! - `message`: wire formats for client and server frames
//! - `session`: per-connection state machine

pub mod connection;
pub mod dispatcher;
pub mod domain_event_handler;
pub mod manager;
pub mod message;
pub mod session;

pub use connection::{ConnectionId, ConnectionRegistry, ConnectionState, Frame, MatchId};
pub use domain_event_handler::WsDomainEventHandler;
pub use manager::Manager;
pub use session::Session;
