//! Per-connection lifecycle, independent of the transport.
//!
//! ```text
//! Connecting --open--> Open --frame--> Open
//!                       |
//!                       +--close / terminate--> Closed (terminal)
//! ```

use crate::connection::{ConnectionId, ConnectionState, FrameSender};
use crate::dispatcher::DispatchOutcome;
use crate::manager::Manager;
use log::*;
use std::sync::Arc;

/// One client connection as seen by the transport's reader loop.
///
/// All inbound frames, and the close or error that ends the connection, must
/// be fed through the same `Session` so that the connection's own operations
/// never interleave.
pub struct Session {
    id: ConnectionId,
    manager: Arc<Manager>,
    state: ConnectionState,
}

impl Session {
    /// Accepts a connection: registers it, sends `welcome` and enters `Open`.
    pub fn open(manager: Arc<Manager>, sender: FrameSender) -> Self {
        let id = manager.register_connection(sender);
        manager.open_connection(&id);

        Self {
            id,
            manager,
            state: ConnectionState::Open,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Forwards one inbound frame to the dispatcher. Returns `None` once the
    /// session has left `Open`.
    pub fn handle_frame(&self, raw: &[u8]) -> Option<DispatchOutcome> {
        if self.state != ConnectionState::Open {
            trace!("Dropping frame for closed connection {}", self.id);
            return None;
        }
        Some(self.manager.dispatch(&self.id, raw))
    }

    /// Graceful close initiated by the peer.
    pub fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        debug!("Connection {} closed by peer", self.id);
        self.finish();
    }

    /// Transport failure. The connection is marked closed before cleanup so
    /// no broadcast queues anything further for it.
    pub fn terminate(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        warn!("Terminating connection {} after transport error", self.id);
        self.manager.mark_closed(&self.id);
        self.finish();
    }

    fn finish(&mut self) {
        self.state = ConnectionState::Closed;
        self.manager.unregister_connection(&self.id);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
