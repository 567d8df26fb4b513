//! Domain event plumbing for the match feed.
//!
//! Persistence-side code (`domain`) announces completed writes as
//! [`DomainEvent`]s; delivery-side code (the `ws` crate) implements
//! [`EventHandler`] to fan them out to connected clients. Neither side
//! depends on the other.
//!
//! Records travel as `serde_json::Value` so this crate stays free of
//! dependencies on `entity` and friends.

use async_trait::async_trait;
use log::*;
use serde_json::Value;
use std::sync::Arc;

/// Identifier of a match, shared by every crate in the workspace.
pub type MatchId = i64;

/// Business-level changes that real-time clients care about.
/// Emitted only after the corresponding write has been persisted.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A new match was stored. Delivered to every open connection.
    MatchCreated {
        match_id: MatchId,
        /// The complete stored match record.
        r#match: Value,
    },
    /// A commentary entry was stored for a match. Delivered only to the
    /// connections subscribed to `match_id`.
    CommentaryPosted {
        match_id: MatchId,
        /// The complete stored commentary record.
        commentary: Value,
    },
}

impl DomainEvent {
    pub fn match_id(&self) -> MatchId {
        match self {
            DomainEvent::MatchCreated { match_id, .. } => *match_id,
            DomainEvent::CommentaryPosted { match_id, .. } => *match_id,
        }
    }
}

/// Trait for handling domain events.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order, so two events
/// published one after the other reach each handler in that order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Returns a publisher that also notifies `handler`.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub async fn publish(&self, event: DomainEvent) {
        trace!(
            "Publishing domain event for match {} to {} handler(s)",
            event.match_id(),
            self.handlers.len()
        );

        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
