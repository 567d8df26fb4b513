//! Domain layer: validates client input, persists it through `entity_api`,
//! and announces successful writes as `events::DomainEvent`s.

pub use entity::{commentary, match_status, matches, Id};
pub use entity_api::Store;

pub mod commentary_entry;
pub mod error;
pub mod listing;
pub mod sports_match;
