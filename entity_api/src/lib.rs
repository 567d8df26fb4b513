//! Persistence for matches and commentary.
//!
//! Records live in a process-local [`Store`]. Every function here assumes
//! its input was already validated by the `domain` layer.

pub mod commentary;
pub mod error;
pub mod matches;
pub mod store;

pub use entity::{match_status::MatchStatus, Id};
pub use store::Store;
