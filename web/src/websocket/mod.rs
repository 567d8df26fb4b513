//! WebSocket HTTP handler for the web layer.
//!
//! Only the axum upgrade handler and socket pump live here. Connection
//! bookkeeping, command handling and fan-out live in the `ws` crate.

pub mod handler;
