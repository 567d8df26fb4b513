//! Typed query parameters for endpoint inputs.
//!
//! Each parameter type deserializes straight from the query string, so
//! malformed input is rejected by the extractor before a controller runs.

pub(crate) mod list;
