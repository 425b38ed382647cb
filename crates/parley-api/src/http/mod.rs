//! HTTP surface of the relay.
//!
//! Plain JSON bodies (`{"error": ...}` on failure), permissive CORS, and the
//! browser client served from the public directory.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
