//! Shared domain types for Parley.
//!
//! Utterances and conversation keys, the wire shapes exchanged with the
//! upstream speech and chat services, relay configuration, and the error
//! types shared by every layer.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod upstream;
