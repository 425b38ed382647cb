//! Business logic and port definitions for Parley.
//!
//! This crate defines the upstream adapter traits that the infrastructure
//! layer implements, the conversation store, and the service that chains
//! transcription, chat, and speech synthesis. It depends only on
//! `parley-types` -- never on `parley-infra` or any HTTP crate.

pub mod conversation;
pub mod upstream;
