//! Infrastructure layer for Parley.
//!
//! Implements the upstream adapter traits from `parley-core` against an
//! OpenAI-compatible REST API, and loads relay configuration from toml plus
//! the environment.

pub mod config;
pub mod openai;
