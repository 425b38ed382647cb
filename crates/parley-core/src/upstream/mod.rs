//! Upstream service abstractions for Parley.
//!
//! - `Transcriber`, `ChatCompleter`, `SpeechSynthesizer`: RPITIT traits for
//!   concrete adapter implementations
//! - `BoxTranscriber`, `BoxChatCompleter`, `BoxSpeechSynthesizer`:
//!   object-safe wrappers for dynamic dispatch

pub mod box_provider;
pub mod provider;
