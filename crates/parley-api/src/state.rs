//! Application state wiring the relay together.
//!
//! AppState holds the conversation service (upstream adapters plus the
//! in-memory store) and the configuration it was built from. Handlers get a
//! cheap clone per request.

use std::sync::Arc;

use secrecy::SecretString;

use parley_core::conversation::service::{ConversationService, ConversationSettings};
use parley_core::conversation::store::InMemoryConversationStore;
use parley_infra::openai::{UpstreamAdapters, create_openai_adapters};
use parley_types::config::RelayConfig;
use parley_types::conversation::SessionKey;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConversationService>,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    /// Build state with OpenAI adapters for `config.upstream`.
    pub fn init(config: RelayConfig, api_key: Option<SecretString>) -> anyhow::Result<Self> {
        let adapters = create_openai_adapters(&config.upstream, api_key)?;
        Ok(Self::new(config, adapters))
    }

    pub fn new(config: RelayConfig, adapters: UpstreamAdapters) -> Self {
        let service = ConversationService::new(
            adapters.transcriber,
            adapters.completer,
            adapters.synthesizer,
            Arc::new(InMemoryConversationStore::new()),
            ConversationSettings::from(&config),
        );

        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }

    /// The history a request addresses.
    ///
    /// Always the shared conversation unless session isolation is on and the
    /// client sent a non-blank id.
    pub fn session_for(&self, requested: Option<&str>) -> SessionKey {
        if !self.config.isolate_sessions {
            return SessionKey::shared();
        }
        match requested.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => SessionKey::new(id),
            None => SessionKey::shared(),
        }
    }
}
