use std::sync::Arc;

use rchat::{InMemoryConversationStore, PromptComposer, RelayController, RelayHooks};
use rprovider::ModelProvider;

use crate::config::ServerConfig;
use crate::gate::TurnGate;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayController>,
    pub gate: TurnGate,
}

impl AppState {
    pub fn new(relay: RelayController) -> Self {
        Self {
            relay: Arc::new(relay),
            gate: TurnGate::new(),
        }
    }

    /// Wires a relay from configuration. `lookup` resolves environment
    /// variables for system prompt overrides and API keys.
    pub fn from_config(
        config: &ServerConfig,
        provider: Arc<dyn ModelProvider>,
        hooks: Arc<dyn RelayHooks>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let profiles = config.bot_profiles(&lookup);
        let credentials = config.credentials(&lookup);

        for profile in profiles.iter_sorted() {
            if !credentials.has_credentials(&profile.id) {
                tracing::warn!(bot = %profile.id, env = %profile.id.env_key(), "no api key configured");
            }
        }

        let relay = RelayController::new(
            provider,
            Arc::new(InMemoryConversationStore::new()),
            Arc::new(profiles),
            Arc::new(credentials),
        )
        .with_composer(PromptComposer::new().with_default_model(&config.upstream.default_model))
        .with_hooks(hooks);

        Self::new(relay)
    }
}
