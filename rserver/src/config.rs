//! Server configuration: defaults, then an optional TOML file, then
//! `CHATRELAY__*` environment variables.

use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use rchat::{BotProfile, BotProfiles, DEFAULT_MODEL};
use rcommon::BotId;
use rprovider::CredentialStore;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "chatrelay.toml";
pub const ENV_PREFIX: &str = "CHATRELAY";
pub const DEFAULT_BIND: &str = "0.0.0.0:8005";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIER: &str = "medium";
pub const PORT_ENV: &str = "PORT";

const DEFAULT_BOTS: [(&str, &str); 4] = [
    (
        "chatbot1",
        "You are ChatBot 1, an AI assistant specialized in general knowledge.",
    ),
    (
        "chatbot2",
        "You are ChatBot 2, an AI assistant specialized in tech support.",
    ),
    (
        "chatbot3",
        "You are ChatBot 3, an AI assistant specialized in travel advice.",
    ),
    (
        "chatbot4",
        "You are ChatBot 4, an AI assistant specialized in cooking recipes.",
    ),
];

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub logging: LoggingConfig,
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub bots: Vec<BotConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub default_model: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BotConfig {
    pub id: String,
    pub system_prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_tier")]
    pub reasoning_tier: String,
}

fn default_tier() -> String {
    DEFAULT_TIER.to_string()
}

impl ServerConfig {
    /// Loads configuration. An explicit `path` must exist; otherwise
    /// `chatrelay.toml` in the working directory is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        Self::defaults()?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Defaults overlaid with an inline TOML document; no environment lookup.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    /// Replaces the port of `server.bind` with `PORT` when that variable is set.
    pub fn apply_port_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let Some(port) = lookup(PORT_ENV) else {
            return Ok(());
        };

        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|err| ConfigError::Message(format!("invalid {PORT_ENV} {port:?}: {err}")))?;
        let host = self
            .server
            .bind
            .rsplit_once(':')
            .map_or(self.server.bind.as_str(), |(host, _)| host);

        self.server.bind = format!("{host}:{port}");
        Ok(())
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.bind", DEFAULT_BIND)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("upstream.base_url", DEFAULT_BASE_URL)?
            .set_default("upstream.default_model", DEFAULT_MODEL)
    }

    /// Configured bots, or the four built-in ones when none are configured,
    /// with `<BOT>_SYSTEM` overrides applied from `lookup`.
    pub fn resolve_bots(&self, lookup: impl Fn(&str) -> Option<String>) -> Vec<BotConfig> {
        let mut bots = if self.bots.is_empty() {
            DEFAULT_BOTS
                .iter()
                .map(|(id, prompt)| BotConfig {
                    id: (*id).to_string(),
                    system_prompt: (*prompt).to_string(),
                    model: None,
                    reasoning_tier: default_tier(),
                })
                .collect::<Vec<_>>()
        } else {
            self.bots.clone()
        };

        for bot in &mut bots {
            let name = format!("{}_SYSTEM", BotId::new(bot.id.as_str()).env_key());
            if let Some(prompt) = lookup(&name).filter(|prompt| !prompt.trim().is_empty()) {
                bot.system_prompt = prompt;
            }
        }

        bots
    }

    pub fn bot_profiles(&self, lookup: impl Fn(&str) -> Option<String>) -> BotProfiles {
        self.resolve_bots(lookup)
            .into_iter()
            .map(BotConfig::into_profile)
            .collect()
    }

    /// Reads each bot's API key from the variable named after its upper-cased
    /// id. Bots without a non-empty key are left out.
    pub fn credentials(&self, lookup: impl Fn(&str) -> Option<String>) -> CredentialStore {
        let store = CredentialStore::new();

        for bot in self.resolve_bots(&lookup) {
            let bot = BotId::new(bot.id);
            if let Some(key) = lookup(&bot.env_key())
                && store.set_api_key(bot.clone(), key).is_err()
            {
                tracing::warn!(bot = %bot, "ignoring empty api key");
            }
        }

        store
    }
}

impl BotConfig {
    pub fn into_profile(self) -> BotProfile {
        let profile = BotProfile::new(self.id, self.system_prompt)
            .with_reasoning_tier(self.reasoning_tier);

        match self.model {
            Some(model) => profile.with_model(model),
            None => profile,
        }
    }
}
