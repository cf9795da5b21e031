//! Per-bot API key lookup with redacted secret handling.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rcommon::BotId;

use crate::ProviderError;

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        // Overwrite with zeros; the length is unchanged so the buffer stays valid UTF-8.
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

/// Lookup from bot id to the API key used for that bot's upstream calls.
pub trait CredentialSource: Send + Sync {
    fn api_key(&self, bot: &BotId) -> Option<SecretString>;
}

#[derive(Default)]
pub struct CredentialStore {
    keys: Mutex<HashMap<BotId, SecretString>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_api_key(
        &self,
        bot: impl Into<BotId>,
        api_key: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let api_key = SecretString::new(api_key);
        if api_key.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        self.keys().insert(bot.into(), api_key);
        Ok(())
    }

    pub fn has_credentials(&self, bot: &BotId) -> bool {
        self.keys().contains_key(bot)
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    fn keys(&self) -> MutexGuard<'_, HashMap<BotId, SecretString>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialSource for CredentialStore {
    fn api_key(&self, bot: &BotId) -> Option<SecretString> {
        self.keys().get(bot).cloned()
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("bots", &self.keys().keys().collect::<Vec<_>>())
            .finish()
    }
}
