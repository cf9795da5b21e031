use std::time::Duration;

use rchat::{RelayError, RelayHooks, RelayPhase, TurnOutcome};
use rcommon::{BotId, ConversationKey};

/// Fans every callback out to each registered hook, in registration order.
#[derive(Default)]
pub struct CompositeRelayHooks {
    hooks: Vec<Box<dyn RelayHooks>>,
}

impl CompositeRelayHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, hooks: impl RelayHooks + 'static) -> Self {
        self.push(hooks);
        self
    }

    pub fn push(&mut self, hooks: impl RelayHooks + 'static) {
        self.hooks.push(Box::new(hooks));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl RelayHooks for CompositeRelayHooks {
    fn on_phase(&self, key: &ConversationKey, phase: RelayPhase) {
        for hooks in &self.hooks {
            hooks.on_phase(key, phase);
        }
    }

    fn on_turn_rejected(&self, bot: &BotId, error: &RelayError) {
        for hooks in &self.hooks {
            hooks.on_turn_rejected(bot, error);
        }
    }

    fn on_turn_start(&self, key: &ConversationKey, model: &str, max_output_tokens: u32) {
        for hooks in &self.hooks {
            hooks.on_turn_start(key, model, max_output_tokens);
        }
    }

    fn on_upstream_connected(&self, key: &ConversationKey) {
        for hooks in &self.hooks {
            hooks.on_upstream_connected(key);
        }
    }

    fn on_delta(&self, key: &ConversationKey, delta_len: usize) {
        for hooks in &self.hooks {
            hooks.on_delta(key, delta_len);
        }
    }

    fn on_upstream_failure(&self, key: &ConversationKey, error: &RelayError) {
        for hooks in &self.hooks {
            hooks.on_upstream_failure(key, error);
        }
    }

    fn on_turn_finished(
        &self,
        key: &ConversationKey,
        outcome: TurnOutcome,
        assistant_len: usize,
        elapsed: Duration,
    ) {
        for hooks in &self.hooks {
            hooks.on_turn_finished(key, outcome, assistant_len, elapsed);
        }
    }
}
