use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use rchat::{RelayError, RelayHooks, RelayPhase, TurnOutcome};
use rcommon::{BotId, ConversationKey};

/// Isolates the relay from panicking hooks. Finalization runs hooks from a
/// destructor, where a second panic would abort the process.
pub struct SafeRelayHooks<H> {
    inner: H,
}

impl<H> SafeRelayHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H> RelayHooks for SafeRelayHooks<H>
where
    H: RelayHooks,
{
    fn on_phase(&self, key: &ConversationKey, phase: RelayPhase) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_phase(key, phase)));
    }

    fn on_turn_rejected(&self, bot: &BotId, error: &RelayError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_rejected(bot, error)
        }));
    }

    fn on_turn_start(&self, key: &ConversationKey, model: &str, max_output_tokens: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_turn_start(key, model, max_output_tokens)
        }));
    }

    fn on_upstream_connected(&self, key: &ConversationKey) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_upstream_connected(key)));
    }

    fn on_delta(&self, key: &ConversationKey, delta_len: usize) {
        let _ = catch_unwind(AssertUnwindSafe(|| self.inner.on_delta(key, delta_len)));
    }

    fn on_upstream_failure(&self, key: &ConversationKey, error: &RelayError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_upstream_failure(key, error)
        }));
    }

    fn on_turn_finished(
        &self,
        key: &ConversationKey,
        outcome: TurnOutcome,
        assistant_len: usize,
        elapsed: Duration,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_turn_finished(key, outcome, assistant_len, elapsed)
        }));
    }
}
