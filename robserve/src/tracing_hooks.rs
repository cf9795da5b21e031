//! Tracing-based hooks for relay turn phases.
//!
//! Message text never reaches the log; only sizes, kinds, and identifiers do.
//!
//! ```rust
//! use rchat::RelayHooks;
//! use robserve::TracingRelayHooks;
//!
//! fn accepts_relay_hooks(_hooks: &dyn RelayHooks) {}
//!
//! let hooks = TracingRelayHooks;
//! accepts_relay_hooks(&hooks);
//! ```

use std::time::Duration;

use rchat::{RelayError, RelayHooks, RelayPhase, TurnOutcome};
use rcommon::{BotId, ConversationKey};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRelayHooks;

impl RelayHooks for TracingRelayHooks {
    fn on_phase(&self, key: &ConversationKey, phase: RelayPhase) {
        tracing::debug!(
            phase = "relay",
            event = "phase",
            session_id = %key.session,
            bot = %key.bot,
            relay_phase = phase.as_str()
        );
    }

    fn on_turn_rejected(&self, bot: &BotId, error: &RelayError) {
        tracing::warn!(
            phase = "relay",
            event = "turn_rejected",
            bot = %bot,
            error_kind = error.kind.as_str(),
            error = %error
        );
    }

    fn on_turn_start(&self, key: &ConversationKey, model: &str, max_output_tokens: u32) {
        tracing::info!(
            phase = "relay",
            event = "turn_start",
            session_id = %key.session,
            bot = %key.bot,
            model,
            max_output_tokens
        );
    }

    fn on_upstream_connected(&self, key: &ConversationKey) {
        tracing::debug!(
            phase = "relay",
            event = "upstream_connected",
            session_id = %key.session,
            bot = %key.bot
        );
    }

    fn on_delta(&self, key: &ConversationKey, delta_len: usize) {
        tracing::trace!(
            phase = "relay",
            event = "delta",
            session_id = %key.session,
            bot = %key.bot,
            delta_len
        );
    }

    fn on_upstream_failure(&self, key: &ConversationKey, error: &RelayError) {
        tracing::error!(
            phase = "relay",
            event = "upstream_failure",
            session_id = %key.session,
            bot = %key.bot,
            error_kind = error.kind.as_str(),
            error = %error
        );
    }

    fn on_turn_finished(
        &self,
        key: &ConversationKey,
        outcome: TurnOutcome,
        assistant_len: usize,
        elapsed: Duration,
    ) {
        match outcome {
            TurnOutcome::Cancelled => tracing::warn!(
                phase = "relay",
                event = "turn_finished",
                session_id = %key.session,
                bot = %key.bot,
                outcome = outcome.as_str(),
                assistant_len,
                elapsed_ms = elapsed.as_millis() as u64
            ),
            _ => tracing::info!(
                phase = "relay",
                event = "turn_finished",
                session_id = %key.session,
                bot = %key.bot,
                outcome = outcome.as_str(),
                assistant_len,
                elapsed_ms = elapsed.as_millis() as u64
            ),
        }
    }
}
