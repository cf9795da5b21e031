//! Metrics-based hooks for relay turns.
//!
//! ```rust
//! use rchat::RelayHooks;
//! use robserve::MetricsRelayHooks;
//!
//! fn accepts_relay_hooks(_hooks: &dyn RelayHooks) {}
//!
//! let hooks = MetricsRelayHooks;
//! accepts_relay_hooks(&hooks);
//! ```

use std::time::Duration;

use rchat::{RelayError, RelayHooks, TurnOutcome};
use rcommon::{BotId, ConversationKey};

/// Labels by bot only; session ids are unbounded and stay out of label sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRelayHooks;

impl RelayHooks for MetricsRelayHooks {
    fn on_turn_rejected(&self, bot: &BotId, error: &RelayError) {
        metrics::counter!(
            "chatrelay_turns_rejected_total",
            "bot" => bot.to_string(),
            "error_kind" => error.kind.as_str()
        )
        .increment(1);
    }

    fn on_turn_start(&self, key: &ConversationKey, model: &str, _max_output_tokens: u32) {
        metrics::counter!(
            "chatrelay_turns_started_total",
            "bot" => key.bot.to_string(),
            "model" => model.to_string()
        )
        .increment(1);
    }

    fn on_delta(&self, key: &ConversationKey, delta_len: usize) {
        metrics::counter!("chatrelay_deltas_total", "bot" => key.bot.to_string()).increment(1);
        metrics::counter!("chatrelay_delta_bytes_total", "bot" => key.bot.to_string())
            .increment(delta_len as u64);
    }

    fn on_upstream_failure(&self, key: &ConversationKey, error: &RelayError) {
        metrics::counter!(
            "chatrelay_upstream_failures_total",
            "bot" => key.bot.to_string(),
            "error_kind" => error.kind.as_str()
        )
        .increment(1);
    }

    fn on_turn_finished(
        &self,
        key: &ConversationKey,
        outcome: TurnOutcome,
        assistant_len: usize,
        elapsed: Duration,
    ) {
        metrics::counter!(
            "chatrelay_turns_finished_total",
            "bot" => key.bot.to_string(),
            "outcome" => outcome.as_str()
        )
        .increment(1);
        metrics::histogram!(
            "chatrelay_turn_duration_seconds",
            "bot" => key.bot.to_string(),
            "outcome" => outcome.as_str()
        )
        .record(elapsed.as_secs_f64());
        metrics::histogram!(
            "chatrelay_assistant_reply_bytes",
            "bot" => key.bot.to_string()
        )
        .record(assistant_len as f64);
    }
}
