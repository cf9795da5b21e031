//! Lifecycle callbacks for relay turns.

use std::time::Duration;

use rcommon::{BotId, ConversationKey};

use crate::{RelayError, RelayErrorKind};

/// Where a single turn is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayPhase {
    Validating,
    Composing,
    Streaming,
    Finalizing,
    Completed,
    Failed,
}

impl RelayPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Composing => "composing",
            Self::Streaming => "streaming",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// How a turn that reached the streaming phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnOutcome {
    Completed,
    Failed(RelayErrorKind),
    /// The consumer dropped the frame stream before the upstream finished.
    Cancelled,
}

impl TurnOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed(_) => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn terminal_phase(self) -> RelayPhase {
        match self {
            Self::Failed(_) => RelayPhase::Failed,
            Self::Completed | Self::Cancelled => RelayPhase::Completed,
        }
    }
}

pub trait RelayHooks: Send + Sync {
    fn on_phase(&self, _key: &ConversationKey, _phase: RelayPhase) {}

    fn on_turn_rejected(&self, _bot: &BotId, _error: &RelayError) {}

    fn on_turn_start(&self, _key: &ConversationKey, _model: &str, _max_output_tokens: u32) {}

    fn on_upstream_connected(&self, _key: &ConversationKey) {}

    fn on_delta(&self, _key: &ConversationKey, _delta_len: usize) {}

    fn on_upstream_failure(&self, _key: &ConversationKey, _error: &RelayError) {}

    fn on_turn_finished(
        &self,
        _key: &ConversationKey,
        _outcome: TurnOutcome,
        _assistant_len: usize,
        _elapsed: Duration,
    ) {
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRelayHooks;

impl RelayHooks for NoopRelayHooks {}
