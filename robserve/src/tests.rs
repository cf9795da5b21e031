use std::sync::{Arc, Mutex};
use std::time::Duration;

use rchat::{RelayError, RelayErrorKind, RelayHooks, RelayPhase, TurnOutcome};
use rcommon::{BotId, ConversationKey};

use crate::{CompositeRelayHooks, MetricsRelayHooks, SafeRelayHooks, TracingRelayHooks};

fn sample_key() -> ConversationKey {
    ConversationKey::new("session-1", "chatbot1")
}

fn drive_all_callbacks(hooks: &dyn RelayHooks) {
    let key = sample_key();
    let rejection = RelayError::empty_input();
    let failure = RelayError::new(RelayErrorKind::UpstreamStream, "connection reset");

    hooks.on_phase(&key, RelayPhase::Validating);
    hooks.on_turn_rejected(&BotId::from("chatbot1"), &rejection);
    hooks.on_turn_start(&key, "gpt-3.5-turbo", 300);
    hooks.on_upstream_connected(&key);
    hooks.on_delta(&key, 5);
    hooks.on_upstream_failure(&key, &failure);
    hooks.on_turn_finished(
        &key,
        TurnOutcome::Failed(RelayErrorKind::UpstreamStream),
        5,
        Duration::from_millis(40),
    );
    hooks.on_turn_finished(&key, TurnOutcome::Cancelled, 0, Duration::from_millis(1));
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    drive_all_callbacks(&TracingRelayHooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    drive_all_callbacks(&MetricsRelayHooks);
}

#[derive(Default, Clone)]
struct RecordingHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingHooks {
    fn record(&self, event: &'static str) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl RelayHooks for RecordingHooks {
    fn on_phase(&self, _key: &ConversationKey, _phase: RelayPhase) {
        self.record("phase");
    }

    fn on_turn_rejected(&self, _bot: &BotId, _error: &RelayError) {
        self.record("rejected");
    }

    fn on_turn_start(&self, _key: &ConversationKey, _model: &str, _max_output_tokens: u32) {
        self.record("start");
    }

    fn on_upstream_connected(&self, _key: &ConversationKey) {
        self.record("connected");
    }

    fn on_delta(&self, _key: &ConversationKey, _delta_len: usize) {
        self.record("delta");
    }

    fn on_upstream_failure(&self, _key: &ConversationKey, _error: &RelayError) {
        self.record("failure");
    }

    fn on_turn_finished(
        &self,
        _key: &ConversationKey,
        _outcome: TurnOutcome,
        _assistant_len: usize,
        _elapsed: Duration,
    ) {
        self.record("finished");
    }
}

struct PanicHooks;

impl RelayHooks for PanicHooks {
    fn on_phase(&self, _key: &ConversationKey, _phase: RelayPhase) {
        panic!("phase panic");
    }

    fn on_turn_rejected(&self, _bot: &BotId, _error: &RelayError) {
        panic!("rejected panic");
    }

    fn on_turn_start(&self, _key: &ConversationKey, _model: &str, _max_output_tokens: u32) {
        panic!("start panic");
    }

    fn on_upstream_connected(&self, _key: &ConversationKey) {
        panic!("connected panic");
    }

    fn on_delta(&self, _key: &ConversationKey, _delta_len: usize) {
        panic!("delta panic");
    }

    fn on_upstream_failure(&self, _key: &ConversationKey, _error: &RelayError) {
        panic!("failure panic");
    }

    fn on_turn_finished(
        &self,
        _key: &ConversationKey,
        _outcome: TurnOutcome,
        _assistant_len: usize,
        _elapsed: Duration,
    ) {
        panic!("finished panic");
    }
}

#[test]
fn safe_hooks_delegate_when_inner_succeeds() {
    let inner = RecordingHooks::default();
    let events = Arc::clone(&inner.events);

    drive_all_callbacks(&SafeRelayHooks::new(inner));

    assert_eq!(
        *events.lock().expect("events lock"),
        vec![
            "phase",
            "rejected",
            "start",
            "connected",
            "delta",
            "failure",
            "finished",
            "finished",
        ]
    );
}

#[test]
fn safe_hooks_swallow_panics() {
    drive_all_callbacks(&SafeRelayHooks::new(PanicHooks));
}

#[test]
fn composite_hooks_fan_out_in_registration_order() {
    let first = RecordingHooks::default();
    let second = RecordingHooks::default();
    let first_events = Arc::clone(&first.events);
    let second_events = Arc::clone(&second.events);

    let hooks = CompositeRelayHooks::new().with(first).with(second);
    assert_eq!(hooks.len(), 2);

    hooks.on_delta(&sample_key(), 3);
    hooks.on_turn_start(&sample_key(), "gpt-3.5-turbo", 100);

    assert_eq!(*first_events.lock().expect("events lock"), vec!["delta", "start"]);
    assert_eq!(*second_events.lock().expect("events lock"), vec!["delta", "start"]);
}

#[test]
fn safe_wrapper_around_composite_keeps_later_hooks_running() {
    let recorder = RecordingHooks::default();
    let events = Arc::clone(&recorder.events);

    let mut composite = CompositeRelayHooks::new();
    composite.push(SafeRelayHooks::new(PanicHooks));
    composite.push(recorder);
    let hooks = SafeRelayHooks::new(composite);

    drive_all_callbacks(&hooks);

    assert_eq!(events.lock().expect("events lock").len(), 8);
}
