//! Turn orchestration: validate, record the user turn, stream the reply, and
//! reconcile the conversation once the upstream ends, fails, or is abandoned.

use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use futures_util::StreamExt;
use rcommon::{ConversationKey, SessionId};
use rprovider::{CredentialSource, Message, ModelProvider, SecretString, StreamRequest};

use crate::{
    BotProfile, BotProfiles, ConversationStore, Frame, FrameStream, NoopRelayHooks,
    PromptComposer, RelayError, RelayHooks, RelayPhase, TurnOutcome, TurnRequest,
};

/// Relays chat turns between callers and an upstream model.
///
/// Turns on distinct conversation keys are independent. Two overlapping turns
/// on the same key are not coordinated here; the embedding host must
/// serialize them.
#[derive(Clone)]
pub struct RelayController {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn ConversationStore>,
    profiles: Arc<BotProfiles>,
    credentials: Arc<dyn CredentialSource>,
    composer: PromptComposer,
    hooks: Arc<dyn RelayHooks>,
}

impl RelayController {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn ConversationStore>,
        profiles: Arc<BotProfiles>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            provider,
            store,
            profiles,
            credentials,
            composer: PromptComposer::default(),
            hooks: Arc::new(NoopRelayHooks),
        }
    }

    pub fn with_composer(mut self, composer: PromptComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RelayHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn profiles(&self) -> &BotProfiles {
        &self.profiles
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    pub fn history(&self, key: &ConversationKey) -> Vec<Message> {
        self.store.get(key)
    }

    /// Clears one conversation, e.g. when the user re-enters a bot's page.
    pub fn reset(&self, key: &ConversationKey) -> Result<(), RelayError> {
        if !self.profiles.contains(&key.bot) {
            return Err(RelayError::unknown_bot(&key.bot));
        }

        self.store.reset(key);
        Ok(())
    }

    /// Drops every conversation the session owns and returns how many there were.
    pub fn end_session(&self, session: &SessionId) -> usize {
        self.store.forget_session(session)
    }

    /// Starts one turn.
    ///
    /// Validation failures come back as `Err` with the store untouched. Once a
    /// stream is returned the user turn is already recorded, and exactly one
    /// assistant turn is recorded when the stream finishes, fails, or is
    /// dropped, holding every fragment that was forwarded.
    pub fn start_turn(&self, request: TurnRequest) -> Result<FrameStream<'static>, RelayError> {
        let key = request.key();
        self.hooks.on_phase(&key, RelayPhase::Validating);

        let (profile, api_key) = match self.validate(&request) {
            Ok(validated) => validated,
            Err(error) => {
                self.hooks.on_turn_rejected(&key.bot, &error);
                return Err(error);
            }
        };

        self.hooks.on_phase(&key, RelayPhase::Composing);
        self.store.append_user(&key, request.message.trim());

        let history = self.store.get(&key);
        let composed = self
            .composer
            .compose(profile, &profile.reasoning_tier, &history);
        self.hooks
            .on_turn_start(&key, &composed.model, composed.max_output_tokens);

        Ok(self.relay(key, composed.into_stream_request(api_key)))
    }

    fn validate(&self, request: &TurnRequest) -> Result<(&BotProfile, SecretString), RelayError> {
        let profile = self
            .profiles
            .get(&request.bot)
            .ok_or_else(|| RelayError::unknown_bot(&request.bot))?;

        if request.message.trim().is_empty() {
            return Err(RelayError::empty_input());
        }

        let api_key = self
            .credentials
            .api_key(&request.bot)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| RelayError::missing_credential(&request.bot))?;

        Ok((profile, api_key))
    }

    fn relay(&self, key: ConversationKey, request: StreamRequest) -> FrameStream<'static> {
        let provider = Arc::clone(&self.provider);
        let mut turn = PendingTurn::new(Arc::clone(&self.store), Arc::clone(&self.hooks), key);

        Box::pin(stream! {
            turn.enter(RelayPhase::Streaming);

            match provider.stream(request).await {
                Err(error) => {
                    turn.fail(RelayError::upstream_connect(&error));
                    yield Frame::error(&error);
                }
                Ok(mut upstream) => {
                    turn.connected();

                    loop {
                        match upstream.next().await {
                            None => {
                                turn.complete();
                                break;
                            }
                            Some(Ok(delta)) => {
                                if delta.is_empty() {
                                    continue;
                                }

                                turn.push(&delta.text);
                                yield Frame::content(delta.text);
                            }
                            Some(Err(error)) => {
                                turn.fail(RelayError::upstream_stream(&error));
                                yield Frame::error(&error);
                                break;
                            }
                        }
                    }
                }
            }

            drop(turn);
        })
    }
}

/// The streaming half of a turn. Dropping it records the assistant reply, so
/// completion, failure, and cancellation all reconcile the store exactly once.
struct PendingTurn {
    store: Arc<dyn ConversationStore>,
    hooks: Arc<dyn RelayHooks>,
    key: ConversationKey,
    buffer: String,
    outcome: TurnOutcome,
    started: Instant,
}

impl PendingTurn {
    fn new(
        store: Arc<dyn ConversationStore>,
        hooks: Arc<dyn RelayHooks>,
        key: ConversationKey,
    ) -> Self {
        Self {
            store,
            hooks,
            key,
            buffer: String::new(),
            outcome: TurnOutcome::Cancelled,
            started: Instant::now(),
        }
    }

    fn enter(&self, phase: RelayPhase) {
        self.hooks.on_phase(&self.key, phase);
    }

    fn connected(&self) {
        self.hooks.on_upstream_connected(&self.key);
    }

    fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.hooks.on_delta(&self.key, text.len());
    }

    fn fail(&mut self, error: RelayError) {
        self.hooks.on_upstream_failure(&self.key, &error);
        self.outcome = TurnOutcome::Failed(error.kind);
    }

    fn complete(&mut self) {
        self.outcome = TurnOutcome::Completed;
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        self.enter(RelayPhase::Finalizing);
        self.store.append_assistant(&self.key, &self.buffer);
        self.enter(self.outcome.terminal_phase());
        self.hooks.on_turn_finished(
            &self.key,
            self.outcome,
            self.buffer.len(),
            self.started.elapsed(),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use futures_util::StreamExt;
    use rcommon::BotId;
    use rprovider::{
        BoxedDeltaStream, CredentialStore, ProviderError, ProviderFuture, Role, TextDelta,
        VecDeltaStream,
    };

    use super::*;
    use crate::{BotProfile, InMemoryConversationStore, RelayErrorKind};

    type Script = Result<Vec<Result<TextDelta, ProviderError>>, ProviderError>;

    struct ScriptedProvider {
        scripts: Mutex<Vec<Script>>,
        requests: Mutex<Vec<StreamRequest>>,
    }

    impl ScriptedProvider {
        fn new(scripts: Vec<Script>) -> Self {
            Self {
                scripts: Mutex::new(scripts),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn texts(texts: &[&str]) -> Self {
            Self::new(vec![Ok(texts
                .iter()
                .map(|text| Ok(TextDelta::new(*text)))
                .collect())])
        }
    }

    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn stream<'a>(
            &'a self,
            request: StreamRequest,
        ) -> ProviderFuture<'a, Result<BoxedDeltaStream<'a>, ProviderError>> {
            Box::pin(async move {
                self.requests.lock().expect("requests lock").push(request);
                let script = self.scripts.lock().expect("scripts lock").remove(0);
                let items = script?;
                Ok(Box::pin(VecDeltaStream::new(items)) as BoxedDeltaStream<'a>)
            })
        }
    }

    #[derive(Default)]
    struct RecordingHooks {
        phases: Mutex<Vec<RelayPhase>>,
        outcomes: Mutex<Vec<(TurnOutcome, usize)>>,
        rejected: Mutex<Vec<RelayErrorKind>>,
    }

    impl RelayHooks for RecordingHooks {
        fn on_phase(&self, _key: &ConversationKey, phase: RelayPhase) {
            self.phases.lock().expect("phases lock").push(phase);
        }

        fn on_turn_rejected(&self, _bot: &BotId, error: &RelayError) {
            self.rejected.lock().expect("rejected lock").push(error.kind);
        }

        fn on_turn_finished(
            &self,
            _key: &ConversationKey,
            outcome: TurnOutcome,
            assistant_len: usize,
            _elapsed: Duration,
        ) {
            self.outcomes
                .lock()
                .expect("outcomes lock")
                .push((outcome, assistant_len));
        }
    }

    struct Fixture {
        provider: Arc<ScriptedProvider>,
        store: Arc<InMemoryConversationStore>,
        hooks: Arc<RecordingHooks>,
        relay: RelayController,
    }

    fn fixture(provider: ScriptedProvider) -> Fixture {
        let provider = Arc::new(provider);
        let store = Arc::new(InMemoryConversationStore::new());
        let hooks = Arc::new(RecordingHooks::default());

        let profiles = BotProfiles::new()
            .with_profile(
                BotProfile::new("chatbot1", "You are ChatBot 1.").with_reasoning_tier("detailed"),
            )
            .with_profile(BotProfile::new("nokey", "You have no key."));

        let credentials = CredentialStore::new();
        credentials
            .set_api_key("chatbot1", "sk-test")
            .expect("key should set");

        let relay = RelayController::new(
            provider.clone(),
            store.clone(),
            Arc::new(profiles),
            Arc::new(credentials),
        )
        .with_hooks(hooks.clone());

        Fixture {
            provider,
            store,
            hooks,
            relay,
        }
    }

    fn key() -> ConversationKey {
        ConversationKey::new("s1", "chatbot1")
    }

    #[tokio::test]
    async fn completed_turn_forwards_fragments_and_records_both_turns() {
        let fx = fixture(ScriptedProvider::texts(&["Hi", "", " there"]));

        let frames = fx
            .relay
            .start_turn(TurnRequest::new("s1", "chatbot1", "  Hello  "))
            .expect("turn should start")
            .collect::<Vec<_>>()
            .await;

        assert_eq!(frames, vec![Frame::content("Hi"), Frame::content(" there")]);
        assert_eq!(
            fx.store.get(&key()),
            vec![Message::user("Hello"), Message::assistant("Hi there")]
        );

        let requests = fx.provider.requests.lock().expect("requests lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].max_output_tokens, Some(600));
        assert_eq!(requests[0].messages.len(), 2);
        assert_eq!(requests[0].messages[0].role, Role::System);
        assert_eq!(requests[0].messages[1], Message::user("Hello"));
        assert_eq!(requests[0].api_key.expose(), "sk-test");

        assert_eq!(
            *fx.hooks.phases.lock().expect("phases lock"),
            vec![
                RelayPhase::Validating,
                RelayPhase::Composing,
                RelayPhase::Streaming,
                RelayPhase::Finalizing,
                RelayPhase::Completed,
            ]
        );
        assert_eq!(
            *fx.hooks.outcomes.lock().expect("outcomes lock"),
            vec![(TurnOutcome::Completed, "Hi there".len())]
        );
    }

    #[tokio::test]
    async fn second_turn_sends_prior_history_after_fresh_system_prompt() {
        let fx = fixture(ScriptedProvider::new(vec![
            Ok(vec![Ok(TextDelta::new("Paris."))]),
            Ok(vec![Ok(TextDelta::new("About 2 million."))]),
        ]));

        let _ = fx
            .relay
            .start_turn(TurnRequest::new("s1", "chatbot1", "Capital of France?"))
            .expect("first turn")
            .collect::<Vec<_>>()
            .await;
        let _ = fx
            .relay
            .start_turn(TurnRequest::new("s1", "chatbot1", "Population?"))
            .expect("second turn")
            .collect::<Vec<_>>()
            .await;

        let requests = fx.provider.requests.lock().expect("requests lock");
        let second = &requests[1].messages;
        assert_eq!(second.len(), 4);
        assert_eq!(second[0].role, Role::System);
        assert_eq!(second[1], Message::user("Capital of France?"));
        assert_eq!(second[2], Message::assistant("Paris."));
        assert_eq!(second[3], Message::user("Population?"));
        assert_eq!(fx.store.len(&key()), 4);
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_partial_output_and_appends_error_frame() {
        let fx = fixture(ScriptedProvider::new(vec![Ok(vec![
            Ok(TextDelta::new("Par")),
            Err(ProviderError::transport("connection reset")),
            Ok(TextDelta::new("never sent")),
        ])]));

        let frames = fx
            .relay
            .start_turn(TurnRequest::new("s1", "chatbot1", "Finish this word"))
            .expect("turn should start")
            .collect::<Vec<_>>()
            .await;

        assert_eq!(
            frames,
            vec![
                Frame::content("Par"),
                Frame::content("[Error: connection reset]"),
            ]
        );
        assert_eq!(
            fx.store.get(&key()),
            vec![Message::user("Finish this word"), Message::assistant("Par")]
        );
        assert_eq!(
            *fx.hooks.outcomes.lock().expect("outcomes lock"),
            vec![(TurnOutcome::Failed(RelayErrorKind::UpstreamStream), 3)]
        );
    }

    #[tokio::test]
    async fn connect_failure_emits_single_error_frame_and_empty_reply() {
        let fx = fixture(ScriptedProvider::new(vec![Err(
            ProviderError::authentication("Incorrect API key provided"),
        )]));

        let frames = fx
            .relay
            .start_turn(TurnRequest::new("s1", "chatbot1", "Hello"))
            .expect("turn should start")
            .collect::<Vec<_>>()
            .await;

        assert_eq!(
            frames,
            vec![Frame::content("[Error: Incorrect API key provided]")]
        );
        assert_eq!(
            fx.store.get(&key()),
            vec![Message::user("Hello"), Message::assistant("")]
        );
        assert!(
            fx.hooks
                .phases
                .lock()
                .expect("phases lock")
                .ends_with(&[RelayPhase::Finalizing, RelayPhase::Failed])
        );
    }

    #[tokio::test]
    async fn dropping_the_stream_mid_turn_records_what_was_forwarded_once() {
        let fx = fixture(ScriptedProvider::texts(&["One", " two", " three"]));

        let mut frames = fx
            .relay
            .start_turn(TurnRequest::new("s1", "chatbot1", "Count"))
            .expect("turn should start");
        let first = frames.next().await.expect("first frame");
        assert_eq!(first, Frame::content("One"));
        drop(frames);

        assert_eq!(
            fx.store.get(&key()),
            vec![Message::user("Count"), Message::assistant("One")]
        );
        assert_eq!(
            *fx.hooks.outcomes.lock().expect("outcomes lock"),
            vec![(TurnOutcome::Cancelled, 3)]
        );
    }

    #[tokio::test]
    async fn never_polled_stream_still_records_an_empty_reply() {
        let fx = fixture(ScriptedProvider::texts(&["unused"]));

        let frames = fx
            .relay
            .start_turn(TurnRequest::new("s1", "chatbot1", "Hello"))
            .expect("turn should start");
        drop(frames);

        assert_eq!(
            fx.store.get(&key()),
            vec![Message::user("Hello"), Message::assistant("")]
        );
        assert!(fx.provider.requests.lock().expect("requests lock").is_empty());
    }

    #[test]
    fn rejections_leave_the_store_untouched() {
        let fx = fixture(ScriptedProvider::new(Vec::new()));

        let cases = [
            (TurnRequest::new("s1", "chatbot1", "   \n"), RelayErrorKind::EmptyInput),
            (TurnRequest::new("s1", "chatbot9", "Hello"), RelayErrorKind::UnknownBot),
            (TurnRequest::new("s1", "nokey", "Hello"), RelayErrorKind::MissingCredential),
        ];

        for (request, expected) in cases {
            let key = request.key();
            let error = match fx.relay.start_turn(request) {
                Ok(_) => panic!("turn should be rejected"),
                Err(error) => error,
            };
            assert_eq!(error.kind, expected);
            assert!(error.kind.is_rejection());
            assert!(fx.store.get(&key).is_empty());
        }

        assert_eq!(fx.store.conversation_count(), 0);
        assert_eq!(
            *fx.hooks.rejected.lock().expect("rejected lock"),
            vec![
                RelayErrorKind::EmptyInput,
                RelayErrorKind::UnknownBot,
                RelayErrorKind::MissingCredential,
            ]
        );
        assert!(fx.provider.requests.lock().expect("requests lock").is_empty());
    }

    #[test]
    fn reset_clears_known_bots_and_rejects_unknown_ones() {
        let fx = fixture(ScriptedProvider::new(Vec::new()));
        fx.store.append_user(&key(), "hello");
        fx.store.append_assistant(&key(), "hi");

        fx.relay.reset(&key()).expect("reset should work");
        assert!(fx.relay.history(&key()).is_empty());

        let error = fx
            .relay
            .reset(&ConversationKey::new("s1", "chatbot9"))
            .expect_err("unknown bot");
        assert_eq!(error.kind, RelayErrorKind::UnknownBot);
    }

    #[test]
    fn end_session_forgets_every_bot_of_that_session_only() {
        let fx = fixture(ScriptedProvider::new(Vec::new()));
        let other_bot = ConversationKey::new("s1", "nokey");
        let other_session = ConversationKey::new("s2", "chatbot1");
        fx.store.append_user(&key(), "hello");
        fx.store.append_user(&other_bot, "hello");
        fx.store.append_user(&other_session, "hello");

        assert_eq!(fx.relay.end_session(&SessionId::from("s1")), 2);
        assert!(fx.relay.history(&key()).is_empty());
        assert!(fx.relay.history(&other_bot).is_empty());
        assert_eq!(fx.relay.history(&other_session).len(), 1);
        assert_eq!(fx.relay.end_session(&SessionId::from("s1")), 0);
    }
}
