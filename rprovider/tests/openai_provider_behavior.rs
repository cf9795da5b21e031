#![cfg(feature = "provider-openai")]

use std::sync::{Arc, Mutex};

use futures_util::{StreamExt, stream};
use rprovider::adapters::openai::{
    OpenAiChunkStream, OpenAiProvider, OpenAiRequest, OpenAiRole, OpenAiStreamChunk,
    OpenAiTransport,
};
use rprovider::{
    Message, ModelProvider, ProviderError, ProviderErrorKind, ProviderFuture, SecretString,
    StreamRequest, TextDelta,
};

#[derive(Debug)]
struct FakeTransport {
    captured_key: Mutex<Option<String>>,
    captured_request: Mutex<Option<OpenAiRequest>>,
    script: Mutex<Option<Result<Vec<Result<OpenAiStreamChunk, ProviderError>>, ProviderError>>>,
}

impl FakeTransport {
    fn scripted(
        script: Result<Vec<Result<OpenAiStreamChunk, ProviderError>>, ProviderError>,
    ) -> Self {
        Self {
            captured_key: Mutex::new(None),
            captured_request: Mutex::new(None),
            script: Mutex::new(Some(script)),
        }
    }
}

impl OpenAiTransport for FakeTransport {
    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            *self.captured_request.lock().expect("request lock") = Some(request);
            *self.captured_key.lock().expect("key lock") = Some(api_key.expose().to_string());

            let chunks = self
                .script
                .lock()
                .expect("script lock")
                .take()
                .expect("transport is called once")?;

            Ok(Box::pin(stream::iter(chunks)) as OpenAiChunkStream<'a>)
        })
    }
}

fn stream_request() -> StreamRequest {
    StreamRequest::new(
        SecretString::new("sk-live-123"),
        "gpt-3.5-turbo",
        vec![
            Message::system("You are ChatBot 3, an AI assistant specialized in travel advice."),
            Message::user("Where should I go in May?"),
        ],
    )
    .with_max_output_tokens(300)
}

#[tokio::test]
async fn stream_maps_text_chunks_to_deltas_and_passes_key_and_budget() {
    let transport = Arc::new(FakeTransport::scripted(Ok(vec![
        Ok(OpenAiStreamChunk::text("Hi")),
        Ok(OpenAiStreamChunk::text("")),
        Ok(OpenAiStreamChunk::text(" there")),
    ])));
    let provider = OpenAiProvider::new(transport.clone());

    let deltas = provider
        .stream(stream_request())
        .await
        .expect("stream should open")
        .collect::<Vec<_>>()
        .await;

    assert_eq!(
        deltas,
        vec![Ok(TextDelta::new("Hi")), Ok(TextDelta::new(" there"))]
    );

    assert_eq!(
        transport.captured_key.lock().expect("key lock").as_deref(),
        Some("sk-live-123")
    );
    let request = transport
        .captured_request
        .lock()
        .expect("request lock")
        .clone()
        .expect("request captured");
    assert_eq!(request.model, "gpt-3.5-turbo");
    assert_eq!(request.max_tokens, Some(300));
    assert_eq!(request.messages[0].role, OpenAiRole::System);
    assert_eq!(request.messages[1].role, OpenAiRole::User);
    assert!(request.stream);
}

#[tokio::test]
async fn stream_surfaces_mid_stream_errors_after_partial_output() {
    let transport = Arc::new(FakeTransport::scripted(Ok(vec![
        Ok(OpenAiStreamChunk::text("Par")),
        Err(ProviderError::transport("connection reset")),
    ])));
    let provider = OpenAiProvider::new(transport);

    let deltas = provider
        .stream(stream_request())
        .await
        .expect("stream should open")
        .collect::<Vec<_>>()
        .await;

    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[0], Ok(TextDelta::new("Par")));
    let err = deltas[1].clone().expect_err("second item is the failure");
    assert_eq!(err.kind, ProviderErrorKind::Transport);
}

#[tokio::test]
async fn stream_fails_at_construction_when_transport_cannot_connect() {
    let transport = Arc::new(FakeTransport::scripted(Err(ProviderError::authentication(
        "Incorrect API key provided",
    ))));
    let provider = OpenAiProvider::new(transport);

    let err = provider
        .stream(stream_request())
        .await
        .err()
        .expect("construction should fail");
    assert_eq!(err.kind, ProviderErrorKind::Authentication);
    assert_eq!(err.to_string(), "Incorrect API key provided");
}

#[tokio::test]
async fn stream_rejects_invalid_requests_before_calling_transport() {
    let transport = Arc::new(FakeTransport::scripted(Ok(Vec::new())));
    let provider = OpenAiProvider::new(transport.clone());

    let request = StreamRequest::new(SecretString::new("sk-live-123"), "gpt-3.5-turbo", Vec::new());
    let err = provider
        .stream(request)
        .await
        .err()
        .expect("empty message list should fail");

    assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
    assert!(transport.captured_request.lock().expect("request lock").is_none());
}
