//! OpenAI transport trait and reqwest-based HTTP implementation.

use std::pin::Pin;

use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::{Client, Response};

use crate::{ProviderError, ProviderFuture, SecretString};

use super::serde_api::{OpenAiApiStreamResponse, build_api_request, extract_error_message};
use super::types::{OpenAiRequest, OpenAiStreamChunk};

pub type OpenAiChunkStream<'a> =
    Pin<Box<dyn Stream<Item = Result<OpenAiStreamChunk, ProviderError>> + Send + 'a>>;

pub trait OpenAiTransport: Send + Sync + std::fmt::Debug {
    fn stream<'a>(
        &'a self,
        request: OpenAiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>>;
}

#[derive(Debug, Clone)]
pub struct OpenAiHttpTransport {
    client: Client,
    base_url: String,
}

impl OpenAiHttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn parse_error(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("OpenAI request failed with status {status}"));

        ProviderError::from_status(status.as_u16(), message)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else if err.is_connect() {
        ProviderError::unavailable(err.to_string())
    } else {
        ProviderError::transport(err.to_string())
    }
}

impl OpenAiTransport for OpenAiHttpTransport {
    fn stream<'a>(
        &'a self,
        mut request: OpenAiRequest,
        api_key: SecretString,
    ) -> ProviderFuture<'a, Result<OpenAiChunkStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let api_request = build_api_request(request)?;
            let url = self.endpoint("chat/completions");
            let response = self
                .client
                .post(url)
                .bearer_auth(api_key.expose())
                .json(&api_request)
                .send()
                .await
                .map_err(map_reqwest_error)?;

            if !response.status().is_success() {
                return Err(Self::parse_error(response).await);
            }

            let stream = try_stream! {
                let mut bytes_stream = response.bytes_stream();
                let mut decoder = SseDecoder::default();

                while let Some(item) = bytes_stream.next().await {
                    let bytes = item.map_err(map_reqwest_error)?;
                    for chunk in decoder.push(&bytes) {
                        yield chunk?;
                    }

                    if decoder.is_done() {
                        break;
                    }
                }

                if !decoder.is_done() {
                    for chunk in decoder.finish() {
                        yield chunk?;
                    }
                }
            };

            Ok(Box::pin(stream) as OpenAiChunkStream<'a>)
        })
    }
}

/// Incremental decoder for the `data:` lines of a chat-completions event stream.
///
/// Bytes are buffered until a full line is available, so multi-byte characters
/// split across network chunks decode correctly. Items come back in line order;
/// a failing line ends decoding but never discards the text decoded before it.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    done: bool,
}

type DecodedLine = Result<Option<OpenAiStreamChunk>, ProviderError>;

impl SseDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<Result<OpenAiStreamChunk, ProviderError>> {
        self.buffer.extend_from_slice(bytes);
        let mut items = Vec::new();

        while let Some(newline_index) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line = self.buffer.drain(..=newline_index).collect::<Vec<_>>();
            if self.done {
                continue;
            }

            self.collect(&line, &mut items);
        }

        items
    }

    /// Flushes a trailing line that was not newline-terminated.
    pub(crate) fn finish(&mut self) -> Vec<Result<OpenAiStreamChunk, ProviderError>> {
        let line = std::mem::take(&mut self.buffer);
        let mut items = Vec::new();
        if !self.done && !line.is_empty() {
            self.collect(&line, &mut items);
        }

        self.done = true;
        items
    }

    pub(crate) fn is_done(&self) -> bool {
        self.done
    }

    fn collect(&mut self, line: &[u8], items: &mut Vec<Result<OpenAiStreamChunk, ProviderError>>) {
        match self.decode_line(line) {
            Ok(Some(chunk)) => items.push(Ok(chunk)),
            Ok(None) => {}
            Err(err) => {
                self.done = true;
                items.push(Err(err));
            }
        }
    }

    fn decode_line(&mut self, line: &[u8]) -> DecodedLine {
        let line = std::str::from_utf8(line)
            .map_err(|err| ProviderError::transport(err.to_string()))?
            .trim();

        let Some(payload) = line.strip_prefix("data:") else {
            return Ok(None);
        };

        let payload = payload.trim();
        if payload == "[DONE]" {
            self.done = true;
            return Ok(None);
        }

        if let Some(message) = extract_error_message(payload) {
            return Err(ProviderError::unavailable(message));
        }

        let parsed: OpenAiApiStreamResponse = serde_json::from_str(payload)
            .map_err(|err| ProviderError::transport(format!("malformed stream payload: {err}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty());

        Ok(content.map(OpenAiStreamChunk::text))
    }
}
