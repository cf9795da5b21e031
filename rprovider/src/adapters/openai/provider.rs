//! OpenAI provider implementation over transport and shared models.

use std::sync::Arc;

use async_stream::try_stream;
use futures_util::StreamExt;

use crate::{
    BoxedDeltaStream, ModelProvider, ProviderError, ProviderFuture, SecretString, StreamRequest,
};

use super::transport::OpenAiTransport;
use super::types::{OpenAiMessage, OpenAiRequest};

#[derive(Clone)]
pub struct OpenAiProvider {
    transport: Arc<dyn OpenAiTransport>,
    fallback_model: String,
}

impl OpenAiProvider {
    pub fn new(transport: Arc<dyn OpenAiTransport>) -> Self {
        Self {
            transport,
            fallback_model: "gpt-3.5-turbo".to_string(),
        }
    }

    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = model.into();
        self
    }

    pub(crate) fn build_openai_request(&self, request: StreamRequest) -> (OpenAiRequest, SecretString) {
        let StreamRequest {
            api_key,
            model,
            messages,
            max_output_tokens,
        } = request;

        let model = if model.trim().is_empty() {
            self.fallback_model.clone()
        } else {
            model
        };

        let messages = messages
            .into_iter()
            .map(OpenAiMessage::from)
            .collect::<Vec<_>>();

        let openai_request = OpenAiRequest {
            model,
            messages,
            max_tokens: max_output_tokens,
            stream: true,
        };

        (openai_request, api_key)
    }
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("transport", &self.transport)
            .field("fallback_model", &self.fallback_model)
            .finish()
    }
}

impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn stream<'a>(
        &'a self,
        request: StreamRequest,
    ) -> ProviderFuture<'a, Result<BoxedDeltaStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.validate()?;
            let (openai_request, api_key) = self.build_openai_request(request);
            let mut chunks = self.transport.stream(openai_request, api_key).await?;

            let stream = try_stream! {
                while let Some(chunk) = chunks.next().await {
                    let delta = chunk?.into_delta();
                    if !delta.is_empty() {
                        yield delta;
                    }
                }
            };

            Ok(Box::pin(stream) as BoxedDeltaStream<'a>)
        })
    }
}
