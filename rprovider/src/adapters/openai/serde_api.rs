//! OpenAI HTTP payload serde models and conversion helpers.

use serde::{Deserialize, Serialize};

use crate::ProviderError;

use super::types::{OpenAiMessage, OpenAiRequest, OpenAiRole};

/// Which request field carries the output budget. Reasoning-era models reject
/// the legacy `max_tokens` name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenAiTokenParameter {
    MaxTokens,
    MaxCompletionTokens,
}

impl OpenAiTokenParameter {
    pub(crate) fn for_model(model: &str) -> Self {
        let model = model.trim().to_ascii_lowercase();
        let modern = ["o1", "o3", "o4", "gpt-5"]
            .iter()
            .any(|prefix| model.starts_with(prefix));

        if modern {
            Self::MaxCompletionTokens
        } else {
            Self::MaxTokens
        }
    }
}

pub(crate) fn build_api_request(request: OpenAiRequest) -> Result<OpenAiApiRequest, ProviderError> {
    let parameter = OpenAiTokenParameter::for_model(&request.model);
    build_api_request_with_token_parameter(request, parameter)
}

pub(crate) fn build_api_request_with_token_parameter(
    request: OpenAiRequest,
    parameter: OpenAiTokenParameter,
) -> Result<OpenAiApiRequest, ProviderError> {
    let messages = request
        .messages
        .into_iter()
        .map(OpenAiApiMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    if messages.is_empty() {
        return Err(ProviderError::invalid_request(
            "OpenAI request requires at least one message",
        ));
    }

    let (max_tokens, max_completion_tokens) = match parameter {
        OpenAiTokenParameter::MaxTokens => (request.max_tokens, None),
        OpenAiTokenParameter::MaxCompletionTokens => (None, request.max_tokens),
    };

    Ok(OpenAiApiRequest {
        model: request.model,
        messages,
        max_tokens,
        max_completion_tokens,
        stream: request.stream,
    })
}

pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let parsed = serde_json::from_str::<OpenAiApiErrorEnvelope>(body).ok()?;
    Some(parsed.error.message)
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiErrorEnvelope {
    pub error: OpenAiApiError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiError {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiRequest {
    pub model: String,
    pub messages: Vec<OpenAiApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenAiApiMessage {
    pub role: String,
    pub content: String,
}

impl TryFrom<OpenAiMessage> for OpenAiApiMessage {
    type Error = ProviderError;

    // Assistant turns may be empty (a reply that failed before its first token).
    fn try_from(value: OpenAiMessage) -> Result<Self, Self::Error> {
        if value.content.trim().is_empty() && value.role != OpenAiRole::Assistant {
            return Err(ProviderError::invalid_request(
                "OpenAI message content must not be empty",
            ));
        }

        Ok(Self {
            role: value.role.as_str().to_string(),
            content: value.content,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiStreamResponse {
    #[serde(default)]
    pub choices: Vec<OpenAiApiStreamChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenAiApiStreamChoice {
    #[serde(default)]
    pub delta: OpenAiApiStreamDelta,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OpenAiApiStreamDelta {
    pub content: Option<String>,
}
