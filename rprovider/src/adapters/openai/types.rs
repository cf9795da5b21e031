//! OpenAI adapter types and provider-agnostic conversion logic.

use crate::{Message, Role, TextDelta};

#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiMessage {
    pub role: OpenAiRole,
    pub content: String,
}

impl From<Message> for OpenAiMessage {
    fn from(value: Message) -> Self {
        Self {
            role: value.role.into(),
            content: value.content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiRole {
    System,
    User,
    Assistant,
}

impl OpenAiRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl From<Role> for OpenAiRole {
    fn from(value: Role) -> Self {
        match value {
            Role::System => Self::System,
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

/// One text fragment decoded from the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiStreamChunk {
    pub text: String,
}

impl OpenAiStreamChunk {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub(crate) fn into_delta(self) -> TextDelta {
        TextDelta::new(self.text)
    }
}
