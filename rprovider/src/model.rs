//! Provider-agnostic message and streaming request types.
//!
//! ```rust
//! use rprovider::{Message, ProviderErrorKind, Role, SecretString, StreamRequest};
//!
//! let ok = StreamRequest::new(
//!     SecretString::new("sk-test"),
//!     "gpt-3.5-turbo",
//!     vec![Message::new(Role::User, "Plan a weekend in Lisbon")],
//! );
//! assert!(ok.validate().is_ok());
//!
//! let err = StreamRequest::new(
//!     SecretString::new("sk-test"),
//!     "",
//!     vec![Message::new(Role::User, "hi")],
//! )
//! .validate()
//! .expect_err("empty model should fail");
//! assert_eq!(err.kind, ProviderErrorKind::InvalidRequest);
//! ```

use std::fmt::{Display, Formatter};

use crate::{ProviderError, SecretString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation entry. Treated as immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Everything an upstream streaming call needs: credential, model, messages, budget.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRequest {
    pub api_key: SecretString,
    pub model: String,
    pub messages: Vec<Message>,
    pub max_output_tokens: Option<u32>,
}

impl StreamRequest {
    pub fn new(api_key: SecretString, model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            api_key,
            model: model.into(),
            messages,
            max_output_tokens: None,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::authentication("api key must not be empty"));
        }

        if self.model.trim().is_empty() {
            return Err(ProviderError::invalid_request("model must not be empty"));
        }

        if self.messages.is_empty() {
            return Err(ProviderError::invalid_request(
                "at least one message is required",
            ));
        }

        if let Some(max_output_tokens) = self.max_output_tokens
            && max_output_tokens == 0
        {
            return Err(ProviderError::invalid_request(
                "max_output_tokens must be greater than zero",
            ));
        }

        Ok(())
    }
}
