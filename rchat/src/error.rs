//! Relay-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use rprovider::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayErrorKind {
    EmptyInput,
    UnknownBot,
    MissingCredential,
    UpstreamConnect,
    UpstreamStream,
}

impl RelayErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::UnknownBot => "unknown_bot",
            Self::MissingCredential => "missing_credential",
            Self::UpstreamConnect => "upstream_connect",
            Self::UpstreamStream => "upstream_stream",
        }
    }

    /// Rejections are returned before any state change and never open a stream.
    pub fn is_rejection(self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::UnknownBot | Self::MissingCredential
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayError {
    pub kind: RelayErrorKind,
    pub message: String,
}

impl RelayError {
    pub fn new(kind: RelayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn empty_input() -> Self {
        Self::new(RelayErrorKind::EmptyInput, "Empty message")
    }

    pub fn unknown_bot(bot: impl Display) -> Self {
        Self::new(RelayErrorKind::UnknownBot, format!("Unknown chatbot: {bot}"))
    }

    pub fn missing_credential(bot: impl Display) -> Self {
        Self::new(
            RelayErrorKind::MissingCredential,
            format!("API key for {bot} not set"),
        )
    }

    pub fn upstream_connect(error: &ProviderError) -> Self {
        Self::new(RelayErrorKind::UpstreamConnect, error.to_string())
    }

    pub fn upstream_stream(error: &ProviderError) -> Self {
        Self::new(RelayErrorKind::UpstreamStream, error.to_string())
    }
}

impl Display for RelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for RelayError {}
