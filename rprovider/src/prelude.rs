//! Common `rprovider` imports for downstream crates.

pub use crate::{
    BoxedDeltaStream, CredentialSource, CredentialStore, DeltaStream, Message, ModelProvider,
    ProviderError, ProviderErrorKind, ProviderFuture, Role, SecretString, StreamRequest,
    TextDelta, VecDeltaStream,
};
pub use rcommon::{BotId, BoxFuture};
