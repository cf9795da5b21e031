//! Upstream model provider contracts for the chatrelay streaming relay.
//!
//! The relay only depends on [`ModelProvider`]: open a streaming call, then
//! pull [`TextDelta`] items until the provider signals completion.
//!
//! ```rust
//! use rprovider::{Message, SecretString, StreamRequest};
//!
//! let request = StreamRequest::new(
//!     SecretString::new("sk-test"),
//!     "gpt-3.5-turbo",
//!     vec![Message::system("You are helpful."), Message::user("Hello")],
//! )
//! .with_max_output_tokens(300);
//!
//! assert!(request.validate().is_ok());
//! ```

mod credentials;
mod error;
mod model;
mod provider;
mod stream;

pub mod adapters;
pub mod prelude;

pub use credentials::{CredentialSource, CredentialStore, SecretString};
pub use error::{ProviderError, ProviderErrorKind};
pub use model::{Message, Role, StreamRequest};
pub use provider::{ModelProvider, ProviderFuture};
pub use stream::{BoxedDeltaStream, DeltaStream, TextDelta, VecDeltaStream};
