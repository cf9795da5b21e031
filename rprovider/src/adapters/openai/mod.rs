mod provider;
mod serde_api;
mod transport;
mod types;

pub use provider::OpenAiProvider;
pub use transport::{OpenAiChunkStream, OpenAiHttpTransport, OpenAiTransport};
pub use types::{OpenAiMessage, OpenAiRequest, OpenAiRole, OpenAiStreamChunk};
