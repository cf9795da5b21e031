//! Streaming conversation relay: per-(session, bot) histories, prompt
//! composition, and turn orchestration over a model provider.

mod composer;
mod error;
mod frame;
mod hooks;
mod profile;
mod relay;
mod store;
mod types;

pub mod prelude {
    pub use crate::{
        BotProfile, BotProfiles, ComposedPrompt, ConversationStore, Frame, FrameStream,
        InMemoryConversationStore, NoopRelayHooks, PromptComposer, ReasoningTier,
        RelayController, RelayError, RelayErrorKind, RelayHooks, RelayPhase, TurnOutcome,
        TurnRequest,
    };
    pub use rcommon::{BotId, ConversationKey, SessionId};
    pub use rprovider::{Message, Role};
}

pub use composer::{ComposedPrompt, DEFAULT_MODEL, PromptComposer, TIER_PLACEHOLDER, render_system_prompt};
pub use error::{RelayError, RelayErrorKind};
pub use frame::Frame;
pub use hooks::{NoopRelayHooks, RelayHooks, RelayPhase, TurnOutcome};
pub use profile::{BotProfile, BotProfiles, ReasoningTier};
pub use relay::RelayController;
pub use store::{ConversationStore, InMemoryConversationStore};
pub use types::{FrameStream, TurnRequest};
