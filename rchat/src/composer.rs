//! Builds the upstream message list and generation parameters for a turn.
//!
//! ```rust
//! use rchat::{BotProfile, PromptComposer};
//! use rprovider::{Message, Role};
//!
//! let profile = BotProfile::new("chatbot3", "You give travel advice. Be {reasoning_tier}.");
//! let history = vec![Message::user("Hello")];
//!
//! let composed = PromptComposer::new().compose(&profile, "detailed", &history);
//! assert_eq!(composed.max_output_tokens, 600);
//! assert_eq!(composed.system_message.content, "You give travel advice. Be detailed.");
//! assert_eq!(composed.messages.len(), 2);
//! assert_eq!(composed.messages[0].role, Role::System);
//! ```

use rprovider::{Message, Role, SecretString, StreamRequest};

use crate::{BotProfile, ReasoningTier};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const TIER_PLACEHOLDER: &str = "{reasoning_tier}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system_message: Message,
    pub messages: Vec<Message>,
    pub model: String,
    pub max_output_tokens: u32,
}

impl ComposedPrompt {
    pub fn into_stream_request(self, api_key: SecretString) -> StreamRequest {
        StreamRequest::new(api_key, self.model, self.messages)
            .with_max_output_tokens(self.max_output_tokens)
    }
}

/// Pure prompt assembly; no I/O and no hidden state beyond the default model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptComposer {
    default_model: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// The profile's model, or the default when the profile leaves it blank.
    pub fn resolve_model<'a>(&'a self, profile: &'a BotProfile) -> &'a str {
        profile
            .model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(self.default_model.as_str())
    }

    pub fn compose(&self, profile: &BotProfile, tier: &str, history: &[Message]) -> ComposedPrompt {
        let system_message = Message::system(render_system_prompt(
            &profile.system_prompt_template,
            tier,
        ));

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(system_message.clone());
        messages.extend(
            history
                .iter()
                .filter(|message| message.role != Role::System)
                .cloned(),
        );

        let model = self.resolve_model(profile).to_string();

        ComposedPrompt {
            system_message,
            messages,
            model,
            max_output_tokens: ReasoningTier::budget_for(tier),
        }
    }
}

/// Writes the tier name into the template: at every placeholder, or as a
/// trailing line when the template has none.
pub fn render_system_prompt(template: &str, tier: &str) -> String {
    if template.contains(TIER_PLACEHOLDER) {
        return template.replace(TIER_PLACEHOLDER, tier);
    }

    let template = template.trim_end();
    if template.is_empty() {
        format!("Reasoning level: {tier}.")
    } else {
        format!("{template}\n\nReasoning level: {tier}.")
    }
}
