//! Static per-bot configuration and reasoning tiers.

use std::fmt::{Display, Formatter};

use rcommon::{BotId, Registry};

/// Named generation setting. Drives the output token budget and is also
/// written into the system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasoningTier {
    Minimal,
    Medium,
    Detailed,
}

impl ReasoningTier {
    pub const ALL: [Self; 3] = [Self::Minimal, Self::Medium, Self::Detailed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Medium => "medium",
            Self::Detailed => "detailed",
        }
    }

    pub fn max_output_tokens(self) -> u32 {
        match self {
            Self::Minimal => 100,
            Self::Medium => 300,
            Self::Detailed => 600,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(name))
    }

    /// Token budget for a tier name; unrecognized names get the smallest budget.
    pub fn budget_for(name: &str) -> u32 {
        Self::parse(name)
            .unwrap_or(Self::Minimal)
            .max_output_tokens()
    }
}

impl Display for ReasoningTier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotProfile {
    pub id: BotId,
    pub system_prompt_template: String,
    pub model: Option<String>,
    pub reasoning_tier: String,
}

impl BotProfile {
    pub fn new(id: impl Into<BotId>, system_prompt_template: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            system_prompt_template: system_prompt_template.into(),
            model: None,
            reasoning_tier: ReasoningTier::Minimal.as_str().to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_reasoning_tier(mut self, reasoning_tier: impl Into<String>) -> Self {
        self.reasoning_tier = reasoning_tier.into();
        self
    }
}

/// Read-only bot id → profile map, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct BotProfiles {
    profiles: Registry<BotId, BotProfile>,
}

impl BotProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: BotProfile) -> Option<BotProfile> {
        self.profiles.insert(profile.id.clone(), profile)
    }

    pub fn with_profile(mut self, profile: BotProfile) -> Self {
        self.insert(profile);
        self
    }

    pub fn get(&self, bot: &BotId) -> Option<&BotProfile> {
        self.profiles.get(bot)
    }

    pub fn contains(&self, bot: &BotId) -> bool {
        self.profiles.contains_key(bot)
    }

    /// Profiles sorted by bot id.
    pub fn iter_sorted(&self) -> Vec<&BotProfile> {
        let mut profiles = self.profiles.values().collect::<Vec<_>>();
        profiles.sort_by(|a, b| a.id.cmp(&b.id));
        profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<BotProfile> for BotProfiles {
    fn from_iter<I: IntoIterator<Item = BotProfile>>(iter: I) -> Self {
        Self {
            profiles: iter
                .into_iter()
                .map(|profile| (profile.id.clone(), profile))
                .collect(),
        }
    }
}
