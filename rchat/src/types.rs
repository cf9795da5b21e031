//! Inbound turn and outbound frame stream types.

use std::pin::Pin;

use futures_core::Stream;
use rcommon::{BotId, ConversationKey, SessionId};

use crate::Frame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub session: SessionId,
    pub bot: BotId,
    pub message: String,
}

impl TurnRequest {
    pub fn new(
        session: impl Into<SessionId>,
        bot: impl Into<BotId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            session: session.into(),
            bot: bot.into(),
            message: message.into(),
        }
    }

    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.session.clone(), self.bot.clone())
    }
}

pub type FrameStream<'a> = Pin<Box<dyn Stream<Item = Frame> + Send + 'a>>;
