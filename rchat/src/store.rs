//! Conversation storage contracts and a basic in-memory implementation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rcommon::{ConversationKey, SessionId};
use rprovider::Message;

/// Keyed, append-only message logs: one per (session, bot) pair.
///
/// Stored history only ever holds user and assistant turns. Operations are
/// infallible; a missing key reads as an empty history.
pub trait ConversationStore: Send + Sync {
    fn get(&self, key: &ConversationKey) -> Vec<Message>;

    /// Appends a user turn. Callers reject empty input before getting here.
    fn append_user(&self, key: &ConversationKey, text: &str);

    /// Appends an assistant turn. Empty text is valid: the upstream produced
    /// nothing before it finished or failed.
    fn append_assistant(&self, key: &ConversationKey, text: &str);

    fn reset(&self, key: &ConversationKey);

    /// Drops every conversation owned by `session`, returning how many were removed.
    fn forget_session(&self, session: &SessionId) -> usize;
}

#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: Mutex<HashMap<ConversationKey, Vec<Message>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, key: &ConversationKey) -> usize {
        self.conversations().get(key).map_or(0, Vec::len)
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations().len()
    }

    // A panic while holding the lock cannot leave a half-written entry behind
    // (each mutation is a single push or remove), so poisoning is recovered.
    fn conversations(&self) -> MutexGuard<'_, HashMap<ConversationKey, Vec<Message>>> {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn append(&self, key: &ConversationKey, message: Message) {
        self.conversations()
            .entry(key.clone())
            .or_default()
            .push(message);
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn get(&self, key: &ConversationKey) -> Vec<Message> {
        self.conversations().get(key).cloned().unwrap_or_default()
    }

    fn append_user(&self, key: &ConversationKey, text: &str) {
        debug_assert!(!text.trim().is_empty(), "user turns must not be empty");
        self.append(key, Message::user(text));
    }

    fn append_assistant(&self, key: &ConversationKey, text: &str) {
        self.append(key, Message::assistant(text));
    }

    fn reset(&self, key: &ConversationKey) {
        self.conversations().remove(key);
    }

    fn forget_session(&self, session: &SessionId) -> usize {
        let mut conversations = self.conversations();
        let before = conversations.len();
        conversations.retain(|key, _| &key.session != session);
        before - conversations.len()
    }
}

#[cfg(test)]
mod tests {
    use rprovider::Role;

    use super::*;

    fn key(session: &str, bot: &str) -> ConversationKey {
        ConversationKey::new(session, bot)
    }

    #[test]
    fn get_on_unknown_key_is_empty() {
        let store = InMemoryConversationStore::new();
        assert!(store.get(&key("s1", "chatbot1")).is_empty());
        assert_eq!(store.len(&key("s1", "chatbot1")), 0);
    }

    #[test]
    fn appends_preserve_insertion_order_within_a_key() {
        let store = InMemoryConversationStore::new();
        let k = key("s1", "chatbot1");

        store.append_user(&k, "first");
        store.append_assistant(&k, "reply one");
        store.append_user(&k, "second");
        store.append_assistant(&k, "");

        let history = store.get(&k);
        assert_eq!(
            history,
            vec![
                Message::new(Role::User, "first"),
                Message::new(Role::Assistant, "reply one"),
                Message::new(Role::User, "second"),
                Message::new(Role::Assistant, ""),
            ]
        );
    }

    #[test]
    fn keys_are_isolated_across_bots_and_sessions() {
        let store = InMemoryConversationStore::new();
        store.append_user(&key("s1", "chatbot1"), "hello one");
        store.append_user(&key("s1", "chatbot2"), "hello two");
        store.append_user(&key("s2", "chatbot1"), "hello three");

        assert_eq!(store.get(&key("s1", "chatbot1")), vec![Message::user("hello one")]);
        assert_eq!(store.get(&key("s1", "chatbot2")), vec![Message::user("hello two")]);
        assert_eq!(store.get(&key("s2", "chatbot1")), vec![Message::user("hello three")]);
    }

    #[test]
    fn reset_then_get_returns_empty() {
        let store = InMemoryConversationStore::new();
        let k = key("s1", "chatbot4");
        store.append_user(&k, "recipe for pancakes?");
        store.append_assistant(&k, "Flour, eggs, milk.");

        store.reset(&k);
        assert!(store.get(&k).is_empty());

        store.reset(&k);
        assert!(store.get(&k).is_empty());
    }

    #[test]
    fn forget_session_drops_only_that_sessions_conversations() {
        let store = InMemoryConversationStore::new();
        store.append_user(&key("s1", "chatbot1"), "a");
        store.append_user(&key("s1", "chatbot2"), "b");
        store.append_user(&key("s2", "chatbot1"), "c");

        let removed = store.forget_session(&SessionId::from("s1"));
        assert_eq!(removed, 2);
        assert_eq!(store.conversation_count(), 1);
        assert_eq!(store.len(&key("s2", "chatbot1")), 1);
    }
}
