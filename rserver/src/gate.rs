//! At most one in-flight turn per conversation key.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rcommon::ConversationKey;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type KeyLock = Arc<AsyncMutex<()>>;

/// Per-key async locks. A turn holds its [`TurnPermit`] until the response
/// body is dropped, so an overlapping turn on the same key waits for the
/// previous one to finalize. Distinct keys never contend.
#[derive(Debug, Clone, Default)]
pub struct TurnGate {
    locks: Arc<Mutex<HashMap<ConversationKey, KeyLock>>>,
}

impl TurnGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: &ConversationKey) -> TurnPermit {
        let lock = Arc::clone(self.locks().entry(key.clone()).or_default());
        let guard = Arc::clone(&lock).lock_owned().await;

        TurnPermit {
            locks: Arc::clone(&self.locks),
            key: key.clone(),
            lock,
            _guard: guard,
        }
    }

    /// Keys with a turn in flight or waiting.
    pub fn len(&self) -> usize {
        self.locks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks().is_empty()
    }

    fn locks(&self) -> MutexGuard<'_, HashMap<ConversationKey, KeyLock>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct TurnPermit {
    locks: Arc<Mutex<HashMap<ConversationKey, KeyLock>>>,
    key: ConversationKey,
    lock: KeyLock,
    _guard: OwnedMutexGuard<()>,
}

impl TurnPermit {
    pub fn key(&self) -> &ConversationKey {
        &self.key
    }
}

impl Drop for TurnPermit {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        // Map entry, this permit, and its guard; anything more is a waiter.
        if Arc::strong_count(&self.lock) <= 3
            && locks
                .get(&self.key)
                .is_some_and(|entry| Arc::ptr_eq(entry, &self.lock))
        {
            locks.remove(&self.key);
        }
    }
}
