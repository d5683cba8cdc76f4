//! Concurrent per-session history store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use crate::history::{ConversationHistory, Turn};

type SharedHistory = Arc<Mutex<ConversationHistory>>;

/// In-memory map from session id to conversation history.
///
/// Each history sits behind its own mutex, so turns of one session are
/// serialised while different sessions only contend on the map lookup.
/// Histories live for the lifetime of the process; nothing is evicted.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SharedHistory>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the history handle for `session_id`, creating an empty one if absent.
    ///
    /// Calling this twice with the same id yields the same history.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<ConversationHistory>> {
        if let Some(history) = self.sessions.read().await.get(session_id) {
            return Arc::clone(history);
        }

        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(session_id.to_string()).or_insert_with(|| {
            debug!(session.id = %session_id, "creating conversation history");
            Arc::new(Mutex::new(ConversationHistory::new()))
        });
        Arc::clone(history)
    }

    /// Take exclusive access to a session's history until the guard is dropped.
    ///
    /// A second `lock` on the same id waits for the first guard to go away.
    pub async fn lock(&self, session_id: &str) -> SessionGuard {
        let history = self.get_or_create(session_id).await;
        SessionGuard { session_id: session_id.to_string(), history: history.lock_owned().await }
    }

    /// Append a completed turn to `session_id`'s history.
    pub async fn append(&self, session_id: &str, turn: Turn) {
        self.lock(session_id).await.append(turn);
    }

    /// A copy of the history for `session_id`, or `None` if the session was never used.
    pub async fn history(&self, session_id: &str) -> Option<ConversationHistory> {
        let history = self.sessions.read().await.get(session_id).map(Arc::clone)?;
        let snapshot = history.lock().await.clone();
        Some(snapshot)
    }

    pub async fn has_session(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Known session ids, sorted.
    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Exclusive handle on one session's history.
///
/// Holding the guard keeps every other turn for the same session waiting.
pub struct SessionGuard {
    session_id: String,
    history: OwnedMutexGuard<ConversationHistory>,
}

impl SessionGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Append a completed turn.
    pub fn append(&mut self, turn: Turn) {
        self.history.push(turn);
        debug!(session.id = %self.session_id, turn_count = self.history.len(), "turn appended");
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("session_id", &self.session_id)
            .field("turns", &self.history.len())
            .finish()
    }
}
