//! Session persistence port and the in-memory implementation.
//!
//! Persistence itself is an external concern; the engine only needs a
//! synchronous-enough save/load keyed by session id. The in-memory
//! store backs tests and single-process deployments.

use dashmap::DashMap;

use crate::core::WorkflowState;

/// Injected persistence capability for workflow state.
pub trait SessionStore: Send + Sync {
    /// Persists the workflow state under the session id, replacing any
    /// previous value.
    fn save(&self, session_id: &str, state: &WorkflowState);

    /// Loads the workflow state for a session, if present.
    fn load(&self, session_id: &str) -> Option<WorkflowState>;

    /// Deletes a session, returning whether it existed.
    fn remove(&self, session_id: &str) -> bool;
}

/// Concurrent in-memory session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, WorkflowState>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, session_id: &str, state: &WorkflowState) {
        self.sessions.insert(session_id.to_string(), state.clone());
    }

    fn load(&self, session_id: &str) -> Option<WorkflowState> {
        self.sessions.get(session_id).map(|entry| entry.clone())
    }

    fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }
}
