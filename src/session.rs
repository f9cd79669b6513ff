use crate::map::ViewportState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Per-session viewport persistence.
///
/// `with_session` runs the whole read-modify-write of one operation while the
/// session is held, so two operations on the same session never interleave.
/// Operations on different sessions run independently. Unknown sessions start
/// at the default world view.
pub trait SessionStore {
    fn with_session<T>(&self, id: &str, op: impl FnOnce(&mut ViewportState) -> T) -> T;
    fn get(&self, id: &str) -> Option<ViewportState>;
    fn remove(&self, id: &str) -> bool;
}

type SessionSlot = Arc<Mutex<ViewportState>>;

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionSlot>>,
}

// States are plain values replaced wholesale; a poisoned lock still holds a
// consistent one
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.sessions).is_empty()
    }

    fn slot(&self, id: &str) -> SessionSlot {
        let mut sessions = lock(&self.sessions);
        Arc::clone(sessions.entry(id.to_string()).or_default())
    }
}

impl SessionStore for InMemorySessionStore {
    fn with_session<T>(&self, id: &str, op: impl FnOnce(&mut ViewportState) -> T) -> T {
        // The map lock is released before the operation runs
        let slot = self.slot(id);
        let mut state = lock(&slot);
        op(&mut *state)
    }

    fn get(&self, id: &str) -> Option<ViewportState> {
        let slot = lock(&self.sessions).get(id).cloned()?;
        let state = *lock(&slot);
        Some(state)
    }

    fn remove(&self, id: &str) -> bool {
        lock(&self.sessions).remove(id).is_some()
    }
}
