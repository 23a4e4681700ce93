//! Per-session serialisation of read-modify-write store round trips.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use knapsack_arena_core::SessionId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock table keyed by session; entries live only while someone holds or awaits them.
#[derive(Debug, Default)]
pub struct SessionLocks {
    table: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other holder works on `session`.
    ///
    /// Distinct sessions never wait on each other; the table itself is only held
    /// for the map lookup.
    pub async fn acquire(&self, session: &SessionId) -> SessionGuard<'_> {
        let entry = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(table.entry(session.clone()).or_default())
        };
        let guard = entry.lock_owned().await;
        SessionGuard {
            locks: self,
            session: session.clone(),
            guard: Some(guard),
        }
    }

    /// Number of sessions with a live entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no session currently holds or awaits a lock.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, session: &SessionId) {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = table
            .get(session)
            .is_some_and(|entry| Arc::strong_count(entry) == 1);
        if idle {
            let _ = table.remove(session);
        }
    }
}

/// Exclusive access to one session, released on drop.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    locks: &'a SessionLocks,
    session: SessionId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.release(&self.session);
    }
}
