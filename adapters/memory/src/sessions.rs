//! Play sessions kept in process memory.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use knapsack_arena_core::{PlaySession, SessionId, SessionStore, StoreError};
use tokio::sync::RwLock;

use crate::Availability;

/// [`SessionStore`] backed by a hash map.
///
/// An optional latency is awaited before every read and write, which widens the
/// window between a read and the following write the way a remote store would.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<SessionId, PlaySession>>,
    latency: Option<Duration>,
    availability: Availability,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..self
        }
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Snapshot of a stored session, bypassing availability checks.
    pub async fn peek(&self, id: &SessionId) -> Option<PlaySession> {
        self.records.read().await.get(id).cloned()
    }

    async fn round_trip(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.availability.check("session store")
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: PlaySession) -> Result<SessionId, StoreError> {
        self.round_trip().await?;
        let id = session.id.clone();
        let mut records = self.records.write().await;
        if records.contains_key(&id) {
            return Err(StoreError::unavailable(format!(
                "session `{id}` already exists"
            )));
        }
        let _ = records.insert(id.clone(), session);
        Ok(id)
    }

    async fn get_by_id(&self, id: &SessionId) -> Result<Option<PlaySession>, StoreError> {
        self.round_trip().await?;
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn update(&self, session: PlaySession) -> Result<(), StoreError> {
        self.round_trip().await?;
        let _ = self
            .records
            .write()
            .await
            .insert(session.id.clone(), session);
        Ok(())
    }
}
