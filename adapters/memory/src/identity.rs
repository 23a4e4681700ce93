//! Player accounts kept in process memory.

use std::collections::HashMap;

use async_trait::async_trait;
use knapsack_arena_core::{IdentityStore, StoreError, User, UserId};
use tokio::sync::RwLock;

use crate::Availability;

/// [`IdentityStore`] seeded with known accounts.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    users: RwLock<HashMap<UserId, User>>,
    availability: Availability,
}

impl MemoryIdentityStore {
    /// Creates a store without accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces an account.
    pub async fn insert(&self, user: User) {
        let _ = self.users.write().await.insert(user.id.clone(), user);
    }

    /// Makes every subsequent lookup fail with [`StoreError::Unavailable`] until reset.
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.availability.check("identity store")?;
        Ok(self.users.read().await.get(id).cloned())
    }
}
