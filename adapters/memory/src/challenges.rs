//! Challenge catalogue kept in process memory.

use std::{cmp::Reverse, collections::HashMap};

use async_trait::async_trait;
use knapsack_arena_core::{Challenge, ChallengeId, ChallengeStore, Difficulty, Page, StoreError};
use rand::seq::IteratorRandom;
use tokio::sync::RwLock;

use crate::Availability;

/// [`ChallengeStore`] backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryChallengeStore {
    records: RwLock<HashMap<ChallengeId, Challenge>>,
    availability: Availability,
}

impl MemoryChallengeStore {
    /// Creates an empty catalogue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`] until reset.
    pub fn set_offline(&self, offline: bool) {
        self.availability.set_offline(offline);
    }

    /// Number of stored challenges.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the catalogue is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn matches(challenge: &Challenge, needle: &str) -> bool {
    challenge.id.as_str().to_lowercase().contains(needle)
        || challenge.difficulty.name().contains(needle)
}

#[async_trait]
impl ChallengeStore for MemoryChallengeStore {
    async fn create(&self, challenge: Challenge) -> Result<ChallengeId, StoreError> {
        self.availability.check("challenge store")?;
        let id = challenge.id.clone();
        let mut records = self.records.write().await;
        if records.contains_key(&id) {
            return Err(StoreError::unavailable(format!(
                "challenge `{id}` already exists"
            )));
        }
        let _ = records.insert(id.clone(), challenge);
        Ok(id)
    }

    async fn get_by_id(&self, id: &ChallengeId) -> Result<Option<Challenge>, StoreError> {
        self.availability.check("challenge store")?;
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn get_random_by_difficulty(
        &self,
        difficulty: Difficulty,
    ) -> Result<Option<Challenge>, StoreError> {
        self.availability.check("challenge store")?;
        let records = self.records.read().await;
        let picked = records
            .values()
            .filter(|challenge| challenge.difficulty == difficulty)
            .choose(&mut rand::thread_rng())
            .cloned();
        Ok(picked)
    }

    async fn update(&self, challenge: Challenge) -> Result<bool, StoreError> {
        self.availability.check("challenge store")?;
        let mut records = self.records.write().await;
        match records.get_mut(&challenge.id) {
            Some(stored) => {
                *stored = challenge;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ChallengeId) -> Result<(), StoreError> {
        self.availability.check("challenge store")?;
        let _ = self.records.write().await.remove(id);
        Ok(())
    }

    async fn paginate(
        &self,
        page_index: usize,
        page_size: usize,
        search: Option<&str>,
    ) -> Result<Page<Challenge>, StoreError> {
        self.availability.check("challenge store")?;
        let needle = search
            .map(str::trim)
            .filter(|needle| !needle.is_empty())
            .map(str::to_lowercase);

        let records = self.records.read().await;
        let mut matching: Vec<&Challenge> = records
            .values()
            .filter(|challenge| needle.as_deref().map_or(true, |n| matches(challenge, n)))
            .collect();
        matching.sort_by_key(|challenge| {
            (
                challenge.difficulty,
                Reverse(challenge.created_at),
                challenge.id.clone(),
            )
        });

        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(page_index.saturating_sub(1).saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect();
        Ok(Page { items, total })
    }
}
