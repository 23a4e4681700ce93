//! Contracts of the external stores the arena consumes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Challenge, ChallengeId, Difficulty, PlaySession, SessionId, StoreError, UserId};

/// One page of a paginated listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records on the requested page.
    pub items: Vec<T>,
    /// Number of records matching the query across all pages.
    pub total: usize,
}

/// Account profile used to enrich display data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account identifier.
    pub id: UserId,
    /// Name shown to other players.
    pub display_name: String,
    /// Avatar reference.
    pub avatar: String,
}

/// Persistent catalogue of authored challenges.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Persists a new challenge and returns its identifier.
    async fn create(&self, challenge: Challenge) -> Result<ChallengeId, StoreError>;

    /// Loads a challenge by identifier.
    async fn get_by_id(&self, id: &ChallengeId) -> Result<Option<Challenge>, StoreError>;

    /// Picks any challenge offered under the provided tier.
    async fn get_random_by_difficulty(
        &self,
        difficulty: Difficulty,
    ) -> Result<Option<Challenge>, StoreError>;

    /// Replaces a stored challenge; returns `false` when no record matched.
    async fn update(&self, challenge: Challenge) -> Result<bool, StoreError>;

    /// Removes a challenge; removing an unknown id is not an error.
    async fn delete(&self, id: &ChallengeId) -> Result<(), StoreError>;

    /// Lists challenges matching `search`, one-based `page_index`.
    async fn paginate(
        &self,
        page_index: usize,
        page_size: usize,
        search: Option<&str>,
    ) -> Result<Page<Challenge>, StoreError>;
}

/// Persistent record of play attempts.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a new session and returns its identifier.
    async fn create(&self, session: PlaySession) -> Result<SessionId, StoreError>;

    /// Loads a session by identifier.
    async fn get_by_id(&self, id: &SessionId) -> Result<Option<PlaySession>, StoreError>;

    /// Overwrites a stored session.
    async fn update(&self, session: PlaySession) -> Result<(), StoreError>;
}

/// Read-only view of player accounts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Loads an account profile by identifier.
    async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}
