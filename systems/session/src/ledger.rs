//! Additive score mutation with clamping.

use std::sync::Arc;

use knapsack_arena_core::{CoreError, NotFound, ScoreAdjustment, SessionId, SessionStore};
use serde::Deserialize;
use tracing::{debug, info};

use crate::SessionLocks;

/// Bounds applied to every stored score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScorePolicy {
    /// Highest score a session may hold; unbounded when `None`.
    pub ceiling: Option<u32>,
}

impl ScorePolicy {
    /// Applies `delta` to `current`, clamping at zero and at the ceiling.
    #[must_use]
    pub fn apply(self, current: u32, delta: i64) -> ScoreAdjustment {
        let sum = i64::from(current).saturating_add(delta);
        let ceiling = self.ceiling.map_or(i64::from(u32::MAX), i64::from);
        let clamped_to_zero = sum < 0;
        let clamped_to_ceiling = sum > ceiling;
        let bounded = sum.clamp(0, ceiling);

        ScoreAdjustment {
            new_score: u32::try_from(bounded).unwrap_or(u32::MAX),
            clamped_to_zero,
            clamped_to_ceiling: clamped_to_ceiling && self.ceiling.is_some(),
        }
    }
}

/// Serialised score adjustments backed by the session store.
#[derive(Clone)]
pub struct ScoreLedger {
    store: Arc<dyn SessionStore>,
    locks: Arc<SessionLocks>,
    policy: ScorePolicy,
}

impl ScoreLedger {
    /// Creates a ledger that shares `locks` with the session clock.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        locks: Arc<SessionLocks>,
        policy: ScorePolicy,
    ) -> Self {
        Self {
            store,
            locks,
            policy,
        }
    }

    /// Replaces the bounds applied by this ledger.
    #[must_use]
    pub fn with_policy(self, policy: ScorePolicy) -> Self {
        Self { policy, ..self }
    }

    /// Bounds applied by this ledger.
    #[must_use]
    pub const fn policy(&self) -> ScorePolicy {
        self.policy
    }

    /// Adds `delta` to the session score.
    ///
    /// Adjustments to the same session are applied one at a time; the store sees a
    /// single read and a single write per call.
    pub async fn adjust(&self, id: &SessionId, delta: i64) -> Result<ScoreAdjustment, CoreError> {
        let _guard = self.locks.acquire(id).await;
        let mut session = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| NotFound::Session(id.clone()))?;

        let adjustment = self.policy.apply(session.score, delta);
        let previous = session.score;
        session.score = adjustment.new_score;
        self.store.update(session).await?;

        if adjustment.clamped_to_zero || adjustment.clamped_to_ceiling {
            info!(
                session = %id,
                delta,
                previous,
                score = adjustment.new_score,
                clamped_to_zero = adjustment.clamped_to_zero,
                clamped_to_ceiling = adjustment.clamped_to_ceiling,
                "score clamped"
            );
        } else {
            debug!(session = %id, delta, previous, score = adjustment.new_score, "score adjusted");
        }
        Ok(adjustment)
    }
}
