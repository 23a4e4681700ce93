//! Server-authoritative time budget of play attempts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use knapsack_arena_core::{
    AttemptStarted, AttemptStatus, Challenge, Clock, CoreError, NotFound, PlaySession, SessionId,
    SessionStore, TeamInfo, UserId,
};
use tracing::info;

use crate::SessionLocks;

/// Starts attempts and reports their remaining time on demand.
///
/// No timer is ever scheduled: "time up" is derived from the wall-clock delta each
/// time it is asked for, and ending an attempt is the caller's decision.
#[derive(Clone)]
pub struct SessionClock {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    locks: Arc<SessionLocks>,
}

impl SessionClock {
    /// Creates a clock over the provided store and time source.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        locks: Arc<SessionLocks>,
    ) -> Self {
        Self {
            store,
            clock,
            locks,
        }
    }

    /// Persists a new session against `challenge`, reading the clock exactly once.
    pub async fn start(
        &self,
        id: SessionId,
        challenge: &Challenge,
        user_id: UserId,
        team: Option<TeamInfo>,
    ) -> Result<AttemptStarted, CoreError> {
        let start_time_utc = self.clock.now();
        let (team_id, team_name, player_count) = match team {
            Some(team) => (Some(team.team_id), Some(team.team_name), team.player_count),
            None => (None, None, 1),
        };
        let session = PlaySession {
            id,
            user_id,
            challenge_id: challenge.id.clone(),
            team_id,
            team_name,
            player_count,
            start_time_utc,
            max_duration_seconds: challenge.max_duration_seconds,
            score: 0,
            duration_seconds: None,
        };
        let deadline_utc = session.deadline_utc();
        let max_duration_seconds = session.max_duration_seconds;

        let session_id = self.store.create(session).await?;
        info!(
            session = %session_id,
            challenge = %challenge.id,
            players = player_count,
            deadline = %deadline_utc,
            "attempt started"
        );

        Ok(AttemptStarted {
            session_id,
            start_time_utc,
            deadline_utc,
            max_duration_seconds,
        })
    }

    /// Reports the time left on a session.
    pub async fn status(&self, id: &SessionId) -> Result<AttemptStatus, CoreError> {
        let session = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| NotFound::Session(id.clone()))?;
        let remaining_seconds = remaining_seconds(
            session.start_time_utc,
            session.max_duration_seconds,
            self.clock.now(),
        );
        Ok(AttemptStatus {
            remaining_seconds,
            is_time_up: remaining_seconds == 0,
        })
    }

    /// Records the duration reported when the attempt ends.
    ///
    /// Repeated calls overwrite the previous duration so client retries stay harmless.
    pub async fn finalize(&self, id: &SessionId, elapsed_seconds: u32) -> Result<(), CoreError> {
        let _guard = self.locks.acquire(id).await;
        let mut session = self
            .store
            .get_by_id(id)
            .await?
            .ok_or_else(|| NotFound::Session(id.clone()))?;
        let previous = session.duration_seconds.replace(elapsed_seconds);
        self.store.update(session).await?;

        info!(
            session = %id,
            elapsed_seconds,
            overwritten = previous.is_some(),
            "attempt finalised"
        );
        Ok(())
    }
}

/// Whole seconds left before the budget runs out, rounded up.
///
/// Zero once the elapsed time reaches the budget. A start instant in the future
/// never yields more than the full budget.
#[must_use]
pub fn remaining_seconds(
    start_time_utc: DateTime<Utc>,
    max_duration_seconds: u32,
    now: DateTime<Utc>,
) -> u32 {
    let elapsed_ms = (now - start_time_utc).num_milliseconds().max(0);
    let remaining_ms = i64::from(max_duration_seconds) * 1_000 - elapsed_ms;
    if remaining_ms <= 0 {
        return 0;
    }
    let rounded_up = (remaining_ms + 999) / 1_000;
    u32::try_from(rounded_up).map_or(max_duration_seconds, |seconds| {
        seconds.min(max_duration_seconds)
    })
}
