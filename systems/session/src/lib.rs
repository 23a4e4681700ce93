#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed, scored play attempts.
//!
//! [`SessionClock`] owns the time budget and [`ScoreLedger`] owns the score. Both
//! share one [`SessionLocks`] table so that mutations of the same session are
//! serialised while distinct sessions proceed independently. [`Attempts`] exposes
//! the four attempt operations over the external stores.

mod clock;
mod ledger;
mod locks;

use std::sync::{Arc, Mutex, PoisonError};

use knapsack_arena_core::{
    AttemptStarted, AttemptStatus, ChallengeId, ChallengeStore, Clock, CoreError, NotFound,
    ScoreAdjustment, SessionId, SessionStore, TeamInfo, UserId, ValidationError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub use clock::{remaining_seconds, SessionClock};
pub use ledger::{ScoreLedger, ScorePolicy};
pub use locks::{SessionGuard, SessionLocks};

/// Entry point for starting, polling, scoring and ending attempts.
pub struct Attempts {
    challenges: Arc<dyn ChallengeStore>,
    clock: SessionClock,
    ledger: ScoreLedger,
    ids: Mutex<ChaCha8Rng>,
}

impl Attempts {
    /// Creates the attempt services with an unbounded score policy.
    #[must_use]
    pub fn new(
        challenges: Arc<dyn ChallengeStore>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let locks = Arc::new(SessionLocks::new());
        Self {
            challenges,
            clock: SessionClock::new(Arc::clone(&sessions), clock, Arc::clone(&locks)),
            ledger: ScoreLedger::new(sessions, locks, ScorePolicy::default()),
            ids: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Replaces the score policy.
    #[must_use]
    pub fn with_policy(self, policy: ScorePolicy) -> Self {
        Self {
            ledger: self.ledger.with_policy(policy),
            ..self
        }
    }

    /// Makes session identifiers reproducible.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            ids: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Session clock backing the attempts.
    #[must_use]
    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    /// Score ledger backing the attempts.
    #[must_use]
    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    /// Starts a solo or team attempt at a stored challenge.
    pub async fn start_attempt(
        &self,
        challenge_id: &ChallengeId,
        user_id: &UserId,
        team: Option<TeamInfo>,
    ) -> Result<AttemptStarted, CoreError> {
        if challenge_id.is_blank() {
            return Err(ValidationError::MissingField {
                field: "challenge_id",
            }
            .into());
        }
        if user_id.is_blank() {
            return Err(ValidationError::MissingField { field: "user_id" }.into());
        }
        if let Some(team) = &team {
            if team.team_id.is_blank() {
                return Err(ValidationError::MissingField { field: "team_id" }.into());
            }
            if team.player_count == 0 {
                return Err(ValidationError::ZeroPlayerCount.into());
            }
        }

        let challenge = self
            .challenges
            .get_by_id(challenge_id)
            .await?
            .ok_or_else(|| NotFound::Challenge(challenge_id.clone()))?;
        let id = self.next_session_id();
        debug!(session = %id, challenge = %challenge_id, user = %user_id, "starting attempt");

        self.clock.start(id, &challenge, user_id.clone(), team).await
    }

    /// Reports the time left on an attempt.
    pub async fn attempt_status(&self, id: &SessionId) -> Result<AttemptStatus, CoreError> {
        self.clock.status(id).await
    }

    /// Adds a signed delta to an attempt's score.
    pub async fn adjust_score(
        &self,
        id: &SessionId,
        delta: i64,
    ) -> Result<ScoreAdjustment, CoreError> {
        self.ledger.adjust(id, delta).await
    }

    /// Records the final duration of an attempt.
    pub async fn end_attempt(&self, id: &SessionId, elapsed_seconds: u32) -> Result<(), CoreError> {
        self.clock.finalize(id, elapsed_seconds).await
    }

    fn next_session_id(&self) -> SessionId {
        let mut rng = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        SessionId::generate(&mut *rng)
    }
}
