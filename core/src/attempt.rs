//! Timed, scored play attempts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ChallengeId, SessionId, TeamId, UserId};

/// Team sharing a multiplayer attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamInfo {
    /// Identifier shared by every member of the team.
    pub team_id: TeamId,
    /// Display name of the team.
    pub team_name: String,
    /// Number of players taking part.
    pub player_count: u32,
}

/// Persisted record of one player's or team's attempt at a challenge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaySession {
    /// Identifier assigned on start.
    pub id: SessionId,
    /// Player that started the attempt.
    pub user_id: UserId,
    /// Challenge being attempted.
    pub challenge_id: ChallengeId,
    /// Team identifier for multiplayer attempts.
    pub team_id: Option<TeamId>,
    /// Team display name for multiplayer attempts.
    pub team_name: Option<String>,
    /// Number of players sharing the attempt.
    pub player_count: u32,
    /// Server-side start instant.
    pub start_time_utc: DateTime<Utc>,
    /// Time budget captured from the challenge at start.
    pub max_duration_seconds: u32,
    /// Current score, never negative.
    pub score: u32,
    /// Duration reported when the attempt ended.
    pub duration_seconds: Option<u32>,
}

impl PlaySession {
    /// Instant after which the attempt is out of time.
    #[must_use]
    pub fn deadline_utc(&self) -> DateTime<Utc> {
        self.start_time_utc + chrono::Duration::seconds(i64::from(self.max_duration_seconds))
    }
}

/// Acknowledgement returned when an attempt starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptStarted {
    /// Identifier of the new play session.
    pub session_id: SessionId,
    /// Server-side start instant.
    pub start_time_utc: DateTime<Utc>,
    /// Start instant plus the time budget.
    pub deadline_utc: DateTime<Utc>,
    /// Time budget granted to the attempt.
    pub max_duration_seconds: u32,
}

/// Remaining time of an attempt, computed on demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptStatus {
    /// Whole seconds left, rounded up and floored at zero.
    pub remaining_seconds: u32,
    /// Whether the budget is exhausted.
    pub is_time_up: bool,
}

/// Outcome of a score adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    /// Score stored after the adjustment.
    pub new_score: u32,
    /// Whether the unclamped sum fell below zero.
    pub clamped_to_zero: bool,
    /// Whether the unclamped sum exceeded the configured ceiling.
    pub clamped_to_ceiling: bool,
}
