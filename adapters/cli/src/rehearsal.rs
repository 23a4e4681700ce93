//! In-memory walkthrough of a complete multiplayer round.

use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use knapsack_arena_core::{
    ChallengeStore, Clock, ConnectionId, IdentityStore, Relay, RoomBus, RoomCommand, RoomEvent,
    RoomId, SessionStore, SystemClock, TeamId, TeamInfo, User, UserId,
};
use knapsack_arena_lobby::{resolve_profile, RoomRegistry};
use knapsack_arena_memory::{
    drain, ChannelBus, MemoryChallengeStore, MemoryIdentityStore, MemorySessionStore,
};
use knapsack_arena_system_authoring::{Authoring, ChallengeDraft, ItemDraft};
use knapsack_arena_system_session::Attempts;
use serde::Serialize;
use tracing::info;

use crate::config::ArenaConfig;

const ROOM: &str = "rehearsal";
const HOST: &str = "ada";
const GUEST: &str = "grace";

/// Outcome of one rehearsal, printed as JSON.
#[derive(Debug, Serialize)]
pub(crate) struct RehearsalReport {
    /// Challenge the room played.
    pub(crate) challenge_id: String,
    /// Best achievable value of the challenge.
    pub(crate) optimal_value: u64,
    /// Final score of each player, in join order.
    pub(crate) scores: Vec<(String, u32)>,
    /// Member holding the host role after the first host left.
    pub(crate) host_after_departure: Option<String>,
    /// Number of events delivered to the guest's connection.
    pub(crate) guest_events: usize,
}

/// Runs authoring, lobby and attempt flows against in-memory adapters.
pub(crate) async fn run(config: &ArenaConfig, seed: u64) -> Result<RehearsalReport> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let challenges = Arc::new(MemoryChallengeStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let identity = Arc::new(MemoryIdentityStore::new());
    let bus = Arc::new(ChannelBus::new());

    for (id, name) in [(HOST, "Ada"), (GUEST, "Grace")] {
        identity
            .insert(User {
                id: UserId::new(id),
                display_name: name.to_owned(),
                avatar: format!("{id}.png"),
            })
            .await;
    }

    let authoring = Authoring::new(
        Arc::clone(&challenges) as Arc<dyn ChallengeStore>,
        Arc::clone(&clock),
        config.authoring,
    )
    .with_seed(seed);
    let difficulty = config.lobby.default_difficulty;
    let draft = ChallengeDraft {
        difficulty,
        items: [(2, 3), (3, 4), (4, 5), (5, 6)]
            .into_iter()
            .map(|(weight, value)| ItemDraft {
                id: None,
                weight,
                value,
            })
            .collect(),
        max_capacity: 5,
        max_duration_seconds: None,
        blank_count: None,
    };
    let challenge_id = authoring
        .create(draft, &UserId::new("operator"))
        .await
        .context("failed to author the rehearsal challenge")?;
    let challenge = authoring.get(&challenge_id).await?;
    info!(challenge = %challenge_id, optimum = challenge.dp_table.final_value(), "challenge ready");

    let registry = RoomRegistry::new(Arc::clone(&bus) as Arc<dyn RoomBus>, config.lobby);
    let room = RoomId::new(ROOM);
    let host_conn = ConnectionId::new(format!("conn-{HOST}"));
    let guest_conn = ConnectionId::new(format!("conn-{GUEST}"));
    let mut host_rx = bus.connect(host_conn.clone());
    let mut guest_rx = bus.connect(guest_conn.clone());

    for (user, connection) in [(HOST, &host_conn), (GUEST, &guest_conn)] {
        let user_id = UserId::new(user);
        let profile = resolve_profile(identity.as_ref() as &dyn IdentityStore, &user_id, None, None)
            .await
            .with_context(|| format!("failed to resolve the profile of {user}"))?;
        registry
            .handle(
                &room,
                RoomCommand::Join {
                    connection: connection.clone(),
                    user_id,
                    display_name: profile.display_name,
                    avatar: profile.avatar,
                },
            )
            .await;
        info!(room = %room, user, "player joined");
    }

    registry
        .handle(
            &room,
            RoomCommand::SetDifficulty {
                connection: host_conn.clone(),
                difficulty,
            },
        )
        .await;
    registry
        .handle(
            &room,
            RoomCommand::StartGame {
                connection: host_conn.clone(),
                difficulty,
                payload: format!("/play/{challenge_id}"),
            },
        )
        .await;
    info!(room = %room, %difficulty, "game started");

    let attempts = Attempts::new(
        Arc::clone(&challenges) as Arc<dyn ChallengeStore>,
        Arc::clone(&sessions) as Arc<dyn SessionStore>,
        Arc::clone(&clock),
    )
    .with_policy(config.scoring)
    .with_seed(seed);
    let team = TeamInfo {
        team_id: TeamId::new(ROOM),
        team_name: "Rehearsal".to_owned(),
        player_count: 2,
    };

    let mut scores = Vec::new();
    for (user, connection, delta) in [(HOST, &host_conn, 10), (GUEST, &guest_conn, -5)] {
        let started = attempts
            .start_attempt(&challenge_id, &UserId::new(user), Some(team.clone()))
            .await?;
        registry
            .handle(
                &room,
                RoomCommand::Relay {
                    connection: connection.clone(),
                    relay: Relay::CellUpdate {
                        row: 1,
                        col: 2,
                        value: 3,
                        is_correct: delta > 0,
                    },
                },
            )
            .await;
        let adjustment = attempts.adjust_score(&started.session_id, delta).await?;
        let status = attempts.attempt_status(&started.session_id).await?;
        attempts.end_attempt(&started.session_id, 1).await?;
        info!(
            user,
            session = %started.session_id,
            score = adjustment.new_score,
            remaining = status.remaining_seconds,
            "attempt finished"
        );
        scores.push((user.to_owned(), adjustment.new_score));
    }

    registry.disconnect(&host_conn).await;
    bus.disconnect(&host_conn);
    let _ = drain(&mut host_rx);
    let host_after_departure = registry
        .room(&room)
        .await
        .and_then(|snapshot| snapshot.players.into_iter().find(|player| player.is_host))
        .map(|player| player.user_id.to_string());
    info!(room = %room, host = ?host_after_departure, "host departed");

    let guest_events = drain(&mut guest_rx);
    ensure!(
        guest_events
            .iter()
            .any(|event| matches!(event, RoomEvent::RoleAssigned { is_host: true })),
        "the remaining player was never promoted"
    );
    registry.shutdown().await;

    Ok(RehearsalReport {
        challenge_id: challenge_id.to_string(),
        optimal_value: challenge.dp_table.final_value(),
        scores,
        host_after_departure,
        guest_events: guest_events.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rehearsal_hands_the_room_to_the_guest() {
        let report = run(&ArenaConfig::default(), 7).await.expect("rehearsal");

        assert_eq!(report.optimal_value, 7);
        assert_eq!(
            report.scores,
            vec![(HOST.to_owned(), 10), (GUEST.to_owned(), 0)]
        );
        assert_eq!(report.host_after_departure.as_deref(), Some(GUEST));
        assert!(report.guest_events > 0);
    }

    #[tokio::test]
    async fn score_ceiling_from_config_applies() {
        let config = ArenaConfig::from_toml("[scoring]\nceiling = 4\n").expect("config");

        let report = run(&config, 7).await.expect("rehearsal");

        assert_eq!(report.scores[0], (HOST.to_owned(), 4));
    }
}
