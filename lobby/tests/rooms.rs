use knapsack_arena_core::{
    ConnectionId, Delivery, Difficulty, Outbound, PlayerSnapshot, RoomCommand, RoomEvent, RoomId,
    UserId,
};
use knapsack_arena_lobby::{apply, query, Room};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn join(user: &str) -> RoomCommand {
    RoomCommand::Join {
        connection: ConnectionId::new(format!("c-{user}")),
        user_id: UserId::new(user),
        display_name: user.to_owned(),
        avatar: String::new(),
    }
}

fn disconnect(user: &str) -> RoomCommand {
    RoomCommand::Disconnect {
        connection: ConnectionId::new(format!("c-{user}")),
    }
}

fn published_to(out: &[Outbound], delivery: &Delivery) -> Vec<RoomEvent> {
    out.iter()
        .filter_map(|effect| match effect {
            Outbound::Publish { delivery: d, event } if d == delivery => Some(event.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn host_disconnect_hands_the_room_to_the_next_member() {
    let room_id = RoomId::new("r");
    let mut room = Room::new(room_id.clone(), Difficulty::Easy);
    let mut out = Vec::new();
    apply(&mut room, join("a"), &mut out);
    apply(&mut room, join("b"), &mut out);
    out.clear();

    apply(&mut room, disconnect("a"), &mut out);

    assert_eq!(
        out,
        vec![
            Outbound::LeaveGroup {
                room: room_id.clone(),
                connection: ConnectionId::new("c-a"),
            },
            Outbound::to_connection(
                ConnectionId::new("c-b"),
                RoomEvent::RoleAssigned { is_host: true },
            ),
            Outbound::to_group(
                room_id,
                RoomEvent::PlayersUpdated {
                    players: vec![PlayerSnapshot {
                        user_id: UserId::new("b"),
                        display_name: "b".to_owned(),
                        avatar: String::new(),
                        is_host: true,
                        score: 0,
                    }],
                },
            ),
        ]
    );
}

#[test]
fn non_host_departure_does_not_reassign_roles() {
    let mut room = Room::new(RoomId::new("r"), Difficulty::Easy);
    let mut out = Vec::new();
    for user in ["a", "b", "c"] {
        apply(&mut room, join(user), &mut out);
    }
    out.clear();

    apply(&mut room, disconnect("b"), &mut out);

    assert!(
        !out.iter().any(|effect| matches!(
            effect,
            Outbound::Publish {
                event: RoomEvent::RoleAssigned { .. },
                ..
            }
        )),
        "nobody is promoted when a regular member leaves"
    );
    assert_eq!(
        query::host(&room).map(|host| host.user_id().clone()),
        Some(UserId::new("a"))
    );
}

#[test]
fn last_member_leaving_empties_the_room_silently() {
    let room_id = RoomId::new("r");
    let mut room = Room::new(room_id.clone(), Difficulty::Hard);
    let mut out = Vec::new();
    apply(&mut room, join("a"), &mut out);
    out.clear();

    apply(&mut room, disconnect("a"), &mut out);

    assert!(query::is_empty(&room));
    assert!(published_to(&out, &Delivery::Group(room_id)).is_empty());
    assert!(query::has_single_host(&room));
}

#[test]
fn unknown_connections_are_ignored() {
    let mut room = Room::new(RoomId::new("r"), Difficulty::Easy);
    let mut out = Vec::new();
    apply(&mut room, join("a"), &mut out);
    out.clear();

    apply(&mut room, disconnect("zed"), &mut out);

    assert!(out.is_empty());
    assert_eq!(query::members(&room).len(), 1);
}

#[test]
fn random_membership_churn_keeps_a_single_host() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let users = ["a", "b", "c", "d", "e", "f"];
    let mut room = Room::new(RoomId::new("r"), Difficulty::Easy);
    let mut out = Vec::new();

    for _ in 0..2_000 {
        let user = users[rng.gen_range(0..users.len())];
        let command = match rng.gen_range(0..3) {
            0 => join(user),
            1 => disconnect(user),
            _ => {
                let kicker = query::members(&room)
                    .get(rng.gen_range(0..users.len()))
                    .map(|player| player.connection().clone())
                    .unwrap_or_else(|| ConnectionId::new("c-nobody"));
                RoomCommand::Kick {
                    connection: kicker,
                    target: UserId::new(user),
                }
            }
        };
        apply(&mut room, command, &mut out);

        assert!(
            query::has_single_host(&room),
            "exactly one host whenever the room is occupied"
        );
        out.clear();
    }
}
