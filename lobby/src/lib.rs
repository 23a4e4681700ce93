#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative state of multiplayer rooms.
//!
//! [`apply`] is the single state transition of a room: it consumes one
//! [`RoomCommand`] and appends the [`Outbound`] effects the bus must carry out.
//! [`RoomRegistry`] serialises commands per room and owns room lifetimes.

mod profile;
mod registry;

use knapsack_arena_core::{
    ConnectionId, Delivery, Difficulty, Outbound, Relay, RoomCommand, RoomEvent, RoomId, UserId,
};
use tracing::debug;

pub use profile::{resolve_profile, Profile};
pub use registry::{LobbyConfig, RoomRegistry, RoomSnapshot};

/// Member of a room bound to one live connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    connection: ConnectionId,
    user_id: UserId,
    display_name: String,
    avatar: String,
    is_host: bool,
    score: u32,
}

impl Player {
    /// Connection currently bound to the member.
    #[must_use]
    pub fn connection(&self) -> &ConnectionId {
        &self.connection
    }

    /// Account of the member.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Whether the member hosts the room.
    #[must_use]
    pub const fn is_host(&self) -> bool {
        self.is_host
    }
}

/// Authoritative state of one room.
#[derive(Clone, Debug)]
pub struct Room {
    id: RoomId,
    difficulty: Difficulty,
    players: Vec<Player>,
}

impl Room {
    /// Creates an empty room at the provided difficulty.
    #[must_use]
    pub fn new(id: RoomId, difficulty: Difficulty) -> Self {
        Self {
            id,
            difficulty,
            players: Vec::new(),
        }
    }

    fn position_of_connection(&self, connection: &ConnectionId) -> Option<usize> {
        self.players
            .iter()
            .position(|player| &player.connection == connection)
    }

    fn host_connection_matches(&self, connection: &ConnectionId) -> bool {
        self.players
            .iter()
            .any(|player| player.is_host && &player.connection == connection)
    }

    fn players_updated(&self) -> Outbound {
        Outbound::to_group(
            self.id.clone(),
            RoomEvent::PlayersUpdated {
                players: query::players(self),
            },
        )
    }
}

/// Builds the delivery of a relayed notification.
///
/// Relays never touch room state, so the registry forwards them without taking the
/// room lock.
#[must_use]
pub fn relay_outbound(room: &RoomId, connection: &ConnectionId, relay: Relay) -> Outbound {
    let delivery = if relay.excludes_sender() {
        Delivery::OthersInGroup {
            room: room.clone(),
            except: connection.clone(),
        }
    } else {
        Delivery::Group(room.clone())
    };
    Outbound::Publish {
        delivery,
        event: relay.into_event(),
    }
}

/// Applies the provided command to the room, mutating state deterministically.
///
/// Host-only commands from other members are ignored without effects.
pub fn apply(room: &mut Room, command: RoomCommand, out: &mut Vec<Outbound>) {
    match command {
        RoomCommand::Join {
            connection,
            user_id,
            display_name,
            avatar,
        } => {
            let is_host = match room.players.iter_mut().find(|p| p.user_id == user_id) {
                Some(existing) => {
                    let stale = std::mem::replace(&mut existing.connection, connection.clone());
                    if stale != connection {
                        out.push(Outbound::LeaveGroup {
                            room: room.id.clone(),
                            connection: stale,
                        });
                    }
                    existing.is_host
                }
                None => {
                    let is_host = room.players.is_empty();
                    room.players.push(Player {
                        connection: connection.clone(),
                        user_id,
                        display_name,
                        avatar,
                        is_host,
                        score: 0,
                    });
                    is_host
                }
            };

            out.push(Outbound::JoinGroup {
                room: room.id.clone(),
                connection: connection.clone(),
            });
            out.push(Outbound::to_connection(
                connection.clone(),
                RoomEvent::DifficultyUpdated {
                    difficulty: room.difficulty,
                },
            ));
            out.push(Outbound::to_connection(
                connection,
                RoomEvent::RoleAssigned { is_host },
            ));
            out.push(room.players_updated());
        }
        RoomCommand::SetDifficulty {
            connection,
            difficulty,
        } => {
            if !room.host_connection_matches(&connection) {
                debug!(
                    room = %room.id,
                    connection = %connection,
                    "ignored difficulty change from non-host"
                );
                return;
            }
            room.difficulty = difficulty;
            out.push(Outbound::to_group(
                room.id.clone(),
                RoomEvent::DifficultyUpdated { difficulty },
            ));
        }
        RoomCommand::StartGame {
            connection,
            difficulty,
            payload,
        } => {
            if !room.host_connection_matches(&connection) {
                debug!(
                    room = %room.id,
                    connection = %connection,
                    "ignored game start from non-host"
                );
                return;
            }
            out.push(Outbound::to_group(
                room.id.clone(),
                RoomEvent::GameStarted {
                    room_id: room.id.clone(),
                    difficulty,
                    payload,
                },
            ));
        }
        RoomCommand::Kick { connection, target } => {
            let Some(host) = room
                .players
                .iter()
                .find(|player| player.is_host && player.connection == connection)
            else {
                debug!(room = %room.id, connection = %connection, "ignored kick from non-host");
                return;
            };
            if host.user_id == target {
                debug!(room = %room.id, user = %target, "host cannot kick themselves");
                return;
            }
            let Some(index) = room.players.iter().position(|p| p.user_id == target) else {
                debug!(room = %room.id, user = %target, "kick target is not in the room");
                return;
            };

            let kicked = room.players.remove(index);
            out.push(Outbound::to_connection(
                kicked.connection.clone(),
                RoomEvent::KickedFromRoom,
            ));
            out.push(Outbound::LeaveGroup {
                room: room.id.clone(),
                connection: kicked.connection,
            });
            out.push(room.players_updated());
        }
        RoomCommand::Relay { connection, relay } => {
            out.push(relay_outbound(&room.id, &connection, relay));
        }
        RoomCommand::Disconnect { connection } => {
            let Some(index) = room.position_of_connection(&connection) else {
                return;
            };
            let departed = room.players.remove(index);
            out.push(Outbound::LeaveGroup {
                room: room.id.clone(),
                connection,
            });
            if room.players.is_empty() {
                return;
            }
            if departed.is_host {
                let successor = &mut room.players[0];
                successor.is_host = true;
                out.push(Outbound::to_connection(
                    successor.connection.clone(),
                    RoomEvent::RoleAssigned { is_host: true },
                ));
            }
            out.push(room.players_updated());
        }
    }

    debug_assert!(
        query::has_single_host(room),
        "a non-empty room must have exactly one host"
    );
}

/// Query functions that provide read-only access to room state.
pub mod query {
    use knapsack_arena_core::{ConnectionId, Difficulty, PlayerSnapshot, RoomId};

    use super::{Player, Room};

    /// Identifier of the room.
    #[must_use]
    pub fn id(room: &Room) -> &RoomId {
        &room.id
    }

    /// Difficulty currently selected for the room.
    #[must_use]
    pub fn difficulty(room: &Room) -> Difficulty {
        room.difficulty
    }

    /// Members in join order.
    #[must_use]
    pub fn members(room: &Room) -> &[Player] {
        &room.players
    }

    /// Public view of the members in join order.
    #[must_use]
    pub fn players(room: &Room) -> Vec<PlayerSnapshot> {
        room.players
            .iter()
            .map(|player| PlayerSnapshot {
                user_id: player.user_id.clone(),
                display_name: player.display_name.clone(),
                avatar: player.avatar.clone(),
                is_host: player.is_host,
                score: player.score,
            })
            .collect()
    }

    /// Current host, if the room has members.
    #[must_use]
    pub fn host(room: &Room) -> Option<&Player> {
        room.players.iter().find(|player| player.is_host)
    }

    /// Whether a connection is bound to a member.
    #[must_use]
    pub fn contains_connection(room: &Room, connection: &ConnectionId) -> bool {
        room.position_of_connection(connection).is_some()
    }

    /// Whether the room has no members.
    #[must_use]
    pub fn is_empty(room: &Room) -> bool {
        room.players.is_empty()
    }

    /// Whether the host invariant holds: one host when occupied, none when empty.
    #[must_use]
    pub fn has_single_host(room: &Room) -> bool {
        let hosts = room.players.iter().filter(|player| player.is_host).count();
        hosts == usize::from(!room.players.is_empty())
    }
}
