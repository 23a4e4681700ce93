//! Concurrent registry of live rooms.

use std::{collections::HashMap, sync::Arc};

use knapsack_arena_core::{
    ConnectionId, Difficulty, Outbound, PlayerSnapshot, RoomBus, RoomCommand, RoomId,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{apply, query, relay_outbound, Room};

/// Settings applied to rooms created by the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LobbyConfig {
    /// Difficulty of newly created rooms.
    pub default_difficulty: Difficulty,
}

/// Read-only copy of a room taken under its lock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// Identifier of the room.
    pub room_id: RoomId,
    /// Selected difficulty.
    pub difficulty: Difficulty,
    /// Members in join order.
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug)]
struct RoomSlot {
    room: Room,
    closed: bool,
}

type SharedSlot = Arc<Mutex<RoomSlot>>;

/// Owner of every live room.
///
/// Each room sits behind its own lock, so commands for one room are applied one at
/// a time while different rooms proceed in parallel. Locks are always taken in the
/// order room, then registry map, then connection index; the map is never held while
/// waiting on a room.
pub struct RoomRegistry {
    bus: Arc<dyn RoomBus>,
    config: LobbyConfig,
    rooms: Mutex<HashMap<RoomId, SharedSlot>>,
    connections: Mutex<HashMap<ConnectionId, RoomId>>,
}

impl RoomRegistry {
    /// Creates an empty registry publishing through `bus`.
    #[must_use]
    pub fn new(bus: Arc<dyn RoomBus>, config: LobbyConfig) -> Self {
        Self {
            bus,
            config,
            rooms: Mutex::new(HashMap::new()),
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Settings applied to new rooms.
    #[must_use]
    pub const fn config(&self) -> LobbyConfig {
        self.config
    }

    /// Routes a command to the room it addresses.
    ///
    /// Joins create the room on demand. Relays are forwarded without touching room
    /// state. Disconnects are routed by connection, whatever `room_id` says.
    pub async fn handle(&self, room_id: &RoomId, command: RoomCommand) {
        match command {
            RoomCommand::Join { .. } => self.join(room_id, command).await,
            RoomCommand::Relay { connection, relay } => {
                self.bus
                    .dispatch(&relay_outbound(room_id, &connection, relay));
            }
            RoomCommand::Disconnect { connection } => self.disconnect(&connection).await,
            RoomCommand::SetDifficulty { .. }
            | RoomCommand::StartGame { .. }
            | RoomCommand::Kick { .. } => self.update_existing(room_id, command).await,
        }
    }

    /// Removes a dropped connection from whichever room it belongs to.
    pub async fn disconnect(&self, connection: &ConnectionId) {
        let Some(room_id) = self.connections.lock().await.get(connection).cloned() else {
            debug!(connection = %connection, "disconnect from a connection outside any room");
            return;
        };
        let Some(slot) = self.slot(&room_id).await else {
            return;
        };

        let mut out = Vec::new();
        {
            let mut guard = slot.lock().await;
            if guard.closed {
                return;
            }
            let was_host = query::host(&guard.room)
                .is_some_and(|host| host.connection() == connection);
            apply(
                &mut guard.room,
                RoomCommand::Disconnect {
                    connection: connection.clone(),
                },
                &mut out,
            );

            if query::is_empty(&guard.room) {
                guard.closed = true;
                let mut rooms = self.rooms.lock().await;
                if rooms
                    .get(&room_id)
                    .is_some_and(|current| Arc::ptr_eq(current, &slot))
                {
                    let _ = rooms.remove(&room_id);
                }
                info!(room = %room_id, "room destroyed");
            } else if was_host {
                if let Some(host) = query::host(&guard.room) {
                    info!(room = %room_id, user = %host.user_id(), "host promoted");
                }
            }
            self.apply_membership(&room_id, &out).await;
        }
        self.publish(&out);
    }

    /// Drops every room and connection binding.
    pub async fn shutdown(&self) {
        let slots: Vec<SharedSlot> = self.rooms.lock().await.drain().map(|(_, s)| s).collect();
        for slot in &slots {
            slot.lock().await.closed = true;
        }
        self.connections.lock().await.clear();
        info!(rooms = slots.len(), "lobby shut down");
    }

    /// Copy of a room's current state.
    pub async fn room(&self, room_id: &RoomId) -> Option<RoomSnapshot> {
        let slot = self.slot(room_id).await?;
        let guard = slot.lock().await;
        if guard.closed {
            return None;
        }
        Some(RoomSnapshot {
            room_id: room_id.clone(),
            difficulty: query::difficulty(&guard.room),
            players: query::players(&guard.room),
        })
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Room a connection was last bound to.
    pub async fn room_of(&self, connection: &ConnectionId) -> Option<RoomId> {
        self.connections.lock().await.get(connection).cloned()
    }

    async fn join(&self, room_id: &RoomId, command: RoomCommand) {
        if let RoomCommand::Join { connection, .. } = &command {
            let previous = self.connections.lock().await.get(connection).cloned();
            if let Some(previous) = previous.filter(|previous| previous != room_id) {
                debug!(
                    connection = %connection,
                    from = %previous,
                    to = %room_id,
                    "connection switching rooms"
                );
                self.disconnect(connection).await;
            }
        }

        let mut out = Vec::new();
        loop {
            let slot = {
                let mut rooms = self.rooms.lock().await;
                let slot = rooms.entry(room_id.clone()).or_insert_with(|| {
                    info!(
                        room = %room_id,
                        difficulty = %self.config.default_difficulty,
                        "room created"
                    );
                    Arc::new(Mutex::new(RoomSlot {
                        room: Room::new(room_id.clone(), self.config.default_difficulty),
                        closed: false,
                    }))
                });
                Arc::clone(slot)
            };

            let mut guard = slot.lock().await;
            if guard.closed {
                debug!(room = %room_id, "joined a room that was just destroyed; retrying");
                continue;
            }
            apply(&mut guard.room, command.clone(), &mut out);
            self.apply_membership(room_id, &out).await;
            break;
        }
        self.publish(&out);
    }

    async fn update_existing(&self, room_id: &RoomId, command: RoomCommand) {
        let Some(slot) = self.slot(room_id).await else {
            debug!(room = %room_id, "command for a room that does not exist");
            return;
        };
        let mut out = Vec::new();
        {
            let mut guard = slot.lock().await;
            if guard.closed {
                return;
            }
            let kick_target = match &command {
                RoomCommand::Kick { target, .. } => Some(target.clone()),
                _ => None,
            };
            apply(&mut guard.room, command, &mut out);
            if let (Some(target), false) = (kick_target, out.is_empty()) {
                info!(room = %room_id, user = %target, "player kicked");
            }
            self.apply_membership(room_id, &out).await;
        }
        self.publish(&out);
    }

    async fn slot(&self, room_id: &RoomId) -> Option<SharedSlot> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    /// Mirrors group changes into the bus and the connection index.
    ///
    /// Runs under the room lock so the bus groups never disagree with room state.
    async fn apply_membership(&self, room_id: &RoomId, out: &[Outbound]) {
        let mut connections = self.connections.lock().await;
        for effect in out {
            match effect {
                Outbound::JoinGroup { connection, .. } => {
                    let _ = connections.insert(connection.clone(), room_id.clone());
                    self.bus.dispatch(effect);
                }
                Outbound::LeaveGroup { connection, .. } => {
                    if connections.get(connection) == Some(room_id) {
                        let _ = connections.remove(connection);
                    }
                    self.bus.dispatch(effect);
                }
                Outbound::Publish { .. } => {}
            }
        }
    }

    fn publish(&self, out: &[Outbound]) {
        for effect in out {
            if let Outbound::Publish { .. } = effect {
                self.bus.dispatch(effect);
            }
        }
    }
}
