//! Message surface of multiplayer rooms.
//!
//! Connections submit [`RoomCommand`] values, the lobby applies them to the room's
//! authoritative state and answers with [`Outbound`] effects: group membership changes
//! and [`RoomEvent`] publications scoped by [`Delivery`].

use serde::{Deserialize, Serialize};

use crate::{ConnectionId, Difficulty, RoomId, UserId};

/// Commands that express every request a connection can make of a room.
#[derive(Clone, Debug, PartialEq)]
pub enum RoomCommand {
    /// Enters the room, creating it when absent, or refreshes a reconnecting player.
    Join {
        /// Connection issuing the request.
        connection: ConnectionId,
        /// Account joining the room.
        user_id: UserId,
        /// Name shown to other members.
        display_name: String,
        /// Avatar reference shown to other members.
        avatar: String,
    },
    /// Changes the room difficulty; host only.
    SetDifficulty {
        /// Connection issuing the request.
        connection: ConnectionId,
        /// Tier to select.
        difficulty: Difficulty,
    },
    /// Announces the start of a shared game; host only.
    StartGame {
        /// Connection issuing the request.
        connection: ConnectionId,
        /// Tier the game is played at.
        difficulty: Difficulty,
        /// Opaque launch payload, such as the play URL.
        payload: String,
    },
    /// Removes another member from the room; host only.
    Kick {
        /// Connection issuing the request.
        connection: ConnectionId,
        /// Member to remove.
        target: UserId,
    },
    /// Forwards a gameplay notification without touching room state.
    Relay {
        /// Connection issuing the request.
        connection: ConnectionId,
        /// Notification to forward.
        relay: Relay,
    },
    /// Reports that a connection dropped.
    Disconnect {
        /// Connection that went away.
        connection: ConnectionId,
    },
}

impl RoomCommand {
    /// Connection that issued the command.
    #[must_use]
    pub fn connection(&self) -> &ConnectionId {
        match self {
            Self::Join { connection, .. }
            | Self::SetDifficulty { connection, .. }
            | Self::StartGame { connection, .. }
            | Self::Kick { connection, .. }
            | Self::Relay { connection, .. }
            | Self::Disconnect { connection } => connection,
        }
    }
}

/// Gameplay notifications relayed verbatim to other members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Relay {
    /// A player filled in a table cell.
    CellUpdate {
        /// Row of the cell.
        row: u32,
        /// Column of the cell.
        col: u32,
        /// Value the player entered.
        value: u64,
        /// Whether the value matched the table.
        is_correct: bool,
    },
    /// A player lost points on a cell.
    ScoreDeduct {
        /// Row of the cell.
        row: u32,
        /// Column of the cell.
        col: u32,
        /// Signed score change applied by the ledger.
        score_change: i64,
    },
    /// Asks every member to reveal a cell.
    RevealCell,
    /// Tells every member, the sender included, to open the shared game.
    StartSignal,
    /// An item was packed into the shared knapsack.
    ItemAdded {
        /// Item that was packed.
        item_id: String,
    },
    /// An item was taken out of the shared knapsack.
    ItemRemoved {
        /// Client-side element description, forwarded untouched.
        element: serde_json::Value,
        /// Item that was removed.
        item_id: String,
        /// Display name of the item.
        item_name: String,
        /// Value of the item.
        item_value: u32,
        /// Weight of the item.
        item_weight: u32,
    },
    /// The shared knapsack was submitted.
    EndGame {
        /// Weight of the submitted packing.
        total_weight: u64,
        /// Value of the submitted packing.
        total_value: u64,
        /// Whether the submission ends the game.
        is_final: bool,
    },
}

impl Relay {
    /// Whether the sender is left out of the delivery.
    #[must_use]
    pub const fn excludes_sender(&self) -> bool {
        matches!(self, Self::CellUpdate { .. } | Self::ScoreDeduct { .. })
    }

    /// Converts the notification into the event members receive.
    #[must_use]
    pub fn into_event(self) -> RoomEvent {
        match self {
            Self::CellUpdate {
                row,
                col,
                value,
                is_correct,
            } => RoomEvent::CellUpdated {
                row,
                col,
                value,
                is_correct,
            },
            Self::ScoreDeduct {
                row,
                col,
                score_change,
            } => RoomEvent::ScoreDeducted {
                row,
                col,
                score_change,
            },
            Self::RevealCell => RoomEvent::RevealCell,
            Self::StartSignal => RoomEvent::StartSignalled,
            Self::ItemAdded { item_id } => RoomEvent::ItemAdded { item_id },
            Self::ItemRemoved {
                element,
                item_id,
                item_name,
                item_value,
                item_weight,
            } => RoomEvent::ItemRemoved {
                element,
                item_id,
                item_name,
                item_value,
                item_weight,
            },
            Self::EndGame {
                total_weight,
                total_value,
                is_final,
            } => RoomEvent::GameEnded {
                total_weight,
                total_value,
                is_final,
            },
        }
    }
}

/// Public view of a room member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// Account of the member.
    pub user_id: UserId,
    /// Name shown to other members.
    pub display_name: String,
    /// Avatar reference.
    pub avatar: String,
    /// Whether the member hosts the room.
    pub is_host: bool,
    /// Score shown in the lobby.
    pub score: u32,
}

/// Events delivered to connections.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum RoomEvent {
    /// Membership after a join, kick or disconnect.
    PlayersUpdated {
        /// Members in join order.
        players: Vec<PlayerSnapshot>,
    },
    /// Tells a connection whether it hosts the room.
    RoleAssigned {
        /// Host flag of the receiving member.
        is_host: bool,
    },
    /// Current room difficulty.
    DifficultyUpdated {
        /// Selected tier.
        difficulty: Difficulty,
    },
    /// The host launched a game.
    GameStarted {
        /// Room the game belongs to.
        room_id: RoomId,
        /// Tier the game is played at.
        difficulty: Difficulty,
        /// Opaque launch payload.
        payload: String,
    },
    /// The receiving connection was removed by the host.
    KickedFromRoom,
    /// Another member filled in a cell.
    CellUpdated {
        /// Row of the cell.
        row: u32,
        /// Column of the cell.
        col: u32,
        /// Value entered.
        value: u64,
        /// Whether the value matched the table.
        is_correct: bool,
    },
    /// Another member lost points on a cell.
    ScoreDeducted {
        /// Row of the cell.
        row: u32,
        /// Column of the cell.
        col: u32,
        /// Signed score change.
        score_change: i64,
    },
    /// Reveal a cell.
    RevealCell,
    /// Open the shared game; carries no launch details.
    StartSignalled,
    /// An item was packed.
    ItemAdded {
        /// Item that was packed.
        item_id: String,
    },
    /// An item was removed.
    ItemRemoved {
        /// Client-side element description.
        element: serde_json::Value,
        /// Item that was removed.
        item_id: String,
        /// Display name of the item.
        item_name: String,
        /// Value of the item.
        item_value: u32,
        /// Weight of the item.
        item_weight: u32,
    },
    /// The shared knapsack was submitted.
    GameEnded {
        /// Weight of the submitted packing.
        total_weight: u64,
        /// Value of the submitted packing.
        total_value: u64,
        /// Whether the submission ends the game.
        is_final: bool,
    },
}

/// Audience of a published event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// A single connection, either the caller or a directly addressed member.
    Connection(ConnectionId),
    /// Every connection in the room group.
    Group(RoomId),
    /// Every connection in the room group except one.
    OthersInGroup {
        /// Room whose group receives the event.
        room: RoomId,
        /// Connection left out.
        except: ConnectionId,
    },
}

/// Effects the bus must carry out, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Outbound {
    /// Adds a connection to a room group.
    JoinGroup {
        /// Room owning the group.
        room: RoomId,
        /// Connection to add.
        connection: ConnectionId,
    },
    /// Removes a connection from a room group.
    LeaveGroup {
        /// Room owning the group.
        room: RoomId,
        /// Connection to remove.
        connection: ConnectionId,
    },
    /// Publishes an event.
    Publish {
        /// Audience of the event.
        delivery: Delivery,
        /// Event to deliver.
        event: RoomEvent,
    },
}

impl Outbound {
    /// Shorthand for publishing to a single connection.
    #[must_use]
    pub fn to_connection(connection: ConnectionId, event: RoomEvent) -> Self {
        Self::Publish {
            delivery: Delivery::Connection(connection),
            event,
        }
    }

    /// Shorthand for publishing to a whole room group.
    #[must_use]
    pub fn to_group(room: RoomId, event: RoomEvent) -> Self {
        Self::Publish {
            delivery: Delivery::Group(room),
            event,
        }
    }
}
