//! Room fan-out over per-connection tokio channels.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use knapsack_arena_core::{ConnectionId, Delivery, RoomBus, RoomEvent, RoomId};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{trace, warn};

/// [`RoomBus`] delivering events to in-process receivers.
///
/// Group members are kept in the order they were added.
#[derive(Debug, Default)]
pub struct ChannelBus {
    connections: Mutex<HashMap<ConnectionId, UnboundedSender<RoomEvent>>>,
    groups: Mutex<HashMap<RoomId, Vec<ConnectionId>>>,
}

impl ChannelBus {
    /// Creates a bus without connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns the stream of events addressed to it.
    ///
    /// Connecting the same handle again replaces the previous stream.
    pub fn connect(&self, connection: ConnectionId) -> UnboundedReceiver<RoomEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let _ = self
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(connection, sender);
        receiver
    }

    /// Forgets a connection; events addressed to it are dropped from now on.
    pub fn disconnect(&self, connection: &ConnectionId) {
        let _ = self
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(connection);
    }

    /// Connections currently in a room group.
    #[must_use]
    pub fn members(&self, room: &RoomId) -> Vec<ConnectionId> {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room)
            .cloned()
            .unwrap_or_default()
    }

    fn audience(&self, delivery: &Delivery) -> Vec<ConnectionId> {
        match delivery {
            Delivery::Connection(connection) => vec![connection.clone()],
            Delivery::Group(room) => self.members(room),
            Delivery::OthersInGroup { room, except } => self
                .members(room)
                .into_iter()
                .filter(|member| member != except)
                .collect(),
        }
    }
}

impl RoomBus for ChannelBus {
    fn add_to_group(&self, room: &RoomId, connection: &ConnectionId) {
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        let members = groups.entry(room.clone()).or_default();
        if !members.contains(connection) {
            members.push(connection.clone());
        }
    }

    fn remove_from_group(&self, room: &RoomId, connection: &ConnectionId) {
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(members) = groups.get_mut(room) {
            members.retain(|member| member != connection);
            if members.is_empty() {
                let _ = groups.remove(room);
            }
        }
    }

    fn publish(&self, delivery: &Delivery, event: &RoomEvent) {
        let audience = self.audience(delivery);
        let connections = self
            .connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for connection in audience {
            match connections.get(&connection) {
                Some(sender) => {
                    if sender.send(event.clone()).is_err() {
                        warn!(connection = %connection, "receiver dropped; event discarded");
                    }
                }
                None => trace!(connection = %connection, "no live connection; event discarded"),
            }
        }
    }
}

/// Takes every event already queued on a receiver.
pub fn drain(receiver: &mut UnboundedReceiver<RoomEvent>) -> Vec<RoomEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
