//! Bidirectional pub/sub transport used by rooms.

use crate::{ConnectionId, Delivery, Outbound, RoomEvent, RoomId};

/// Group-membership and fan-out primitives of the real-time transport.
///
/// Every call is fire-and-forget: transports log delivery failures instead of
/// reporting them, and no ordering is promised between publishes issued by
/// different rooms or connections.
pub trait RoomBus: Send + Sync {
    /// Adds a connection to a room group.
    fn add_to_group(&self, room: &RoomId, connection: &ConnectionId);

    /// Removes a connection from a room group.
    fn remove_from_group(&self, room: &RoomId, connection: &ConnectionId);

    /// Delivers an event to its audience.
    fn publish(&self, delivery: &Delivery, event: &RoomEvent);

    /// Carries out a single effect produced by a room.
    fn dispatch(&self, outbound: &Outbound) {
        match outbound {
            Outbound::JoinGroup { room, connection } => self.add_to_group(room, connection),
            Outbound::LeaveGroup { room, connection } => self.remove_from_group(room, connection),
            Outbound::Publish { delivery, event } => self.publish(delivery, event),
        }
    }
}
