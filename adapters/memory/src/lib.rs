#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-process adapters for the Knapsack Arena.
//!
//! The stores keep records in memory and can be switched offline to exercise the
//! unavailability path. [`ChannelBus`] delivers room events over unbounded tokio
//! channels, one per connection, and [`ManualClock`] lets tests move time by hand.

mod bus;
mod challenges;
mod clock;
mod identity;
mod sessions;

use std::sync::atomic::{AtomicBool, Ordering};

use knapsack_arena_core::StoreError;

pub use bus::{drain, ChannelBus};
pub use challenges::MemoryChallengeStore;
pub use clock::ManualClock;
pub use identity::MemoryIdentityStore;
pub use sessions::MemorySessionStore;

/// Switch shared by the stores to simulate an outage.
#[derive(Debug, Default)]
struct Availability {
    offline: AtomicBool,
}

impl Availability {
    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check(&self, store: &str) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::unavailable(format!("{store} is offline")))
        } else {
            Ok(())
        }
    }
}
