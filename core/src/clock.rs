//! Server-side wall clock.

use chrono::{DateTime, Utc};

/// Source of the current UTC instant; client timestamps are never consulted.
pub trait Clock: Send + Sync {
    /// Reads the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
