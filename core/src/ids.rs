//! Identifier newtypes shared across the arena.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps the provided string as an identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrows the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Reports whether the identifier is empty or only whitespace.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of a single knapsack item within a challenge.
    ItemId
);
string_id!(
    /// Identifier of an authored challenge.
    ChallengeId
);
string_id!(
    /// Identifier of a timed play attempt.
    SessionId
);
string_id!(
    /// Identifier of a registered player account.
    UserId
);
string_id!(
    /// Identifier of a team sharing an attempt.
    TeamId
);
string_id!(
    /// Identifier of a multiplayer room.
    RoomId
);
string_id!(
    /// Opaque handle of a live real-time connection.
    ConnectionId
);

const CHALLENGE_PREFIX: &str = "KSC";
const CHALLENGE_DIGITS: usize = 6;
const SESSION_PREFIX: &str = "TK";
const SESSION_DIGITS: usize = 8;
const ITEM_PREFIX: &str = "ITM";
const ITEM_DIGITS: usize = 8;

impl ChallengeId {
    /// Draws a fresh `KSC-XXXXXX` identifier from the provided generator.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(random_tag(CHALLENGE_PREFIX, CHALLENGE_DIGITS, rng))
    }
}

impl SessionId {
    /// Draws a fresh `TK-XXXXXXXX` identifier from the provided generator.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(random_tag(SESSION_PREFIX, SESSION_DIGITS, rng))
    }
}

impl ItemId {
    /// Draws a fresh `ITM-XXXXXXXX` identifier from the provided generator.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(random_tag(ITEM_PREFIX, ITEM_DIGITS, rng))
    }
}

fn random_tag<R: Rng + ?Sized>(prefix: &str, digits: usize, rng: &mut R) -> String {
    let mut tag = String::with_capacity(prefix.len() + 1 + digits);
    tag.push_str(prefix);
    tag.push('-');
    for _ in 0..digits {
        let nibble = rng.gen_range(0..16u32);
        let digit = char::from_digit(nibble, 16).unwrap_or('0');
        tag.push(digit.to_ascii_uppercase());
    }
    tag
}
