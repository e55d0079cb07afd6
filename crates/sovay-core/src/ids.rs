//! Branded ID newtypes for type safety.
//!
//! The two identifier kinds in the realtime stack are distinct newtype
//! wrappers around `String`, so a client identifier can never be passed
//! where a subscription token is expected.
//!
//! [`ClientId`] matches the wire convention of the push channel: an opaque
//! `client-{unix_millis}-{hex suffix}` token generated on the client when
//! none is supplied externally. [`SubscriptionId`] is a UUID v7
//! (time-ordered) used to address individual listener registrations.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Opaque per-session token identifying one client on the push channel.
    ClientId
}

branded_id! {
    /// Unique identifier for a listener registration.
    SubscriptionId
}

impl ClientId {
    /// Generate a fresh client token: millisecond timestamp plus a random
    /// hex suffix, e.g. `client-1754460000123-9f3a2c`.
    #[must_use]
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let suffix: u32 = rand::random::<u32>() & 0x00ff_ffff;
        Self(format!("client-{millis}-{suffix:06x}"))
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::generate()
    }
}

impl SubscriptionId {
    /// Create a new random ID (UUID v7, time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
