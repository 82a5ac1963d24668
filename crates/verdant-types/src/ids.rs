//! Type-safe identifier wrappers.
//!
//! Generated identifiers (sessions, offset purchases, challenges) wrap a
//! UUID v7. Version 7 UUIDs embed a millisecond timestamp followed by 74
//! random bits, so they are unique across processes without coordination
//! and sort by creation time.
//!
//! [`UserId`] is different: users are named by the caller (an account
//! handle, an email hash, a test fixture like `"u1"`), so it wraps a
//! `String` and is never generated here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Declares a time-ordered identifier: a [`Uuid`] v7 newtype
/// that parses from and prints as the hyphenated form and can report when
/// it was minted.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh identifier stamped with the current time.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// The wrapped [`Uuid`].
            pub const fn into_inner(self) -> Uuid {
                self.0
            }

            /// Millisecond timestamp embedded at minting, if this is a v7 id.
            pub fn created_at(&self) -> Option<DateTime<Utc>> {
                let (secs, nanos) = self.0.get_timestamp()?.to_unix();
                DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

define_id! {
    /// Unique identifier for one recorded session in a user's activity log.
    SessionId
}

define_id! {
    /// Unique identifier for a carbon offset purchase.
    PurchaseId
}

define_id! {
    /// Unique identifier for a community challenge.
    ChallengeId
}

define_id! {
    /// Unique identifier for a drafted policy letter.
    LetterId
}

/// Caller-supplied identifier for a user whose impact is being tracked.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserId(pub String);

impl UserId {
    /// Create a user identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn user_id_serializes_as_plain_string() {
        let id = UserId::from("u1");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"u1\""));
    }

    #[test]
    fn ids_parse_back_and_carry_mint_time() {
        let before = Utc::now();
        let id = LetterId::new();
        let parsed = format!(" {id} ").parse::<LetterId>().ok();
        assert_eq!(parsed, Some(id));
        assert!("not-a-uuid".parse::<LetterId>().is_err());

        let minted = id.created_at();
        assert!(minted.is_some_and(|t| t.timestamp_millis() >= before.timestamp_millis()));
        assert_eq!(PurchaseId::from(Uuid::nil()).created_at(), None);
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = ChallengeId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
