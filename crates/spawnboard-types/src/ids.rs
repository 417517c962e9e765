//! Identifier types for the Spawnboard dashboard.
//!
//! Timer rows carry a UUID v7 identifier generated app-side on first insert.
//! Tracked resources are keyed by a short slug ([`ResourceKey`]) that is the
//! upsert key for every store mutation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Maximum length of a resource key, in bytes.
pub const MAX_RESOURCE_KEY_LEN: usize = 64;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
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
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a spawn timer row.
    TimerId
}

/// Error returned when a string is not a valid [`ResourceKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resource key {key:?}: expected 1-64 characters of [a-z0-9_-]")]
pub struct InvalidResourceKey {
    /// The rejected input.
    pub key: String,
}

/// Slug identifying a tracked resource (e.g. `iron_vein`).
///
/// Keys are lowercase ASCII letters, digits, `_` and `-`. Use
/// [`ResourceKey::parse`] at trust boundaries; deserialized keys are
/// re-checked when the configuration is validated.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Parse and validate a resource key.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidResourceKey`] if the input is empty, too long, or
    /// contains characters outside `[a-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, InvalidResourceKey> {
        if is_valid_key(raw) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(InvalidResourceKey {
                key: raw.to_owned(),
            })
        }
    }

    /// Whether this key satisfies the slug rules.
    ///
    /// Always true for keys built with [`ResourceKey::parse`].
    pub fn is_valid(&self) -> bool {
        is_valid_key(&self.0)
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_valid_key(raw: &str) -> bool {
    !raw.is_empty()
        && raw.len() <= MAX_RESOURCE_KEY_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_id_display_matches_uuid() {
        let id = TimerId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
        assert_ne!(id.into_inner(), Uuid::nil());
    }

    #[test]
    fn resource_key_accepts_slugs() {
        for raw in ["iron_vein", "boss-1", "a", "x9"] {
            let key = ResourceKey::parse(raw);
            assert!(key.is_ok(), "{raw} should be accepted");
        }
    }

    #[test]
    fn resource_key_rejects_bad_input() {
        let too_long = "a".repeat(MAX_RESOURCE_KEY_LEN.saturating_add(1));
        for raw in ["", "Iron", "has space", "slash/key", "ümlaut", too_long.as_str()] {
            assert!(ResourceKey::parse(raw).is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn resource_key_serializes_as_plain_string() {
        let key = ResourceKey::parse("dragon_nest").ok();
        let json = serde_json::to_string(&key).ok();
        assert_eq!(json.as_deref(), Some("\"dragon_nest\""));
    }

    #[test]
    fn deserialized_key_can_be_rechecked() {
        let key: Result<ResourceKey, _> = serde_json::from_str("\"Not A Slug\"");
        assert!(key.is_ok());
        assert!(!key.map(|k| k.is_valid()).unwrap_or(true));
    }
}
