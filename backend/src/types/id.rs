//! Typed ID wrappers for compile-time type safety.
//!
//! These types wrap UUIDs to prevent accidental mixing of different entity
//! IDs (e.g. passing a deployment id where a project id is expected).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate typed ID wrappers with common trait implementations.
macro_rules! typed_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
        )]
        #[sqlx(transparent)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }
    };
}

// Define all typed IDs
typed_id!(UserId, "Unique identifier for a user.");
typed_id!(SessionTokenId, "Unique identifier for a session token.");
typed_id!(DeploymentTokenId, "Unique identifier for a deployment token.");
typed_id!(ProjectId, "Unique identifier for a project.");
typed_id!(DeploymentId, "Unique identifier for a deployment.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_round_trip() {
        let id = ProjectId::new();
        let parsed: ProjectId = id.to_string().parse().expect("parse id");
        assert_eq!(id, parsed);
    }

    #[test]
    fn serde_uses_plain_uuid_string() {
        let id = DeploymentId::new();
        let json = serde_json::to_string(&id).expect("serialize id");
        assert_eq!(json, format!("\"{}\"", id));
        let back: DeploymentId = serde_json::from_str(&json).expect("deserialize id");
        assert_eq!(id, back);
    }

    #[test]
    fn distinct_id_types_do_not_compare() {
        let uuid = Uuid::new_v4();
        let user = UserId::from_uuid(uuid);
        let project = ProjectId::from_uuid(uuid);
        assert_eq!(*user.as_uuid(), *project.as_uuid());
    }
}
