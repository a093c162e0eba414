//! Strongly-typed identifier types for the IELTS practice domain.
//!
//! Every entity gets its own identifier type so that, for example, a sound id can
//! never be passed where a section id is expected. All IDs use UUID v7 for
//! time-ordering and distributed generation.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new ID with a time-ordered UUID v7
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create an ID from an existing UUID
            #[inline]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get a reference to the underlying UUID
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Convert to the underlying UUID
            #[inline]
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
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

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(AccountId, "Unique identifier for user accounts");

define_id!(TestId, "Unique identifier for authored (public) tests");

define_id!(UserTestId, "Unique identifier for user-assembled (private) tests");

define_id!(
    UserTestDetailId,
    "Unique identifier for a section selected into a user test"
);

define_id!(
    SectionId,
    "Unique identifier for reading and listening sections"
);

define_id!(SoundId, "Unique identifier for audio tracks");

define_id!(QuestionListId, "Unique identifier for question lists");

define_id!(QuestionId, "Unique identifier for questions");

define_id!(ExplanationId, "Unique identifier for answer explanations");

define_id!(ResultId, "Unique identifier for completed test attempts");

define_id!(ResultDetailId, "Unique identifier for per-question outcomes");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = TestId::new();
        assert_ne!(id.to_string(), "");
    }

    #[test]
    fn test_id_equality() {
        let uuid = Uuid::now_v7();
        let id1 = SectionId::from_uuid(uuid);
        let id2 = SectionId::from_uuid(uuid);
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_id_from_string() {
        let id1 = ResultId::new();
        let s = id1.to_string();
        let id2: ResultId = s.parse().unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_id_serialization() {
        let id = AccountId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
