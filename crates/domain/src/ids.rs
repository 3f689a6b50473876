use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// String-backed identifier newtype.
///
/// Game data is authored by hand (`"npc_guard"`, `"room_shire"`), so ids are
/// opaque strings rather than UUIDs. `generate()` is there for ids minted at
/// runtime, such as action events.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Sentient entities (NPCs, owners, questmakers) share one id space: a
// reaction resolves its entity by trying each store in turn.
define_id!(EntityId);
define_id!(PlayerId);

// World data
define_id!(RoomId);
define_id!(RaceId);
define_id!(ProfessionId);
define_id!(SkillId);
define_id!(ItemId);

// Anything that can perceive: a sentient entity or a player.
define_id!(ObserverId);

// Runtime
define_id!(EventId);

impl From<&EntityId> for ObserverId {
    fn from(value: &EntityId) -> Self {
        Self(value.0.clone())
    }
}

impl From<&PlayerId> for ObserverId {
    fn from(value: &PlayerId) -> Self {
        Self(value.0.clone())
    }
}

impl From<&ObserverId> for EntityId {
    fn from(value: &ObserverId) -> Self {
        Self(value.0.clone())
    }
}
