//! Observers: everything that can perceive a player's action.
//!
//! `Observer` is a closed set. The perception filter and the significance
//! monitor work through `id()`, `kind()`, `reaction_threshold()` and
//! `bias_keys()` and never need to know which concrete entity they hold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entities::{MonitoredAspect, Npc, Owner, Player, Questmaker};
use crate::{EntityId, ObserverId, PlayerId, ProfessionId, RaceId, RoomId};

/// Observer category, also the column key of the base significance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverKind {
    Npc,
    Owner,
    Questmaker,
    Player,
}

impl ObserverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Npc => "npc",
            Self::Owner => "owner",
            Self::Questmaker => "questmaker",
            Self::Player => "player",
        }
    }
}

impl fmt::Display for ObserverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which bias tables apply to an observer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiasKeys {
    pub race: Option<RaceId>,
    pub profession: Option<ProfessionId>,
    pub room: Option<RoomId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "snake_case")]
pub enum Observer {
    Npc(Npc),
    Owner(Owner),
    Questmaker(Questmaker),
    Player(Player),
}

impl Observer {
    pub fn id(&self) -> ObserverId {
        match self {
            Self::Npc(npc) => ObserverId::from(&npc.id),
            Self::Owner(owner) => ObserverId::from(&owner.id),
            Self::Questmaker(questmaker) => ObserverId::from(&questmaker.id),
            Self::Player(player) => ObserverId::from(&player.id),
        }
    }

    pub fn kind(&self) -> ObserverKind {
        match self {
            Self::Npc(_) => ObserverKind::Npc,
            Self::Owner(_) => ObserverKind::Owner,
            Self::Questmaker(_) => ObserverKind::Questmaker,
            Self::Player(_) => ObserverKind::Player,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Npc(npc) => &npc.name,
            Self::Owner(owner) => &owner.name,
            Self::Questmaker(questmaker) => &questmaker.name,
            Self::Player(player) => &player.name,
        }
    }

    /// Players never react, so they have no threshold.
    pub fn reaction_threshold(&self) -> Option<i32> {
        match self {
            Self::Npc(npc) => Some(npc.reaction_threshold),
            Self::Owner(owner) => Some(owner.reaction_threshold),
            Self::Questmaker(questmaker) => Some(questmaker.reaction_threshold),
            Self::Player(_) => None,
        }
    }

    pub fn bias_keys(&self) -> BiasKeys {
        match self {
            Self::Npc(npc) => BiasKeys {
                race: npc.race_id.clone(),
                profession: npc.profession_id.clone(),
                room: Some(npc.current_room_id.clone()),
            },
            Self::Owner(owner) => match owner.monitored_aspect {
                MonitoredAspect::Location => BiasKeys {
                    room: Some(RoomId::new(owner.associated_id.as_str())),
                    ..BiasKeys::default()
                },
                MonitoredAspect::Race => BiasKeys {
                    race: Some(RaceId::new(owner.associated_id.as_str())),
                    ..BiasKeys::default()
                },
                MonitoredAspect::Profession => BiasKeys {
                    profession: Some(ProfessionId::new(owner.associated_id.as_str())),
                    ..BiasKeys::default()
                },
            },
            // Questmakers perceive neutrally.
            Self::Questmaker(_) => BiasKeys::default(),
            Self::Player(player) => BiasKeys {
                race: player.race_id.clone(),
                profession: player.profession_id.clone(),
                room: Some(player.current_room_id.clone()),
            },
        }
    }

    pub fn to_ref(&self) -> ObserverRef {
        ObserverRef {
            id: self.id(),
            kind: self.kind(),
            name: self.name().to_string(),
        }
    }
}

impl From<SentientEntity> for Observer {
    fn from(entity: SentientEntity) -> Self {
        match entity {
            SentientEntity::Npc(npc) => Self::Npc(npc),
            SentientEntity::Owner(owner) => Self::Owner(owner),
            SentientEntity::Questmaker(questmaker) => Self::Questmaker(questmaker),
        }
    }
}

/// Lightweight identity of an observer carried on perceived actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverRef {
    pub id: ObserverId,
    pub kind: ObserverKind,
    pub name: String,
}

/// An entity that can be driven by the LLM in response to what it perceived.
#[derive(Debug, Clone, PartialEq)]
pub enum SentientEntity {
    Npc(Npc),
    Owner(Owner),
    Questmaker(Questmaker),
}

impl SentientEntity {
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Npc(npc) => &npc.id,
            Self::Owner(owner) => &owner.id,
            Self::Questmaker(questmaker) => &questmaker.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Npc(npc) => &npc.name,
            Self::Owner(owner) => &owner.name,
            Self::Questmaker(questmaker) => &questmaker.name,
        }
    }

    pub fn kind(&self) -> ObserverKind {
        match self {
            Self::Npc(_) => ObserverKind::Npc,
            Self::Owner(_) => ObserverKind::Owner,
            Self::Questmaker(_) => ObserverKind::Questmaker,
        }
    }

    /// Personality or standing instructions for the LLM.
    pub fn prompt_context(&self) -> &str {
        match self {
            Self::Npc(npc) => &npc.personality_prompt,
            Self::Owner(owner) => &owner.llm_prompt_context,
            Self::Questmaker(questmaker) => &questmaker.llm_prompt_context,
        }
    }

    pub fn memories_about(&self, player_id: &PlayerId) -> &[String] {
        match self {
            Self::Npc(npc) => npc.memories_about(player_id),
            Self::Owner(owner) => owner.memories_about(player_id),
            Self::Questmaker(_) => &[],
        }
    }
}
