use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{EntityId, PlayerId, ProfessionId, RaceId, RoomId};

/// A non-player character that perceives actions in its current room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub current_room_id: RoomId,
    pub race_id: Option<RaceId>,
    pub profession_id: Option<ProfessionId>,
    /// Cumulative significance needed before this NPC reacts.
    pub reaction_threshold: i32,
    pub personality_prompt: String,
    #[serde(default)]
    pub memories_about_players: HashMap<PlayerId, Vec<String>>,
}

impl Npc {
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        current_room_id: impl Into<RoomId>,
        reaction_threshold: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            current_room_id: current_room_id.into(),
            race_id: None,
            profession_id: None,
            reaction_threshold,
            personality_prompt: String::new(),
            memories_about_players: HashMap::new(),
        }
    }

    pub fn with_race(mut self, race_id: impl Into<RaceId>) -> Self {
        self.race_id = Some(race_id.into());
        self
    }

    pub fn with_profession(mut self, profession_id: impl Into<ProfessionId>) -> Self {
        self.profession_id = Some(profession_id.into());
        self
    }

    pub fn with_personality(mut self, prompt: impl Into<String>) -> Self {
        self.personality_prompt = prompt.into();
        self
    }

    pub fn memories_about(&self, player_id: &PlayerId) -> &[String] {
        self.memories_about_players
            .get(player_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
