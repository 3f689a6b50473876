use serde::{Deserialize, Serialize};

use crate::{PlayerId, ProfessionId, RaceId, RoomId};

/// The acting player as seen by the perception pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub race_id: Option<RaceId>,
    pub profession_id: Option<ProfessionId>,
    pub current_room_id: RoomId,
}

impl Player {
    pub fn new(
        id: impl Into<PlayerId>,
        name: impl Into<String>,
        current_room_id: impl Into<RoomId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            race_id: None,
            profession_id: None,
            current_room_id: current_room_id.into(),
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

    pub fn has_race(&self, race_id: &str) -> bool {
        self.race_id.as_ref().is_some_and(|r| r.as_str() == race_id)
    }

    pub fn has_profession(&self, profession_id: &str) -> bool {
        self.profession_id
            .as_ref()
            .is_some_and(|p| p.as_str() == profession_id)
    }
}
