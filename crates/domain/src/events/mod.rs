//! Game events carried on the in-process event bus.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Player, Skill};
use crate::{EntityId, EventId, ItemId, PlayerId, RoomId};

/// What an action was aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ActionTarget {
    Entity(EntityId),
    Player(PlayerId),
    Item(ItemId),
}

/// An objective record of something a player did.
///
/// Published once and shared behind an `Arc`; subscribers read it
/// concurrently and never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEvent {
    pub id: EventId,
    pub player: Player,
    /// Open vocabulary: "say", "attack", "pray", "tamper_lock", ...
    pub action_type: String,
    pub skill_used: Option<Skill>,
    #[serde(default)]
    pub targets: Vec<ActionTarget>,
    pub room_id: RoomId,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ActionEvent {
    /// An action taken in the player's current room.
    pub fn new(player: Player, action_type: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        let room_id = player.current_room_id.clone();
        Self {
            id: EventId::generate(),
            player,
            action_type: action_type.into(),
            skill_used: None,
            targets: Vec::new(),
            room_id,
            timestamp,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_skill(mut self, skill: Skill) -> Self {
        self.skill_used = Some(skill);
        self
    }

    pub fn with_target(mut self, target: ActionTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn in_room(mut self, room_id: impl Into<RoomId>) -> Self {
        self.room_id = room_id.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The category of the skill used, if a skill with a category was used.
    pub fn skill_category(&self) -> Option<&str> {
        self.skill_used.as_ref().and_then(Skill::category)
    }
}

/// Text addressed to one player, produced by a sentient entity's reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMessage {
    pub player_id: PlayerId,
    pub speaker_id: EntityId,
    /// Already rendered for display.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn frodo() -> Player {
        Player::new("player_frodo", "Frodo", "room_shire")
    }

    #[test]
    fn action_happens_in_player_room_unless_moved() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let here = ActionEvent::new(frodo(), "say", at);
        let shouted = ActionEvent::new(frodo(), "say", at)
            .in_room("room_bree")
            .with_metadata("speech", "Hullo!");

        assert_eq!(here.room_id.as_str(), "room_shire");
        assert!(here.metadata.is_empty());
        assert_eq!(shouted.room_id.as_str(), "room_bree");
        assert_eq!(shouted.player.current_room_id.as_str(), "room_shire");
        assert_eq!(shouted.metadata.get("speech").map(String::as_str), Some("Hullo!"));
    }

    #[test]
    fn targets_and_metadata_default_to_empty() {
        let json = serde_json::json!({
            "id": "evt_1",
            "player": serde_json::to_value(frodo()).unwrap(),
            "actionType": "wave",
            "skillUsed": null,
            "roomId": "room_shire",
            "timestamp": "2024-03-01T12:00:00Z",
        });

        let event: ActionEvent = serde_json::from_value(json).unwrap();

        assert!(event.targets.is_empty());
        assert!(event.metadata.is_empty());
        assert_eq!(event.action_type, "wave");
    }
}
