use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Player;
use crate::{DomainError, EntityId, PlayerId, RoomId};

/// What an owner watches over. Paired with `Owner::associated_id`, which is a
/// room, race or profession id depending on the aspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoredAspect {
    Location,
    Race,
    Profession,
}

impl MonitoredAspect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Race => "race",
            Self::Profession => "profession",
        }
    }

    /// Race and profession owners watch players wherever they are.
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Race | Self::Profession)
    }
}

impl fmt::Display for MonitoredAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MonitoredAspect {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location" => Ok(Self::Location),
            "race" => Ok(Self::Race),
            "profession" => Ok(Self::Profession),
            other => Err(DomainError::parse(format!("unknown monitored aspect '{other}'"))),
        }
    }
}

/// An LLM-driven world guardian for a location, race or profession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub monitored_aspect: MonitoredAspect,
    pub associated_id: String,
    pub llm_prompt_context: String,
    #[serde(default)]
    pub memories_about_players: HashMap<PlayerId, Vec<String>>,
    pub current_influence_budget: f64,
    pub max_influence_budget: f64,
    pub budget_regen_rate: f64,
    pub reaction_threshold: i32,
}

impl Owner {
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        monitored_aspect: MonitoredAspect,
        associated_id: impl Into<String>,
        reaction_threshold: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            monitored_aspect,
            associated_id: associated_id.into(),
            llm_prompt_context: String::new(),
            memories_about_players: HashMap::new(),
            current_influence_budget: 0.0,
            max_influence_budget: 0.0,
            budget_regen_rate: 0.0,
            reaction_threshold,
        }
    }

    pub fn with_budget(mut self, current: f64, max: f64) -> Self {
        self.max_influence_budget = max.max(0.0);
        self.current_influence_budget = current.clamp(0.0, self.max_influence_budget);
        self
    }

    pub fn with_prompt_context(mut self, context: impl Into<String>) -> Self {
        self.llm_prompt_context = context.into();
        self
    }

    /// Adds `amount` to the influence budget, keeping it within `[0, max]`.
    /// Returns the new budget.
    pub fn accrue_influence(&mut self, amount: f64) -> f64 {
        let max = self.max_influence_budget.max(0.0);
        self.current_influence_budget = (self.current_influence_budget + amount).clamp(0.0, max);
        self.current_influence_budget
    }

    /// Location owners watch the room named by `associated_id`.
    pub fn watches_room(&self, room_id: &RoomId) -> bool {
        self.monitored_aspect == MonitoredAspect::Location && self.associated_id == room_id.as_str()
    }

    /// Race and profession owners watch every player of their race or
    /// profession.
    pub fn watches_player(&self, player: &Player) -> bool {
        match self.monitored_aspect {
            MonitoredAspect::Race => player.has_race(&self.associated_id),
            MonitoredAspect::Profession => player.has_profession(&self.associated_id),
            MonitoredAspect::Location => false,
        }
    }

    pub fn memories_about(&self, player_id: &PlayerId) -> &[String] {
        self.memories_about_players
            .get(player_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
