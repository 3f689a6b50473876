//! Perception filter - turns an objective action into one observer's reading
//! of it.
//!
//! Clarity starts at 1.0 and is shifted by the observer's bias tables, applied
//! in a fixed order: racial, territorial (room), professional. Each table can
//! contribute twice: once for the action type and once for the category of
//! the skill used. The result is clamped to [0, 1] and decides how precisely
//! the observer names what it saw.

mod table;

use std::sync::Arc;

use mudmind_domain::{
    ActionEvent, BiasKeys, Observer, ObserverId, ObserverKind, PerceivedAction, PerceptionBiases,
    UNCLEAR_ACTION,
};

use crate::infrastructure::ports::{ProfessionRepo, RaceRepo, RepoError, RoomRepo};

pub use table::{SignificanceTable, UNKNOWN_ACTION_SIGNIFICANCE, UNSCORED_KIND_SIGNIFICANCE};

/// Above this clarity the observer recognises the exact action or skill.
const HIGH_CLARITY: f64 = 0.9;
/// Above this clarity the observer recognises the general kind of action.
const MODERATE_CLARITY: f64 = 0.5;

/// Bias tables resolved for one observer, in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasSources {
    pub racial: Option<PerceptionBiases>,
    pub territorial: Option<PerceptionBiases>,
    pub professional: Option<PerceptionBiases>,
}

impl BiasSources {
    fn in_order(&self) -> [Option<&PerceptionBiases>; 3] {
        [
            self.racial.as_ref(),
            self.territorial.as_ref(),
            self.professional.as_ref(),
        ]
    }
}

pub struct PerceptionFilter {
    rooms: Arc<dyn RoomRepo>,
    races: Arc<dyn RaceRepo>,
    professions: Arc<dyn ProfessionRepo>,
    table: SignificanceTable,
}

impl PerceptionFilter {
    pub fn new(
        rooms: Arc<dyn RoomRepo>,
        races: Arc<dyn RaceRepo>,
        professions: Arc<dyn ProfessionRepo>,
    ) -> Self {
        Self {
            rooms,
            races,
            professions,
            table: SignificanceTable::default(),
        }
    }

    pub fn with_table(mut self, table: SignificanceTable) -> Self {
        self.table = table;
        self
    }

    pub fn table(&self) -> &SignificanceTable {
        &self.table
    }

    /// Interpret `event` from `observer`'s point of view.
    ///
    /// Fails only when a bias table lookup fails; a table that simply does
    /// not exist contributes no bias.
    pub async fn filter(
        &self,
        event: &ActionEvent,
        observer: &Observer,
    ) -> Result<PerceivedAction, PerceptionError> {
        let sources = self
            .fetch_biases(&observer.bias_keys(), observer)
            .await?;
        Ok(self.interpret(event, observer, &sources))
    }

    /// The pure part of `filter`: same inputs, same result.
    pub fn interpret(
        &self,
        event: &ActionEvent,
        observer: &Observer,
        sources: &BiasSources,
    ) -> PerceivedAction {
        let clarity = clarity(event, sources);

        PerceivedAction {
            observer: observer.to_ref(),
            source_player: Some(event.player.clone()),
            target: event.targets.first().cloned(),
            perceived_action_type: self.perceived_action_type(event, clarity),
            clarity,
            apparent_skill_level: (clarity * 100.0).floor() as u32,
            is_criminal: false,
            base_significance: self
                .table
                .base_significance(&event.action_type, observer.kind()),
            timestamp: event.timestamp,
        }
    }

    fn perceived_action_type(&self, event: &ActionEvent, clarity: f64) -> String {
        let skill_name = event.skill_used.as_ref().and_then(|s| s.name());
        let category = event.skill_category();
        let known_action = self.table.is_known(&event.action_type);

        if clarity > HIGH_CLARITY {
            if let Some(name) = skill_name {
                return name.to_string();
            }
            if known_action {
                return event.action_type.clone();
            }
        } else if clarity > MODERATE_CLARITY {
            if let Some(category) = category {
                return format!("{category}_action");
            }
            if known_action {
                return format!("{}_general", event.action_type);
            }
        } else if let Some(category) = category {
            return format!("strange_{category}");
        }

        UNCLEAR_ACTION.to_string()
    }

    async fn fetch_biases(
        &self,
        keys: &BiasKeys,
        observer: &Observer,
    ) -> Result<BiasSources, PerceptionError> {
        let mut sources = BiasSources::default();

        if let Some(race_id) = keys.race.as_ref().filter(|id| !id.is_empty()) {
            let race = self
                .races
                .get(race_id)
                .await
                .map_err(|e| PerceptionError::lookup("race", race_id, observer, e))?;
            sources.racial = race.map(|r| r.perception_biases);
        }

        if let Some(room_id) = keys.room.as_ref().filter(|id| !id.is_empty()) {
            let room = self
                .rooms
                .get(room_id)
                .await
                .map_err(|e| PerceptionError::lookup("room", room_id, observer, e))?;
            sources.territorial = room.map(|r| r.perception_biases);
        }

        if let Some(profession_id) = keys.profession.as_ref().filter(|id| !id.is_empty()) {
            let profession = self
                .professions
                .get(profession_id)
                .await
                .map_err(|e| PerceptionError::lookup("profession", profession_id, observer, e))?;
            sources.professional = profession.map(|p| p.perception_biases);
        }

        Ok(sources)
    }
}

/// Clarity of `event` through `sources`, clamped to [0, 1].
pub fn clarity(event: &ActionEvent, sources: &BiasSources) -> f64 {
    let category = event.skill_category();
    let mut clarity = 1.0;

    for biases in sources.in_order().into_iter().flatten() {
        let keys = std::iter::once(event.action_type.as_str()).chain(category);
        for (key, bias) in keys.filter_map(|key| biases.get(key).map(|bias| (key, *bias))) {
            // NaN or infinite entries would poison the sum.
            if !bias.is_finite() {
                tracing::warn!(bias_key = key, bias, "Ignoring non-finite perception bias");
                continue;
            }
            clarity += bias;
        }
    }

    clarity.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PerceptionError {
    #[error("Failed to get {source_kind} '{id}' for {observer_kind} {observer_id}: {source}")]
    Lookup {
        source_kind: &'static str,
        id: String,
        observer_kind: ObserverKind,
        observer_id: ObserverId,
        source: RepoError,
    },
}

impl PerceptionError {
    fn lookup(
        source_kind: &'static str,
        id: impl ToString,
        observer: &Observer,
        source: RepoError,
    ) -> Self {
        Self::Lookup {
            source_kind,
            id: id.to_string(),
            observer_kind: observer.kind(),
            observer_id: observer.id(),
            source,
        }
    }
}
