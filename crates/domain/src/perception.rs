//! Subjective interpretations of action events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Player;
use crate::events::ActionTarget;
use crate::observer::ObserverRef;

/// Fallback interpretation when an observer cannot make sense of an action.
pub const UNCLEAR_ACTION: &str = "unclear_action";

/// One observer's reading of one action event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerceivedAction {
    pub observer: ObserverRef,
    /// The acting player. Always set by the perception filter; a record
    /// without one cannot be reacted to.
    pub source_player: Option<Player>,
    pub target: Option<ActionTarget>,
    /// The observer's understanding, e.g. "Fireball", "magic_action",
    /// "strange_magic".
    pub perceived_action_type: String,
    /// 0.0 (not at all) to 1.0 (perfectly).
    pub clarity: f64,
    /// The observer's guess at how skilfully the action was performed (0-100).
    pub apparent_skill_level: u32,
    /// Always false; legality rules are not modelled.
    pub is_criminal: bool,
    pub base_significance: f64,
    pub timestamp: DateTime<Utc>,
}

impl PerceivedAction {
    /// `base_significance × clarity`, the unit accumulated per observation.
    pub fn significance(&self) -> f64 {
        self.base_significance * self.clarity
    }
}

/// A perceived action held in an observation buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerceivedActionRecord {
    pub perceived_action: PerceivedAction,
    pub significance: f64,
    pub timestamp: DateTime<Utc>,
}

impl PerceivedActionRecord {
    pub fn new(perceived_action: PerceivedAction, recorded_at: DateTime<Utc>) -> Self {
        let significance = perceived_action.significance();
        Self {
            perceived_action,
            significance,
            timestamp: recorded_at,
        }
    }
}
