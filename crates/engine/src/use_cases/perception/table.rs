//! A priori significance of (action type, observer kind) pairs.

use std::collections::HashMap;

use mudmind_domain::ObserverKind;

/// Score used when the action type is not in the table at all.
pub const UNKNOWN_ACTION_SIGNIFICANCE: f64 = 0.5;

/// Score used when the action is known but has no entry for the observer kind.
pub const UNSCORED_KIND_SIGNIFICANCE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SignificanceTable {
    scores: HashMap<String, HashMap<ObserverKind, f64>>,
}

impl SignificanceTable {
    pub fn empty() -> Self {
        Self {
            scores: HashMap::new(),
        }
    }

    /// Set or replace the score of one (action, observer kind) pair.
    pub fn with_score(mut self, action_type: impl Into<String>, kind: ObserverKind, score: f64) -> Self {
        self.scores
            .entry(action_type.into())
            .or_default()
            .insert(kind, score);
        self
    }

    /// Register an action type with the same score for every observer kind.
    pub fn with_uniform_score(self, action_type: &str, score: f64) -> Self {
        self.with_scores(action_type, [score; 4])
    }

    /// Register an action type with per-kind scores ordered npc, owner,
    /// questmaker, player.
    pub fn with_scores(mut self, action_type: &str, [npc, owner, questmaker, player]: [f64; 4]) -> Self {
        let row = self.scores.entry(action_type.to_string()).or_default();
        row.insert(ObserverKind::Npc, npc);
        row.insert(ObserverKind::Owner, owner);
        row.insert(ObserverKind::Questmaker, questmaker);
        row.insert(ObserverKind::Player, player);
        self
    }

    /// Register an action type with no per-kind scores.
    pub fn with_action(mut self, action_type: impl Into<String>) -> Self {
        self.scores.entry(action_type.into()).or_default();
        self
    }

    pub fn is_known(&self, action_type: &str) -> bool {
        self.scores.contains_key(action_type)
    }

    pub fn base_significance(&self, action_type: &str, kind: ObserverKind) -> f64 {
        match self.scores.get(action_type) {
            None => UNKNOWN_ACTION_SIGNIFICANCE,
            Some(row) => row.get(&kind).copied().unwrap_or(UNSCORED_KIND_SIGNIFICANCE),
        }
    }
}

impl Default for SignificanceTable {
    fn default() -> Self {
        Self::empty()
            .with_uniform_score("attack", 10.0)
            // Prayer matters to owners, speech to the NPCs being spoken near.
            .with_scores("pray", [2.0, 10.0, 2.0, 5.0])
            .with_scores("say", [10.0, 1.0, 1.0, 5.0])
            .with_scores("talk", [10.0, 1.0, 1.0, 5.0])
            .with_uniform_score("use_skill", 5.0)
            .with_uniform_score("magic_action", 7.0)
            .with_uniform_score("combat_action", 8.0)
            .with_uniform_score("subterfuge_action", 6.0)
            .with_uniform_score("strange_magic", 3.0)
            .with_uniform_score("unclear_action", 0.5)
            .with_uniform_score("tamper_lock", 7.0)
            .with_uniform_score("cast_hostile_spell", 12.0)
            .with_uniform_score("attack_ally", 15.0)
            .with_uniform_score("healing_magic", 4.0)
            .with_uniform_score("arcane_weaving", 6.0)
            .with_uniform_score("disable_trap", 5.0)
            .with_uniform_score("gather_item", 3.0)
            .with_uniform_score("deliver_item", 2.0)
            .with_uniform_score("find_item", 3.0)
            .with_uniform_score("return_item_to_npc", 4.0)
            .with_uniform_score("observe_area", 1.0)
            .with_uniform_score("report_to_npc", 2.0)
            .with_uniform_score("defeat_dummy", 5.0)
    }
}
