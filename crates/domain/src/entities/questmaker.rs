use serde::{Deserialize, Serialize};

use crate::EntityId;

/// An LLM-driven quest controller. Questmakers are not tied to a place and
/// observe every action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questmaker {
    pub id: EntityId,
    pub name: String,
    pub llm_prompt_context: String,
    pub reaction_threshold: i32,
}

impl Questmaker {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, reaction_threshold: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            llm_prompt_context: String::new(),
            reaction_threshold,
        }
    }

    pub fn with_prompt_context(mut self, context: impl Into<String>) -> Self {
        self.llm_prompt_context = context.into();
        self
    }
}
