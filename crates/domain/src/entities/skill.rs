use serde::{Deserialize, Serialize};

use crate::SkillId;

/// A skill used as part of an action. The category ("magic", "subterfuge")
/// is what observers without expertise latch on to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub category: String,
}

impl Skill {
    pub fn new(
        id: impl Into<SkillId>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
        }
    }

    /// The category, if one was recorded.
    pub fn category(&self) -> Option<&str> {
        (!self.category.is_empty()).then_some(self.category.as_str())
    }

    /// The display name, if one was recorded.
    pub fn name(&self) -> Option<&str> {
        (!self.name.is_empty()).then_some(self.name.as_str())
    }
}
