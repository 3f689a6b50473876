use serde::{Deserialize, Serialize};

use super::PerceptionBiases;
use crate::{EntityId, RoomId};

/// A location. Its biases are territorial: they apply to anyone perceiving
/// from inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub owner_id: Option<EntityId>,
    #[serde(default)]
    pub perception_biases: PerceptionBiases,
}

impl Room {
    pub fn new(id: impl Into<RoomId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            owner_id: None,
            perception_biases: PerceptionBiases::new(),
        }
    }

    pub fn with_bias(mut self, key: impl Into<String>, bias: f64) -> Self {
        self.perception_biases.insert(key.into(), bias);
        self
    }
}
