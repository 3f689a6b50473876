use serde::{Deserialize, Serialize};

use super::PerceptionBiases;
use crate::RaceId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: RaceId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub perception_biases: PerceptionBiases,
}

impl Race {
    pub fn new(id: impl Into<RaceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            perception_biases: PerceptionBiases::new(),
        }
    }

    pub fn with_bias(mut self, key: impl Into<String>, bias: f64) -> Self {
        self.perception_biases.insert(key.into(), bias);
        self
    }
}
