use serde::{Deserialize, Serialize};

use super::PerceptionBiases;
use crate::ProfessionId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profession {
    pub id: ProfessionId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub perception_biases: PerceptionBiases,
}

impl Profession {
    pub fn new(id: impl Into<ProfessionId>, name: impl Into<String>) -> Self {
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
