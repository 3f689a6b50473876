//! Entities the perception pipeline reads.
//!
//! Storage for these lives behind repository ports in the engine; the domain
//! only describes their shape and the few invariants they own (the owner's
//! influence budget).

mod npc;
mod owner;
mod player;
mod profession;
mod questmaker;
mod race;
mod room;
mod skill;

use std::collections::HashMap;

pub use npc::Npc;
pub use owner::{MonitoredAspect, Owner};
pub use player::Player;
pub use profession::Profession;
pub use questmaker::Questmaker;
pub use race::Race;
pub use room::Room;
pub use skill::Skill;

/// Additive clarity modifiers keyed by action type or skill category,
/// e.g. `{"magic_action": -0.2, "pray": 0.1}`.
pub type PerceptionBiases = HashMap<String, f64>;
