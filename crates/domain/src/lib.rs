//! MudMind domain types.
//!
//! Entities that can observe players (NPCs, owners, questmakers), the
//! objective `ActionEvent`, and the subjective `PerceivedAction` derived from
//! it. No I/O happens here.

pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod observer;
pub mod perception;

pub use entities::{
    MonitoredAspect, Npc, Owner, PerceptionBiases, Player, Profession, Questmaker, Race, Room,
    Skill,
};
pub use error::DomainError;
pub use events::{ActionEvent, ActionTarget, PlayerMessage};
pub use ids::*;
pub use observer::{BiasKeys, Observer, ObserverKind, ObserverRef, SentientEntity};
pub use perception::{PerceivedAction, PerceivedActionRecord, UNCLEAR_ACTION};
