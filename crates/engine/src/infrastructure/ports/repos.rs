//! Repository port traits for entity storage.
//!
//! Persistence and caching live outside the engine; these traits are the
//! list-scan and point-lookup reads the perception pipeline needs, plus the
//! one write it performs (owner budgets).

use async_trait::async_trait;
use mudmind_domain::{
    EntityId, Npc, Owner, Profession, ProfessionId, Questmaker, Race, RaceId, Room, RoomId,
};

use super::error::RepoError;

// =============================================================================
// Sentient Entities
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NpcRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Npc>, RepoError>;
    async fn get(&self, id: &EntityId) -> Result<Option<Npc>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnerRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Owner>, RepoError>;
    async fn get(&self, id: &EntityId) -> Result<Option<Owner>, RepoError>;
    async fn save(&self, owner: &Owner) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestmakerRepo: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Questmaker>, RepoError>;
    async fn get(&self, id: &EntityId) -> Result<Option<Questmaker>, RepoError>;
}

// =============================================================================
// Bias Tables
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepo: Send + Sync {
    async fn get(&self, id: &RoomId) -> Result<Option<Room>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RaceRepo: Send + Sync {
    async fn get(&self, id: &RaceId) -> Result<Option<Race>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfessionRepo: Send + Sync {
    async fn get(&self, id: &ProfessionId) -> Result<Option<Profession>, RepoError>;
}
