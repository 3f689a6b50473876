//! In-memory world storage.
//!
//! Backs every repository port with a `DashMap` so the engine runs without
//! a database. Used by the binary's demo world and by end-to-end tests.

use std::hash::Hash;

use async_trait::async_trait;
use dashmap::DashMap;
use mudmind_domain::{
    EntityId, Npc, Owner, Profession, ProfessionId, Questmaker, Race, RaceId, Room, RoomId,
};

use crate::infrastructure::ports::{
    NpcRepo, OwnerRepo, ProfessionRepo, QuestmakerRepo, RaceRepo, RepoError, RoomRepo,
};

#[derive(Default)]
pub struct InMemoryWorld {
    npcs: DashMap<EntityId, Npc>,
    owners: DashMap<EntityId, Owner>,
    questmakers: DashMap<EntityId, Questmaker>,
    rooms: DashMap<RoomId, Room>,
    races: DashMap<RaceId, Race>,
    professions: DashMap<ProfessionId, Profession>,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_npc(&self, npc: Npc) {
        self.npcs.insert(npc.id.clone(), npc);
    }

    pub fn insert_owner(&self, owner: Owner) {
        self.owners.insert(owner.id.clone(), owner);
    }

    pub fn insert_questmaker(&self, questmaker: Questmaker) {
        self.questmakers.insert(questmaker.id.clone(), questmaker);
    }

    pub fn insert_room(&self, room: Room) {
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn insert_race(&self, race: Race) {
        self.races.insert(race.id.clone(), race);
    }

    pub fn insert_profession(&self, profession: Profession) {
        self.professions.insert(profession.id.clone(), profession);
    }

    /// Current stored state of an owner.
    pub fn owner(&self, id: &EntityId) -> Option<Owner> {
        self.owners.get(id).map(|o| o.value().clone())
    }
}

/// Snapshot sorted by key so scans are stable between calls.
fn sorted_values<K: Ord + Hash + Eq + Clone, V: Clone>(map: &DashMap<K, V>) -> Vec<V> {
    let mut entries: Vec<(K, V)> = map
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().map(|(_, v)| v).collect()
}

#[async_trait]
impl NpcRepo for InMemoryWorld {
    async fn list_all(&self) -> Result<Vec<Npc>, RepoError> {
        Ok(sorted_values(&self.npcs))
    }

    async fn get(&self, id: &EntityId) -> Result<Option<Npc>, RepoError> {
        Ok(self.npcs.get(id).map(|n| n.value().clone()))
    }
}

#[async_trait]
impl OwnerRepo for InMemoryWorld {
    async fn list_all(&self) -> Result<Vec<Owner>, RepoError> {
        Ok(sorted_values(&self.owners))
    }

    async fn get(&self, id: &EntityId) -> Result<Option<Owner>, RepoError> {
        Ok(self.owner(id))
    }

    async fn save(&self, owner: &Owner) -> Result<(), RepoError> {
        self.owners.insert(owner.id.clone(), owner.clone());
        Ok(())
    }
}

#[async_trait]
impl QuestmakerRepo for InMemoryWorld {
    async fn list_all(&self) -> Result<Vec<Questmaker>, RepoError> {
        Ok(sorted_values(&self.questmakers))
    }

    async fn get(&self, id: &EntityId) -> Result<Option<Questmaker>, RepoError> {
        Ok(self.questmakers.get(id).map(|q| q.value().clone()))
    }
}

#[async_trait]
impl RoomRepo for InMemoryWorld {
    async fn get(&self, id: &RoomId) -> Result<Option<Room>, RepoError> {
        Ok(self.rooms.get(id).map(|r| r.value().clone()))
    }
}

#[async_trait]
impl RaceRepo for InMemoryWorld {
    async fn get(&self, id: &RaceId) -> Result<Option<Race>, RepoError> {
        Ok(self.races.get(id).map(|r| r.value().clone()))
    }
}

#[async_trait]
impl ProfessionRepo for InMemoryWorld {
    async fn get(&self, id: &ProfessionId) -> Result<Option<Profession>, RepoError> {
        Ok(self.professions.get(id).map(|p| p.value().clone()))
    }
}
