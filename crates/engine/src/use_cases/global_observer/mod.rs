//! Global observer manager.
//!
//! Race and profession owners watch their players everywhere. Each action by
//! a matching player accrues influence into the owner's budget, with no
//! buffering and no reaction threshold.
//!
//! Accruals run as spawned units bounded by a semaphore. Units for the same
//! owner are serialized and re-read the owner inside the critical section,
//! so concurrent accruals add up instead of overwriting each other.

use std::sync::Arc;

use dashmap::DashMap;
use mudmind_domain::{ActionEvent, EntityId, Observer, Owner};
use tokio::sync::{Mutex, Semaphore};
use tokio_util::task::TaskTracker;

use crate::infrastructure::event_bus::{GameEvent, MailboxReceiver};
use crate::infrastructure::ports::{OwnerRepo, RepoError};
use crate::use_cases::perception::{PerceptionError, PerceptionFilter};

/// Default bound on accrual units in flight.
pub const DEFAULT_MAX_CONCURRENT_ACCRUALS: usize = 16;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AccrualError {
    #[error(transparent)]
    Perception(#[from] PerceptionError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct GlobalObserverManager {
    owners: Arc<dyn OwnerRepo>,
    filter: Arc<PerceptionFilter>,
    permits: Arc<Semaphore>,
    owner_locks: DashMap<EntityId, Arc<Mutex<()>>>,
    tasks: TaskTracker,
}

impl GlobalObserverManager {
    pub fn new(owners: Arc<dyn OwnerRepo>, filter: Arc<PerceptionFilter>) -> Self {
        Self::with_max_concurrency(owners, filter, DEFAULT_MAX_CONCURRENT_ACCRUALS)
    }

    pub fn with_max_concurrency(
        owners: Arc<dyn OwnerRepo>,
        filter: Arc<PerceptionFilter>,
        max_concurrent_accruals: usize,
    ) -> Self {
        Self {
            owners,
            filter,
            permits: Arc::new(Semaphore::new(max_concurrent_accruals.max(1))),
            owner_locks: DashMap::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// Spawn an accrual unit for every global owner watching the acting
    /// player. Returns the number of units spawned.
    pub async fn handle_action_event(
        self: &Arc<Self>,
        event: Arc<ActionEvent>,
    ) -> Result<usize, RepoError> {
        let owners = self.owners.list_all().await?;
        let mut spawned = 0;

        for owner in owners
            .into_iter()
            .filter(|o| o.monitored_aspect.is_global() && o.watches_player(&event.player))
        {
            let manager = Arc::clone(self);
            let event = Arc::clone(&event);
            spawned += 1;

            self.tasks.spawn(async move {
                let Ok(_permit) = Arc::clone(&manager.permits).acquire_owned().await else {
                    tracing::warn!(owner_id = %owner.id, "Accrual permits closed, skipping");
                    return;
                };
                let owner_id = owner.id.clone();
                match manager.accrue(&event, owner).await {
                    Ok(_) => {}
                    Err(AccrualError::Repo(e)) if e.is_not_found() => tracing::debug!(
                        owner_id = %owner_id,
                        "Owner removed before accrual, skipping"
                    ),
                    Err(e) => tracing::warn!(
                        error = %e,
                        owner_id = %owner_id,
                        player_id = %event.player.id,
                        "Influence accrual failed"
                    ),
                }
            });
        }

        Ok(spawned)
    }

    /// Perceive `event` as `owner` and add its significance to the owner's
    /// stored budget. Returns the new budget.
    pub async fn accrue(&self, event: &ActionEvent, owner: Owner) -> Result<f64, AccrualError> {
        let perceived = self.filter.filter(event, &Observer::Owner(owner.clone())).await?;
        let significance = perceived.significance();

        let lock = self.owner_lock(&owner.id);
        let _guard = lock.lock().await;

        let mut current = self
            .owners
            .get(&owner.id)
            .await?
            .ok_or_else(|| RepoError::not_found("Owner", &owner.id))?;
        let budget = current.accrue_influence(significance);
        self.owners.save(&current).await?;

        tracing::info!(
            owner_id = %current.id,
            player_id = %event.player.id,
            action_type = %event.action_type,
            significance,
            budget,
            max_budget = current.max_influence_budget,
            "Accrued influence"
        );

        Ok(budget)
    }

    fn owner_lock(&self, owner_id: &EntityId) -> Arc<Mutex<()>> {
        Arc::clone(self.owner_locks.entry(owner_id.clone()).or_default().value())
    }

    /// Consume action events until the mailbox closes.
    pub async fn run(self: Arc<Self>, mut mailbox: MailboxReceiver) {
        tracing::info!("Global observer manager started");

        while let Some(event) = mailbox.recv().await {
            let GameEvent::Action(action) = event else {
                continue;
            };
            let player_id = action.player.id.clone();
            if let Err(e) = self.handle_action_event(action).await {
                tracing::error!(
                    error = %e,
                    player_id = %player_id,
                    "Failed to list owners for global observation"
                );
            }
        }

        tracing::info!("Global observer manager stopped");
    }

    /// Wait until every spawned accrual has finished.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryWorld;
    use crate::infrastructure::ports::MockOwnerRepo;
    use crate::test_fixtures::{action, fixed_time};
    use crate::use_cases::perception::SignificanceTable;
    use mudmind_domain::{MonitoredAspect, Player, Race};

    fn filter_over(world: &Arc<InMemoryWorld>) -> Arc<PerceptionFilter> {
        Arc::new(PerceptionFilter::new(
            world.clone(),
            world.clone(),
            world.clone(),
        ))
    }

    fn hobbit_owner() -> Owner {
        Owner::new(
            "owner_hobbits",
            "Spirit of the Shire",
            MonitoredAspect::Race,
            "hobbit",
            20,
        )
        .with_budget(0.0, 100.0)
    }

    #[tokio::test]
    async fn only_matching_global_owners_accrue() {
        let world = Arc::new(InMemoryWorld::new());
        world.insert_owner(hobbit_owner());
        world.insert_owner(
            Owner::new("owner_elves", "Elves", MonitoredAspect::Race, "elf", 20)
                .with_budget(0.0, 100.0),
        );
        world.insert_owner(
            Owner::new("owner_burglars", "Guild", MonitoredAspect::Profession, "burglar", 20)
                .with_budget(0.0, 100.0),
        );
        world.insert_owner(
            Owner::new("owner_shire", "Shire", MonitoredAspect::Location, "room_shire", 20)
                .with_budget(0.0, 100.0),
        );
        let manager = Arc::new(GlobalObserverManager::new(world.clone(), filter_over(&world)));
        let player = Player::new("player_bilbo", "Bilbo", "room_shire")
            .with_race("hobbit")
            .with_profession("burglar");
        let event = Arc::new(ActionEvent::new(player, "pray", fixed_time()));

        let spawned = manager.handle_action_event(event).await.unwrap();
        manager.wait_idle().await;

        assert_eq!(spawned, 2);
        let budget = |id: &str| world.owner(&id.into()).unwrap().current_influence_budget;
        assert_eq!(budget("owner_hobbits"), 10.0);
        assert_eq!(budget("owner_burglars"), 10.0);
        assert_eq!(budget("owner_elves"), 0.0);
        assert_eq!(budget("owner_shire"), 0.0);
    }

    #[tokio::test]
    async fn budget_is_capped_at_max() {
        let world = Arc::new(InMemoryWorld::new());
        world.insert_owner(hobbit_owner().with_budget(95.0, 100.0));
        let manager = GlobalObserverManager::new(world.clone(), filter_over(&world));

        let budget = manager.accrue(&action("pray"), hobbit_owner()).await.unwrap();

        assert_eq!(budget, 100.0);
        assert_eq!(
            world.owner(&"owner_hobbits".into()).unwrap().current_influence_budget,
            100.0
        );
    }

    #[tokio::test]
    async fn clarity_scales_accrued_influence() {
        let world = Arc::new(InMemoryWorld::new());
        world.insert_owner(hobbit_owner());
        world.insert_race(Race::new("hobbit", "Hobbit").with_bias("pray", -0.5));
        let manager = GlobalObserverManager::new(world.clone(), filter_over(&world));

        let budget = manager.accrue(&action("pray"), hobbit_owner()).await.unwrap();

        assert_eq!(budget, 5.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_accruals_add_up() {
        let world = Arc::new(InMemoryWorld::new());
        world.insert_owner(hobbit_owner().with_budget(0.0, 1_000.0));
        let filter = Arc::new(
            PerceptionFilter::new(world.clone(), world.clone(), world.clone())
                .with_table(SignificanceTable::empty().with_uniform_score("wave", 2.0)),
        );
        let manager = Arc::new(GlobalObserverManager::with_max_concurrency(
            world.clone(),
            filter,
            4,
        ));

        for _ in 0..25 {
            manager
                .handle_action_event(Arc::new(action("wave")))
                .await
                .unwrap();
        }
        manager.wait_idle().await;

        assert_eq!(
            world.owner(&"owner_hobbits".into()).unwrap().current_influence_budget,
            50.0
        );
    }

    #[tokio::test]
    async fn save_failure_is_reported() {
        let owner = hobbit_owner();
        let stored = owner.clone();
        let mut owners = MockOwnerRepo::new();
        owners
            .expect_get()
            .returning(move |_| Ok(Some(stored.clone())));
        owners
            .expect_save()
            .returning(|_| Err(RepoError::database("save_owner", "disk full")));
        let world = Arc::new(InMemoryWorld::new());
        let manager = GlobalObserverManager::new(Arc::new(owners), filter_over(&world));

        let err = manager.accrue(&action("pray"), owner).await.unwrap_err();

        assert!(matches!(err, AccrualError::Repo(RepoError::Database { .. })));
    }

    #[tokio::test]
    async fn removed_owner_is_not_found() {
        let world = Arc::new(InMemoryWorld::new());
        let manager = GlobalObserverManager::new(world.clone(), filter_over(&world));

        let err = manager.accrue(&action("pray"), hobbit_owner()).await.unwrap_err();

        assert!(matches!(&err, AccrualError::Repo(e) if e.is_not_found()));
        assert!(world.owner(&"owner_hobbits".into()).is_none());
    }

    #[tokio::test]
    async fn listing_failure_spawns_nothing() {
        let mut owners = MockOwnerRepo::new();
        owners
            .expect_list_all()
            .returning(|| Err(RepoError::database("list_owners", "timeout")));
        owners.expect_save().never();
        let world = Arc::new(InMemoryWorld::new());
        let manager = Arc::new(GlobalObserverManager::new(
            Arc::new(owners),
            filter_over(&world),
        ));

        assert!(manager
            .handle_action_event(Arc::new(action("pray")))
            .await
            .is_err());
    }
}
