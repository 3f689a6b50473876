//! Action significance monitor.
//!
//! Every action is shown to each observer that could plausibly notice it.
//! What the observer perceives is buffered per (player, observer) pair, and
//! once the buffered significance reaches the observer's reaction threshold
//! the buffer is drained and handed to the reaction trigger. There is no
//! decay: significance only leaves a buffer by being drained.
//!
//! Buffers live in a sharded map. The shard lock is held only to find or
//! create a buffer; append, threshold check and drain then happen under that
//! buffer's own lock, so each crossing is drained by exactly one task.
//!
//! Reactions run on their own tasks so a slow LLM call never holds back the
//! other observers of the same event. `wait_idle` covers them too.

use std::sync::Arc;

use dashmap::DashMap;
use mudmind_domain::{
    ActionEvent, Observer, ObserverId, PerceivedActionRecord, PlayerId, SentientEntity,
};
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;

use crate::infrastructure::event_bus::{GameEvent, MailboxReceiver};
use crate::infrastructure::ports::{ClockPort, NpcRepo, OwnerRepo, QuestmakerRepo, RepoError};
use crate::use_cases::perception::PerceptionFilter;
use crate::use_cases::reaction::ReactionTrigger;

type BufferKey = (PlayerId, ObserverId);

/// Perceived actions one observer has accumulated about one player.
#[derive(Debug, Default)]
pub struct ActionBuffer {
    records: Vec<PerceivedActionRecord>,
}

impl ActionBuffer {
    pub fn push(&mut self, record: PerceivedActionRecord) {
        self.records.push(record);
    }

    pub fn cumulative_significance(&self) -> f64 {
        self.records.iter().map(|r| r.significance).sum()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take every record, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<PerceivedActionRecord> {
        std::mem::take(&mut self.records)
    }
}

pub struct ActionSignificanceMonitor {
    npcs: Arc<dyn NpcRepo>,
    owners: Arc<dyn OwnerRepo>,
    questmakers: Arc<dyn QuestmakerRepo>,
    filter: Arc<PerceptionFilter>,
    reactions: Arc<dyn ReactionTrigger>,
    clock: Arc<dyn ClockPort>,
    buffers: DashMap<BufferKey, Arc<Mutex<ActionBuffer>>>,
    tasks: TaskTracker,
}

impl ActionSignificanceMonitor {
    pub fn new(
        npcs: Arc<dyn NpcRepo>,
        owners: Arc<dyn OwnerRepo>,
        questmakers: Arc<dyn QuestmakerRepo>,
        filter: Arc<PerceptionFilter>,
        reactions: Arc<dyn ReactionTrigger>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            npcs,
            owners,
            questmakers,
            filter,
            reactions,
            clock,
            buffers: DashMap::new(),
            tasks: TaskTracker::new(),
        }
    }

    /// Observers that could notice `event`: NPCs in the event's room, owners
    /// of that room or of the acting player's race or profession, and every
    /// questmaker.
    pub async fn candidates(&self, event: &ActionEvent) -> Result<Vec<Observer>, RepoError> {
        let npcs = self.npcs.list_all().await?;
        let owners = self.owners.list_all().await?;
        let questmakers = self.questmakers.list_all().await?;

        let nearby_npcs = npcs
            .into_iter()
            .filter(|npc| npc.current_room_id == event.room_id)
            .map(SentientEntity::Npc);
        let watching_owners = owners
            .into_iter()
            .filter(|owner| {
                owner.watches_room(&event.room_id) || owner.watches_player(&event.player)
            })
            .map(SentientEntity::Owner);
        let all_questmakers = questmakers.into_iter().map(SentientEntity::Questmaker);

        Ok(nearby_npcs
            .chain(watching_owners)
            .chain(all_questmakers)
            .map(Observer::from)
            .collect())
    }

    /// Run one action through every candidate observer.
    ///
    /// Returns how many reactions were started. A failure listing
    /// candidates abandons the event; a failure perceiving it only skips the
    /// affected observer.
    pub async fn handle_action_event(&self, event: &ActionEvent) -> Result<usize, RepoError> {
        let candidates = self.candidates(event).await?;
        let mut triggered = 0;

        for observer in candidates {
            let perceived = match self.filter.filter(event, &observer).await {
                Ok(perceived) => perceived,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        observer_id = %observer.id(),
                        event_id = %event.id,
                        "Observer could not perceive action, skipping"
                    );
                    continue;
                }
            };

            let record = PerceivedActionRecord::new(perceived, self.clock.now());
            let Some(batch) = self.record(&event.player.id, &observer, record).await else {
                continue;
            };

            triggered += 1;
            tracing::info!(
                observer_id = %observer.id(),
                player_id = %event.player.id,
                actions = batch.len(),
                "Reaction threshold reached"
            );
            let reactions = Arc::clone(&self.reactions);
            let player_id = event.player.id.clone();
            self.tasks.spawn(async move {
                match reactions.trigger_reaction(&observer, batch).await {
                    Ok(outcome) => tracing::debug!(
                        observer_id = %observer.id(),
                        narrative = outcome.narrative.is_some(),
                        tools = outcome.tools_dispatched,
                        "Reaction completed"
                    ),
                    Err(e) => tracing::error!(
                        error = %e,
                        observer_id = %observer.id(),
                        player_id = %player_id,
                        "Reaction failed"
                    ),
                }
            });
        }

        Ok(triggered)
    }

    /// Append `record` and, if that reaches the observer's threshold, drain
    /// the buffer in the same critical section.
    async fn record(
        &self,
        player_id: &PlayerId,
        observer: &Observer,
        record: PerceivedActionRecord,
    ) -> Option<Vec<PerceivedActionRecord>> {
        let threshold = f64::from(observer.reaction_threshold()?);
        let buffer = self.buffer(player_id, &observer.id());
        let mut buffer = buffer.lock().await;

        buffer.push(record);
        let cumulative = buffer.cumulative_significance();
        tracing::debug!(
            observer_id = %observer.id(),
            player_id = %player_id,
            cumulative,
            threshold,
            "Buffered perceived action"
        );

        (cumulative >= threshold).then(|| buffer.drain())
    }

    fn buffer(&self, player_id: &PlayerId, observer_id: &ObserverId) -> Arc<Mutex<ActionBuffer>> {
        let key = (player_id.clone(), observer_id.clone());
        Arc::clone(self.buffers.entry(key).or_default().value())
    }

    fn existing_buffer(
        &self,
        player_id: &PlayerId,
        observer_id: &ObserverId,
    ) -> Option<Arc<Mutex<ActionBuffer>>> {
        let key = (player_id.clone(), observer_id.clone());
        self.buffers.get(&key).map(|entry| Arc::clone(entry.value()))
    }

    /// Sum of the significance currently buffered for the pair.
    pub async fn cumulative_significance(
        &self,
        player_id: &PlayerId,
        observer_id: &ObserverId,
    ) -> f64 {
        match self.existing_buffer(player_id, observer_id) {
            Some(buffer) => buffer.lock().await.cumulative_significance(),
            None => 0.0,
        }
    }

    /// Drain the pair's buffer. Concurrent callers never see the same record.
    pub async fn take_batched(
        &self,
        player_id: &PlayerId,
        observer_id: &ObserverId,
    ) -> Vec<PerceivedActionRecord> {
        match self.existing_buffer(player_id, observer_id) {
            Some(buffer) => buffer.lock().await.drain(),
            None => Vec::new(),
        }
    }

    /// Consume action events until the mailbox closes, handling each on its
    /// own task.
    pub async fn run(self: Arc<Self>, mut mailbox: MailboxReceiver) {
        tracing::info!("Action significance monitor started");

        while let Some(event) = mailbox.recv().await {
            let GameEvent::Action(action) = event else {
                tracing::trace!(event_kind = %event.kind(), "Ignoring non-action event");
                continue;
            };

            let monitor = Arc::clone(&self);
            self.tasks.spawn(async move {
                if let Err(e) = monitor.handle_action_event(&action).await {
                    tracing::error!(
                        error = %e,
                        event_id = %action.id,
                        player_id = %action.player.id,
                        "Failed to list observers for action"
                    );
                }
            });
        }

        tracing::info!("Action significance monitor stopped");
    }

    /// Wait until every spawned event and reaction task has finished.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }
}
