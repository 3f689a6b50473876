//! Sentient entity reactions.
//!
//! When an observer's buffered significance crosses its threshold the monitor
//! hands the drained records to a [`ReactionTrigger`]. The
//! [`SentientEntityManager`] resolves the entity, asks the LLM how it reacts,
//! delivers the narrative to the player and dispatches any tool calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mudmind_domain::{
    EntityId, Observer, ObserverId, ObserverKind, PerceivedActionRecord, Player, PlayerMessage,
    SentientEntity,
};
use tokio_util::sync::CancellationToken;

use crate::infrastructure::event_bus::{EventBus, GameEvent};
use crate::infrastructure::ports::{
    LlmError, LlmReaction, LlmService, NarrativeRenderer, NpcRepo, OwnerRepo, PromptAssembler,
    PromptError, QuestmakerRepo, SemanticColor, SemanticMessage, SemanticMessageType,
    ToolDispatchError, ToolDispatcher,
};

/// Default deadline for one LLM call.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Seam between the significance monitor and whatever reacts to a crossing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReactionTrigger: Send + Sync {
    async fn trigger_reaction(
        &self,
        observer: &Observer,
        records: Vec<PerceivedActionRecord>,
    ) -> Result<ReactionOutcome, ReactionError>;
}

/// What a successful reaction produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReactionOutcome {
    /// The rendered text sent to the player, if the entity said anything.
    pub narrative: Option<String>,
    /// Number of tool calls handed to the dispatcher.
    pub tools_dispatched: usize,
    /// Dispatch failure. Logged, does not fail the reaction.
    pub tool_error: Option<ToolDispatchError>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ReactionError {
    #[error("No perceived actions to react to for observer {0}")]
    EmptyInput(ObserverId),
    #[error("Observers of kind '{kind}' cannot react (observer {observer_id})")]
    UnsupportedObserverKind {
        kind: ObserverKind,
        observer_id: ObserverId,
    },
    #[error("Sentient entity not found: {0}")]
    EntityNotFound(EntityId),
    #[error("Perceived actions for {0} carry no source player")]
    MissingSourcePlayer(EntityId),
    #[error("Failed to build prompt for {entity_id}: {source}")]
    Prompt {
        entity_id: EntityId,
        source: PromptError,
    },
    #[error("LLM call for {entity_id} failed: {source}")]
    Llm {
        entity_id: EntityId,
        source: LlmError,
    },
    #[error("LLM call for {entity_id} timed out after {timeout:?}")]
    LlmTimeout {
        entity_id: EntityId,
        timeout: Duration,
    },
}

pub struct SentientEntityManager {
    npcs: Arc<dyn NpcRepo>,
    owners: Arc<dyn OwnerRepo>,
    questmakers: Arc<dyn QuestmakerRepo>,
    prompts: Arc<dyn PromptAssembler>,
    llm: Arc<dyn LlmService>,
    tools: Arc<dyn ToolDispatcher>,
    renderer: Arc<dyn NarrativeRenderer>,
    bus: Arc<EventBus>,
    llm_timeout: Duration,
}

impl SentientEntityManager {
    pub fn new(
        npcs: Arc<dyn NpcRepo>,
        owners: Arc<dyn OwnerRepo>,
        questmakers: Arc<dyn QuestmakerRepo>,
        prompts: Arc<dyn PromptAssembler>,
        llm: Arc<dyn LlmService>,
        tools: Arc<dyn ToolDispatcher>,
        renderer: Arc<dyn NarrativeRenderer>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            npcs,
            owners,
            questmakers,
            prompts,
            llm,
            tools,
            renderer,
            bus,
            llm_timeout: DEFAULT_LLM_TIMEOUT,
        }
    }

    pub fn with_llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = timeout;
        self
    }

    /// Find the sentient entity behind `id`: NPCs first, then owners, then
    /// questmakers. Lookup errors count as a miss.
    pub async fn resolve_entity(&self, id: &EntityId) -> Option<SentientEntity> {
        match self.npcs.get(id).await {
            Ok(Some(npc)) => return Some(SentientEntity::Npc(npc)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, entity_id = %id, "NPC lookup failed"),
        }

        match self.owners.get(id).await {
            Ok(Some(owner)) => return Some(SentientEntity::Owner(owner)),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, entity_id = %id, "Owner lookup failed"),
        }

        match self.questmakers.get(id).await {
            Ok(Some(questmaker)) => Some(SentientEntity::Questmaker(questmaker)),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, entity_id = %id, "Questmaker lookup failed");
                None
            }
        }
    }

    async fn call_llm(
        &self,
        entity: &SentientEntity,
        player: &Player,
        prompt: &str,
    ) -> Result<LlmReaction, ReactionError> {
        let cancel = CancellationToken::new();
        let call = self
            .llm
            .process_action(cancel.clone(), entity, player, prompt);

        match tokio::time::timeout(self.llm_timeout, call).await {
            Ok(Ok(reaction)) => Ok(reaction),
            Ok(Err(source)) => Err(ReactionError::Llm {
                entity_id: entity.id().clone(),
                source,
            }),
            Err(_) => {
                cancel.cancel();
                Err(ReactionError::LlmTimeout {
                    entity_id: entity.id().clone(),
                    timeout: self.llm_timeout,
                })
            }
        }
    }

    fn deliver_narrative(
        &self,
        entity: &SentientEntity,
        player: &Player,
        narrative: &str,
    ) -> String {
        let (message_type, color) = match entity {
            SentientEntity::Npc(_) => (SemanticMessageType::NpcMessage, SemanticColor::Npc),
            SentientEntity::Owner(_) => (SemanticMessageType::OwnerMessage, SemanticColor::Owner),
            SentientEntity::Questmaker(_) => {
                (SemanticMessageType::QuestMessage, SemanticColor::Quest)
            }
        };
        let message = SemanticMessage {
            message_type,
            content: format!("{} says: {}", entity.name(), narrative.trim()),
            color,
        };
        let rendered = self.renderer.render(&message);

        tracing::info!(
            entity_id = %entity.id(),
            player_id = %player.id,
            message = %rendered,
            "Delivering reaction narrative"
        );

        let delivered = self
            .bus
            .publish(GameEvent::PlayerMessage(Arc::new(PlayerMessage {
                player_id: player.id.clone(),
                speaker_id: entity.id().clone(),
                content: rendered.clone(),
            })));
        if delivered == 0 {
            tracing::debug!(player_id = %player.id, "No subscriber received the player message");
        }

        rendered
    }
}

#[async_trait]
impl ReactionTrigger for SentientEntityManager {
    async fn trigger_reaction(
        &self,
        observer: &Observer,
        records: Vec<PerceivedActionRecord>,
    ) -> Result<ReactionOutcome, ReactionError> {
        if records.is_empty() {
            return Err(ReactionError::EmptyInput(observer.id()));
        }
        if observer.kind() == ObserverKind::Player {
            return Err(ReactionError::UnsupportedObserverKind {
                kind: observer.kind(),
                observer_id: observer.id(),
            });
        }

        let entity_id = EntityId::from(&observer.id());
        let entity = self
            .resolve_entity(&entity_id)
            .await
            .ok_or_else(|| ReactionError::EntityNotFound(entity_id.clone()))?;

        let player = records
            .first()
            .and_then(|r| r.perceived_action.source_player.clone())
            .ok_or_else(|| ReactionError::MissingSourcePlayer(entity_id.clone()))?;

        let prompt = self
            .prompts
            .assemble(&entity, &player, &records)
            .map_err(|source| ReactionError::Prompt {
                entity_id: entity_id.clone(),
                source,
            })?;

        let total: f64 = records.iter().map(|r| r.significance).sum();
        tracing::info!(
            entity_id = %entity_id,
            entity_kind = %entity.kind(),
            player_id = %player.id,
            actions = records.len(),
            total_significance = total,
            "Triggering reaction"
        );

        let reaction = self.call_llm(&entity, &player, &prompt).await?;

        let mut outcome = ReactionOutcome::default();
        if !reaction.narrative.trim().is_empty() {
            outcome.narrative = Some(self.deliver_narrative(&entity, &player, &reaction.narrative));
        }

        if !reaction.tool_calls.is_empty() {
            let cancel = CancellationToken::new();
            match self
                .tools
                .dispatch(cancel, &player, &entity, &reaction.tool_calls)
                .await
            {
                Ok(()) => outcome.tools_dispatched = reaction.tool_calls.len(),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        entity_id = %entity_id,
                        player_id = %player.id,
                        "Tool dispatch failed"
                    );
                    outcome.tool_error = Some(e);
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_bus::{mailbox, EventKind};
    use crate::infrastructure::ports::{
        MockNpcRepo, MockOwnerRepo, MockQuestmakerRepo, RepoError, ToolCall,
    };
    use crate::test_fixtures::{
        record_for, FixedLlm, ListingPrompt, PlainRenderer, RecordingTools, StalledLlm,
    };
    use mudmind_domain::{MonitoredAspect, Npc, Owner, Player, Questmaker};

    struct Repos {
        npcs: MockNpcRepo,
        owners: MockOwnerRepo,
        questmakers: MockQuestmakerRepo,
    }

    impl Repos {
        fn empty() -> Self {
            let mut npcs = MockNpcRepo::new();
            npcs.expect_get().returning(|_| Ok(None));
            let mut owners = MockOwnerRepo::new();
            owners.expect_get().returning(|_| Ok(None));
            let mut questmakers = MockQuestmakerRepo::new();
            questmakers.expect_get().returning(|_| Ok(None));
            Self {
                npcs,
                owners,
                questmakers,
            }
        }

        fn with_npc(npc: Npc) -> Self {
            let mut repos = Self::empty();
            repos.npcs = MockNpcRepo::new();
            repos
                .npcs
                .expect_get()
                .returning(move |id| Ok((id == &npc.id).then(|| npc.clone())));
            repos
        }
    }

    fn manager(
        repos: Repos,
        llm: Arc<dyn LlmService>,
        tools: Arc<dyn ToolDispatcher>,
        bus: Arc<EventBus>,
    ) -> SentientEntityManager {
        SentientEntityManager::new(
            Arc::new(repos.npcs),
            Arc::new(repos.owners),
            Arc::new(repos.questmakers),
            Arc::new(ListingPrompt),
            llm,
            tools,
            Arc::new(PlainRenderer),
            bus,
        )
    }

    fn guard() -> Npc {
        Npc::new("npc_guard", "Guard", "room_shire", 10)
    }

    #[tokio::test]
    async fn npc_reaction_is_rendered_and_published() {
        let bus = Arc::new(EventBus::new());
        let (tx, mut rx) = mailbox(4);
        bus.subscribe(EventKind::PlayerMessage, tx);
        let llm = Arc::new(FixedLlm::replying("Halt! Who goes there?"));
        let manager = manager(
            Repos::with_npc(guard()),
            llm.clone(),
            Arc::new(RecordingTools::default()),
            bus,
        );
        let observer = Observer::Npc(guard());
        let records = vec![
            record_for(&observer, "say", 6.0),
            record_for(&observer, "attack", 6.0),
        ];

        let outcome = manager.trigger_reaction(&observer, records).await.unwrap();

        assert_eq!(
            outcome.narrative.as_deref(),
            Some("Guard says: Halt! Who goes there?")
        );
        assert_eq!(outcome.tools_dispatched, 0);
        assert_eq!(llm.prompts(), vec!["Guard saw Frodo: say, attack".to_string()]);

        let Some(GameEvent::PlayerMessage(message)) = rx.recv().await else {
            panic!("expected a player message");
        };
        assert_eq!(message.player_id.as_str(), "player_frodo");
        assert_eq!(message.speaker_id.as_str(), "npc_guard");
        assert_eq!(message.content, "Guard says: Halt! Who goes there?");
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let manager = manager(
            Repos::empty(),
            Arc::new(FixedLlm::replying("unused")),
            Arc::new(RecordingTools::default()),
            Arc::new(EventBus::new()),
        );

        let err = manager
            .trigger_reaction(&Observer::Npc(guard()), vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, ReactionError::EmptyInput(_)));
    }

    #[tokio::test]
    async fn players_cannot_react() {
        let manager = manager(
            Repos::empty(),
            Arc::new(FixedLlm::replying("unused")),
            Arc::new(RecordingTools::default()),
            Arc::new(EventBus::new()),
        );
        let observer = Observer::Player(Player::new("player_sam", "Sam", "room_shire"));
        let records = vec![record_for(&observer, "say", 10.0)];

        let err = manager.trigger_reaction(&observer, records).await.unwrap_err();

        assert!(matches!(
            err,
            ReactionError::UnsupportedObserverKind {
                kind: ObserverKind::Player,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unknown_entity_is_not_found() {
        let manager = manager(
            Repos::empty(),
            Arc::new(FixedLlm::replying("unused")),
            Arc::new(RecordingTools::default()),
            Arc::new(EventBus::new()),
        );
        let observer = Observer::Npc(guard());
        let records = vec![record_for(&observer, "say", 10.0)];

        let err = manager.trigger_reaction(&observer, records).await.unwrap_err();

        assert!(matches!(err, ReactionError::EntityNotFound(id) if id.as_str() == "npc_guard"));
    }

    #[tokio::test]
    async fn lookup_errors_fall_through_to_later_repositories() {
        let questmaker = Questmaker::new("qm_fate", "Fate", 30);
        let mut repos = Repos::empty();
        repos.npcs = MockNpcRepo::new();
        repos
            .npcs
            .expect_get()
            .returning(|_| Err(RepoError::database("get_npc", "timeout")));
        repos.questmakers = MockQuestmakerRepo::new();
        let found = questmaker.clone();
        repos
            .questmakers
            .expect_get()
            .returning(move |_| Ok(Some(found.clone())));
        let manager = manager(
            repos,
            Arc::new(FixedLlm::replying("Destiny stirs.")),
            Arc::new(RecordingTools::default()),
            Arc::new(EventBus::new()),
        );
        let observer = Observer::Questmaker(questmaker);
        let records = vec![record_for(&observer, "pray", 30.0)];

        let outcome = manager.trigger_reaction(&observer, records).await.unwrap();

        assert_eq!(outcome.narrative.as_deref(), Some("Fate says: Destiny stirs."));
    }

    #[tokio::test]
    async fn owner_is_resolved_after_npcs() {
        let owner = Owner::new(
            "owner_shire",
            "Spirit of the Shire",
            MonitoredAspect::Location,
            "room_shire",
            20,
        );
        let mut repos = Repos::empty();
        repos.owners = MockOwnerRepo::new();
        let found = owner.clone();
        repos
            .owners
            .expect_get()
            .returning(move |_| Ok(Some(found.clone())));
        let manager = manager(
            repos,
            Arc::new(FixedLlm::replying("")),
            Arc::new(RecordingTools::default()),
            Arc::new(EventBus::new()),
        );

        let resolved = manager.resolve_entity(&owner.id).await;

        assert_eq!(resolved, Some(SentientEntity::Owner(owner)));
    }

    #[tokio::test]
    async fn records_without_source_player_are_rejected() {
        let manager = manager(
            Repos::with_npc(guard()),
            Arc::new(FixedLlm::replying("unused")),
            Arc::new(RecordingTools::default()),
            Arc::new(EventBus::new()),
        );
        let observer = Observer::Npc(guard());
        let mut record = record_for(&observer, "say", 10.0);
        record.perceived_action.source_player = None;

        let err = manager
            .trigger_reaction(&observer, vec![record])
            .await
            .unwrap_err();

        assert!(matches!(err, ReactionError::MissingSourcePlayer(_)));
    }

    #[tokio::test]
    async fn llm_failure_is_reported() {
        let manager = manager(
            Repos::with_npc(guard()),
            Arc::new(FixedLlm::failing(LlmError::RequestFailed("503".into()))),
            Arc::new(RecordingTools::default()),
            Arc::new(EventBus::new()),
        );
        let observer = Observer::Npc(guard());
        let records = vec![record_for(&observer, "say", 10.0)];

        let err = manager.trigger_reaction(&observer, records).await.unwrap_err();

        assert!(matches!(
            err,
            ReactionError::Llm {
                source: LlmError::RequestFailed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn stalled_llm_times_out_and_is_cancelled() {
        let llm = Arc::new(StalledLlm::default());
        let manager = manager(
            Repos::with_npc(guard()),
            llm.clone(),
            Arc::new(RecordingTools::default()),
            Arc::new(EventBus::new()),
        )
        .with_llm_timeout(Duration::from_millis(50));
        let observer = Observer::Npc(guard());
        let records = vec![record_for(&observer, "attack", 10.0)];

        let err = manager.trigger_reaction(&observer, records).await.unwrap_err();

        assert!(matches!(
            err,
            ReactionError::LlmTimeout { timeout, .. } if timeout == Duration::from_millis(50)
        ));
        assert!(llm.token().is_some_and(|t| t.is_cancelled()));
    }

    #[tokio::test]
    async fn tool_failure_keeps_reaction_successful() {
        let llm = Arc::new(FixedLlm::with_reaction(LlmReaction {
            narrative: "Take this.".to_string(),
            tool_calls: vec![ToolCall {
                tool_name: "give_item".to_string(),
                parameters: serde_json::json!({ "item_id": "item_lembas" }),
            }],
        }));
        let tools = Arc::new(RecordingTools::failing(ToolDispatchError::UnknownTool(
            "give_item".to_string(),
        )));
        let manager = manager(
            Repos::with_npc(guard()),
            llm,
            tools.clone(),
            Arc::new(EventBus::new()),
        );
        let observer = Observer::Npc(guard());
        let records = vec![record_for(&observer, "say", 10.0)];

        let outcome = manager.trigger_reaction(&observer, records).await.unwrap();

        assert_eq!(
            outcome,
            ReactionOutcome {
                narrative: Some("Guard says: Take this.".to_string()),
                tools_dispatched: 0,
                tool_error: Some(ToolDispatchError::UnknownTool("give_item".to_string())),
            }
        );
        assert_eq!(tools.calls().len(), 1);
    }

    #[tokio::test]
    async fn silent_reaction_only_dispatches_tools() {
        let bus = Arc::new(EventBus::new());
        let (tx, mut rx) = mailbox(4);
        bus.subscribe(EventKind::PlayerMessage, tx);
        let tools = Arc::new(RecordingTools::default());
        let manager = manager(
            Repos::with_npc(guard()),
            Arc::new(FixedLlm::with_reaction(LlmReaction {
                narrative: "   ".to_string(),
                tool_calls: vec![ToolCall {
                    tool_name: "attack_player".to_string(),
                    parameters: serde_json::Value::Null,
                }],
            })),
            tools.clone(),
            bus,
        );
        let observer = Observer::Npc(guard());
        let records = vec![record_for(&observer, "attack", 10.0)];

        let outcome = manager.trigger_reaction(&observer, records).await.unwrap();

        assert_eq!(outcome.narrative, None);
        assert_eq!(outcome.tools_dispatched, 1);
        assert!(rx.try_recv().is_err());
    }
}
