//! Application state and composition.

use std::sync::Arc;

use mudmind_domain::ActionEvent;
use tokio::task::JoinHandle;

use crate::infrastructure::{
    config::EngineConfig,
    event_bus::{mailbox, EventBus, EventKind, GameEvent, MailboxReceiver},
    memory::InMemoryWorld,
    ports::{
        ClockPort, LlmService, NarrativeRenderer, NpcRepo, OwnerRepo, ProfessionRepo,
        PromptAssembler, QuestmakerRepo, RaceRepo, RoomRepo, ToolDispatcher,
    },
};
use crate::use_cases::{
    ActionSignificanceMonitor, GlobalObserverManager, PerceptionFilter, SentientEntityManager,
};

/// Main application state.
///
/// Holds the bus, the repositories and the wired use cases.
pub struct App {
    pub config: EngineConfig,
    pub bus: Arc<EventBus>,
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
#[derive(Clone)]
pub struct Repositories {
    pub npc: Arc<dyn NpcRepo>,
    pub owner: Arc<dyn OwnerRepo>,
    pub questmaker: Arc<dyn QuestmakerRepo>,
    pub room: Arc<dyn RoomRepo>,
    pub race: Arc<dyn RaceRepo>,
    pub profession: Arc<dyn ProfessionRepo>,
}

impl Repositories {
    /// Every port backed by the same in-memory world.
    pub fn in_memory(world: Arc<InMemoryWorld>) -> Self {
        Self {
            npc: world.clone(),
            owner: world.clone(),
            questmaker: world.clone(),
            room: world.clone(),
            race: world.clone(),
            profession: world,
        }
    }
}

/// External service adapters.
#[derive(Clone)]
pub struct Services {
    pub llm: Arc<dyn LlmService>,
    pub tools: Arc<dyn ToolDispatcher>,
    pub renderer: Arc<dyn NarrativeRenderer>,
    pub prompts: Arc<dyn PromptAssembler>,
}

/// Container for the pipeline stages.
pub struct UseCases {
    pub perception: Arc<PerceptionFilter>,
    pub monitor: Arc<ActionSignificanceMonitor>,
    pub global_observers: Arc<GlobalObserverManager>,
    pub reactions: Arc<SentientEntityManager>,
}

/// Handles of the running bus consumers.
pub struct Consumers {
    monitor: JoinHandle<()>,
    global_observers: JoinHandle<()>,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        config: EngineConfig,
        repositories: Repositories,
        services: Services,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let bus = Arc::new(EventBus::new());

        let perception = Arc::new(PerceptionFilter::new(
            repositories.room.clone(),
            repositories.race.clone(),
            repositories.profession.clone(),
        ));
        let reactions = Arc::new(
            SentientEntityManager::new(
                repositories.npc.clone(),
                repositories.owner.clone(),
                repositories.questmaker.clone(),
                services.prompts,
                services.llm,
                services.tools,
                services.renderer,
                bus.clone(),
            )
            .with_llm_timeout(config.llm_timeout),
        );
        let monitor = Arc::new(ActionSignificanceMonitor::new(
            repositories.npc.clone(),
            repositories.owner.clone(),
            repositories.questmaker.clone(),
            perception.clone(),
            reactions.clone(),
            clock,
        ));
        let global_observers = Arc::new(GlobalObserverManager::with_max_concurrency(
            repositories.owner.clone(),
            perception.clone(),
            config.max_concurrent_accruals,
        ));

        Self {
            config,
            bus,
            repositories,
            use_cases: UseCases {
                perception,
                monitor,
                global_observers,
                reactions,
            },
        }
    }

    /// Give a new consumer its own mailbox for `kind`.
    pub fn subscribe(&self, kind: EventKind) -> MailboxReceiver {
        let (tx, rx) = mailbox(self.config.mailbox_capacity);
        self.bus.subscribe(kind, tx);
        rx
    }

    /// Subscribe the monitor and the global observer manager to action
    /// events and spawn their loops.
    pub fn start(&self) -> Consumers {
        let monitor_mailbox = self.subscribe(EventKind::Action);
        let global_mailbox = self.subscribe(EventKind::Action);

        Consumers {
            monitor: tokio::spawn(Arc::clone(&self.use_cases.monitor).run(monitor_mailbox)),
            global_observers: tokio::spawn(
                Arc::clone(&self.use_cases.global_observers).run(global_mailbox),
            ),
        }
    }

    /// Publish a player action. Returns how many consumers received it.
    pub fn publish_action(&self, event: ActionEvent) -> usize {
        tracing::debug!(
            event_id = %event.id,
            player_id = %event.player.id,
            action_type = %event.action_type,
            room_id = %event.room_id,
            "Publishing action"
        );
        self.bus.publish(GameEvent::Action(Arc::new(event)))
    }

    /// Stop accepting actions, let the consumers drain their mailboxes and
    /// wait for every reaction and accrual already under way.
    pub async fn shutdown(&self, consumers: Consumers) {
        self.bus.unsubscribe_all(EventKind::Action);

        for (name, handle) in [
            ("monitor", consumers.monitor),
            ("global_observers", consumers.global_observers),
        ] {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, consumer = name, "Consumer task panicked");
            }
        }

        self.use_cases.monitor.wait_idle().await;
        self.use_cases.global_observers.wait_idle().await;
        tracing::info!("Pipeline drained");
    }
}
