//! MudMind Engine - Main entry point.
//!
//! Seeds a small in-memory world, replays a scripted sequence of player
//! actions through the perception pipeline and prints whatever the world's
//! entities say back.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mudmind_engine::app::{App, Repositories, Services};
use mudmind_engine::demo;
use mudmind_engine::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    event_bus::{EventKind, GameEvent},
    memory::InMemoryWorld,
    ollama::OllamaClient,
    prompt::ActionSummaryPrompt,
    telnet::AnsiRenderer,
    tool_dispatcher::LoggingToolDispatcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may be run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mudmind_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MudMind Engine");

    let config = EngineConfig::from_env()?;
    tracing::info!(
        llm_endpoint = %config.llm_api_endpoint,
        llm_model = %config.llm_model,
        llm_timeout_secs = config.llm_timeout.as_secs(),
        mailbox_capacity = config.mailbox_capacity,
        max_concurrent_accruals = config.max_concurrent_accruals,
        "Configuration loaded"
    );

    let world = Arc::new(InMemoryWorld::new());
    demo::seed_world(&world);

    let services = Services {
        llm: Arc::new(OllamaClient::from_config(&config)),
        tools: Arc::new(LoggingToolDispatcher),
        renderer: Arc::new(AnsiRenderer),
        prompts: Arc::new(ActionSummaryPrompt),
    };
    let app = App::new(
        config,
        Repositories::in_memory(world.clone()),
        services,
        Arc::new(SystemClock::new()),
    );

    // Print player messages as a telnet client would see them
    let mut messages = app.subscribe(EventKind::PlayerMessage);
    let printer = tokio::spawn(async move {
        while let Some(event) = messages.recv().await {
            if let GameEvent::PlayerMessage(message) = event {
                print!("[to {}] {}", message.player_id, message.content);
            }
        }
    });

    let consumers = app.start();
    for action in demo::script() {
        let delivered = app.publish_action(action);
        tracing::debug!(delivered, "Action published");
    }
    app.shutdown(consumers).await;

    app.bus.unsubscribe_all(EventKind::PlayerMessage);
    printer.await?;

    for owner_id in ["owner_shire", "owner_wizards"] {
        if let Some(owner) = world.owner(&owner_id.into()) {
            tracing::info!(
                owner_id = %owner.id,
                budget = owner.current_influence_budget,
                max_budget = owner.max_influence_budget,
                "Final influence budget"
            );
        }
    }

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
