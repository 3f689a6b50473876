//! Helpers for constructing the full application stack in tests.

use std::sync::Arc;

use crate::app::{App, Repositories, Services};
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::memory::InMemoryWorld;
use crate::infrastructure::prompt::ActionSummaryPrompt;
use crate::test_fixtures::{fixed_time, FixedLlm, PlainRenderer, RecordingTools};

/// A wired App plus handles on the fakes behind it.
pub struct E2ETestContext {
    pub app: App,
    pub world: Arc<InMemoryWorld>,
    pub llm: Arc<FixedLlm>,
    pub tools: Arc<RecordingTools>,
}

impl E2ETestContext {
    pub fn setup(world: InMemoryWorld, llm: FixedLlm) -> Self {
        Self::setup_with_config(world, llm, EngineConfig::default())
    }

    pub fn setup_with_config(world: InMemoryWorld, llm: FixedLlm, config: EngineConfig) -> Self {
        let world = Arc::new(world);
        let llm = Arc::new(llm);
        let tools = Arc::new(RecordingTools::default());

        let services = Services {
            llm: llm.clone(),
            tools: tools.clone(),
            renderer: Arc::new(PlainRenderer),
            prompts: Arc::new(ActionSummaryPrompt),
        };
        let app = App::new(
            config,
            Repositories::in_memory(world.clone()),
            services,
            Arc::new(FixedClock(fixed_time())),
        );

        Self {
            app,
            world,
            llm,
            tools,
        }
    }

    pub fn budget_of(&self, owner_id: &str) -> f64 {
        self.world
            .owner(&owner_id.into())
            .map(|owner| owner.current_influence_budget)
            .unwrap_or_default()
    }
}
