//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Entity storage (NPCs, owners, questmakers, bias tables)
//! - LLM calls and tool dispatch
//! - Rendering and prompt assembly
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{NpcRepo, OwnerRepo, ProfessionRepo, QuestmakerRepo, RaceRepo, RoomRepo};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    LlmReaction, LlmService, NarrativeRenderer, PromptAssembler, SemanticColor, SemanticMessage,
    SemanticMessageType, ToolCall, ToolDispatcher,
};

// =============================================================================
// Errors
// =============================================================================
pub use error::{LlmError, PromptError, RepoError, ToolDispatchError};

// =============================================================================
// Test-Only Mock Repositories (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{
    MockNpcRepo, MockOwnerRepo, MockProfessionRepo, MockQuestmakerRepo, MockRaceRepo,
    MockRoomRepo,
};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;
