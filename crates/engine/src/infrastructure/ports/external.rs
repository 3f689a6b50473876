//! External service port traits (LLM, tool dispatch, rendering, prompts).

use async_trait::async_trait;
use mudmind_domain::{PerceivedActionRecord, Player, SentientEntity};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::error::{LlmError, PromptError, ToolDispatchError};

// =============================================================================
// LLM
// =============================================================================

/// A tool invocation requested by the LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// What an entity decided to do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmReaction {
    /// Text shown to the player. May be empty when the entity acts silently.
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

#[async_trait]
pub trait LlmService: Send + Sync {
    /// Ask the entity how it reacts. Implementations should return
    /// `LlmError::Cancelled` promptly once `cancel` fires.
    async fn process_action(
        &self,
        cancel: CancellationToken,
        entity: &SentientEntity,
        player: &Player,
        prompt: &str,
    ) -> Result<LlmReaction, LlmError>;
}

// =============================================================================
// Tool Dispatch
// =============================================================================

#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        cancel: CancellationToken,
        player: &Player,
        entity: &SentientEntity,
        tool_calls: &[ToolCall],
    ) -> Result<(), ToolDispatchError>;
}

// =============================================================================
// Presentation
// =============================================================================

/// Kind of message shown to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticMessageType {
    NpcMessage,
    OwnerMessage,
    QuestMessage,
}

/// Display style, mapped to concrete colours by each renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticColor {
    Default,
    Highlight,
    Error,
    Narrative,
    Npc,
    Owner,
    Quest,
}

/// Transport-independent message. Renderers turn it into text for one
/// particular client type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticMessage {
    #[serde(rename = "type")]
    pub message_type: SemanticMessageType,
    pub content: String,
    pub color: SemanticColor,
}

pub trait NarrativeRenderer: Send + Sync {
    fn render(&self, message: &SemanticMessage) -> String;
}

// =============================================================================
// Prompt Assembly
// =============================================================================

pub trait PromptAssembler: Send + Sync {
    /// Build the prompt describing what `entity` perceived `player` doing.
    fn assemble(
        &self,
        entity: &SentientEntity,
        player: &Player,
        records: &[PerceivedActionRecord],
    ) -> Result<String, PromptError>;
}
