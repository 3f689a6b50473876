//! Tool dispatch that validates and logs tool calls without executing them.

use async_trait::async_trait;
use mudmind_domain::{Player, SentientEntity};
use tokio_util::sync::CancellationToken;

use crate::infrastructure::ports::{ToolCall, ToolDispatchError, ToolDispatcher};

/// Tool names entities may call.
pub const KNOWN_TOOLS: &[&str] = &[
    "NPC_memorize",
    "OWNER_memorize",
    "OWNER_memorize_dependables",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingToolDispatcher;

impl LoggingToolDispatcher {
    fn validate(call: &ToolCall) -> Result<(), ToolDispatchError> {
        if !KNOWN_TOOLS.contains(&call.tool_name.as_str()) {
            return Err(ToolDispatchError::UnknownTool(call.tool_name.clone()));
        }

        match call.parameters.get("memory_string") {
            Some(serde_json::Value::String(memory)) if !memory.trim().is_empty() => Ok(()),
            _ => Err(ToolDispatchError::InvalidParameters {
                tool: call.tool_name.clone(),
                message: "missing or invalid memory_string".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ToolDispatcher for LoggingToolDispatcher {
    async fn dispatch(
        &self,
        cancel: CancellationToken,
        player: &Player,
        entity: &SentientEntity,
        tool_calls: &[ToolCall],
    ) -> Result<(), ToolDispatchError> {
        for call in tool_calls {
            if cancel.is_cancelled() {
                return Err(ToolDispatchError::Failed {
                    tool: call.tool_name.clone(),
                    message: "dispatch cancelled".to_string(),
                });
            }
            Self::validate(call)?;
            tracing::info!(
                tool = %call.tool_name,
                entity_id = %entity.id(),
                player_id = %player.id,
                parameters = %call.parameters,
                "Tool call"
            );
        }
        Ok(())
    }
}
