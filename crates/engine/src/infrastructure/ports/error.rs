//! Error types for port operations.

/// Repository operation errors with context for debugging.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepoError {
    /// Entity not found - includes entity type and ID for actionable error messages.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Storage operation failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
}

impl RepoError {
    /// Create a NotFound error with entity type and ID context.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Create a Database error with operation context.
    pub fn database(operation: &'static str, message: impl ToString) -> Self {
        Self::Database {
            operation,
            message: message.to_string(),
        }
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("LLM request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToolDispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid parameters for '{tool}': {message}")]
    InvalidParameters { tool: String, message: String },
    #[error("Tool '{tool}' failed: {message}")]
    Failed { tool: String, message: String },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PromptError {
    #[error("Nothing to describe: no perceived actions")]
    NoActions,
    #[error("Prompt assembly failed: {0}")]
    Assembly(String),
}
