//! Hand-written fakes for the external service ports and common builders.
//!
//! Repository ports are mocked with `mockall`; the LLM, tool and rendering
//! ports get small fakes here so tests can script their behaviour and
//! inspect what they were asked to do.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use mudmind_domain::{
    ActionEvent, Observer, PerceivedAction, PerceivedActionRecord, Player, SentientEntity,
};
use tokio_util::sync::CancellationToken;

use crate::infrastructure::ports::{
    LlmError, LlmReaction, LlmService, NarrativeRenderer, PromptAssembler, PromptError,
    SemanticMessage, ToolCall, ToolDispatchError, ToolDispatcher,
};

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn frodo() -> Player {
    Player::new("player_frodo", "Frodo", "room_shire").with_race("hobbit")
}

pub fn action(action_type: &str) -> ActionEvent {
    ActionEvent::new(frodo(), action_type, fixed_time())
}

/// A record as the monitor would buffer it, with explicit significance.
pub fn record_for(
    observer: &Observer,
    action_type: &str,
    significance: f64,
) -> PerceivedActionRecord {
    let perceived = PerceivedAction {
        observer: observer.to_ref(),
        source_player: Some(frodo()),
        target: None,
        perceived_action_type: action_type.to_string(),
        clarity: 1.0,
        apparent_skill_level: 100,
        is_criminal: false,
        base_significance: significance,
        timestamp: fixed_time(),
    };
    PerceivedActionRecord::new(perceived, fixed_time())
}

// =============================================================================
// LLM
// =============================================================================

/// Scripted LLM: returns a canned reaction or error and records prompts.
pub struct FixedLlm {
    result: Result<LlmReaction, LlmError>,
    prompts: Mutex<Vec<String>>,
}

impl FixedLlm {
    pub fn replying(narrative: &str) -> Self {
        Self::with_reaction(LlmReaction {
            narrative: narrative.to_string(),
            tool_calls: vec![],
        })
    }

    pub fn with_reaction(reaction: LlmReaction) -> Self {
        Self {
            result: Ok(reaction),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        Self {
            result: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for FixedLlm {
    async fn process_action(
        &self,
        _cancel: CancellationToken,
        _entity: &SentientEntity,
        _player: &Player,
        prompt: &str,
    ) -> Result<LlmReaction, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.result.clone()
    }
}

/// Never answers. Keeps the cancellation token it was handed.
#[derive(Default)]
pub struct StalledLlm {
    token: Mutex<Option<CancellationToken>>,
}

impl StalledLlm {
    pub fn token(&self) -> Option<CancellationToken> {
        self.token.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for StalledLlm {
    async fn process_action(
        &self,
        cancel: CancellationToken,
        _entity: &SentientEntity,
        _player: &Player,
        _prompt: &str,
    ) -> Result<LlmReaction, LlmError> {
        *self.token.lock().unwrap() = Some(cancel.clone());
        cancel.cancelled().await;
        Err(LlmError::Cancelled)
    }
}

// =============================================================================
// Tools
// =============================================================================

#[derive(Default)]
pub struct RecordingTools {
    failure: Option<ToolDispatchError>,
    calls: Mutex<Vec<ToolCall>>,
}

impl RecordingTools {
    pub fn failing(error: ToolDispatchError) -> Self {
        Self {
            failure: Some(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolDispatcher for RecordingTools {
    async fn dispatch(
        &self,
        _cancel: CancellationToken,
        _player: &Player,
        _entity: &SentientEntity,
        tool_calls: &[ToolCall],
    ) -> Result<(), ToolDispatchError> {
        self.calls.lock().unwrap().extend_from_slice(tool_calls);
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Presentation & prompts
// =============================================================================

/// Renders the bare content.
pub struct PlainRenderer;

impl NarrativeRenderer for PlainRenderer {
    fn render(&self, message: &SemanticMessage) -> String {
        message.content.clone()
    }
}

/// Lists the perceived action types after the entity and player names.
pub struct ListingPrompt;

impl PromptAssembler for ListingPrompt {
    fn assemble(
        &self,
        entity: &SentientEntity,
        player: &Player,
        records: &[PerceivedActionRecord],
    ) -> Result<String, PromptError> {
        let actions: Vec<&str> = records
            .iter()
            .map(|r| r.perceived_action.perceived_action_type.as_str())
            .collect();
        Ok(format!(
            "{} saw {}: {}",
            entity.name(),
            player.name,
            actions.join(", ")
        ))
    }
}
