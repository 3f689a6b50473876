//! Ollama LLM client (OpenAI-compatible API)
//!
//! Works against any endpoint speaking the OpenAI chat-completions protocol.
//! The model is asked for a JSON object `{ "narrative": ..., "tool_calls": [...] }`
//! which is decoded straight into an `LlmReaction`.

use async_trait::async_trait;
use mudmind_domain::{Player, SentientEntity};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::ports::{LlmError, LlmReaction, LlmService};

/// Transport-level timeout. The reaction deadline is enforced separately by
/// the caller and is normally shorter.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

const SYSTEM_PROMPT: &str = "You are a helpful assistant for a multi-user dungeon game. \
Your responses should be in JSON format, with a 'narrative' field for text to be shown to \
the player, and a 'tool_calls' field for any actions the AI should take. Each tool call has \
a 'tool_name' and a 'parameters' object.";

/// Client for Ollama's OpenAI-compatible API
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let client = Self::new(&config.llm_api_endpoint, &config.llm_model);
        match &config.llm_api_key {
            Some(key) => client.with_api_key(key.clone()),
            None => client,
        }
    }

    async fn send(&self, request: &OpenAIChatRequest) -> Result<LlmReaction, LlmError> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::RequestFailed(format!("{status}: {error_text}")));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        convert_response(api_response)
    }
}

#[async_trait]
impl LlmService for OllamaClient {
    async fn process_action(
        &self,
        cancel: CancellationToken,
        entity: &SentientEntity,
        player: &Player,
        prompt: &str,
    ) -> Result<LlmReaction, LlmError> {
        let request = OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage::new("system", SYSTEM_PROMPT),
                OpenAIMessage::new("user", prompt),
            ],
            response_format: Some(ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        };

        tracing::debug!(
            entity_id = %entity.id(),
            player_id = %player.id,
            model = %self.model,
            "Sending reaction prompt"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = self.send(&request) => result,
        }
    }
}

fn convert_response(response: OpenAIChatResponse) -> Result<LlmReaction, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))?;

    let content = choice.message.content.unwrap_or_default();
    parse_reaction(&content)
}

/// Decode the model's JSON answer, tolerating a markdown code fence around it.
fn parse_reaction(content: &str) -> Result<LlmReaction, LlmError> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(json)
        .map_err(|e| LlmError::InvalidResponse(format!("Malformed reaction JSON: {e}")))
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

impl OpenAIMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAIChoice {
    message: OpenAIMessage,
}
