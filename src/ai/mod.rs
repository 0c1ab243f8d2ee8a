//! Generative AI backend: the Anthropic Messages API or canned mock replies.

pub mod client;
pub mod mock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use client::{AnthropicClient, AnthropicConfig};

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("ANTHROPIC_API_KEY is not configured")]
    NotConfigured,

    #[error("Request to AI backend failed: {0}")]
    Request(String),

    #[error("AI backend returned {status}: {message}")]
    Upstream {
        status: u16,
        message: String,
        details: Value,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// The two kinds of call the game makes, with their sampling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Generation,
    Evaluation,
}

impl CallKind {
    pub fn max_tokens(self) -> u32 {
        match self {
            CallKind::Generation => 4096,
            CallKind::Evaluation => 3072,
        }
    }

    pub fn temperature(self) -> f64 {
        match self {
            CallKind::Generation => 0.7,
            CallKind::Evaluation => 0.3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CallKind::Generation => "generate",
            CallKind::Evaluation => "evaluate",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    pub content: String,
    pub usage: Usage,
    pub model: String,
    pub mock_mode: bool,
}

pub enum AiBackend {
    Anthropic(AnthropicClient),
    /// Canned replies, nothing is billed
    Mock,
    /// Live mode requested without an API key; every call fails
    Unconfigured,
}

impl AiBackend {
    /// Live backend from the environment, or `Unconfigured` when no key is set
    pub fn from_env(mock_mode: bool, model: Option<&str>) -> Self {
        if mock_mode {
            log::info!("AI backend: mock mode");
            return AiBackend::Mock;
        }
        match AnthropicConfig::from_env() {
            Some(mut config) => {
                if let Some(model) = model {
                    config = config.with_model(model);
                }
                let client = AnthropicClient::new(config);
                log::info!("AI backend: Anthropic ({})", client.model());
                AiBackend::Anthropic(client)
            }
            None => {
                log::warn!("ANTHROPIC_API_KEY is not set, AI endpoints will fail until it is configured");
                AiBackend::Unconfigured
            }
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, AiBackend::Mock)
    }

    pub async fn complete(
        &self,
        kind: CallKind,
        prompt: &str,
        game_id: Option<&str>,
    ) -> Result<AiResponse, AiError> {
        match self {
            AiBackend::Anthropic(client) => {
                log::info!("[{}] gameId: {}", kind.label(), game_id.unwrap_or("-"));
                client.complete(kind, prompt).await
            }
            AiBackend::Mock => Ok(mock::mock_response(kind, game_id)),
            AiBackend::Unconfigured => {
                log::error!("[{}] ANTHROPIC_API_KEY is not configured", kind.label());
                Err(AiError::NotConfigured)
            }
        }
    }

    pub async fn generate(&self, prompt: &str, game_id: Option<&str>) -> Result<AiResponse, AiError> {
        self.complete(CallKind::Generation, prompt, game_id).await
    }

    pub async fn evaluate(&self, prompt: &str, game_id: Option<&str>) -> Result<AiResponse, AiError> {
        self.complete(CallKind::Evaluation, prompt, game_id).await
    }
}
