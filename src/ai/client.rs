//! Anthropic Messages API client

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AiError, AiResponse, CallKind, Usage};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// USD per million tokens
const INPUT_PRICE_PER_MTOK: f64 = 3.0;
const OUTPUT_PRICE_PER_MTOK: f64 = 15.0;

#[derive(Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// `ANTHROPIC_API_KEY` is required, `ANTHROPIC_MODEL` overrides the default model
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("ANTHROPIC_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }
        Some(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Usage,
    #[serde(default)]
    model: String,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

pub struct AnthropicClient {
    config: AnthropicConfig,
    http_client: HttpClient,
}

impl AnthropicClient {
    pub fn new(config: AnthropicConfig) -> Self {
        Self {
            config,
            http_client: HttpClient::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn complete(&self, kind: CallKind, prompt: &str) -> Result<AiResponse, AiError> {
        let label = kind.label();
        log::info!("[{}] calling model {} (prompt {} chars)", label, self.config.model, prompt.chars().count());

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: kind.max_tokens(),
            temperature: kind.temperature(),
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.config.base_url.trim_end_matches('/')))
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let details: Value = response.json().await.unwrap_or(Value::Null);
            let message = details
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("Anthropic API returned an error")
                .to_string();
            log::error!("[{}] Anthropic API error {}: {}", label, status, message);
            return Err(AiError::Upstream {
                status: status.as_u16(),
                message,
                details,
            });
        }

        let data: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        log::info!(
            "[{}] tokens in={} out={} estimated cost ${:.4}",
            label,
            data.usage.input_tokens,
            data.usage.output_tokens,
            estimated_cost(&data.usage)
        );

        let content = data
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .unwrap_or_default();
        if content.is_empty() {
            log::error!("[{}] response had no text content", label);
            return Err(AiError::InvalidResponse(
                "The API response had no content".to_string(),
            ));
        }

        Ok(AiResponse {
            content,
            usage: data.usage,
            model: data.model,
            mock_mode: false,
        })
    }
}

/// Rough USD cost of one call
pub fn estimated_cost(usage: &Usage) -> f64 {
    usage.input_tokens as f64 / 1_000_000.0 * INPUT_PRICE_PER_MTOK
        + usage.output_tokens as f64 / 1_000_000.0 * OUTPUT_PRICE_PER_MTOK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_cost() {
        let usage = Usage {
            input_tokens: 1_000,
            output_tokens: 3_000,
        };
        assert!((estimated_cost(&usage) - 0.048).abs() < 1e-9);
        assert_eq!(estimated_cost(&Usage::default()), 0.0);
    }

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: CallKind::Evaluation.max_tokens(),
            temperature: CallKind::Evaluation.temperature(),
            messages: [Message {
                role: "user",
                content: "hello",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["max_tokens"], 3072);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_response_parsing_tolerates_missing_usage() {
        let data: MessagesResponse =
            serde_json::from_str(r#"{"content":[{"type":"text","text":"hi"}],"model":"m"}"#).unwrap();
        assert_eq!(data.content[0].text.as_deref(), Some("hi"));
        assert_eq!(data.usage, Usage::default());
    }

    #[test]
    fn test_client_reports_configured_model() {
        let client = AnthropicClient::new(AnthropicConfig::new("k"));
        assert_eq!(client.model(), DEFAULT_MODEL);
        let client = AnthropicClient::new(AnthropicConfig::new("k").with_model("claude-haiku"));
        assert_eq!(client.model(), "claude-haiku");
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = AnthropicConfig::new("sk-secret").with_model("m");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
