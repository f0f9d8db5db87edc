//! The `llm` capability: a thin HTTP proxy to the external inference
//! service.
//!
//! The engine's contract is limited to this request/response shape; model
//! selection happens service-side via the tier name. Failures from the
//! underlying service propagate as a single error string.

use std::time::Duration;

use pai_config::InferenceConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{EngineError, Result};

/// Quality/speed tier for an inference request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmTier {
    /// Cheapest, fastest model the service offers.
    #[default]
    Fast,
    /// Balanced default model.
    Standard,
    /// Highest-quality model.
    Smart,
}

/// Options for one inference request.
#[derive(Debug, Clone, Default)]
pub struct LlmOptions {
    /// Model tier. Default: fast.
    pub tier: LlmTier,
    /// Optional system prompt.
    pub system: Option<String>,
    /// Request structured (parseable) output.
    pub json: bool,
    /// Token budget for the response.
    pub max_tokens: Option<u32>,
}

/// Token-usage accounting reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens consumed.
    pub input: u64,
    /// Output tokens generated.
    pub output: u64,
}

/// A completed inference response.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Response text.
    pub text: String,
    /// Parsed structured data when structured output was requested.
    pub json: Option<Value>,
    /// Token-usage accounting when the service reports it.
    pub usage: Option<TokenUsage>,
}

/// Wire request to the inference service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceRequest<'a> {
    user_prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_prompt: Option<&'a str>,
    level: LlmTier,
    expect_json: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Wire response from the inference service.
#[derive(Debug, Deserialize)]
struct InferenceReply {
    success: bool,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    parsed: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

/// LLM inference handle granted to actions declaring the `llm` capability.
#[derive(Debug, Clone)]
pub struct LlmCapability {
    config: InferenceConfig,
    client: reqwest::Client,
}

impl LlmCapability {
    /// Create a handle bound to the given service configuration.
    pub fn new(config: InferenceConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Run one inference request.
    pub async fn complete(&self, prompt: &str, options: &LlmOptions) -> Result<LlmResponse> {
        let url = format!(
            "{}/v1/inference",
            self.config.effective_base_url().trim_end_matches('/')
        );

        debug!(url = %url, tier = ?options.tier, "Sending inference request");

        let body = InferenceRequest {
            user_prompt: prompt,
            system_prompt: options.system.as_deref(),
            level: options.tier,
            expect_json: options.json,
            max_tokens: options.max_tokens,
        };

        let mut request = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body);
        if let Some(key) = self.config.effective_api_key() {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EngineError::Execution(format!("LLM inference failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EngineError::Execution(format!("LLM inference failed: {e}")))?;

        if !status.is_success() {
            return Err(EngineError::Execution(format!(
                "LLM inference failed ({}): {}",
                status.as_u16(),
                text
            )));
        }

        let reply: InferenceReply = serde_json::from_str(&text).map_err(|e| {
            EngineError::Execution(format!("LLM inference returned invalid JSON: {e}"))
        })?;

        if !reply.success {
            return Err(EngineError::Execution(
                reply
                    .error
                    .unwrap_or_else(|| "LLM inference failed".to_string()),
            ));
        }

        Ok(LlmResponse {
            text: reply.output.unwrap_or_default(),
            json: reply.parsed,
            usage: reply.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn capability_for(server: &MockServer) -> LlmCapability {
        let config = InferenceConfig::default().with_base_url(server.uri());
        LlmCapability::new(config, reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_complete_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/inference"))
            .and(body_partial_json(json!({
                "userPrompt": "name a color",
                "level": "fast",
                "expectJson": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "output": "blue",
                "usage": { "input": 5, "output": 1 }
            })))
            .mount(&server)
            .await;

        let llm = capability_for(&server);
        let response = llm
            .complete("name a color", &LlmOptions::default())
            .await
            .unwrap();
        assert_eq!(response.text, "blue");
        assert_eq!(response.usage.unwrap().input, 5);
        assert!(response.json.is_none());
    }

    #[tokio::test]
    async fn test_complete_structured_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/inference"))
            .and(body_partial_json(json!({
                "level": "smart",
                "expectJson": true,
                "maxTokens": 256
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "output": "{\"topic\":\"rust\"}",
                "parsed": { "topic": "rust" }
            })))
            .mount(&server)
            .await;

        let llm = capability_for(&server);
        let options = LlmOptions {
            tier: LlmTier::Smart,
            system: Some("extract the topic".to_string()),
            json: true,
            max_tokens: Some(256),
        };
        let response = llm.complete("some text", &options).await.unwrap();
        assert_eq!(response.json.unwrap()["topic"], "rust");
    }

    #[tokio::test]
    async fn test_service_reported_failure_is_single_error_string() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "model overloaded"
            })))
            .mount(&server)
            .await;

        let llm = capability_for(&server);
        let err = llm.complete("x", &LlmOptions::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "model overloaded");
    }

    #[tokio::test]
    async fn test_http_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let llm = capability_for(&server);
        let err = llm.complete("x", &LlmOptions::default()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("unavailable"));
    }

    #[test]
    fn test_tier_wire_names() {
        assert_eq!(serde_json::to_string(&LlmTier::Fast).unwrap(), "\"fast\"");
        assert_eq!(serde_json::to_string(&LlmTier::Smart).unwrap(), "\"smart\"");
        assert_eq!(LlmTier::default(), LlmTier::Fast);
    }
}
