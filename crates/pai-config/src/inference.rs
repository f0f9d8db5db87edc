//! Inference service configuration for the `llm` capability.
//!
//! The engine never talks to a model provider directly; the `llm` capability
//! is a thin HTTP proxy to an external inference service that maps tier
//! names (fast/standard/smart) to concrete models.
//!
//! # Configuration
//!
//! ```toml
//! [inference]
//! base_url = "http://127.0.0.1:8787"
//! timeout_secs = 120
//! ```
//!
//! # Environment Variables
//!
//! - `PAI_INFERENCE_URL` — override the service base URL
//! - `PAI_INFERENCE_API_KEY` — bearer token for the service

use serde::{Deserialize, Serialize};

/// Default inference service URL (a locally running service).
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8787";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Inference service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Service base URL.
    /// Default: `http://127.0.0.1:8787`
    ///
    /// Can be overridden by the `PAI_INFERENCE_URL` environment variable.
    pub base_url: Option<String>,

    /// Bearer token for the service.
    ///
    /// Can be overridden by the `PAI_INFERENCE_API_KEY` environment variable.
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    /// Default: 120
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl InferenceConfig {
    /// Get the effective base URL, checking the environment first.
    pub fn effective_base_url(&self) -> String {
        if let Ok(url) = std::env::var("PAI_INFERENCE_URL") {
            return url;
        }
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Get the effective API key, checking the environment first.
    pub fn effective_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var("PAI_INFERENCE_API_KEY") {
            return Some(key);
        }
        self.api_key.clone()
    }

    /// Set the base URL (builder form, used by tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}
