//! Cloud dispatch configuration.
//!
//! In cloud mode the runner POSTs validated input to a per-action worker
//! endpoint derived from the action name:
//!
//! ```text
//! https://pai-<name with '/' replaced by '-'>.<account-subdomain>.dev
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [cloud]
//! account_subdomain = "my-account"
//! ```
//!
//! # Environment Variables
//!
//! - `CF_ACCOUNT_SUBDOMAIN` — override the account subdomain

use serde::{Deserialize, Serialize};

/// Default account subdomain when none is configured.
const DEFAULT_ACCOUNT_SUBDOMAIN: &str = "workers";

/// Cloud dispatch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Account subdomain used in derived worker URLs.
    /// Default: `workers`
    ///
    /// Can be overridden by the `CF_ACCOUNT_SUBDOMAIN` environment variable.
    pub account_subdomain: Option<String>,

    /// Fixed base URL replacing the per-action URL derivation entirely.
    /// When set, requests go to `<base_url>/pai-<flattened-name>`. Intended
    /// for self-hosted gateways and tests against a local stub server.
    pub base_url: Option<String>,
}

impl CloudConfig {
    /// Get the effective account subdomain, checking the environment first.
    pub fn effective_account_subdomain(&self) -> String {
        if let Ok(sub) = std::env::var("CF_ACCOUNT_SUBDOMAIN") {
            return sub;
        }
        self.account_subdomain
            .clone()
            .unwrap_or_else(|| DEFAULT_ACCOUNT_SUBDOMAIN.to_string())
    }

    /// Set a fixed base URL (builder form, used by tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Derive the worker URL for an action name.
    ///
    /// Slashes in legacy `category/name` names are flattened to dashes.
    pub fn worker_url(&self, action: &str) -> String {
        let flat = action.replace('/', "-");
        match &self.base_url {
            Some(base) => format!("{}/pai-{}", base.trim_end_matches('/'), flat),
            None => format!(
                "https://pai-{}.{}.dev",
                flat,
                self.effective_account_subdomain()
            ),
        }
    }
}
