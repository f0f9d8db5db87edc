//! Explicit configuration for the PAI action engine.
//!
//! Everything the engine needs from its environment — resolution roots,
//! cloud dispatch settings, the inference service endpoint — is carried in
//! an [`EngineConfig`] value constructed once and passed into the catalog
//! and runners. Nothing reads ambient process-wide state after construction,
//! so independent engine instances never interfere.
//!
//! Configuration is read from `<base>/config.toml` when present:
//!
//! ```toml
//! [paths]
//! base_path = "~/.pai"
//!
//! [cloud]
//! account_subdomain = "my-account"
//!
//! [inference]
//! base_url = "http://127.0.0.1:8787"
//! timeout_secs = 120
//! ```
//!
//! Each section also honors environment overrides; see the module docs.

pub mod cloud;
pub mod error;
pub mod inference;
pub mod paths;

pub use cloud::CloudConfig;
pub use error::{ConfigError, Result};
pub use inference::InferenceConfig;
pub use paths::PathsConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resolution-root paths.
    pub paths: PathsConfig,

    /// Cloud dispatch settings.
    pub cloud: CloudConfig,

    /// Inference service settings.
    pub inference: InferenceConfig,
}

impl EngineConfig {
    /// Load configuration from `<base>/config.toml`, falling back to
    /// defaults when the file does not exist.
    ///
    /// The base directory itself comes from `PAI_BASE_PATH` or `~/.pai`;
    /// a `base_path` inside the file then applies to everything else.
    pub fn load() -> Result<Self> {
        let base = PathsConfig::default().effective_base_path();
        let path = base.join("config.toml");
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
