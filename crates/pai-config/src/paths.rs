//! Resolution-root path configuration.
//!
//! All engine directories hang off a single base path. The catalog and
//! runners receive these paths explicitly at construction — there is no
//! process-wide directory state, so independent engine instances (e.g. in
//! tests) never interfere.
//!
//! # Configuration
//!
//! ```toml
//! [paths]
//! base_path = "~/.pai"
//! ```
//!
//! # Environment Variables
//!
//! - `PAI_BASE_PATH` — override the base path for all engine data
//!
//! # Directory layout
//!
//! ```text
//! <base>/
//!   actions/          # system/framework actions
//!   pipelines/        # system/framework pipelines
//!   user/
//!     actions/        # personal actions (shadow system actions by name)
//!     pipelines/      # personal pipelines
//!   logs/
//!   config.toml
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Path configuration for the engine's resolution roots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base path for all engine data.
    /// Default: `~/.pai`
    ///
    /// Can be overridden by the `PAI_BASE_PATH` environment variable.
    pub base_path: Option<PathBuf>,
}

impl PathsConfig {
    /// Get the effective base path, checking the environment first.
    ///
    /// Resolution order:
    /// 1. `PAI_BASE_PATH` environment variable
    /// 2. Configured `base_path` value
    /// 3. Default: `~/.pai`
    pub fn effective_base_path(&self) -> PathBuf {
        if let Ok(env_path) = std::env::var("PAI_BASE_PATH") {
            return PathBuf::from(env_path);
        }

        self.base_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".pai")
        })
    }

    /// System/framework actions root.
    pub fn system_actions_dir(&self) -> PathBuf {
        self.effective_base_path().join("actions")
    }

    /// Personal actions root, consulted before the system root.
    pub fn user_actions_dir(&self) -> PathBuf {
        self.effective_base_path().join("user").join("actions")
    }

    /// System/framework pipelines root.
    pub fn system_pipelines_dir(&self) -> PathBuf {
        self.effective_base_path().join("pipelines")
    }

    /// Personal pipelines root, consulted before the system root.
    pub fn user_pipelines_dir(&self) -> PathBuf {
        self.effective_base_path().join("user").join("pipelines")
    }

    /// Log directory for the CLI's file layer.
    pub fn logs_dir(&self) -> PathBuf {
        self.effective_base_path().join("logs")
    }
}
