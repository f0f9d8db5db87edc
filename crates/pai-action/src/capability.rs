//! Capability provider: least-capability injection for actions.
//!
//! Given the capability names an action's manifest declares, the provider
//! constructs concrete handles bound to the live environment — and only
//! those. An action that does not declare `shell` never receives a shell
//! handle, even though the provider could construct one. Handles are built
//! lazily per invocation, never speculatively for the whole enumeration.

use std::sync::Arc;

use pai_config::InferenceConfig;
use pai_types::CapabilityName;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm::LlmCapability;

/// Builds capability sets scoped to a declared requirement list.
///
/// Construction of a [`Capabilities`] value is a pure function of the
/// required names — it is independent of any particular action instance.
#[derive(Debug, Clone)]
pub struct CapabilityProvider {
    inference: InferenceConfig,
    http: reqwest::Client,
}

impl CapabilityProvider {
    /// Create a provider bound to the given inference configuration.
    pub fn new(inference: InferenceConfig) -> Self {
        Self {
            inference,
            http: reqwest::Client::new(),
        }
    }

    /// Build the capability set for a declared requirement list.
    pub fn build(&self, required: &[CapabilityName]) -> Capabilities {
        let mut capabilities = Capabilities::default();

        for capability in required {
            match capability {
                CapabilityName::Llm => {
                    capabilities.llm = Some(Arc::new(LlmCapability::new(
                        self.inference.clone(),
                        self.http.clone(),
                    )));
                }
                CapabilityName::Fetch => {
                    // The ambient HTTP client, granted verbatim.
                    capabilities.fetch = Some(self.http.clone());
                }
                CapabilityName::Shell => {
                    capabilities.shell = Some(ShellCapability);
                }
                CapabilityName::ReadFile => {
                    capabilities.read_file = Some(FileReadCapability);
                }
                CapabilityName::WriteFile => {
                    capabilities.write_file = Some(FileWriteCapability);
                }
                CapabilityName::Kv => {
                    // kv has no backing store; the name stays in the
                    // enumeration for manifest compatibility but no handle
                    // is granted.
                    warn!("kv capability requested but no backing store is configured");
                }
            }
        }

        capabilities
    }
}

/// The capability handles granted to one invocation.
///
/// One optional field per capability kind; a `None` field means the action
/// did not declare the capability and has nothing to call.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// LLM inference proxy.
    pub llm: Option<Arc<LlmCapability>>,
    /// HTTP client for arbitrary network calls.
    pub fetch: Option<reqwest::Client>,
    /// Shell command execution.
    pub shell: Option<ShellCapability>,
    /// Text file read by path.
    pub read_file: Option<FileReadCapability>,
    /// Text file write by path.
    pub write_file: Option<FileWriteCapability>,
}

/// Captured output of a shell command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellOutput {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Process exit code.
    pub code: i32,
}

/// Shell command execution through `sh -c`.
#[derive(Debug, Clone, Copy)]
pub struct ShellCapability;

impl ShellCapability {
    /// Run a command string through the system shell.
    ///
    /// A non-zero exit is reported via the returned code and stderr, never
    /// as an error — the action decides how to interpret failure. A command
    /// that cannot be spawned at all reports code 1 with the spawn error in
    /// stderr.
    pub async fn run(&self, command: &str) -> ShellOutput {
        match tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
            .await
        {
            Ok(output) => ShellOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                code: output.status.code().unwrap_or(-1),
            },
            Err(e) => ShellOutput {
                stdout: String::new(),
                stderr: e.to_string(),
                code: 1,
            },
        }
    }
}

/// Text file read by path. Capability gating is the only sandboxing.
#[derive(Debug, Clone, Copy)]
pub struct FileReadCapability;

impl FileReadCapability {
    /// Read a text file.
    pub async fn read(&self, path: &str) -> std::io::Result<String> {
        tokio::fs::read_to_string(path).await
    }
}

/// Text file write by path. Capability gating is the only sandboxing.
#[derive(Debug, Clone, Copy)]
pub struct FileWriteCapability;

impl FileWriteCapability {
    /// Write a text file, creating or truncating it.
    pub async fn write(&self, path: &str, content: &str) -> std::io::Result<()> {
        tokio::fs::write(path, content).await
    }
}
