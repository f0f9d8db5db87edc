//! The uniform result envelope returned by every run operation.
//!
//! Both the action runner and the pipeline runner report success and failure
//! through the same shape: `success=true` implies `output` is present (and
//! schema-valid where a schema exists); `success=false` implies `error` is a
//! non-empty human-readable string and `output` is absent. No failure mode
//! crosses the runner boundary as a panic or an `Err`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where an action executes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// In-process, via the handler registry.
    #[default]
    Local,
    /// Dispatched to a worker-style HTTP endpoint.
    Cloud,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Local => write!(f, "local"),
            ExecutionMode::Cloud => write!(f, "cloud"),
        }
    }
}

/// Execution metadata attached to a result envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Wall-clock duration of the invocation in milliseconds.
    pub duration_ms: u64,

    /// Resolved action name.
    pub action: String,

    /// Resolved action version, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Execution mode of the invocation.
    pub mode: ExecutionMode,
}

/// Result wrapper for action execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Whether the invocation succeeded.
    pub success: bool,

    /// Action output. Present exactly when `success` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    /// Human-readable failure description. Present exactly when `success`
    /// is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Execution metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
}

impl ActionResult {
    /// Build a success envelope.
    pub fn ok(output: Value, metadata: ResultMetadata) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            metadata: Some(metadata),
        }
    }

    /// Build a failure envelope.
    pub fn fail(error: impl Into<String>, metadata: Option<ResultMetadata>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let result = ActionResult::ok(
            json!({"topic": "quantum computing"}),
            ResultMetadata {
                duration_ms: 42,
                action: "A_EXTRACT_TOPIC".to_string(),
                version: Some("1.0.0".to_string()),
                mode: ExecutionMode::Local,
            },
        );
        assert!(result.success);
        assert!(result.output.is_some());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_failure_envelope_shape() {
        let result = ActionResult::fail("Action not found: A_MISSING", None);
        assert!(!result.success);
        assert!(result.output.is_none());
        assert_eq!(result.error.as_deref(), Some("Action not found: A_MISSING"));
    }

    #[test]
    fn test_metadata_wire_format_is_camel_case() {
        let result = ActionResult::ok(
            json!(null),
            ResultMetadata {
                duration_ms: 7,
                action: "parse/topic".to_string(),
                version: None,
                mode: ExecutionMode::Cloud,
            },
        );
        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["metadata"]["durationMs"], 7);
        assert_eq!(wire["metadata"]["mode"], "cloud");
        // version omitted when unknown
        assert!(wire["metadata"].get("version").is_none());
    }

    #[test]
    fn test_failure_omits_output_on_wire() {
        let wire = serde_json::to_value(ActionResult::fail("boom", None)).unwrap();
        assert!(wire.get("output").is_none());
        assert!(wire.get("metadata").is_none());
        assert_eq!(wire["success"], false);
    }

    #[test]
    fn test_execution_mode_display() {
        assert_eq!(ExecutionMode::Local.to_string(), "local");
        assert_eq!(ExecutionMode::Cloud.to_string(), "cloud");
        assert_eq!(ExecutionMode::default(), ExecutionMode::Local);
    }
}
