//! Per-invocation context metadata: capability names, trace identifiers, and
//! pipeline-step information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Side-effect primitives an action may request in its manifest.
///
/// The runtime grants an implementation only the capabilities it declares;
/// an action that does not list `shell` never receives a shell handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapabilityName {
    /// LLM inference — prompt in, response out.
    Llm,
    /// HTTP fetch.
    Fetch,
    /// Shell command execution.
    Shell,
    /// File read (gated, not otherwise sandboxed).
    ReadFile,
    /// File write (gated, not otherwise sandboxed).
    WriteFile,
    /// Key-value storage. Declared for manifest compatibility; the current
    /// provider grants no handle for it.
    Kv,
}

impl CapabilityName {
    /// Wire name as it appears in `requires` lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityName::Llm => "llm",
            CapabilityName::Fetch => "fetch",
            CapabilityName::Shell => "shell",
            CapabilityName::ReadFile => "readFile",
            CapabilityName::WriteFile => "writeFile",
            CapabilityName::Kv => "kv",
        }
    }
}

impl std::fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trace identifiers for observability, forwarded on cloud dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceContext {
    /// Caller-supplied trace identifier.
    pub trace_id: String,
    /// Span identifier, fresh per invocation.
    pub span_id: String,
}

impl TraceContext {
    /// Create a trace context with a fresh 8-character span id.
    pub fn new(trace_id: impl Into<String>) -> Self {
        let span_id = Uuid::new_v4().to_string()[..8].to_string();
        Self {
            trace_id: trace_id.into(),
            span_id,
        }
    }
}

/// Pipeline-step metadata attached when an action runs as part of a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStepContext {
    /// Pipeline name.
    pub name: String,
    /// Step identifier within the pipeline.
    pub step_id: String,
    /// Zero-based position of the step in declaration order.
    pub step_index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_wire_names() {
        assert_eq!(
            serde_json::to_string(&CapabilityName::ReadFile).unwrap(),
            "\"readFile\""
        );
        assert_eq!(
            serde_json::from_str::<CapabilityName>("\"writeFile\"").unwrap(),
            CapabilityName::WriteFile
        );
        assert_eq!(CapabilityName::Llm.as_str(), "llm");
    }

    #[test]
    fn test_unknown_capability_rejected() {
        assert!(serde_json::from_str::<CapabilityName>("\"network\"").is_err());
    }

    #[test]
    fn test_trace_context_span_id_length() {
        let trace = TraceContext::new("trace-123");
        assert_eq!(trace.trace_id, "trace-123");
        assert_eq!(trace.span_id.len(), 8);
    }

    #[test]
    fn test_trace_context_span_ids_unique() {
        let a = TraceContext::new("t");
        let b = TraceContext::new("t");
        assert_ne!(a.span_id, b.span_id);
    }
}
