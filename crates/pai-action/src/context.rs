//! Per-invocation execution context handed to action implementations.

use std::collections::HashMap;

use pai_types::{ExecutionMode, PipelineStepContext, TraceContext};

use crate::capability::Capabilities;

/// Everything an action implementation receives besides its input.
///
/// Constructed fresh for every invocation and never shared or cached: each
/// call gets a capability set scoped to that action's declared requirements
/// only.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Where the action is running.
    pub mode: ExecutionMode,

    /// Injected capabilities, scoped to the manifest's `requires` list.
    pub capabilities: Capabilities,

    /// Environment variables visible to the action.
    pub env: HashMap<String, String>,

    /// Trace context for observability.
    pub trace: Option<TraceContext>,

    /// Pipeline-step metadata when running as part of a pipeline.
    pub pipeline: Option<PipelineStepContext>,
}

impl ActionContext {
    /// A bare local context with no capabilities, for tests and
    /// registry-only invocations.
    pub fn bare() -> Self {
        Self {
            mode: ExecutionMode::Local,
            capabilities: Capabilities::default(),
            env: HashMap::new(),
            trace: None,
            pipeline: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_context() {
        let ctx = ActionContext::bare();
        assert_eq!(ctx.mode, ExecutionMode::Local);
        assert!(ctx.capabilities.shell.is_none());
        assert!(ctx.trace.is_none());
        assert!(ctx.pipeline.is_none());
    }
}
