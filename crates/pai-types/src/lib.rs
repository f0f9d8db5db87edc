//! Shared data model for the PAI action engine.
//!
//! Actions are portable, self-contained units of work with a declared
//! input/output contract. This crate holds the types every other engine
//! crate agrees on:
//!
//! - [`ActionManifest`] — the `action.json` metadata document, including the
//!   dual-format schema union ([`SchemaDoc`])
//! - [`ActionResult`] — the uniform success/error/metadata envelope returned
//!   by every run operation
//! - [`CapabilityName`] — the fixed enumeration of side-effect primitives an
//!   action may request
//! - [`TraceContext`] / [`PipelineStepContext`] — per-invocation metadata
//!   attached to an execution context

pub mod context;
pub mod manifest;
pub mod result;

pub use context::{CapabilityName, PipelineStepContext, TraceContext};
pub use manifest::{
    ActionAuthor, ActionManifest, DeploymentConfig, FieldSpec, ManifestError, SchemaDoc,
    MANIFEST_FILE,
};
pub use result::{ActionResult, ExecutionMode, ResultMetadata};
