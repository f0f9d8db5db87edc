//! Action engine for PAI: resolution, validation, capability injection, and
//! execution.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ActionRunner                                            │
//! │  - ActionCatalog: two-root, two-grammar resolution       │
//! │  - HandlerRegistry: name → statically linked handler     │
//! │  - schema: dual-format input/output validation           │
//! │  - CapabilityProvider: least-capability injection        │
//! │  - local execution or cloud worker dispatch              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every run returns a uniform [`pai_types::ActionResult`] envelope; no
//! failure mode crosses the runner boundary as a panic or an `Err`.

pub mod builtins;
pub mod capability;
pub mod catalog;
pub mod context;
pub mod error;
pub mod llm;
pub mod registry;
pub mod runner;
pub mod schema;

pub use capability::{
    Capabilities, CapabilityProvider, FileReadCapability, FileWriteCapability, ShellCapability,
    ShellOutput,
};
pub use catalog::{ActionCatalog, ActionListing, ActionRoots, ResolvedAction, RootKind};
pub use context::ActionContext;
pub use error::{EngineError, Result};
pub use llm::{LlmCapability, LlmOptions, LlmResponse, LlmTier, TokenUsage};
pub use registry::{ActionHandler, HandlerRegistry};
pub use runner::{ActionRunner, RunOptions};
pub use schema::{validate, Validation};
