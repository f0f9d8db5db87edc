//! Declarative pipelines for the PAI action engine.
//!
//! A pipeline chains actions with data threaded between them. Two forms
//! exist: the mapped form (explicit steps, templated inputs, an output
//! mapping) and the piped form (a bare action list through which one value
//! flows). Both execute strictly sequentially through the action runner and
//! return the uniform result envelope.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │  PipelineRunner                                        │
//! │  - user/system roots, personal definitions win         │
//! │  - TOML definitions, loaded fresh per run              │
//! │  - {{dot.path}} interpolation over {input, steps}      │
//! │  - halt on first failure, partial results preserved    │
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod definition;
pub mod error;
pub mod runner;

pub use context::{interpolate, resolve_path};
pub use definition::{PipelineDefinition, PipelineFile, PipelineForm, StepDefinition};
pub use error::{PipelineError, Result};
pub use runner::{PipelineMetadata, PipelineResult, PipelineRoots, PipelineRunner};
