//! Declarative pipeline definition parser.
//!
//! Pipelines are TOML documents loaded fresh on every run. Two forms are
//! supported:
//!
//! **Mapped form** — explicit steps with templated inputs and an output
//! mapping evaluated against the final context:
//!
//! ```toml
//! [pipeline]
//! name = "blog-post"
//! description = "Proofread and summarize a draft"
//!
//! [[pipeline.steps]]
//! id = "proofread"
//! action = "blog/proofread"
//! input = { text = "{{input.draft}}" }
//!
//! [[pipeline.steps]]
//! id = "summarize"
//! action = "A_SUMMARIZE"
//! input = { text = "{{steps.proofread.output.corrected}}" }
//!
//! [pipeline.output]
//! summary = "{{steps.summarize.output.summary}}"
//! ```
//!
//! **Piped form** — a bare action list through which a single value flows,
//! the last action's output becoming the pipeline output:
//!
//! ```toml
//! [pipeline]
//! name = "clean-text"
//! actions = ["A_TRIM", "A_DEDUPE"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PipelineError;

/// Top-level wrapper matching the TOML structure `[pipeline]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineFile {
    pub pipeline: PipelineDefinition,
}

/// A complete declarative pipeline definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineDefinition {
    /// Unique pipeline name.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Piped form: bare ordered action names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,

    /// Mapped form: ordered step list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepDefinition>,

    /// Mapped form: output mapping from context paths to final fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

/// A single step within a mapped-form pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepDefinition {
    /// Unique step identifier within this pipeline.
    pub id: String,

    /// Action reference (flat or legacy grammar, or a `_builtin/` name).
    pub action: String,

    /// Reserved extension point; steps execute sequentially regardless.
    #[serde(default)]
    pub parallel: bool,

    /// Reserved extension point; steps execute sequentially regardless.
    #[serde(default)]
    pub foreach: Option<String>,

    /// Input template, interpolated against the accumulated context.
    /// Declared last so TOML serialization keeps plain values ahead of
    /// tables.
    #[serde(default = "empty_object")]
    pub input: Value,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Which declarative form a definition uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineForm {
    /// Explicit steps with templated inputs and an output mapping.
    Mapped,
    /// Bare action list with raw value piping.
    Piped,
}

impl PipelineFile {
    /// Parse a pipeline definition from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml_str)
            .map_err(|e| PipelineError::Definition(format!("TOML parse error: {e}")))
    }

    /// Load a pipeline definition from a file path.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Definition(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }
}

impl PipelineDefinition {
    /// The declarative form this definition uses. Only meaningful after
    /// [`validate`](Self::validate) has passed.
    pub fn form(&self) -> PipelineForm {
        if self.steps.is_empty() {
            PipelineForm::Piped
        } else {
            PipelineForm::Mapped
        }
    }

    /// Validate the definition.
    ///
    /// Checks:
    /// - Non-empty name
    /// - Exactly one of `steps` / `actions` is declared
    /// - Step ids are non-empty and unique; action references non-empty
    /// - Mapped form declares an output mapping
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.name.is_empty() {
            return Err(PipelineError::Definition(
                "Pipeline name cannot be empty".into(),
            ));
        }

        match (self.steps.is_empty(), self.actions.is_empty()) {
            (true, true) => {
                return Err(PipelineError::Definition(
                    "Pipeline must declare either 'steps' or 'actions'".into(),
                ));
            }
            (false, false) => {
                return Err(PipelineError::Definition(
                    "Pipeline cannot declare both 'steps' and 'actions'".into(),
                ));
            }
            (false, true) => self.validate_mapped()?,
            (true, false) => self.validate_piped()?,
        }

        Ok(())
    }

    fn validate_mapped(&self) -> Result<(), PipelineError> {
        let mut seen_ids = HashSet::new();
        for step in &self.steps {
            if step.id.is_empty() {
                return Err(PipelineError::Definition("Step id cannot be empty".into()));
            }
            if !seen_ids.insert(step.id.as_str()) {
                return Err(PipelineError::Definition(format!(
                    "Duplicate step id: {}",
                    step.id
                )));
            }
            if step.action.is_empty() {
                return Err(PipelineError::Definition(format!(
                    "Step '{}' has an empty action reference",
                    step.id
                )));
            }
        }

        if self.output.is_none() {
            return Err(PipelineError::Definition(
                "Mapped pipeline must declare an 'output' mapping".into(),
            ));
        }

        Ok(())
    }

    fn validate_piped(&self) -> Result<(), PipelineError> {
        if self.actions.iter().any(String::is_empty) {
            return Err(PipelineError::Definition(
                "Action names in 'actions' cannot be empty".into(),
            ));
        }
        Ok(())
    }
}
