//! Pipeline runner: sequential step execution with inter-step data flow.
//!
//! Loading precedence mirrors the action catalog: a personal pipeline
//! definition shadows a system one of the same name. Definitions are loaded
//! fresh from disk on every run and never mutated after load.
//!
//! Execution is strictly sequential. The first failing step halts the
//! pipeline immediately; the failure envelope preserves all step outputs
//! accumulated so far for diagnostics.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use pai_action::{ActionRunner, RunOptions};
use pai_config::EngineConfig;
use pai_types::PipelineStepContext;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::context::interpolate;
use crate::definition::{PipelineDefinition, PipelineFile, PipelineForm};
use crate::error::PipelineError;

/// File extension of pipeline definition documents.
const PIPELINE_EXT: &str = "toml";

/// The ordered pair of pipeline resolution roots.
#[derive(Debug, Clone)]
pub struct PipelineRoots {
    /// Personal root, consulted first.
    pub user: PathBuf,
    /// System/framework root.
    pub system: PathBuf,
}

impl PipelineRoots {
    /// Create roots from explicit paths.
    pub fn new(user: impl Into<PathBuf>, system: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            system: system.into(),
        }
    }

    /// Derive roots from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            user: config.paths.user_pipelines_dir(),
            system: config.paths.system_pipelines_dir(),
        }
    }
}

/// Execution metadata attached to a pipeline result envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineMetadata {
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: u64,
    /// Pipeline name.
    pub pipeline: String,
    /// Number of steps that completed.
    pub steps_completed: usize,
}

/// Result wrapper for pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Whether the run succeeded.
    pub success: bool,

    /// Final pipeline output. Present exactly when `success` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    /// Human-readable failure description naming the failing step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Step outputs accumulated before the run ended, keyed by step id.
    /// Mapped form only.
    #[serde(
        default,
        rename = "stepResults",
        skip_serializing_if = "Option::is_none"
    )]
    pub step_results: Option<Map<String, Value>>,

    /// Execution metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PipelineMetadata>,
}

/// Loads and executes declarative pipelines through the action runner.
pub struct PipelineRunner {
    roots: PipelineRoots,
    actions: Arc<ActionRunner>,
}

impl PipelineRunner {
    /// Create a runner over the given roots.
    pub fn new(roots: PipelineRoots, actions: Arc<ActionRunner>) -> Self {
        Self { roots, actions }
    }

    /// Load a pipeline definition, personal root first.
    pub fn load(&self, name: &str) -> Result<PipelineDefinition, PipelineError> {
        for root in [&self.roots.user, &self.roots.system] {
            let path = root.join(format!("{name}.{PIPELINE_EXT}"));
            if !path.is_file() {
                continue;
            }
            debug!(pipeline = %name, path = %path.display(), "Loading pipeline definition");
            let file = PipelineFile::from_file(&path)?;
            file.pipeline.validate()?;
            return Ok(file.pipeline);
        }
        Err(PipelineError::NotFound(name.to_string()))
    }

    /// Enumerate pipeline names from both roots, de-duplicated with user
    /// entries winning.
    pub fn list(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();

        for root in [&self.roots.user, &self.roots.system] {
            for stem in definition_stems(root) {
                if seen.insert(stem.clone()) {
                    names.push(stem);
                }
            }
        }

        names
    }

    /// Run a pipeline by name.
    pub async fn run(&self, name: &str, input: Value) -> PipelineResult {
        let start = Instant::now();

        let definition = match self.load(name) {
            Ok(definition) => definition,
            Err(e) => {
                return PipelineResult {
                    success: false,
                    output: None,
                    error: Some(e.to_string()),
                    step_results: None,
                    metadata: Some(metadata(start, name, 0)),
                };
            }
        };

        match definition.form() {
            PipelineForm::Mapped => self.run_mapped(&definition, input, start).await,
            PipelineForm::Piped => self.run_piped(&definition, input, start).await,
        }
    }

    /// Mapped form: thread step outputs through the `{input, steps}`
    /// context, halting on the first failure.
    async fn run_mapped(
        &self,
        definition: &PipelineDefinition,
        input: Value,
        start: Instant,
    ) -> PipelineResult {
        let mut steps: Map<String, Value> = Map::new();

        for (index, step) in definition.steps.iter().enumerate() {
            if step.parallel || step.foreach.is_some() {
                debug!(
                    step = %step.id,
                    "parallel/foreach modifiers are reserved; executing sequentially"
                );
            }

            info!(
                pipeline = %definition.name,
                step = %step.id,
                action = %step.action,
                "Running pipeline step"
            );

            let context = json!({ "input": input, "steps": steps });
            let step_input = interpolate(&step.input, &context);

            let result = self
                .actions
                .run(
                    &step.action,
                    step_input,
                    RunOptions {
                        pipeline: Some(PipelineStepContext {
                            name: definition.name.clone(),
                            step_id: step.id.clone(),
                            step_index: index,
                        }),
                        ..Default::default()
                    },
                )
                .await;

            if !result.success {
                let cause = result.error.unwrap_or_else(|| "unknown error".to_string());
                return PipelineResult {
                    success: false,
                    output: None,
                    error: Some(format!("Step '{}' failed: {cause}", step.id)),
                    step_results: Some(steps),
                    metadata: Some(metadata(start, &definition.name, index)),
                };
            }

            steps.insert(
                step.id.clone(),
                json!({ "output": result.output.unwrap_or(Value::Null) }),
            );
        }

        let context = json!({ "input": input, "steps": steps });
        let output = definition
            .output
            .as_ref()
            .map(|mapping| interpolate(mapping, &context))
            .unwrap_or(Value::Null);

        let completed = definition.steps.len();
        PipelineResult {
            success: true,
            output: Some(output),
            error: None,
            step_results: Some(steps),
            metadata: Some(metadata(start, &definition.name, completed)),
        }
    }

    /// Piped form: feed the raw rolling value through each action, no
    /// templating.
    async fn run_piped(
        &self,
        definition: &PipelineDefinition,
        input: Value,
        start: Instant,
    ) -> PipelineResult {
        let mut data = input;

        for (index, action) in definition.actions.iter().enumerate() {
            info!(pipeline = %definition.name, action = %action, "Running piped action");

            let result = self
                .actions
                .run(
                    action,
                    data,
                    RunOptions {
                        pipeline: Some(PipelineStepContext {
                            name: definition.name.clone(),
                            step_id: action.clone(),
                            step_index: index,
                        }),
                        ..Default::default()
                    },
                )
                .await;

            if !result.success {
                let cause = result.error.unwrap_or_else(|| "unknown error".to_string());
                return PipelineResult {
                    success: false,
                    output: None,
                    error: Some(format!("{action} failed: {cause}")),
                    step_results: None,
                    metadata: Some(metadata(start, &definition.name, index)),
                };
            }

            // pipe: output becomes the next input
            data = result.output.unwrap_or(Value::Null);
        }

        let completed = definition.actions.len();
        PipelineResult {
            success: true,
            output: Some(data),
            error: None,
            step_results: None,
            metadata: Some(metadata(start, &definition.name, completed)),
        }
    }
}

fn metadata(start: Instant, pipeline: &str, steps_completed: usize) -> PipelineMetadata {
    PipelineMetadata {
        duration_ms: start.elapsed().as_millis() as u64,
        pipeline: pipeline.to_string(),
        steps_completed,
    }
}

/// Collect `.toml` stems from one root, sorted for stable listings.
fn definition_stems(root: &Path) -> Vec<String> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut stems: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PIPELINE_EXT) {
                return None;
            }
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(String::from)
        })
        .collect();
    stems.sort();
    stems
}
