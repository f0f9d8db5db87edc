//! Action runner: resolve, validate, inject, execute, envelope.
//!
//! `run` is the engine's API boundary. Every failure mode — not found,
//! input invalid, execution failed, output invalid, transport error,
//! malformed definition — comes back as a `{success: false, error, metadata}`
//! envelope with a distinguishable message. Nothing escapes as a panic or an
//! `Err`; callers (CLI, pipeline runner) decide whether to halt or continue.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use pai_config::{CloudConfig, EngineConfig};
use pai_types::{
    ActionManifest, ActionResult, ExecutionMode, PipelineStepContext, ResultMetadata, TraceContext,
};
use serde_json::Value;
use tracing::debug;

use crate::capability::CapabilityProvider;
use crate::catalog::{ActionCatalog, ActionRoots};
use crate::context::ActionContext;
use crate::error::EngineError;
use crate::registry::{ActionHandler, HandlerRegistry};
use crate::schema;

/// Per-invocation options for [`ActionRunner::run`].
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Execution mode. Default: local.
    pub mode: ExecutionMode,

    /// Environment block for the action. Defaults to the process
    /// environment.
    pub env: Option<HashMap<String, String>>,

    /// Trace identifier; when present a fresh span id is minted and the
    /// trace is forwarded on cloud dispatch.
    pub trace_id: Option<String>,

    /// Pipeline-step metadata when invoked by the pipeline runner.
    pub pipeline: Option<PipelineStepContext>,
}

/// Executes actions locally or dispatches them to cloud workers.
pub struct ActionRunner {
    catalog: ActionCatalog,
    registry: Arc<HandlerRegistry>,
    provider: CapabilityProvider,
    cloud: CloudConfig,
    http: reqwest::Client,
}

impl ActionRunner {
    /// Create a runner from explicit parts.
    pub fn new(
        roots: ActionRoots,
        registry: Arc<HandlerRegistry>,
        provider: CapabilityProvider,
        cloud: CloudConfig,
    ) -> Self {
        Self {
            catalog: ActionCatalog::new(roots),
            registry,
            provider,
            cloud,
            http: reqwest::Client::new(),
        }
    }

    /// Create a runner wired from engine configuration.
    pub fn from_config(config: &EngineConfig, registry: Arc<HandlerRegistry>) -> Self {
        Self::new(
            ActionRoots::from_config(config),
            registry,
            CapabilityProvider::new(config.inference.clone()),
            config.cloud.clone(),
        )
    }

    /// The catalog this runner resolves against.
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Run an action by name.
    pub async fn run(&self, name: &str, input: Value, options: RunOptions) -> ActionResult {
        let start = Instant::now();
        let mode = options.mode;

        // Every failure class is an EngineError normalized to the envelope
        // right here; nothing escapes this function as an Err or a panic.
        let fail = |error: EngineError, version: Option<String>| {
            ActionResult::fail(error.to_string(), Some(metadata(start, name, version, mode)))
        };

        // Resolve: package first, then the registry-only fallback that keeps
        // pre-manifest actions loading.
        let resolved = match self.catalog.resolve(name) {
            Ok(resolved) => resolved,
            Err(e) => return fail(e, None),
        };

        // A packaged action may have no local handler (e.g. one deployed
        // only as a cloud worker); the handler requirement is enforced on
        // the local path below.
        let (manifest, handler) = match resolved {
            Some(package) => {
                let handler = self
                    .registry
                    .get(&package.manifest.name)
                    .or_else(|| self.registry.get(name));
                (package.manifest, handler)
            }
            None => match self.registry.get(name) {
                Some(handler) => {
                    let manifest = handler
                        .manifest()
                        .unwrap_or_else(|| ActionManifest::implicit(name));
                    (manifest, Some(handler))
                }
                None => return fail(EngineError::NotFound(name.to_string()), None),
            },
        };

        let version = manifest.version.clone();

        // Validate input before anything side-effecting happens. On failure
        // the implementation is never invoked.
        if let Some(ref input_schema) = manifest.input {
            let validation = schema::validate(input_schema, &input);
            if !validation.valid {
                return fail(
                    EngineError::Validation(format!(
                        "Input validation failed: {}",
                        validation.summary()
                    )),
                    Some(version),
                );
            }
        }

        let ctx = ActionContext {
            mode,
            capabilities: self.provider.build(&manifest.requires),
            env: options.env.unwrap_or_else(|| std::env::vars().collect()),
            trace: options.trace_id.map(TraceContext::new),
            pipeline: options.pipeline,
        };

        if mode == ExecutionMode::Cloud {
            return self
                .dispatch_cloud(name, &manifest, &input, ctx.trace.as_ref(), start)
                .await;
        }

        let Some(handler) = handler else {
            return fail(
                EngineError::Execution(format!(
                    "No implementation registered for action: {name}"
                )),
                Some(version),
            );
        };

        debug!(action = %manifest.name, version = %version, "Executing action locally");

        let output = match handler.execute(input, &ctx).await {
            Ok(output) => output,
            Err(e) => return fail(EngineError::Execution(e.to_string()), Some(version)),
        };

        // The implementation succeeded, but an output contract violation is
        // still a failure.
        if let Some(ref output_schema) = manifest.output {
            let validation = schema::validate(output_schema, &output);
            if !validation.valid {
                return fail(
                    EngineError::Validation(format!(
                        "Output validation failed: {}",
                        validation.summary()
                    )),
                    Some(version),
                );
            }
        }

        ActionResult::ok(output, metadata(start, &manifest.name, Some(version), mode))
    }

    /// POST validated input to the derived worker endpoint.
    ///
    /// A 2xx JSON body becomes the output with no output-schema
    /// re-validation; anything else becomes a failure envelope.
    async fn dispatch_cloud(
        &self,
        name: &str,
        manifest: &ActionManifest,
        input: &Value,
        trace: Option<&TraceContext>,
        start: Instant,
    ) -> ActionResult {
        let mode = ExecutionMode::Cloud;
        let version = Some(manifest.version.clone());
        let url = self.cloud.worker_url(name);

        debug!(action = %name, url = %url, "Dispatching action to cloud worker");

        let mut request = self.http.post(&url).json(input);
        if let Some(trace) = trace {
            request = request.header("X-Trace-Id", &trace.trace_id);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return ActionResult::fail(
                    EngineError::Transport(e.to_string()).to_string(),
                    Some(metadata(start, name, version, mode)),
                );
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return ActionResult::fail(
                EngineError::Transport(format!("Worker error ({}): {}", status.as_u16(), body))
                    .to_string(),
                Some(metadata(start, name, version, mode)),
            );
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(output) => ActionResult::ok(output, metadata(start, name, version, mode)),
            Err(e) => ActionResult::fail(
                EngineError::Transport(format!("Worker returned invalid JSON: {e}")).to_string(),
                Some(metadata(start, name, version, mode)),
            ),
        }
    }
}

fn metadata(
    start: Instant,
    action: &str,
    version: Option<String>,
    mode: ExecutionMode,
) -> ResultMetadata {
    ResultMetadata {
        duration_ms: start.elapsed().as_millis() as u64,
        action: action.to_string(),
        version,
        mode,
    }
}
