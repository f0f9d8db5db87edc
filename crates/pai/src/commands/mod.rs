//! CLI command handlers and shared input plumbing.

pub mod action;
pub mod pipeline;

use std::io::{IsTerminal, Read};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use pai_action::builtins::register_builtins;
use pai_action::{ActionRunner, HandlerRegistry};
use pai_config::EngineConfig;
use pai_pipeline::{PipelineRoots, PipelineRunner};
use serde_json::{Map, Value};

/// Wired engine shared by all commands.
pub struct Engine {
    /// Action runner over the configured roots with builtins registered.
    pub actions: Arc<ActionRunner>,
    /// Pipeline runner delegating to `actions`.
    pub pipelines: PipelineRunner,
}

impl Engine {
    /// Build the engine from loaded configuration.
    pub fn new(config: EngineConfig) -> Self {
        tracing::debug!(
            base = %config.paths.effective_base_path().display(),
            "Wiring engine"
        );

        let mut registry = HandlerRegistry::new();
        register_builtins(&mut registry);

        let actions = Arc::new(ActionRunner::from_config(&config, Arc::new(registry)));
        let pipelines = PipelineRunner::new(
            PipelineRoots::from_config(&config),
            Arc::clone(&actions),
        );

        Self { actions, pipelines }
    }
}

/// Assemble the run input from `--input`, trailing `--key value` pairs, or
/// stdin, in that order of precedence. With no source at all the input is
/// an empty object.
pub fn gather_input(input_flag: Option<&str>, pairs: &[String]) -> anyhow::Result<Value> {
    if let Some(raw) = input_flag {
        return serde_json::from_str(raw).context("--input is not valid JSON");
    }

    if !pairs.is_empty() {
        return Ok(Value::Object(parse_pairs(pairs)?));
    }

    if !std::io::stdin().is_terminal() {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        let trimmed = buffer.trim();
        if !trimmed.is_empty() {
            return serde_json::from_str(trimmed).context("stdin is not valid JSON");
        }
    }

    Ok(Value::Object(Map::new()))
}

/// Parse trailing `--key value` pairs. Each value is JSON-decoded when
/// possible, otherwise kept as a literal string.
fn parse_pairs(args: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut map = Map::new();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let key = flag
            .strip_prefix("--")
            .ok_or_else(|| anyhow!("expected --key, got '{flag}'"))?;
        if key.is_empty() {
            return Err(anyhow!("empty flag name"));
        }
        let raw = iter
            .next()
            .ok_or_else(|| anyhow!("missing value for --{key}"))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()));
        map.insert(key.to_string(), value);
    }

    Ok(map)
}
