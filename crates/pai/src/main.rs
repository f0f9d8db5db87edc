//! PAI - action and pipeline runner CLI.
//!
//! Main entry point for the `pai` binary.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{action, pipeline, Engine};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// PAI - run packaged actions and pipelines
#[derive(Parser)]
#[command(name = "pai")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run and list actions
    Action(action::ActionArgs),

    /// Run and list pipelines
    Pipeline(pipeline::PipelineArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = pai_config::EngineConfig::load()?;
    let _guard = init_tracing(cli.verbose, &config);

    let engine = Engine::new(config);

    match cli.command {
        Commands::Action(args) => action::run(args, &engine).await,
        Commands::Pipeline(args) => pipeline::run(args, &engine).await,
    }
}

/// Initialize tracing — console (human-readable) + rotating JSON file.
///
/// The returned guard must stay alive for the process lifetime so the file
/// writer flushes.
fn init_tracing(
    verbose: bool,
    config: &pai_config::EngineConfig,
) -> tracing_appender::non_blocking::WorkerGuard {
    let filter = if verbose {
        "pai=debug,pai_action=debug,pai_pipeline=debug,pai_config=debug,info"
    } else {
        "pai=info,pai_action=warn,pai_pipeline=info,warn"
    };

    let log_dir = config.paths.logs_dir();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "pai.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "pai=debug,pai_action=debug,pai_pipeline=debug,pai_config=debug,info",
                )),
        )
        .init();

    guard
}
