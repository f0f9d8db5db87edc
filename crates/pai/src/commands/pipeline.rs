//! `pai pipeline` — run and list pipelines.

use clap::{Args, Subcommand};
use serde_json::json;

use super::{gather_input, Engine};

#[derive(Args)]
pub struct PipelineArgs {
    #[command(subcommand)]
    command: PipelineCommand,
}

#[derive(Subcommand)]
enum PipelineCommand {
    /// Enumerate available pipelines as JSON
    List,

    /// Run a pipeline by name
    Run {
        /// Pipeline name
        name: String,

        /// Inline JSON input; otherwise trailing --key value pairs or stdin
        #[arg(long)]
        input: Option<String>,

        /// Trailing --key value pairs (values JSON-decoded when possible)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

pub async fn run(args: PipelineArgs, engine: &Engine) -> anyhow::Result<()> {
    match args.command {
        PipelineCommand::List => {
            let names = engine.pipelines.list();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "pipelines": names }))?
            );
            Ok(())
        }

        PipelineCommand::Run { name, input, args } => {
            let input = gather_input(input.as_deref(), &args)?;
            let result = engine.pipelines.run(&name, input).await;

            if result.success {
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            } else {
                eprintln!(
                    "{}",
                    serde_json::to_string(&json!({
                        "error": result.error,
                        "stepResults": result.step_results,
                        "metadata": result.metadata,
                    }))?
                );
                std::process::exit(1);
            }
        }
    }
}
