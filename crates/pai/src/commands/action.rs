//! `pai action` — run and list actions.

use clap::{Args, Subcommand, ValueEnum};
use pai_action::RunOptions;
use pai_types::ExecutionMode;
use serde_json::json;

use super::{gather_input, Engine};

#[derive(Args)]
pub struct ActionArgs {
    #[command(subcommand)]
    command: ActionCommand,
}

#[derive(Subcommand)]
enum ActionCommand {
    /// Enumerate available actions as JSON
    List,

    /// Run an action by name
    Run {
        /// Action name (flat `A_NAME` or legacy `category/name`)
        name: String,

        /// Execution backend
        #[arg(long, value_enum, default_value = "local")]
        mode: ModeArg,

        /// Inline JSON input; otherwise trailing --key value pairs or stdin
        #[arg(long)]
        input: Option<String>,

        /// Trace identifier forwarded to the action and on cloud dispatch
        #[arg(long)]
        trace_id: Option<String>,

        /// Trailing --key value pairs (values JSON-decoded when possible)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Local,
    Cloud,
}

impl From<ModeArg> for ExecutionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Local => ExecutionMode::Local,
            ModeArg::Cloud => ExecutionMode::Cloud,
        }
    }
}

pub async fn run(args: ActionArgs, engine: &Engine) -> anyhow::Result<()> {
    match args.command {
        ActionCommand::List => {
            let names: Vec<String> = engine
                .actions
                .catalog()
                .list()
                .into_iter()
                .map(|listing| listing.name)
                .collect();
            println!("{}", serde_json::to_string_pretty(&json!({ "actions": names }))?);
            Ok(())
        }

        ActionCommand::Run {
            name,
            mode,
            input,
            trace_id,
            args,
        } => {
            let input = gather_input(input.as_deref(), &args)?;
            let result = engine
                .actions
                .run(
                    &name,
                    input,
                    RunOptions {
                        mode: mode.into(),
                        trace_id,
                        ..Default::default()
                    },
                )
                .await;

            if result.success {
                println!("{}", serde_json::to_string_pretty(&result)?);
                Ok(())
            } else {
                eprintln!(
                    "{}",
                    serde_json::to_string(&json!({
                        "error": result.error,
                        "metadata": result.metadata,
                    }))?
                );
                std::process::exit(1);
            }
        }
    }
}
