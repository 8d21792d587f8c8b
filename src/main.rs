mod cli;
mod config;
mod flow;
mod logging;
mod process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vorta")]
#[command(about = "Declarative task-flow runner - run named flows of shell tasks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory containing the `jems` configuration directory (defaults to current)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Output mode: console, json, or quiet
    #[arg(long, global = true, default_value = "console")]
    output: String,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Write logs to a timestamped file in the user config directory
    #[arg(long, global = true, conflicts_with = "log_file")]
    log: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a flow
    Flow {
        /// Flow name
        name: String,
    },

    /// Show how a flow would be grouped without running it
    Plan {
        /// Flow name
        name: String,
    },

    /// List flows in every configuration record
    Flows,
}

impl Commands {
    fn label(&self) -> &str {
        match self {
            Commands::Flow { name } | Commands::Plan { name } => name.as_str(),
            Commands::Flows => "flows",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let mode = cli::OutputMode::parse(&args.output);

    let log_file = match args.log_file {
        Some(path) => Some(path),
        None if args.log => Some(logging::default_log_path(args.command.label())?),
        None => None,
    };
    logging::init_logging(args.debug, mode, log_file.as_deref())?;

    let working_dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving current directory")?,
    };

    let bundle = config::ConfigBundle::load(&working_dir)
        .with_context(|| format!("loading configuration from {}", working_dir.display()))?;

    let handler = cli::create_handler(mode, args.debug);

    let exit_code = match args.command {
        Commands::Flow { name } => {
            let runner = flow::FlowRunner::with_shell(&working_dir);
            cli::run_flow(&name, &bundle, &runner, &*handler).await
        }
        Commands::Plan { name } => cli::show_plan(&name, &bundle, &*handler),
        Commands::Flows => {
            cli::list_flows(&bundle, &*handler);
            0
        }
    };

    std::io::stdout().flush()?;
    std::io::stderr().flush()?;

    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
