//! Command execution.
//!
//! Validates arguments, resolves settings once, runs the selected command,
//! and turns any error into a printed diagnostic plus exit code.

mod build;
mod clean;
mod fetch_tools;
mod stage;

use crate::bundler::Bundler;
use crate::cli::{Args, Command, OutputManager};
use crate::config::PackagerConfig;
use crate::error::{CliError, PackagerError, Result};

use build::execute_build;
use clean::execute_clean;
use fetch_tools::execute_fetch_tools;
use stage::execute_stage;

/// Execute the selected command and return the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.json);
    let command = args.selected_command();
    match run(&args, &command, &output).await {
        Ok(()) => Ok(0),
        Err(e) => {
            report_failure(&output, &command, &e);
            Ok(e.exit_code())
        }
    }
}

async fn run(args: &Args, command: &Command, output: &OutputManager) -> Result<()> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let config = PackagerConfig::load(&args.project_dir, args.config.as_deref())?;
    let settings = config.resolve(&args.project_dir, &args.overrides())?;
    log::debug!("Resolved settings: {:?}", settings);
    let bundler = Bundler::new(settings);

    match command {
        Command::Build => execute_build(&bundler, output).await,
        Command::Stage => execute_stage(&bundler, output).await,
        Command::FetchTools => execute_fetch_tools(&bundler, output).await,
        Command::Clean { tools } => execute_clean(&bundler, output, *tools).await,
    }
}

fn report_failure(output: &OutputManager, command: &Command, e: &PackagerError) {
    output.error(&format!("Command '{}' failed: {}", command.name(), e));

    let suggestions = e.recovery_suggestions();
    if !suggestions.is_empty() && !output.is_json() {
        output.info("Recovery suggestions:");
        for suggestion in suggestions {
            output.indent(&format!("• {}", suggestion));
        }
    }
}
