//! Command execution for the bundling subcommands.
//!
//! Each subcommand merges its flags over the loaded configuration file,
//! builds validated bundler settings and runs the pipeline. Failures are
//! reported here and converted into the process exit code.

mod apk;
mod app;
mod helpers;
mod ipa;

use crate::bundler::BundledArtifact;
use crate::cli::{Args, Command, OutputManager};
use crate::config::FileConfig;
use crate::error::{EXIT_CONFIGURATION, Result};

use apk::execute_apk;
use app::execute_app;
use ipa::execute_ipa;

/// Execute the subcommand, returning the process exit code.
pub async fn execute_command(args: Args) -> Result<i32> {
    let output = OutputManager::new(args.verbose, args.quiet);

    if let Err(validation_error) = args.validate() {
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(EXIT_CONFIGURATION);
    }

    match run_command(&args, &output).await {
        Ok(artifacts) => {
            if !output.is_quiet() {
                for artifact in &artifacts {
                    let _ = output.artifact(artifact);
                }
            }
            Ok(0)
        }
        Err(e) => {
            output.error(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));
            output.suggestions(&e.recovery_suggestions());
            Ok(e.exit_code())
        }
    }
}

async fn run_command(args: &Args, output: &OutputManager) -> Result<Vec<BundledArtifact>> {
    let config = FileConfig::load_optional(args.config.as_deref())?;
    if let Some(path) = &args.config {
        let _ = output.verbose(&format!("Using configuration {}", path.display()));
    }

    match &args.command {
        Command::Apk(apk) => execute_apk(args, apk, &config, output).await,
        Command::App(app) => execute_app(args, app, &config, output).await,
        Command::Ipa(ipa) => execute_ipa(args, ipa, &config, output).await,
    }
}
