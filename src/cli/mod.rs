//! Command line interface for toucan-bundler.
//!
//! Parses arguments, initialises logging and dispatches to the `apk`, `app`
//! and `ipa` subcommands.

pub mod args;
pub mod commands;
mod output;

pub use args::{ApkArgs, AppArgs, Args, Command, IpaArgs};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    init_logging(&args);
    execute_command(args).await
}

/// Initialises `env_logger`; `RUST_LOG` still wins over the flag-derived default.
fn init_logging(args: &Args) {
    let default_filter = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}
