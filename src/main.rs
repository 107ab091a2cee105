//! toucan-bundler: packages native binaries into signed Android and Apple bundles.

use std::process;
use toucan_bundler::cli;
use toucan_bundler::cli::OutputManager;

#[tokio::main]
async fn main() {
    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            // Never quiet for fatal errors
            let output = OutputManager::new(false, false);
            output.error(&format!("Fatal error: {e}"));
            output.suggestions(&e.recovery_suggestions());
            process::exit(e.exit_code());
        }
    }
}
