//! Error types for the toucan-bundler command line.
//!
//! Wraps bundler, configuration file and argument errors, and maps each to a
//! process exit code and a short list of recovery suggestions.

use crate::bundler::{self, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for command line operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Exit code for invalid invocations (bad flags, unknown tokens, missing options).
pub const EXIT_CONFIGURATION: i32 = 2;

/// Exit code for every other failure without a tool status of its own.
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for command line operations
#[derive(Error, Debug)]
pub enum AppError {
    /// Bundle assembly failed
    #[error("{0}")]
    Bundler(#[from] bundler::Error),

    /// Configuration file could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid command line arguments
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),
}

/// Configuration file errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Configuration file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file is not valid TOML for this tool
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Configuration file path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}

impl AppError {
    /// Process exit code for this error.
    ///
    /// A failed external tool's own exit status is passed through unchanged;
    /// configuration problems exit with [`EXIT_CONFIGURATION`].
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Bundler(e) => match (e.tool_exit_status(), e.kind()) {
                (Some(status), _) if status != 0 => status,
                (_, ErrorKind::Configuration) => EXIT_CONFIGURATION,
                _ => EXIT_FAILURE,
            },
            AppError::Config(_) | AppError::Cli(_) => EXIT_CONFIGURATION,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            AppError::Bundler(e) => match e.kind() {
                ErrorKind::Configuration => vec![
                    "Check the flags passed to the subcommand (see --help)".to_string(),
                    "Tool locations can be set in the [tools] table of the --config file"
                        .to_string(),
                ],
                ErrorKind::ExternalTool => vec![
                    "Re-run with --verbose to see the exact tool command line".to_string(),
                    "Check the tool's output above for the underlying cause".to_string(),
                ],
                ErrorKind::Filesystem => vec![
                    "Verify the path named in the error exists and is readable".to_string(),
                ],
                ErrorKind::Internal => {
                    vec!["Check the error message above for specific details".to_string()]
                }
            },
            AppError::Config(ConfigError::Parse { .. }) => vec![
                "Configuration files accept [manifest], [tools], [android] and [apple] tables"
                    .to_string(),
            ],
            AppError::Cli(CliError::MissingArgument { argument }) => {
                vec![format!("Pass --{argument} or set it in the --config file")]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_status_is_passed_through() {
        let err = AppError::from(bundler::Error::ToolFailed {
            tool: "apksigner".into(),
            status: Some(42),
            stderr: String::new(),
        });
        assert_eq!(err.exit_code(), 42);
    }

    #[test]
    fn signal_termination_is_generic_failure() {
        let err = AppError::from(bundler::Error::ToolFailed {
            tool: "actool".into(),
            status: None,
            stderr: String::new(),
        });
        assert_eq!(err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn configuration_errors_exit_with_usage_code() {
        let err = AppError::from(bundler::Error::ArchError("mips".into()));
        assert_eq!(err.exit_code(), EXIT_CONFIGURATION);

        let err = AppError::from(CliError::MissingArgument {
            argument: "sdk-dir".into(),
        });
        assert_eq!(err.exit_code(), EXIT_CONFIGURATION);
        assert!(err.recovery_suggestions()[0].contains("--sdk-dir"));
    }
}
