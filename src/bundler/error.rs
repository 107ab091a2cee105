//! Error types for bundle assembly.
//!
//! Every failure in the pipeline falls into one of three families:
//!
//! | Kind | Raised when | Retry |
//! |------|-------------|-------|
//! | [`ErrorKind::Configuration`] | unknown platform/architecture token, missing required option | never |
//! | [`ErrorKind::ExternalTool`] | `actool`, `codesign`, `aapt`, `apksigner`, `zip` or `sips` exits non-zero | never |
//! | [`ErrorKind::Filesystem`] | missing source file, failed copy/link/mkdir | never |
//!
//! Filesystem errors always carry the offending path, and external tool errors
//! carry the tool's exit status unchanged so the CLI can surface it.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use toucan_bundler::bundler::{ErrorExt, Result};
//!
//! fn read_profile(path: &Path) -> Result<Vec<u8>> {
//!     std::fs::read(path).fs_context("reading provisioning profile", path)
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Coarse classification of an [`Error`], used for exit codes and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing invocation parameter.
    Configuration,
    /// An external tool failed to run or exited non-zero.
    ExternalTool,
    /// A filesystem operation failed.
    Filesystem,
    /// Anything else (serialization, image decoding, ...).
    Internal,
}

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "copying executable")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Invalid or missing configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Unsupported CPU architecture token.
    #[error("unsupported architecture: {0} (expected one of arm, arm64, x86, x64)")]
    ArchError(String),

    /// Unknown target platform token.
    #[error("unknown target platform: {0} (expected one of android, ios, mac)")]
    PlatformError(String),

    /// A required external tool could not be located.
    #[error("required tool `{tool}` not found: {reason}")]
    ToolNotFound {
        /// Tool name or path that was looked up
        tool: String,
        /// Why resolution failed
        reason: String,
    },

    /// The external tool could not be spawned at all.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// The external tool ran and exited unsuccessfully.
    #[error("{tool} exited with {}: {stderr}", describe_status(.status))]
    ToolFailed {
        /// Tool that failed
        tool: String,
        /// Exit status, `None` if terminated by a signal
        status: Option<i32>,
        /// Captured standard error (trimmed)
        stderr: String,
    },

    /// The external tool did not finish within the configured timeout.
    #[error("{tool} timed out after {seconds}s")]
    ToolTimeout {
        /// Tool that was killed
        tool: String,
        /// Configured timeout
        seconds: u64,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Image processing error (icon rasterization).
    #[error("{0}")]
    ImageError(#[from] image::ImageError),

    /// Error walking directory (checksums, copies).
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Handlebars template rendering error.
    #[error("{0}")]
    HandleBarsError(#[from] handlebars::RenderError),

    /// Handlebars template parsing error.
    #[error("{0}")]
    Template(#[from] handlebars::TemplateError),

    /// JSON serialization error (asset catalog descriptors).
    #[error("{0}")]
    JsonError(#[from] serde_json::error::Error),

    /// Property list (plist) parsing/writing error.
    #[error("{0}")]
    Plist(#[from] plist::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Classifies this error, looking through any [`Error::Context`] wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Context(_, inner) => inner.kind(),
            Error::Config(_) | Error::ArchError(_) | Error::PlatformError(_) | Error::ToolNotFound { .. } => {
                ErrorKind::Configuration
            }
            Error::CommandFailed { .. } | Error::ToolFailed { .. } | Error::ToolTimeout { .. } => {
                ErrorKind::ExternalTool
            }
            Error::Fs { .. } | Error::IoError(_) | Error::WalkdirError(_) => ErrorKind::Filesystem,
            _ => ErrorKind::Internal,
        }
    }

    /// Exit status reported by a failed external tool, if any.
    pub fn tool_exit_status(&self) -> Option<i32> {
        match self {
            Error::Context(_, inner) => inner.tool_exit_status(),
            Error::ToolFailed { status, .. } => *status,
            _ => None,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the bundler's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::Config(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::Config(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying binary".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_preserves_kind_and_status() {
        let err: Result<()> = Err(Error::ToolFailed {
            tool: "codesign".into(),
            status: Some(3),
            stderr: "no identity found".into(),
        });
        let err = err.context("signing demo.app").unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalTool);
        assert_eq!(err.tool_exit_status(), Some(3));
        assert!(err.to_string().starts_with("signing demo.app: codesign exited with status 3"));
    }

    #[test]
    fn fs_context_carries_path() {
        let err = std::fs::read("/definitely/not/here")
            .fs_context("reading binary", "/definitely/not/here")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Filesystem);
        assert!(err.to_string().contains("/definitely/not/here"));
    }

    #[test]
    fn missing_option_is_configuration_error() {
        let value: Option<&str> = None;
        let err = value.context("minimum deployment target is required").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
