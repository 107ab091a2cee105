//! External tool invocation.
//!
//! Every external step (`actool`, `codesign`, `aapt`, `apksigner`, `zip`,
//! `sips`) goes through [`ToolCommand`], which resolves the tool, waits for it
//! to exit and turns a non-zero exit into [`Error::ToolFailed`] carrying the
//! tool's exit status.

use crate::bundler::error::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A single blocking external tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Starts a command for the given tool path or bare name.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            current_dir: None,
            timeout: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Runs the tool from `dir` instead of the current directory.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Kills the tool and fails if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Short tool name for messages.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    fn display_command(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Runs the tool to completion.
    ///
    /// # Errors
    ///
    /// - [`Error::ToolNotFound`] if a bare tool name is not on `PATH`
    /// - [`Error::CommandFailed`] if the process cannot be spawned
    /// - [`Error::ToolTimeout`] if the configured timeout elapses
    /// - [`Error::ToolFailed`] if the tool exits unsuccessfully
    pub async fn run(self) -> Result<()> {
        let program = resolve_tool(&self.program)?;
        let tool = self.tool_name();

        log::debug!("Running {}", self.display_command());

        let mut command = tokio::process::Command::new(&program);
        command.args(&self.args).kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }

        let output = command.output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, output)
                .await
                .map_err(|_| Error::ToolTimeout {
                    tool: tool.clone(),
                    seconds: limit.as_secs(),
                })?,
            None => output.await,
        }
        .map_err(|error| Error::CommandFailed {
            command: self.display_command(),
            error,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::debug!("{tool}: {}", stdout.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(Error::ToolFailed {
                tool,
                status: output.status.code(),
                stderr,
            });
        }

        Ok(())
    }
}

/// Resolves a bare tool name on `PATH`; paths with a directory component are
/// used as given.
pub fn resolve_tool(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 {
        if program.exists() {
            // Absolute so a changed working directory cannot redirect it
            return Ok(std::path::absolute(program).unwrap_or_else(|_| program.to_path_buf()));
        }
        return Err(Error::ToolNotFound {
            tool: program.display().to_string(),
            reason: "no such file".into(),
        });
    }

    which::which(program).map_err(|e| Error::ToolNotFound {
        tool: program.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::bundler::ErrorKind;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_status() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "failing", "echo 'bad input' >&2\nexit 7");

        let err = ToolCommand::new(&tool).arg("x").run().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalTool);
        assert_eq!(err.tool_exit_status(), Some(7));
        assert!(err.to_string().contains("bad input"));
    }

    #[tokio::test]
    async fn runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "touch-here", "touch marker");
        let work = dir.path().join("work");
        std::fs::create_dir(&work).unwrap();

        ToolCommand::new(&tool).current_dir(&work).run().await.unwrap();

        assert!(work.join("marker").exists());
    }

    #[tokio::test]
    async fn timeout_is_external_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "slow", "sleep 5");

        let err = ToolCommand::new(&tool)
            .timeout(Some(Duration::from_millis(100)))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ToolTimeout { .. }));
        assert_eq!(err.kind(), ErrorKind::ExternalTool);
    }

    #[test]
    fn missing_tool_is_configuration_error() {
        let err = resolve_tool(Path::new("/no/such/dir/actool")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = resolve_tool(Path::new("definitely-not-a-real-tool-name")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
