//! Shared helper functions for command execution.

use crate::bundler::SettingsBuilder;
use crate::cli::Args;
use crate::config::FileConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Temporary directory root: `--temp-dir`, then `temp-dir`, then the system default.
pub(super) fn temp_root(args: &Args, config: &FileConfig) -> PathBuf {
    args.temp_dir
        .clone()
        .or_else(|| config.temp_dir.clone())
        .unwrap_or_else(std::env::temp_dir)
}

/// Per-tool timeout: `--tool-timeout`, then `tool-timeout`.
pub(super) fn tool_timeout(args: &Args, config: &FileConfig) -> Option<Duration> {
    args.tool_timeout
        .or(config.tool_timeout)
        .map(Duration::from_secs)
}

/// Applies the global run options to a settings builder.
pub(super) fn with_run_options(
    builder: SettingsBuilder,
    args: &Args,
    config: &FileConfig,
) -> SettingsBuilder {
    let builder = builder.temp_root(temp_root(args, config));
    match tool_timeout(args, config) {
        Some(timeout) => builder.tool_timeout(timeout),
        None => builder,
    }
}

/// First of the flag value and the configuration value.
pub(super) fn flag_or<T: Clone>(flag: &Option<T>, config: &Option<T>) -> Option<T> {
    flag.clone().or_else(|| config.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["toucan-bundler"];
        argv.extend_from_slice(extra);
        argv.extend_from_slice(&["ipa", "--app-file", "a.app", "--ipa-file", "a.ipa"]);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_configuration() {
        let config = FileConfig {
            temp_dir: Some(PathBuf::from("/from/config")),
            tool_timeout: Some(10),
            ..Default::default()
        };

        let overridden = args(&["--temp-dir", "/from/flag", "--tool-timeout", "5"]);
        assert_eq!(temp_root(&overridden, &config), PathBuf::from("/from/flag"));
        assert_eq!(tool_timeout(&overridden, &config), Some(Duration::from_secs(5)));

        let inherited = args(&[]);
        assert_eq!(temp_root(&inherited, &config), PathBuf::from("/from/config"));
        assert_eq!(tool_timeout(&inherited, &config), Some(Duration::from_secs(10)));
    }

    #[test]
    fn defaults_without_configuration() {
        let plain = args(&[]);
        let config = FileConfig::default();
        assert_eq!(temp_root(&plain, &config), std::env::temp_dir());
        assert_eq!(tool_timeout(&plain, &config), None);
    }
}
