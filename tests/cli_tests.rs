//! Command line behaviour: exit codes, stderr and configuration files.

use assert_cmd::Command;
use predicates::prelude::*;

fn bundler() -> Command {
    Command::cargo_bin("toucan-bundler").unwrap()
}

#[test]
fn help_lists_subcommands() {
    bundler()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apk"))
        .stdout(predicate::str::contains("app"))
        .stdout(predicate::str::contains("ipa"));
}

#[test]
fn unsupported_architecture_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    bundler()
        .args(["apk", "--target-name", "demo", "--target-cpu", "mips"])
        .args(["--sdk-dir", "/opt/android-sdk", "--keystore", "debug.keystore"])
        .args(["--source-lib", "libdemo.so", "--out"])
        .arg(dir.path().join("demo.apk"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unsupported architecture: mips"));

    assert!(!dir.path().join("demo.apk").exists());
}

#[test]
fn unknown_target_os_is_rejected() {
    bundler()
        .args(["app", "--target-name", "demo", "--target-os", "windows"])
        .args(["--minimum-deployment-target", "10.0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown target platform: windows"));
}

#[test]
fn missing_required_flag_is_usage_error() {
    bundler()
        .args(["ipa", "--app-file", "demo.app"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--ipa-file"));
}

#[test]
fn unreadable_config_fails() {
    bundler()
        .args(["--config", "/nonexistent/toucan.toml"])
        .args(["ipa", "--app-file", "demo.app", "--ipa-file", "demo.ipa"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("/nonexistent/toucan.toml"));
}

#[cfg(unix)]
mod with_fake_zip {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    fn fake_zip(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("zip");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn config(dir: &Path, zip: &Path) -> PathBuf {
        let path = dir.join("toucan.toml");
        std::fs::write(
            &path,
            format!(
                "temp-dir = {:?}\n\n[tools]\nzip = {:?}\n",
                dir.join("tmp"),
                zip
            ),
        )
        .unwrap();
        path
    }

    fn app(dir: &Path) -> PathBuf {
        let app = dir.join("demo.app");
        std::fs::create_dir_all(&app).unwrap();
        std::fs::write(app.join("demo"), b"exe").unwrap();
        app
    }

    #[test]
    fn ipa_reports_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let zip = fake_zip(dir.path(), "find -L \"$3\" -type f > \"$2\"");
        let config = config(dir.path(), &zip);

        bundler()
            .arg("--config")
            .arg(&config)
            .arg("ipa")
            .arg("--app-file")
            .arg(app(dir.path()))
            .arg("--ipa-file")
            .arg(dir.path().join("demo.ipa"))
            .assert()
            .success()
            .stdout(predicate::str::contains("demo.ipa"))
            .stdout(predicate::str::contains("SHA256:"));

        assert!(dir.path().join("demo.ipa").is_file());
    }

    #[test]
    fn tool_exit_status_is_passed_through() {
        let dir = tempfile::tempdir().unwrap();
        let zip = fake_zip(dir.path(), "echo 'zip I/O error' >&2\nexit 7");
        let config = config(dir.path(), &zip);

        bundler()
            .arg("--config")
            .arg(&config)
            .arg("ipa")
            .arg("--app-file")
            .arg(app(dir.path()))
            .arg("--ipa-file")
            .arg(dir.path().join("demo.ipa"))
            .assert()
            .code(7)
            .stderr(predicate::str::contains("Command 'ipa' failed"));

        assert!(!dir.path().join("demo.ipa").exists());
        // The run created the temporary root, so it removes it again.
        assert!(!dir.path().join("tmp").exists());
    }

    #[test]
    fn quiet_suppresses_report() {
        let dir = tempfile::tempdir().unwrap();
        let zip = fake_zip(dir.path(), "find -L \"$3\" -type f > \"$2\"");
        let config = config(dir.path(), &zip);

        bundler()
            .arg("--quiet")
            .arg("--config")
            .arg(&config)
            .arg("ipa")
            .arg("--app-file")
            .arg(app(dir.path()))
            .arg("--ipa-file")
            .arg(dir.path().join("demo.ipa"))
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }
}
