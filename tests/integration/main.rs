//! Integration tests for corekit

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn corekit() -> Command {
        cargo_bin_cmd!("corekit")
    }

    #[test]
    fn help_displays() {
        corekit()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Arduino core and toolchain"));
    }

    #[test]
    fn version_displays() {
        corekit()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("corekit"));
    }

    #[test]
    fn config_path() {
        corekit()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_has_sections() {
        corekit()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("[core]")
                    .and(predicate::str::contains("[toolchain]"))
                    .and(predicate::str::contains("[build]")),
            );
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");

        corekit()
            .env("COREKIT_CONFIG", &config)
            .args(["config", "set", "nope.nope", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn config_set_and_show_roundtrip() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");

        corekit()
            .env("COREKIT_CONFIG", &config)
            .args(["config", "set", "core.version", "1.8.3"])
            .assert()
            .success();

        corekit()
            .env("COREKIT_CONFIG", &config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.8.3"));
    }

    #[test]
    fn status_runs_on_empty_cache() {
        let temp = TempDir::new().unwrap();

        corekit()
            .env("COREKIT_CACHE_DIR", temp.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("not installed"));
    }

    #[test]
    fn cache_info_empty() {
        let temp = TempDir::new().unwrap();

        corekit()
            .env("COREKIT_CACHE_DIR", temp.path())
            .args(["cache", "info"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No packages installed"));
    }

    #[test]
    fn cache_clear_non_interactive_aborts() {
        let temp = TempDir::new().unwrap();

        // Without --yes and without a TTY, the confirmation defaults to no
        corekit()
            .env("COREKIT_CACHE_DIR", temp.path())
            .args(["cache", "clear"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Aborted"));
    }

    #[test]
    fn path_fails_when_not_installed() {
        let temp = TempDir::new().unwrap();

        corekit()
            .env("COREKIT_CACHE_DIR", temp.path())
            .args(["path", "core"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not installed"));
    }

    #[test]
    fn install_help_shows_force_flag() {
        corekit()
            .args(["install", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force"));
    }
}
