//! Integration tests for Quire

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn quire() -> Command {
        let mut cmd = cargo_bin_cmd!("quire");
        cmd.env_remove("QUIRE_CONFIG");
        cmd
    }

    /// Command reading its configuration from `dir/config.toml`
    fn quire_in(dir: &Path) -> Command {
        let mut cmd = quire();
        cmd.arg("--config").arg(dir.join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        quire()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("deferred bulk writes"));
    }

    #[test]
    fn version_displays() {
        quire()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("quire"));
    }

    #[test]
    fn check_passes_with_defaults() {
        let dir = TempDir::new().unwrap();
        quire_in(dir.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("tags.update"))
            .stdout(predicate::str::contains("Every buffer outlives its worker interval"));
    }

    #[test]
    fn check_fails_when_interval_outlives_ttl() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[workers]\ntags_update_secs = 120\n",
        )
        .unwrap();

        quire_in(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stdout(predicate::str::contains("[FAIL]"))
            .stderr(predicate::str::contains("tags.update"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn malformed_config_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[buffer\nttl_secs = 65\n").unwrap();

        quire_in(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("line "));
    }

    #[test]
    fn buffers_lists_every_key() {
        let dir = TempDir::new().unwrap();
        quire_in(dir.path())
            .args(["buffers", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("CACHED-WORKS-CREATE"))
            .stdout(predicate::str::contains("EMAILS-TO-SEND"));
    }

    #[test]
    fn buffers_json() {
        let dir = TempDir::new().unwrap();
        quire_in(dir.path())
            .args(["buffers", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"worker\": \"work_likes.create\"").or(
                predicate::str::contains("\"interval_secs\": 20"),
            ))
            .stdout(predicate::str::contains("\"pending\": 0"))
            .stdout(predicate::str::contains("\"pending\": 1").not());
    }

    #[test]
    fn buffers_counts_demo_writes() {
        let dir = TempDir::new().unwrap();
        quire_in(dir.path())
            .args(["buffers", "--demo"])
            .assert()
            .success()
            .stdout(predicate::str::contains("PENDING"))
            .stdout(predicate::str::contains("4 pending"));
    }

    #[test]
    fn config_path() {
        quire()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        quire_in(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("# from built-in defaults"))
            .stdout(predicate::str::contains("[buffer]"))
            .stdout(predicate::str::contains("ttl_secs = 65"));
    }

    #[test]
    fn config_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        quire_in(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(dir.path().join("config.toml").exists());

        quire_in(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Use --force to overwrite"));
    }

    #[test]
    fn run_once_is_idle_without_writes() {
        let dir = TempDir::new().unwrap();
        quire_in(dir.path())
            .args(["run", "--once"])
            .assert()
            .success()
            .stdout(predicate::str::contains("idle"))
            .stdout(predicate::str::contains("Every buffer drained"));
    }

    #[test]
    fn run_once_flushes_demo_writes() {
        let dir = TempDir::new().unwrap();
        quire_in(dir.path())
            .args(["run", "--once", "--demo"])
            .assert()
            .success()
            .stdout(predicate::str::contains("CACHED-WORKS-CREATE (flushed 1)"))
            .stdout(predicate::str::contains("EMAILS-TO-SEND (flushed 1)"));
    }
}
