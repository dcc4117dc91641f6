//! Integration tests for the homelab binary.

use std::fs;

use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary isolated from the developer's config, `.env` and log settings.
fn homelab(home: &TempDir) -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("homelab");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

const TARGET: [&str; 4] = ["--ip", "10.0.0.5", "--domain", "lab.example"];

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("EXAMPLES"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_arguments_is_usage_error() {
    let home = TempDir::new().unwrap();
    homelab(&home).assert().code(2);
}

#[test]
fn test_services_lists_catalog() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .args(["services", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("caddy"))
        .stdout(predicate::str::contains("uptime-kuma"));
}

#[test]
fn test_services_json_is_parseable() {
    let home = TempDir::new().unwrap();
    let output = homelab(&home)
        .args(["services", "--optional", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 6);
}

#[test]
fn test_plan_puts_core_services_first() {
    let home = TempDir::new().unwrap();
    let output = homelab(&home)
        .arg("plan")
        .args(TARGET)
        .args(["-s", "redis"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let caddy = stdout.find("Caddy").unwrap();
    let redis = stdout.find("Redis").unwrap();
    assert!(caddy < redis);
}

#[test]
fn test_unknown_service_exits_not_found() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .arg("plan")
        .args(TARGET)
        .args(["-s", "jellyfin"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("jellyfin"));
}

#[test]
fn test_invalid_ip_is_configuration_error() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .args(["plan", "--ip", "not-an-ip", "--domain", "lab.example"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not-an-ip"));
}

#[test]
fn test_missing_credential_is_configuration_error() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .arg("plan")
        .args(TARGET)
        .args(["-s", "minio"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("minio_root_password"));
}

#[test]
fn test_credential_from_environment() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .env("HOMELAB_CREDENTIALS__MINIO_ROOT_PASSWORD", "hunter22")
        .arg("plan")
        .args(TARGET)
        .args(["-s", "minio"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MinIO"));
}

#[test]
fn test_config_file_supplies_target() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("homelab.toml");
    fs::write(
        &path,
        r#"
[homelab]
ip = "10.0.0.5"
domain = "lab.example"
services = ["postgresql", "redis", "outline"]

[credentials]
postgres_password = "s3cret"
"#,
    )
    .unwrap();

    homelab(&home)
        .arg("--config")
        .arg(&path)
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("Outline"))
        .stdout(predicate::str::contains("https://wiki.lab.example"));
}

#[test]
fn test_missing_explicit_config_file_exits_four() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .args(["--config", "does-not-exist.toml", "services"])
        .assert()
        .code(4);
}

#[test]
fn test_dry_run_touches_nothing() {
    let home = TempDir::new().unwrap();
    let root = home.path().join("srv");

    homelab(&home)
        .args(["install", "--dry-run", "--distribution", "debian"])
        .args(TARGET)
        .args(["-s", "redis", "--install-root"])
        .arg(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains("homelab-redis up -d"))
        .stdout(predicate::str::contains("Caddyfile"));

    assert!(!root.exists(), "dry run must not write files");
}

#[test]
fn test_templates_lists_builtins() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("caddy/Caddyfile"))
        .stdout(predicate::str::contains("n8n/config"));
}

#[test]
fn test_templates_render_uses_override_directory() {
    let home = TempDir::new().unwrap();
    let templates = home.path().join("templates");
    fs::create_dir_all(templates.join("caddy")).unwrap();
    fs::write(
        templates.join("caddy/Caddyfile.toml"),
        "content = \"# custom proxy for {{domain}}\"\n",
    )
    .unwrap();

    homelab(&home)
        .args(["templates", "--render", "caddy", "--templates-dir"])
        .arg(&templates)
        .args(TARGET)
        .assert()
        .success()
        .stdout(predicate::str::contains("# custom proxy for lab.example"))
        .stdout(predicate::str::contains("homelab-caddy"));
}

#[test]
fn test_env_password_reaches_templates_unchanged() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .env("HOMELAB_CREDENTIALS__POSTGRES_PASSWORD", "007700")
        .args(["templates", "--render", "postgresql"])
        .args(TARGET)
        .assert()
        .success()
        .stdout(predicate::str::contains("POSTGRES_PASSWORD=007700"));
}

#[test]
fn test_config_path_points_into_config_home() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_list_masks_credentials() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .env("HOMELAB_CREDENTIALS__POSTGRES_PASSWORD", "s3cret")
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret").not())
        .stdout(predicate::str::contains("********"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    homelab(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("homelab"));
}
