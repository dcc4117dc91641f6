//! Integration tests for homelab-core through its public API.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use homelab_core::application::ports::{CommandOutput, CommandSpec, LoadError};
use homelab_core::prelude::*;
use serde_json::{Value, json};

#[derive(Default)]
struct FakeHost {
    commands: Mutex<Vec<String>>,
    files: Mutex<BTreeMap<PathBuf, String>>,
    fail_on: Option<&'static str>,
}

impl CommandRunner for FakeHost {
    fn run(&self, command: &CommandSpec) -> HomelabResult<CommandOutput> {
        let line = command.to_string();
        self.commands.lock().unwrap().push(line.clone());
        match self.fail_on {
            _ if line.starts_with("docker network inspect") => {
                Ok(CommandOutput::failure(1, "network not found"))
            }
            Some(pattern) if line.contains(pattern) => Ok(CommandOutput::failure(1, "boom")),
            _ => Ok(CommandOutput::success()),
        }
    }
}

impl ConfigWriter for FakeHost {
    fn write_config(&self, path: &Path, content: &str) -> HomelabResult<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn remove_config(&self, path: &Path) -> HomelabResult<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }
}

impl PlatformProbe for FakeHost {
    fn detect(&self) -> HomelabResult<Distribution> {
        Ok(Distribution::Ubuntu)
    }
}

struct Blueprints;

impl TemplateLoader for Blueprints {
    fn load(&self, name: &str) -> Result<Value, LoadError> {
        if name.ends_with("/docker-compose") {
            Ok(json!({
                "content": "services:\n  app:\n    image: {{image}}\n    container_name: {{container_name}}\n",
                "variables": { "image": "string", "container_name": "string" }
            }))
        } else if name == "caddy/Caddyfile" {
            Ok(json!({ "content": "{{site_blocks}}" }))
        } else if name == "n8n/config" {
            Ok(json!({ "host": "{{n8n_host}}", "port": "{{port}}" }))
        } else {
            Err(LoadError::NotFound)
        }
    }

    fn available(&self) -> Vec<String> {
        Vec::new()
    }
}

fn provisioner(host: &Arc<FakeHost>) -> Provisioner {
    Provisioner::new(
        host.clone(),
        Arc::new(Blueprints),
        host.clone(),
        host.clone(),
    )
}

fn config(services: &[ServiceType]) -> HomelabConfig {
    HomelabConfig::builder()
        .ip("10.0.0.5")
        .domain("lab.example")
        .services(services.iter().copied())
        .install_root("/opt/lab")
        .build()
}

#[test]
fn test_full_install_writes_every_file() {
    let host = Arc::new(FakeHost::default());
    let mut ctx = RunContext::new();

    let outcome = provisioner(&host)
        .run(&config(&[ServiceType::N8n]), &mut ctx)
        .unwrap();

    assert!(!outcome.is_cancelled());
    let files = host.files.lock().unwrap();
    assert!(files.contains_key(Path::new("/opt/lab/caddy/Caddyfile")));

    let n8n: Value =
        serde_json::from_str(&files[Path::new("/opt/lab/n8n/config/config.json")]).unwrap();
    assert_eq!(n8n["host"], "n8n.lab.example");

    let compose = &files[Path::new("/opt/lab/n8n/docker-compose.yml")];
    assert!(compose.contains("container_name: homelab-n8n"));
    assert!(!compose.contains("{{"));
}

#[test]
fn test_failed_run_removes_written_files() {
    let host = Arc::new(FakeHost {
        fail_on: Some("homelab-redis up"),
        ..FakeHost::default()
    });
    let mut ctx = RunContext::new();

    let err = provisioner(&host)
        .run(&config(&[ServiceType::Redis]), &mut ctx)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceInstallation);
    assert_eq!(err.service(), Some(ServiceType::Redis));
    assert!(host.files.lock().unwrap().is_empty());
    assert!(
        host.commands
            .lock()
            .unwrap()
            .iter()
            .any(|c| c == "docker network rm homelab"),
        "network created by the run is removed"
    );
}

#[test]
fn test_missing_credential_aborts_before_side_effects() {
    let host = Arc::new(FakeHost::default());
    let mut ctx = RunContext::new();

    let err = provisioner(&host)
        .run(&config(&[ServiceType::Minio]), &mut ctx)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceInstallation);
    assert!(host.commands.lock().unwrap().is_empty());
    assert!(host.files.lock().unwrap().is_empty());
}

#[test]
fn test_unknown_template_surfaces_as_template_error() {
    struct Empty;
    impl TemplateLoader for Empty {
        fn load(&self, _name: &str) -> Result<Value, LoadError> {
            Err(LoadError::NotFound)
        }
        fn available(&self) -> Vec<String> {
            Vec::new()
        }
    }

    let engine = TemplateEngine::new(Arc::new(Empty));
    let err = engine
        .render_named("ghost", &TemplateContext::new())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Template);
    assert_eq!(err.template(), Some("ghost"));
}
