//! Service lifecycle - per-service installation steps.
//!
//! Every service moves through the same states:
//!
//! ```text
//! Created ──► DependenciesChecked ──► ConfigGenerated ──► Installed
//!    │                 │                      │
//!    └─────────────────┴──────────┬───────────┘
//!                                 ▼
//!                               Failed
//! ```
//!
//! There are no retries and no backward moves. Per-service differences
//! (files, context, dependencies) come from the catalog entry behind the
//! descriptor, so one [`ServiceInstaller`] drives every service.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError, InstallStage,
        ports::{CommandRunner, CommandSpec, ConfigWriter},
        services::{
            recovery::{RecoveryManager, RollbackAction},
            template_engine::TemplateEngine,
        },
    },
    domain::{ServiceDescriptor, ServiceType, container_name},
    error::{HomelabError, HomelabResult},
};

/// Where a service is in its installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    DependenciesChecked,
    ConfigGenerated,
    Installed,
    Failed,
}

impl LifecycleState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::DependenciesChecked => "dependencies-checked",
            Self::ConfigGenerated => "config-generated",
            Self::Installed => "installed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State machine for one service in one run.
#[derive(Debug, Clone)]
pub struct ServiceLifecycle {
    descriptor: Arc<ServiceDescriptor>,
    state: LifecycleState,
}

impl ServiceLifecycle {
    pub fn new(descriptor: Arc<ServiceDescriptor>) -> Self {
        Self {
            descriptor,
            state: LifecycleState::Created,
        }
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    fn expect_state(&self, expected: LifecycleState, next: LifecycleState) -> HomelabResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ApplicationError::InvalidTransition {
                service: self.descriptor.service_type(),
                from: self.state.as_str(),
                to: next.as_str(),
            }
            .into())
        }
    }

    /// Run `step` if the machine is in `expected`; move to `next` on success
    /// and to `Failed` otherwise.
    fn transition<T>(
        &mut self,
        expected: LifecycleState,
        next: LifecycleState,
        step: impl FnOnce(&ServiceDescriptor) -> HomelabResult<T>,
    ) -> HomelabResult<T> {
        self.expect_state(expected, next)?;
        match step(&self.descriptor) {
            Ok(value) => {
                debug!(service = %self.descriptor.service_type(), state = %next, "Lifecycle advanced");
                self.state = next;
                Ok(value)
            }
            Err(e) => {
                self.state = LifecycleState::Failed;
                Err(e)
            }
        }
    }
}

/// Record of one successfully installed service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledService {
    pub service_type: ServiceType,
    pub access_url: String,
    pub files: Vec<PathBuf>,
}

/// Drives lifecycles through the container runtime and the config writer.
pub struct ServiceInstaller {
    runner: Arc<dyn CommandRunner>,
    writer: Arc<dyn ConfigWriter>,
    engine: Arc<TemplateEngine>,
}

impl ServiceInstaller {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        writer: Arc<dyn ConfigWriter>,
        engine: Arc<TemplateEngine>,
    ) -> Self {
        Self {
            runner,
            writer,
            engine,
        }
    }

    /// Verify every declared dependency has a container on the host.
    pub fn check_dependencies(&self, lifecycle: &mut ServiceLifecycle) -> HomelabResult<()> {
        lifecycle.transition(
            LifecycleState::Created,
            LifecycleState::DependenciesChecked,
            |descriptor| {
                for &dependency in descriptor.dependencies() {
                    let probe = CommandSpec::new("docker")
                        .args(["container", "inspect"])
                        .arg(container_name(dependency));

                    let output = self.runner.run(&probe).map_err(|e| {
                        stage_error(descriptor, InstallStage::DependencyCheck, e.to_string())
                    })?;
                    if !output.is_success() {
                        return Err(stage_error(
                            descriptor,
                            InstallStage::DependencyCheck,
                            format!("dependency '{dependency}' is not running"),
                        ));
                    }
                    debug!(service = %descriptor.service_type(), dependency = %dependency, "Dependency present");
                }
                Ok(())
            },
        )
    }

    /// Render every config file of the service, then write them.
    ///
    /// Nothing is written unless every file renders. Each written file
    /// registers an action that removes it.
    pub fn generate_config_files(
        &self,
        lifecycle: &mut ServiceLifecycle,
        recovery: &mut RecoveryManager,
    ) -> HomelabResult<Vec<PathBuf>> {
        lifecycle.transition(
            LifecycleState::DependenciesChecked,
            LifecycleState::ConfigGenerated,
            |descriptor| {
                let context = descriptor.template_context().map_err(|e| {
                    stage_error(descriptor, InstallStage::ConfigGeneration, e.to_string())
                })?;

                let rendered = descriptor
                    .def()
                    .config_files
                    .iter()
                    .map(|file| {
                        let content = self.engine.render_named(file.template, &context)?;
                        Ok((descriptor.install_dir().join(file.path), content))
                    })
                    .collect::<HomelabResult<Vec<_>>>()?;

                let mut written = Vec::with_capacity(rendered.len());
                for (path, content) in rendered {
                    self.writer.write_config(&path, &content).map_err(|e| {
                        stage_error(descriptor, InstallStage::ConfigGeneration, e.to_string())
                    })?;

                    let writer = Arc::clone(&self.writer);
                    let target = path.clone();
                    recovery.register_action(RollbackAction::new(
                        format!("remove {}", path.display()),
                        move || writer.remove_config(&target),
                    ));
                    written.push(path);
                }
                Ok(written)
            },
        )
    }

    /// Check dependencies, generate config, then bring the service up.
    ///
    /// Required credentials are verified first, so a service that cannot
    /// render never issues a command.
    #[instrument(skip_all, fields(service = %descriptor.service_type()))]
    pub fn install(
        &self,
        descriptor: Arc<ServiceDescriptor>,
        recovery: &mut RecoveryManager,
    ) -> HomelabResult<InstalledService> {
        if let Some(missing) = descriptor.missing_credentials().first() {
            return Err(stage_error(
                &descriptor,
                InstallStage::ConfigGeneration,
                format!("required credential '{missing}' is missing or empty"),
            ));
        }

        let mut lifecycle = ServiceLifecycle::new(descriptor);
        self.check_dependencies(&mut lifecycle)?;
        let files = self.generate_config_files(&mut lifecycle, recovery)?;

        let runner = Arc::clone(&self.runner);
        lifecycle.transition(
            LifecycleState::ConfigGenerated,
            LifecycleState::Installed,
            |descriptor| {
                let compose = descriptor.compose_path().to_string_lossy().into_owned();
                let project = descriptor.container_name();

                let up = compose_command(&compose, &project).args(["up", "-d"]);
                let output = runner
                    .run(&up)
                    .map_err(|e| stage_error(descriptor, InstallStage::BringUp, e.to_string()))?;
                if !output.is_success() {
                    return Err(stage_error(
                        descriptor,
                        InstallStage::BringUp,
                        output.failure_reason(),
                    ));
                }

                let down = compose_command(&compose, &project).arg("down");
                let rollback_runner = Arc::clone(&runner);
                recovery.register_action(RollbackAction::new(
                    format!("stop {}", descriptor.name()),
                    move || {
                        let output = rollback_runner.run(&down)?;
                        if output.is_success() {
                            Ok(())
                        } else {
                            Err(ApplicationError::CommandFailed {
                                command: down.to_string(),
                                reason: output.failure_reason(),
                            }
                            .into())
                        }
                    },
                ));
                Ok(())
            },
        )?;

        let descriptor = lifecycle.descriptor();
        info!(url = %descriptor.access_url(), "Service installed");
        Ok(InstalledService {
            service_type: descriptor.service_type(),
            access_url: descriptor.access_url(),
            files,
        })
    }
}

fn compose_command(compose: &str, project: &str) -> CommandSpec {
    CommandSpec::new("docker").args(["compose", "-f", compose, "-p", project])
}

fn stage_error(
    descriptor: &ServiceDescriptor,
    stage: InstallStage,
    reason: impl Into<String>,
) -> HomelabError {
    HomelabError::installation(descriptor.service_type(), stage, reason)
}
